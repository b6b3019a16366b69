//! Output types: the encoded blob, per-stage timings, and batch reports.

use serde::{Deserialize, Serialize};

use crate::error::Img2WebpError;

/// The MIME type of every blob this library produces.
pub const WEBP_MIME: &str = "image/webp";

/// A WebP-encoded image blob with its pixel dimensions.
///
/// The MIME type is always [`WEBP_MIME`], regardless of what the source
/// declared. In JSON the bytes serialise as a base64 string rather than an
/// integer array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// The WebP container bytes.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// Pixel width, equal to the decoded source width.
    pub width: u32,
    /// Pixel height, equal to the decoded source height.
    pub height: u32,
}

impl EncodedImage {
    /// The output MIME type. Always `image/webp`.
    pub fn mime_type(&self) -> &'static str {
        WEBP_MIME
    }

    /// Byte length of the encoded blob.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob is empty (never true for a successful conversion).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the image, returning the raw WebP bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Timing and size accounting for one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Source size in bytes.
    pub input_bytes: u64,
    /// Encoded WebP size in bytes.
    pub output_bytes: u64,
    /// Wall-clock time spent reading the source.
    pub read_duration_ms: u64,
    /// Wall-clock time spent decoding.
    pub decode_duration_ms: u64,
    /// Wall-clock time spent encoding (and, in the base64 path, transcoding).
    pub encode_duration_ms: u64,
    /// Total wall-clock time for the conversion.
    pub total_duration_ms: u64,
}

impl ConversionStats {
    /// Output size as a fraction of input size (1.0 = no savings).
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.output_bytes as f64 / self.input_bytes as f64
    }
}

/// Result of a full-pipeline conversion: the blob plus its accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub image: EncodedImage,
    pub stats: ConversionStats,
}

/// Outcome of one input within a batch.
///
/// Batch conversion never aborts on a single bad file; each input gets its
/// own report, successful or not.
#[derive(Debug)]
pub struct FileReport {
    /// The input string exactly as given to the batch.
    pub input: String,
    /// The conversion outcome for this input.
    pub result: Result<ConversionOutput, Img2WebpError>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Serde adapter: `Vec<u8>` ⇄ base64 string.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_image_mime_is_fixed() {
        let img = EncodedImage {
            bytes: vec![1, 2, 3],
            width: 2,
            height: 1,
        };
        assert_eq!(img.mime_type(), "image/webp");
        assert_eq!(img.len(), 3);
        assert!(!img.is_empty());
    }

    #[test]
    fn encoded_image_bytes_serialise_as_base64() {
        let img = EncodedImage {
            bytes: vec![0xDE, 0xAD],
            width: 1,
            height: 1,
        };
        let json = serde_json::to_value(&img).unwrap();
        assert_eq!(json["bytes"], "3q0=");

        let back: EncodedImage = serde_json::from_value(json).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn compression_ratio_handles_zero_input() {
        let stats = ConversionStats {
            input_bytes: 0,
            output_bytes: 10,
            read_duration_ms: 0,
            decode_duration_ms: 0,
            encode_duration_ms: 0,
            total_duration_ms: 0,
        };
        assert_eq!(stats.compression_ratio(), 0.0);
    }

    #[test]
    fn compression_ratio_is_output_over_input() {
        let stats = ConversionStats {
            input_bytes: 200,
            output_bytes: 50,
            read_duration_ms: 1,
            decode_duration_ms: 2,
            encode_duration_ms: 3,
            total_duration_ms: 6,
        };
        assert!((stats.compression_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
