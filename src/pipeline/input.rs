//! Input resolution: normalise a user-supplied path, URL, or data URI into a
//! [`SourceFile`].
//!
//! ## Why a declared MIME type?
//!
//! Browsers attach a MIME type to every picked file, and the upload contract
//! trusts that declaration for gating: the validator works from the declared
//! type and byte size alone, without touching pixel data. Content sniffing is
//! deliberately not done here — the decoder is the final arbiter of whether
//! the bytes really are an image, and lying about the type only moves the
//! failure from the gate to the decode stage.

use crate::error::Img2WebpError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `data:<mime>;base64,<payload>` — the only data-URI shape accepted.
static RE_DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:([A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+);base64,([A-Za-z0-9+/]*={0,2})$").unwrap()
});

/// Where a source's bytes live until the pipeline reads them.
#[derive(Debug)]
enum SourceOrigin {
    /// Bytes already in memory (direct upload, URL download, data URI).
    Memory(Vec<u8>),
    /// A local file, read lazily by [`SourceFile::read_bytes`].
    Local(PathBuf),
}

/// An upload candidate: declared MIME type, byte size, and the bytes' origin.
///
/// A `SourceFile` is consumed by one conversion call and carries no state
/// beyond what the caller supplied; re-selecting a file means constructing a
/// fresh instance.
#[derive(Debug)]
pub struct SourceFile {
    mime_type: String,
    byte_size: u64,
    origin: SourceOrigin,
}

impl SourceFile {
    /// Wrap in-memory bytes with a caller-declared MIME type.
    pub fn from_bytes(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            byte_size: bytes.len() as u64,
            origin: SourceOrigin::Memory(bytes),
        }
    }

    /// Reference a local file, deriving the MIME type from its extension.
    ///
    /// Only the file's metadata is touched here; the bytes are read later, at
    /// the pipeline's read stage. Files with an unrecognised extension get
    /// `application/octet-stream`, which the validator rejects.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Img2WebpError> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| Img2WebpError::ReadFailure {
                path: path.clone(),
                source: e,
            })?;

        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension)
            .unwrap_or("application/octet-stream");

        debug!("Resolved local file: {} ({})", path.display(), mime);

        Ok(Self {
            mime_type: mime.to_string(),
            byte_size: meta.len(),
            origin: SourceOrigin::Local(path),
        })
    }

    /// Parse a `data:<mime>;base64,<payload>` URI into an in-memory source.
    pub fn from_data_uri(uri: &str) -> Result<Self, Img2WebpError> {
        let caps = RE_DATA_URI
            .captures(uri.trim())
            .ok_or_else(|| Img2WebpError::InvalidDataUri {
                detail: "expected data:<mime>;base64,<payload>".to_string(),
            })?;

        let mime = caps[1].to_ascii_lowercase();
        let bytes = STANDARD
            .decode(&caps[2])
            .map_err(|e| Img2WebpError::InvalidDataUri {
                detail: format!("payload is not valid base64: {e}"),
            })?;

        Ok(Self::from_bytes(bytes, mime))
    }

    /// The declared MIME type, exactly as supplied.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the source in bytes, known without reading the content.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Read the full binary content.
    ///
    /// This is the pipeline's first suspension point: path-backed sources hit
    /// the filesystem asynchronously, in-memory sources return immediately.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, Img2WebpError> {
        match &self.origin {
            SourceOrigin::Memory(bytes) => Ok(bytes.clone()),
            SourceOrigin::Local(path) => tokio::fs::read(path).await.map_err(|e| {
                Img2WebpError::ReadFailure {
                    path: path.clone(),
                    source: e,
                }
            }),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Check if the input string looks like a data URI.
pub fn is_data_uri(input: &str) -> bool {
    input.starts_with("data:")
}

/// Resolve an input string to a [`SourceFile`].
///
/// Accepts a local file path, an HTTP/HTTPS URL (downloaded into memory), or
/// a base64 data URI.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<SourceFile, Img2WebpError> {
    if is_data_uri(input) {
        SourceFile::from_data_uri(input)
    } else if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        SourceFile::from_path(input).await
    }
}

/// Download a URL into memory and return it as a [`SourceFile`].
///
/// The MIME type comes from the `Content-Type` response header when present
/// (parameters stripped), falling back to the URL path's extension.
async fn download_url(url: &str, timeout_secs: u64) -> Result<SourceFile, Img2WebpError> {
    info!("Downloading image from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Img2WebpError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Img2WebpError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Img2WebpError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Img2WebpError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let header_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase());

    let mime = match header_mime {
        Some(m) if !m.is_empty() => m,
        _ => extension_from_url(url)
            .as_deref()
            .and_then(mime_for_extension)
            .unwrap_or("application/octet-stream")
            .to_string(),
    };

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Img2WebpError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes ({})", bytes.len(), mime);

    Ok(SourceFile::from_bytes(bytes.to_vec(), mime))
}

/// Extract a file extension from the URL path, if it has one.
fn extension_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    let last = segments.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_string())
    }
}

/// Map a file extension to its upload MIME type.
fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/photo.jpg"));
        assert!(is_url("http://example.com/photo.jpg"));
        assert!(!is_url("/tmp/photo.jpg"));
        assert!(!is_url("photo.jpg"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_is_data_uri() {
        assert!(is_data_uri("data:image/png;base64,AAAA"));
        assert!(!is_data_uri("photo.png"));
    }

    #[test]
    fn from_bytes_records_declared_mime_and_size() {
        let f = SourceFile::from_bytes(vec![1, 2, 3], "image/png");
        assert_eq!(f.mime_type(), "image/png");
        assert_eq!(f.byte_size(), 3);
    }

    #[tokio::test]
    async fn memory_source_reads_back_its_bytes() {
        let f = SourceFile::from_bytes(vec![9, 8, 7], "image/gif");
        assert_eq!(f.read_bytes().await.unwrap(), vec![9, 8, 7]);
    }

    #[test]
    fn data_uri_roundtrip() {
        let payload = STANDARD.encode([0xDE, 0xAD, 0xBE, 0xEF]);
        let uri = format!("data:image/webp;base64,{payload}");
        let f = SourceFile::from_data_uri(&uri).expect("valid data URI");
        assert_eq!(f.mime_type(), "image/webp");
        assert_eq!(f.byte_size(), 4);
    }

    #[test]
    fn data_uri_rejects_missing_base64_marker() {
        let err = SourceFile::from_data_uri("data:image/png,plain").unwrap_err();
        assert!(matches!(err, Img2WebpError::InvalidDataUri { .. }));
    }

    #[test]
    fn data_uri_rejects_bad_payload() {
        let err = SourceFile::from_data_uri("data:image/png;base64,!!!!").unwrap_err();
        assert!(matches!(err, Img2WebpError::InvalidDataUri { .. }));
    }

    #[test]
    fn extension_mapping_is_case_insensitive() {
        assert_eq!(mime_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("Png"), Some("image/png"));
        assert_eq!(mime_for_extension("svg"), None);
    }

    #[test]
    fn extension_from_url_ignores_bare_paths() {
        assert_eq!(
            extension_from_url("https://example.com/a/photo.webp"),
            Some("webp".to_string())
        );
        assert_eq!(extension_from_url("https://example.com/a/photo"), None);
    }

    #[tokio::test]
    async fn from_path_missing_file_is_read_failure() {
        let err = SourceFile::from_path("/definitely/not/a/real/photo.png")
            .await
            .unwrap_err();
        assert!(matches!(err, Img2WebpError::ReadFailure { .. }));
    }
}
