//! Error types for the img2webp library.
//!
//! A single enum carries every failure the pipeline can surface. Each stage
//! owns distinct variants so callers can match on *where* a conversion died
//! (validation, read, decode, encode, transcode) rather than string-compare
//! messages:
//!
//! * [`Img2WebpError::UnsupportedFormat`] / [`Img2WebpError::FileTooLarge`] —
//!   the upload gate rejected the file before any pixel work.
//! * [`Img2WebpError::NotAnImage`] — the converter's own MIME check failed
//!   (only reachable when the caller skipped the validator).
//! * [`Img2WebpError::ReadFailure`], [`Img2WebpError::DecodeFailure`],
//!   [`Img2WebpError::EncodeFailure`], [`Img2WebpError::Base64TranscodeFailure`]
//!   — one per pipeline stage, in stage order.
//!
//! The `Display` strings are written for end users: the form-handling layer
//! is expected to show them verbatim in a toast or field error.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the img2webp library.
#[derive(Debug, Error)]
pub enum Img2WebpError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Declared MIME type is outside the upload allow-list.
    #[error("unsupported image format '{mime}': use JPG, PNG, GIF, or WebP")]
    UnsupportedFormat { mime: String },

    /// File exceeds the configured size ceiling.
    #[error("file is {size_bytes} bytes: maximum file size is {max_megabytes} MB")]
    FileTooLarge { size_bytes: u64, max_megabytes: u32 },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The converter's defence-in-depth check failed: the declared MIME type
    /// does not start with `image/`. Validation was evidently skipped.
    #[error("file must be an image (got '{mime}')")]
    NotAnImage { mime: String },

    /// Could not read the source bytes from disk.
    #[error("failed to read file '{path}': {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes could not be decoded into a raster image (corrupt, truncated,
    /// or an unsupported sub-format).
    #[error("failed to load image: {detail}")]
    DecodeFailure { detail: String },

    /// The WebP encoder produced no usable output.
    #[error("failed to convert image to WebP: {detail}")]
    EncodeFailure { detail: String },

    /// The base64 transcode stage failed.
    #[error("failed to convert to base64: {detail}")]
    Base64TranscodeFailure { detail: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// HTTP URL was syntactically valid but the download failed.
    #[error("failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// A `data:` URI input was malformed.
    #[error("invalid data URI: {detail}")]
    InvalidDataUri { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output WebP file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Resource errors ───────────────────────────────────────────────────
    /// The image's header dimensions exceed the opt-in decode budget.
    #[error("image is {pixels} pixels (limit: {max_pixels})")]
    PixelBudgetExceeded { pixels: u64, max_pixels: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking-pool task panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Img2WebpError {
    /// Whether the error came from the pre-conversion upload gate.
    ///
    /// The UI typically keeps the file picker open for these, while pipeline
    /// errors usually mean the file itself is unusable.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Img2WebpError::UnsupportedFormat { .. } | Img2WebpError::FileTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_the_allow_list() {
        let e = Img2WebpError::UnsupportedFormat {
            mime: "application/pdf".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("application/pdf"), "got: {msg}");
        assert!(msg.contains("JPG, PNG, GIF, or WebP"), "got: {msg}");
    }

    #[test]
    fn file_too_large_names_the_configured_limit() {
        let e = Img2WebpError::FileTooLarge {
            size_bytes: 6 * 1024 * 1024,
            max_megabytes: 5,
        };
        let msg = e.to_string();
        assert!(msg.contains("5 MB"), "got: {msg}");
    }

    #[test]
    fn not_an_image_display() {
        let e = Img2WebpError::NotAnImage {
            mime: "text/plain".into(),
        };
        assert!(e.to_string().starts_with("file must be an image"));
    }

    #[test]
    fn decode_failure_display() {
        let e = Img2WebpError::DecodeFailure {
            detail: "unexpected EOF".into(),
        };
        assert!(e.to_string().starts_with("failed to load image"));
    }

    #[test]
    fn encode_failure_display() {
        let e = Img2WebpError::EncodeFailure {
            detail: "VP8 error".into(),
        };
        assert!(e.to_string().starts_with("failed to convert image to WebP"));
    }

    #[test]
    fn base64_failure_is_distinct_from_encode_failure() {
        let e = Img2WebpError::Base64TranscodeFailure {
            detail: "worker died".into(),
        };
        assert!(e.to_string().starts_with("failed to convert to base64"));
        assert!(!e.is_validation());
    }

    #[test]
    fn validation_predicate() {
        assert!(Img2WebpError::UnsupportedFormat { mime: "x/y".into() }.is_validation());
        assert!(Img2WebpError::FileTooLarge {
            size_bytes: 1,
            max_megabytes: 5
        }
        .is_validation());
        assert!(!Img2WebpError::NotAnImage { mime: "x/y".into() }.is_validation());
    }
}
