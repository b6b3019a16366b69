//! Upload validation: reject unacceptable files before any decode work.
//!
//! The gate is a pure function over the source's declared MIME type and byte
//! size — no pixel data is touched. Checks run in a fixed order (format, then
//! size) and the first failure wins, so a caller always gets exactly one
//! error to show the user.

use crate::error::Img2WebpError;
use crate::pipeline::input::SourceFile;

/// MIME types accepted for upload.
///
/// `image/jpg` is not a registered type, but real browsers and form libraries
/// emit it often enough that rejecting it just generates support tickets.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Returns whether a declared MIME type is on the upload allow-list.
pub fn is_supported_image_mime(mime: &str) -> bool {
    let canon = mime.trim().to_ascii_lowercase();
    ALLOWED_MIME_TYPES.contains(&canon.as_str())
}

/// Validate an upload candidate against the format allow-list and a size
/// ceiling.
///
/// `Ok(())` means the file may proceed to conversion. The error carries the
/// exact message to show the user:
///
/// * [`Img2WebpError::UnsupportedFormat`] — MIME type outside the allow-list
///   (checked first, regardless of size)
/// * [`Img2WebpError::FileTooLarge`] — more than `max_size_megabytes` MB
///
/// # Example
/// ```rust
/// use img2webp::{validate, SourceFile};
///
/// let file = SourceFile::from_bytes(vec![0u8; 128], "image/png");
/// assert!(validate(&file, 5).is_ok());
///
/// let pdf = SourceFile::from_bytes(vec![0u8; 128], "application/pdf");
/// assert!(validate(&pdf, 5).is_err());
/// ```
pub fn validate(file: &SourceFile, max_size_megabytes: u32) -> Result<(), Img2WebpError> {
    if !is_supported_image_mime(file.mime_type()) {
        return Err(Img2WebpError::UnsupportedFormat {
            mime: file.mime_type().to_string(),
        });
    }

    let max_bytes = max_size_megabytes as u64 * 1024 * 1024;
    if file.byte_size() > max_bytes {
        return Err(Img2WebpError::FileTooLarge {
            size_bytes: file.byte_size(),
            max_megabytes: max_size_megabytes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_of(mime: &str, size: usize) -> SourceFile {
        SourceFile::from_bytes(vec![0u8; size], mime)
    }

    #[test]
    fn accepts_every_allow_listed_type() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(
                validate(&file_of(mime, 1024), 5).is_ok(),
                "{mime} should be accepted"
            );
        }
    }

    #[test]
    fn accepts_mixed_case_mime() {
        assert!(validate(&file_of("Image/JPEG", 1024), 5).is_ok());
    }

    #[test]
    fn rejects_unsupported_type_regardless_of_size() {
        let err = validate(&file_of("application/pdf", 10), 5).unwrap_err();
        assert!(matches!(err, Img2WebpError::UnsupportedFormat { .. }));
    }

    #[test]
    fn rejects_empty_mime() {
        let err = validate(&file_of("", 10), 5).unwrap_err();
        assert!(matches!(err, Img2WebpError::UnsupportedFormat { .. }));
    }

    #[test]
    fn rejects_oversized_file_with_limit_in_message() {
        let err = validate(&file_of("image/png", 6 * 1024 * 1024), 5).unwrap_err();
        assert!(matches!(err, Img2WebpError::FileTooLarge { .. }));
        assert!(err.to_string().contains("5 MB"));
    }

    #[test]
    fn size_exactly_at_the_ceiling_passes() {
        assert!(validate(&file_of("image/webp", 5 * 1024 * 1024), 5).is_ok());
    }

    #[test]
    fn format_is_checked_before_size() {
        // Oversized AND unsupported: the format error must win.
        let err = validate(&file_of("video/mp4", 6 * 1024 * 1024), 5).unwrap_err();
        assert!(matches!(err, Img2WebpError::UnsupportedFormat { .. }));
    }

    #[test]
    fn custom_ceiling_is_honoured() {
        assert!(validate(&file_of("image/png", 2 * 1024 * 1024), 1).is_err());
        assert!(validate(&file_of("image/png", 2 * 1024 * 1024), 2).is_ok());
    }
}
