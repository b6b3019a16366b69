//! Raster decoding: source bytes → `DynamicImage`.
//!
//! ## Why spawn_blocking?
//!
//! Decoding a multi-megapixel JPEG is pure CPU work that can take hundreds of
//! milliseconds. `tokio::task::spawn_blocking` moves it onto the blocking
//! thread pool so the async caller (and everything else on the runtime) keeps
//! making progress while pixels are unpacked.
//!
//! ## Why probe the header first?
//!
//! Dimensions are preserved through conversion, so the decoded RGBA buffer is
//! `width × height × 4` bytes — a pathological upload can claim gigabytes
//! before a single pixel is useful. When a pixel budget is configured we read
//! only the image header (cheap, no pixel allocation) and reject over-budget
//! files before the full decode.

use crate::error::Img2WebpError;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Decode image bytes into a raster, off the async thread.
///
/// `max_decoded_pixels` is the opt-in budget from
/// [`crate::config::ConversionConfig::max_decoded_pixels`]; `None` decodes
/// unconditionally.
pub async fn decode_image(
    bytes: Vec<u8>,
    max_decoded_pixels: Option<u64>,
) -> Result<DynamicImage, Img2WebpError> {
    tokio::task::spawn_blocking(move || decode_blocking(&bytes, max_decoded_pixels))
        .await
        .map_err(|e| Img2WebpError::Internal(format!("decode task panicked: {e}")))?
}

/// Blocking implementation of the decode stage.
fn decode_blocking(
    bytes: &[u8],
    max_decoded_pixels: Option<u64>,
) -> Result<DynamicImage, Img2WebpError> {
    if let Some(max_pixels) = max_decoded_pixels {
        let (width, height) = header_dimensions(bytes)?;
        let pixels = width as u64 * height as u64;
        if pixels > max_pixels {
            return Err(Img2WebpError::PixelBudgetExceeded { pixels, max_pixels });
        }
    }

    let img = image::load_from_memory(bytes).map_err(|e| Img2WebpError::DecodeFailure {
        detail: e.to_string(),
    })?;

    debug!("Decoded image: {}x{} px", img.width(), img.height());

    Ok(img)
}

/// Read width and height from the image header alone.
fn header_dimensions(bytes: &[u8]) -> Result<(u32, u32), Img2WebpError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Img2WebpError::DecodeFailure {
            detail: e.to_string(),
        })?
        .into_dimensions()
        .map_err(|e| Img2WebpError::DecodeFailure {
            detail: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 120, 200, 255]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("png encode");
        buf
    }

    #[tokio::test]
    async fn decodes_png_and_preserves_dimensions() {
        let img = decode_image(png_bytes(17, 9), None).await.expect("decode");
        assert_eq!((img.width(), img.height()), (17, 9));
    }

    #[tokio::test]
    async fn corrupt_bytes_are_a_decode_failure() {
        let err = decode_image(b"not an image at all".to_vec(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Img2WebpError::DecodeFailure { .. }));
    }

    #[tokio::test]
    async fn truncated_png_is_a_decode_failure() {
        let mut bytes = png_bytes(64, 64);
        bytes.truncate(bytes.len() / 2);
        let err = decode_image(bytes, None).await.unwrap_err();
        assert!(matches!(err, Img2WebpError::DecodeFailure { .. }));
    }

    #[tokio::test]
    async fn pixel_budget_rejects_from_header_alone() {
        let err = decode_image(png_bytes(100, 100), Some(9_999))
            .await
            .unwrap_err();
        match err {
            Img2WebpError::PixelBudgetExceeded { pixels, max_pixels } => {
                assert_eq!(pixels, 10_000);
                assert_eq!(max_pixels, 9_999);
            }
            other => panic!("expected PixelBudgetExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pixel_budget_admits_images_at_the_limit() {
        let img = decode_image(png_bytes(100, 100), Some(10_000))
            .await
            .expect("within budget");
        assert_eq!((img.width(), img.height()), (100, 100));
    }
}
