//! WebP encoding: `DynamicImage` → lossy WebP bytes, plus the base64
//! data-URI transcode.
//!
//! ## Why the `webp` crate?
//!
//! The `image` crate decodes WebP but only *encodes* it losslessly, with no
//! quality knob. The `webp` crate binds libwebp directly and exposes the
//! quality-parameterised lossy encoder this pipeline is built around.
//!
//! ## Why convert to RGBA8 first?
//!
//! libwebp accepts RGB8/RGBA8 input only. `to_rgba8` normalises every decoded
//! representation (palette GIFs, 16-bit PNGs, grayscale JPEGs) without
//! touching dimensions, so the conversion stays a pure re-encode.

use crate::error::Img2WebpError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use tracing::debug;
use webp::{Encoder, PixelLayout};

/// Encode a decoded raster as lossy WebP, off the async thread.
///
/// `quality` is the caller-facing 0.0–1.0 scale; libwebp's 0–100 scale is an
/// implementation detail. Dimensions pass through untouched.
pub async fn encode_webp(img: DynamicImage, quality: f32) -> Result<Vec<u8>, Img2WebpError> {
    tokio::task::spawn_blocking(move || encode_webp_blocking(&img, quality))
        .await
        .map_err(|e| Img2WebpError::Internal(format!("encode task panicked: {e}")))?
}

/// Blocking implementation of the encode stage.
pub(crate) fn encode_webp_blocking(
    img: &DynamicImage,
    quality: f32,
) -> Result<Vec<u8>, Img2WebpError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let encoder = Encoder::new(rgba.as_raw(), PixelLayout::Rgba, width, height);
    let memory = encoder
        .encode_simple(false, (quality * 100.0).clamp(0.0, 100.0))
        .map_err(|e| Img2WebpError::EncodeFailure {
            detail: format!("{e:?}"),
        })?;

    let bytes = memory.to_vec();
    if bytes.is_empty() {
        return Err(Img2WebpError::EncodeFailure {
            detail: "encoder returned no bytes".to_string(),
        });
    }

    debug!(
        "Encoded {}x{} px → {} bytes WebP (quality {})",
        width,
        height,
        bytes.len(),
        quality
    );

    Ok(bytes)
}

/// Transcode a WebP blob into a `data:image/webp;base64,…` URI.
///
/// Base64-expanding a multi-megabyte blob is CPU work, so it runs on the
/// blocking pool like the other stages. A failure of the transcode task is
/// surfaced as its own error kind, distinct from encode failures.
pub async fn to_data_uri(webp_bytes: Vec<u8>) -> Result<String, Img2WebpError> {
    tokio::task::spawn_blocking(move || {
        format!("data:image/webp;base64,{}", STANDARD.encode(&webp_bytes))
    })
    .await
    .map_err(|e| Img2WebpError::Base64TranscodeFailure {
        detail: e.to_string(),
    })
}
