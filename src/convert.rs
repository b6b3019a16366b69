//! Eager conversion entry points.
//!
//! ## Layering
//!
//! [`convert_to_webp`] and [`convert_to_webp_base64`] are the core contract:
//! they take an already-constructed [`SourceFile`] and run the read → decode
//! → encode stages, nothing more. They assume the caller has already gated
//! the file through [`crate::validate::validate`] and re-check only that the
//! declared type is an image at all.
//!
//! [`convert`] is the convenience wrapper the CLI uses: it resolves an input
//! string (path, URL, or data URI), runs the validator, then the core
//! pipeline, and returns the blob together with per-stage timings. Use
//! [`crate::stream::convert_stream`] or [`convert_batch`] for many inputs.

use crate::config::ConversionConfig;
use crate::error::Img2WebpError;
use crate::output::{ConversionOutput, ConversionStats, EncodedImage, FileReport};
use crate::pipeline::{decode, encode, input};
use crate::pipeline::input::SourceFile;
use crate::validate;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a source image to a WebP blob at the configured quality.
///
/// This is the primary conversion operation. Pixel dimensions are preserved
/// exactly; only the container and compression change. The declared MIME
/// type must start with `image/` — the full allow-list and size ceiling are
/// the validator's job and are deliberately not re-checked here.
///
/// # Errors
/// * [`Img2WebpError::NotAnImage`] — declared MIME is not `image/*`
/// * [`Img2WebpError::ReadFailure`] — source bytes could not be read
/// * [`Img2WebpError::DecodeFailure`] — bytes are not a decodable image
/// * [`Img2WebpError::EncodeFailure`] — libwebp produced no output
///
/// A failed conversion returns nothing partial: the caller either gets a
/// complete WebP blob or an error to show the user. There are no retries.
pub async fn convert_to_webp(
    file: &SourceFile,
    config: &ConversionConfig,
) -> Result<EncodedImage, Img2WebpError> {
    run_stages(file, config).await.map(|(image, _)| image)
}

/// Convert a source image to a `data:image/webp;base64,…` URI.
///
/// Strictly [`convert_to_webp`] plus a base64 transcode; conversion errors
/// propagate unchanged, and a failure in the transcode step itself surfaces
/// as [`Img2WebpError::Base64TranscodeFailure`].
pub async fn convert_to_webp_base64(
    file: &SourceFile,
    config: &ConversionConfig,
) -> Result<String, Img2WebpError> {
    let image = convert_to_webp(file, config).await?;
    encode::to_data_uri(image.into_bytes()).await
}

/// Convert a local file, URL, or data URI to WebP.
///
/// This is the full pipeline the CLI drives: resolve the input, run the
/// upload validator, then convert. Returns the blob with per-stage timings.
///
/// # Errors
/// Everything [`convert_to_webp`] can return, plus validation and input
/// resolution failures ([`Img2WebpError::UnsupportedFormat`],
/// [`Img2WebpError::FileTooLarge`], [`Img2WebpError::DownloadFailed`], …).
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Img2WebpError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let file = input::resolve_input(input_str, config.download_timeout_secs).await?;

    // ── Step 2: Gate the upload ──────────────────────────────────────────
    validate::validate(&file, config.max_size_megabytes)?;

    // ── Step 3: Run the pipeline ─────────────────────────────────────────
    let (image, mut stats) = run_stages(&file, config).await?;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Converted {} → {} bytes WebP ({:.0}% of input) in {}ms",
        input_str,
        stats.output_bytes,
        stats.compression_ratio() * 100.0,
        stats.total_duration_ms
    );

    Ok(ConversionOutput { image, stats })
}

/// Convert an input and write the WebP blob directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Img2WebpError> {
    let output = convert(input_str, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Img2WebpError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("webp.tmp");
    tokio::fs::write(&tmp_path, &output.image.bytes)
        .await
        .map_err(|e| Img2WebpError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Img2WebpError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Img2WebpError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Img2WebpError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert(input_str, config))
}

/// Convert many inputs concurrently, up to `config.concurrency` at a time.
///
/// One bad file never aborts the batch: every input gets its own
/// [`FileReport`]. Reports come back in input order; progress callbacks (if
/// configured) fire in completion order.
pub async fn convert_batch(inputs: &[String], config: &ConversionConfig) -> Vec<FileReport> {
    let total_files = inputs.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total_files);
    }

    let mut indexed: Vec<(usize, FileReport)> =
        stream::iter(inputs.iter().enumerate().map(|(idx, input_str)| {
            let config = config.clone();
            let input_str = input_str.clone();
            async move {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_start(&input_str, total_files);
                }
                let result = convert(&input_str, &config).await;
                if let Some(ref cb) = config.progress_callback {
                    match &result {
                        Ok(out) => cb.on_file_complete(&input_str, total_files, out.image.len()),
                        Err(e) => cb.on_file_error(&input_str, total_files, e.to_string()),
                    }
                }
                (
                    idx,
                    FileReport {
                        input: input_str,
                        result,
                    },
                )
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    // Restore input order for the eager API; the stream API keeps completion order.
    indexed.sort_by_key(|(idx, _)| *idx);
    let reports: Vec<FileReport> = indexed.into_iter().map(|(_, r)| r).collect();

    let success = reports.iter().filter(|r| r.is_success()).count();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total_files, success);
    }
    info!("Batch complete: {}/{} files converted", success, total_files);

    reports
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run the read → decode → encode stages for one source.
///
/// The three `.await`s below are the pipeline's suspension points; each
/// stage's wall-clock time is recorded for [`ConversionStats`].
async fn run_stages(
    file: &SourceFile,
    config: &ConversionConfig,
) -> Result<(EncodedImage, ConversionStats), Img2WebpError> {
    let total_start = Instant::now();

    // Defence in depth: reject obvious non-images even when the caller
    // skipped the validator. Only the `image/` prefix is checked here.
    let mime = file.mime_type().trim().to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(Img2WebpError::NotAnImage {
            mime: file.mime_type().to_string(),
        });
    }

    let read_start = Instant::now();
    let bytes = file.read_bytes().await?;
    let read_duration_ms = read_start.elapsed().as_millis() as u64;
    let input_bytes = bytes.len() as u64;

    let decode_start = Instant::now();
    let raster = decode::decode_image(bytes, config.max_decoded_pixels).await?;
    let decode_duration_ms = decode_start.elapsed().as_millis() as u64;
    let (width, height) = (raster.width(), raster.height());

    let encode_start = Instant::now();
    let webp_bytes = encode::encode_webp(raster, config.quality).await?;
    let encode_duration_ms = encode_start.elapsed().as_millis() as u64;

    debug!(
        "Stages for {}x{} px: read {}ms, decode {}ms, encode {}ms",
        width, height, read_duration_ms, decode_duration_ms, encode_duration_ms
    );

    let stats = ConversionStats {
        input_bytes,
        output_bytes: webp_bytes.len() as u64,
        read_duration_ms,
        decode_duration_ms,
        encode_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    let image = EncodedImage {
        bytes: webp_bytes,
        width,
        height,
    };

    Ok((image, stats))
}
