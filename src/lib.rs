//! # img2webp
//!
//! Normalise uploaded raster images to WebP.
//!
//! ## Why this crate?
//!
//! Upload endpoints that accept "whatever the user picked" end up storing a
//! zoo of JPEGs, PNGs, GIFs, and WebPs at wildly varying sizes. This crate
//! gates uploads (format allow-list + size ceiling) and re-encodes every
//! accepted image as lossy WebP at a controlled quality — one predictable
//! output format, usually a fraction of the input size, with pixel
//! dimensions preserved exactly.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Input     resolve local file, URL, or data URI
//!  ├─ 2. Validate  MIME allow-list, then size ceiling (first failure wins)
//!  ├─ 3. Read      async read of the source bytes
//!  ├─ 4. Decode    JPEG/PNG/GIF/WebP → raster (CPU-bound, spawn_blocking)
//!  ├─ 5. Encode    raster → lossy WebP via libwebp (CPU-bound, spawn_blocking)
//!  └─ 6. Base64    optional data:image/webp;base64,… transcode
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img2webp::{convert_to_webp, validate, ConversionConfig, SourceFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default(); // quality 0.8, max 5 MB
//!
//!     let file = SourceFile::from_path("photo.jpg").await?;
//!     validate(&file, config.max_size_megabytes)?;
//!
//!     let webp = convert_to_webp(&file, &config).await?;
//!     println!("{}x{} px, {} bytes", webp.width, webp.height, webp.len());
//!     std::fs::write("photo.webp", webp.into_bytes())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2webp` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! img2webp = { version = "0.3", default-features = false }
//! ```
//!
//! ## Concurrency model
//!
//! Every conversion is an independent, stateless call: no cache, no pool, no
//! shared state. Concurrent calls are safe without locking, and each call
//! suspends (never blocks) at its read, decode, and encode stages. A caller
//! that abandons a conversion simply drops the future; superseded-result
//! bookkeeping belongs to the caller, not this crate.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod validate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    convert, convert_batch, convert_sync, convert_to_file, convert_to_webp,
    convert_to_webp_base64,
};
pub use error::Img2WebpError;
pub use output::{ConversionOutput, ConversionStats, EncodedImage, FileReport, WEBP_MIME};
pub use pipeline::input::{resolve_input, SourceFile};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, ReportStream};
pub use validate::{is_supported_image_mime, validate, ALLOWED_MIME_TYPES};
