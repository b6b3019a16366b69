//! Configuration types for image-to-WebP conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across tasks and to diff two runs to understand
//! why their outputs differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest; new knobs don't break call sites.

use crate::error::Img2WebpError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for an image-to-WebP conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use img2webp::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .quality(0.9)
///     .max_size_megabytes(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// WebP encoding quality. Range: 0.0–1.0. Default: 0.8.
    ///
    /// Higher means larger output with less compression artifacting. 0.8 is
    /// the sweet spot for photographic uploads: visually clean while usually
    /// cutting payload size by half or more against the original JPEG/PNG.
    pub quality: f32,

    /// Maximum accepted upload size in megabytes. Default: 5.
    ///
    /// Enforced by [`crate::validate::validate`] against the source's byte
    /// size, before any decode work. One megabyte is 1024 × 1024 bytes.
    pub max_size_megabytes: u32,

    /// Optional decode budget in total pixels (width × height). Default: None.
    ///
    /// The encoder preserves dimensions exactly, so a pathological 20 000 ×
    /// 20 000 px upload allocates a 1.6 GB RGBA buffer during rasterisation.
    /// Setting a budget rejects such files from the image header alone,
    /// before the full decode. `None` keeps the historical unbounded
    /// behaviour.
    pub max_decoded_pixels: Option<u64>,

    /// Number of files converted concurrently in batch mode. Default: 4.
    ///
    /// Decode and encode are CPU-bound and run on the blocking pool, so
    /// there is little point exceeding the machine's core count.
    pub concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-file progress callback for batch conversion.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            quality: 0.8,
            max_size_megabytes: 5,
            max_decoded_pixels: None,
            concurrency: 4,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("quality", &self.quality)
            .field("max_size_megabytes", &self.max_size_megabytes)
            .field("max_decoded_pixels", &self.max_decoded_pixels)
            .field("concurrency", &self.concurrency)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The size ceiling in bytes (`max_size_megabytes` × 1024 × 1024).
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_megabytes as u64 * 1024 * 1024
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn quality(mut self, q: f32) -> Self {
        self.config.quality = q;
        self
    }

    pub fn max_size_megabytes(mut self, mb: u32) -> Self {
        self.config.max_size_megabytes = mb.max(1);
        self
    }

    pub fn max_decoded_pixels(mut self, pixels: u64) -> Self {
        self.config.max_decoded_pixels = Some(pixels.max(1));
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Img2WebpError> {
        let c = &self.config;
        if !(0.0..=1.0).contains(&c.quality) {
            return Err(Img2WebpError::InvalidConfig(format!(
                "quality must be 0.0–1.0, got {}",
                c.quality
            )));
        }
        if c.max_size_megabytes == 0 {
            return Err(Img2WebpError::InvalidConfig(
                "max_size_megabytes must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(Img2WebpError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}
