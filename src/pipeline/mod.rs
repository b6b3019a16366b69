//! Pipeline stages for image-to-WebP normalisation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the decode backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ read ──▶ decode ──▶ encode ──▶ (base64)
//! (path/URL/  (async    (image,       (libwebp,      (data URI,
//!  data URI)   I/O)  spawn_blocking) spawn_blocking)  optional)
//! ```
//!
//! 1. [`input`]  — canonicalise the user-supplied path, URL, or data URI into
//!    a [`input::SourceFile`]
//! 2. [`decode`] — decode the source bytes into a raster; runs in
//!    `spawn_blocking` because decoding is CPU-bound
//! 3. [`encode`] — re-encode the raster as lossy WebP at the configured
//!    quality, and optionally transcode the blob to a base64 data URI
//!
//! Every stage suspends the calling task rather than blocking it; the stages
//! of one conversion run strictly in sequence, but any number of conversions
//! can be in flight at once because nothing is shared between calls.

pub mod decode;
pub mod encode;
pub mod input;
