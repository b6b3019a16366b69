//! Progress-callback trait for per-file batch-conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events as the batch pipeline processes each file.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a WebSocket, or a terminal
//! progress bar — without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` so it works correctly
//! when files are converted concurrently.

use std::sync::Arc;

/// Called by the batch pipeline as it processes each file.
///
/// Implementations must be `Send + Sync` (files are converted concurrently).
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// `on_file_start`, `on_file_complete`, and `on_file_error` may be called
/// concurrently from different tasks. Implementations must protect shared
/// mutable state with appropriate synchronisation primitives (e.g. `Mutex`,
/// `AtomicUsize`).
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any file is converted.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a file's pipeline starts.
    ///
    /// # Arguments
    /// * `input`       — the input string as given to the batch
    /// * `total_files` — total files in the batch
    fn on_file_start(&self, input: &str, total_files: usize) {
        let _ = (input, total_files);
    }

    /// Called when a file is successfully converted.
    ///
    /// # Arguments
    /// * `input`        — the input string as given to the batch
    /// * `total_files`  — total files in the batch
    /// * `output_bytes` — byte length of the produced WebP blob
    fn on_file_complete(&self, input: &str, total_files: usize, output_bytes: usize) {
        let _ = (input, total_files, output_bytes);
    }

    /// Called when a file fails anywhere in its pipeline.
    ///
    /// # Arguments
    /// * `input`       — the input string as given to the batch
    /// * `total_files` — total files in the batch
    /// * `error`       — human-readable error description
    fn on_file_error(&self, input: &str, total_files: usize, error: String) {
        let _ = (input, total_files, error);
    }

    /// Called once after all files have been attempted.
    ///
    /// # Arguments
    /// * `total_files`   — total files in the batch
    /// * `success_count` — files that converted without error
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: Arc<AtomicUsize>,
        completes: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
        completed_total: Arc<AtomicUsize>,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_file_start(&self, _input: &str, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _input: &str, _total: usize, _output_bytes: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _input: &str, _total: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total: usize, success_count: usize) {
            self.completed_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(5);
        cb.on_file_start("a.jpg", 5);
        cb.on_file_complete("a.jpg", 5, 42);
        cb.on_file_error("b.jpg", 5, "some error".to_string());
        cb.on_batch_complete(5, 4);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: Arc::new(AtomicUsize::new(0)),
            completes: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
            completed_total: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_file_start("a.jpg", 3);
        tracker.on_file_complete("a.jpg", 3, 100);
        tracker.on_file_start("b.png", 3);
        tracker.on_file_complete("b.png", 3, 200);
        tracker.on_file_start("c.gif", 3);
        tracker.on_file_error("c.gif", 3, "failed to load image: bad frame".to_string());

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);

        tracker.on_batch_complete(3, 2);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ConversionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_file_start("x.webp", 10);
        cb.on_file_complete("x.webp", 10, 512);
    }
}
