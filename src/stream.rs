//! Streaming batch API: emit per-file reports as they complete.
//!
//! ## Why stream?
//!
//! A directory of large photos takes a while to churn through. A
//! streams-based API lets callers display partial results immediately, wire
//! up progress bars, or upload converted files as soon as each one is ready
//! instead of buffering the entire batch in memory.
//!
//! Unlike the eager [`crate::convert::convert_batch`] which returns only
//! after all files finish (in input order), [`convert_stream`] yields
//! [`FileReport`] items as each file completes — which means out of input
//! order whenever `concurrency > 1`. Match on `report.input` if identity
//! matters.

use crate::config::ConversionConfig;
use crate::convert;
use crate::output::FileReport;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file conversion reports.
pub type ReportStream = Pin<Box<dyn Stream<Item = FileReport> + Send>>;

/// Convert many inputs, streaming each report as its conversion finishes.
///
/// Per-file failures are carried inside the report; the stream itself never
/// errors and always yields exactly one item per input.
pub fn convert_stream(inputs: &[String], config: &ConversionConfig) -> ReportStream {
    info!("Starting streaming batch of {} files", inputs.len());

    let concurrency = config.concurrency;
    let config = config.clone();
    let inputs: Vec<String> = inputs.to_vec();

    let s = stream::iter(inputs.into_iter().map(move |input_str| {
        let config = config.clone();
        async move {
            let result = convert::convert(&input_str, &config).await;
            FileReport {
                input: input_str,
                result,
            }
        }
    }))
    .buffer_unordered(concurrency);

    Box::pin(s)
}
