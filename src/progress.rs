//! Progress-callback trait for per-page and per-row pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events as each stage walks through pages or manifest rows. Callers can
//! forward them to a terminal progress bar, a log, or a test recorder without
//! the library knowing how the host application reports progress.
//!
//! # Example
//!
//! ```rust
//! use pdf2deck::{PipelineConfig, PipelineProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, stage: Stage, item: u32, total: usize) {
//!         let n = self.done.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{stage}: {item} ({n}/{total})");
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//! let config = PipelineConfig::builder()
//!     .progress_callback(cb as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// A pipeline stage that reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Rasterising (and possibly trimming) PDF pages.
    Render,
    /// Extracting page text and classifying pages.
    Classify,
    /// Turning manifest rows into slides.
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Render => "Rendering",
            Stage::Classify => "Classifying",
            Stage::Assemble => "Assembling",
        })
    }
}

/// Called by the pipeline as it processes each page or row.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Items are reported strictly in input order.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once before the first item of a stage.
    ///
    /// # Arguments
    /// * `total` — number of pages or rows the stage will visit
    fn on_stage_start(&self, stage: Stage, total: usize) {
        let _ = (stage, total);
    }

    /// Called when an item finished successfully.
    ///
    /// # Arguments
    /// * `item`  — 1-indexed page number, or manifest page number for rows
    /// * `total` — same value passed to `on_stage_start`
    fn on_item_complete(&self, stage: Stage, item: u32, total: usize) {
        let _ = (stage, item, total);
    }

    /// Called when an item was skipped without failing the run
    /// (out-of-range page, blank page after trimming, unknown slide type).
    fn on_item_skipped(&self, stage: Stage, item: u32, reason: String) {
        let _ = (stage, item, reason);
    }

    /// Called once after the last item of a stage.
    ///
    /// # Arguments
    /// * `completed` — items that finished successfully
    fn on_stage_complete(&self, stage: Stage, completed: usize) {
        let _ = (stage, completed);
    }
}

/// Type alias for a shared, thread-safe progress callback.
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

/// A no-op callback implementation, used when no callback is configured.
pub(crate) struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Return the configured callback, or a no-op one.
pub(crate) fn callback_or_noop(cb: &Option<ProgressCallback>) -> ProgressCallback {
    match cb {
        Some(cb) => Arc::clone(cb),
        None => Arc::new(NoopProgressCallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<String>>);

    impl PipelineProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage, total: usize) {
            self.0.lock().unwrap().push(format!("start {stage} {total}"));
        }
        fn on_item_skipped(&self, stage: Stage, item: u32, reason: String) {
            self.0
                .lock()
                .unwrap()
                .push(format!("skip {stage} {item} {reason}"));
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Render, 3);
        cb.on_item_complete(Stage::Render, 1, 3);
        cb.on_item_skipped(Stage::Assemble, 2, "unknown".into());
        cb.on_stage_complete(Stage::Render, 3);
    }

    #[test]
    fn callback_or_noop_prefers_configured() {
        let rec = Arc::new(Recorder(Mutex::new(Vec::new())));
        let configured: Option<ProgressCallback> = Some(rec.clone());
        let cb = callback_or_noop(&configured);
        cb.on_stage_start(Stage::Classify, 2);
        cb.on_item_skipped(Stage::Render, 9, "out of range".into());
        assert_eq!(
            *rec.0.lock().unwrap(),
            vec!["start Classifying 2", "skip Rendering 9 out of range"]
        );
    }
}
