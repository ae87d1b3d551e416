//! Progress-callback trait for generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::CloudConfigBuilder::progress_callback`] to receive events
//! as the pipeline moves through its stages and places each word.
//!
//! # Example
//!
//! ```rust
//! use edgequake_wordcloud::{CloudConfig, GenerationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     placed: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_word_placed(&self, placed: usize, total: usize) {
//!         self.placed.store(placed, Ordering::SeqCst);
//!         eprintln!("{placed}/{total} words placed");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { placed: AtomicUsize::new(0) });
//!
//! let config = CloudConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pipeline stages reported through [`GenerationProgressCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Resolving the optional shape mask.
    LoadMask,
    /// Loading the selected font.
    LoadFont,
    /// Splitting the text into counted words.
    Tokenize,
    /// Packing words onto the canvas.
    Layout,
    /// Drawing the packed words into the image.
    Render,
    /// Building the frequency table and chart.
    Report,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::LoadMask => "Loading mask",
            Stage::LoadFont => "Loading font",
            Stage::Tokenize => "Counting words",
            Stage::Layout => "Placing words",
            Stage::Render => "Rendering",
            Stage::Report => "Building report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the generation pipeline as it runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The trait is `Send + Sync` so a callback can be
/// shared through [`crate::config::CloudConfig`], which is `Clone`.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    ///
    /// # Arguments
    /// * `stage`      — the stage that finished
    /// * `elapsed_ms` — wall-clock time spent in the stage
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called after each word is placed or dropped during layout.
    ///
    /// # Arguments
    /// * `attempted` — words processed so far (placed or dropped)
    /// * `total`     — words retained for layout
    fn on_word_placed(&self, attempted: usize, total: usize) {
        let _ = (attempted, total);
    }

    /// Called once after a successful run.
    ///
    /// # Arguments
    /// * `placed` — words drawn on the canvas
    /// * `total`  — words retained for layout
    fn on_generation_complete(&self, placed: usize, total: usize) {
        let _ = (placed, total);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CloudConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        stages: Mutex<Vec<Stage>>,
        words: AtomicUsize,
        placed_total: AtomicUsize,
    }

    impl GenerationProgressCallback for TrackingCallback {
        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.stages.lock().unwrap().push(stage);
        }

        fn on_word_placed(&self, _attempted: usize, _total: usize) {
            self.words.fetch_add(1, Ordering::SeqCst);
        }

        fn on_generation_complete(&self, placed: usize, _total: usize) {
            self.placed_total.store(placed, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Layout);
        cb.on_stage_complete(Stage::Layout, 12);
        cb.on_word_placed(1, 5);
        cb.on_generation_complete(5, 5);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_stage_complete(Stage::Tokenize, 1);
        tracker.on_word_placed(1, 2);
        tracker.on_word_placed(2, 2);
        tracker.on_stage_complete(Stage::Layout, 3);
        tracker.on_generation_complete(2, 2);

        assert_eq!(
            *tracker.stages.lock().unwrap(),
            vec![Stage::Tokenize, Stage::Layout]
        );
        assert_eq!(tracker.words.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.placed_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stage_labels_are_human_readable() {
        assert_eq!(Stage::Layout.to_string(), "Placing words");
        assert_eq!(
            serde_json::to_string(&Stage::LoadMask).unwrap(),
            "\"load_mask\""
        );
    }
}
