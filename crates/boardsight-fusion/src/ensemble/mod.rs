//! Ensemble fusion pipeline.
//!
//! This module normalizes per-source detections, merges them with the
//! configured strategy and assigns stable ids to the fused set.

mod error;
mod nms;
mod params;
mod pipeline;
mod priority;
mod result;
mod voting;

pub use error::FusionError;
pub use params::{FusionParams, FusionStrategy};
pub use pipeline::EnsembleFusion;
pub use result::{FusedDetection, FusionOutcome, SourceStatus, SourceSummary};

use boardsight_core::Detection;

/// Detections of one source after normalization; `None` when unavailable.
pub(crate) struct NormalizedRun<'a> {
    pub source: &'a str,
    pub detections: Option<Vec<Detection>>,
}

/// Indices `(run, detection)` in admission order.
#[derive(Debug, Default)]
pub(crate) struct Admission {
    pub picks: Vec<(usize, usize)>,
    pub suppressed: usize,
}
