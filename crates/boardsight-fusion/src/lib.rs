//! Ensemble fusion of chess piece detectors.
//!
//! Current focus:
//! - a [`DetectionAdapter`] seam over object-detection models, with a
//!   [`ReplayAdapter`] serving canned detections,
//! - an explicit [`ModelRegistry`] owning the loaded adapters,
//! - parallel adapter runs with a per-call timeout ([`run_adapters`]),
//! - tiered priority fusion ([`FusionPolicy`]) plus NMS and voting
//!   alternatives, all driven by [`EnsembleFusion`].
//!
//! Neural-network inference itself lives outside this crate.

mod adapter;
mod ensemble;
mod policy;
mod registry;
mod runner;

pub use adapter::{AdapterError, DetectionAdapter, ReplayAdapter};
pub use ensemble::{
    EnsembleFusion, FusedDetection, FusionError, FusionOutcome, FusionParams, FusionStrategy,
    SourceStatus, SourceSummary,
};
pub use policy::{CategoryFilter, FusionPolicy, FusionTier};
pub use registry::{DetectorRole, ModelInfo, ModelRegistry, RegisteredModel};
pub use runner::{run_adapters, SourceRun};

pub use boardsight_core::{iou, overlaps, DEFAULT_IOU_THRESHOLD, STRATEGIC_KINDS};
