//! Image-to-position pipeline.
//!
//! This module wires together detector selection, concurrent adapter runs,
//! ensemble fusion, grid mapping and report assembly.

mod error;
mod params;
mod pipeline;
mod selection;

pub use error::BoardReadError;
pub use params::{DetectorMode, ReaderParams};
pub use pipeline::{BoardReader, BoardRequest};
