//! High-level facade crate for the `boardsight-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the underlying crates,
//! - [`BoardReader`]: image in, [`BoardReport`] out, running every
//!   registered detector, fusing their outputs, mapping them onto the board
//!   and encoding the position,
//! - JSON configuration ([`BoardSightConfig`]) that builds a reader from a
//!   list of models,
//! - (feature-gated) image decoding helpers in [`detect`].
//!
//! ## Quickstart
//!
//! ```
//! use boardsight::core::{BoundingBox, RawDetection, RgbImage};
//! use boardsight::fusion::{DetectorRole, ModelRegistry, ReplayAdapter};
//! use boardsight::{BoardReader, BoardRequest, ReaderParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ModelRegistry::new();
//! registry.register(
//!     "haki",
//!     DetectorRole::Specialist,
//!     ReplayAdapter::new(vec![RawDetection::new(
//!         "white-king",
//!         0.9,
//!         BoundingBox::new(100.0, 100.0, 140.0, 140.0),
//!     )]),
//! )?;
//!
//! let reader = BoardReader::new(registry, ReaderParams::default())?;
//! let report = reader.read(BoardRequest::new(RgbImage::blank(640, 640)?))?;
//! assert_eq!(report.notation, "8/1K6/8/8/8/8/8/8 w KQkq - 0 1");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `boardsight::core`: pieces, label normalization, boxes, IoU, images.
//! - `boardsight::fusion`: adapters, the model registry and ensemble fusion.
//! - `boardsight::grid`: 8x8 occupancy grid and placement notation.
//! - `boardsight::detect` (feature `image`): decoding with the `image` crate.

pub use boardsight_core as core;
pub use boardsight_fusion as fusion;
pub use boardsight_grid as grid;

mod config;
mod image_kind;
mod reader;
mod report;

pub use config::{BoardSightConfig, ConfigError, ModelSpec};
pub use image_kind::{classify_image, ImageKind, ImageKindParams};
pub use reader::{BoardReadError, BoardReader, BoardRequest, DetectorMode, ReaderParams};
pub use report::{
    quality_warnings, BoardReport, BoxReport, PieceReport, QualityWarning, WarningThresholds,
};

#[cfg(feature = "image")]
pub mod detect;
