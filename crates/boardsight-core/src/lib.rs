//! Core types and utilities for chess piece detection.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete object detector or image decoding library.
//!
//! - [`Piece`] and [`normalize_label`]: the canonical 12-symbol alphabet and
//!   the single normalization point for detector class labels.
//! - [`BoundingBox`], [`ImageSize`] and [`iou`]: pixel-space geometry.
//! - [`RawDetection`] / [`Detection`]: detector output before and after
//!   normalization.
//! - [`RgbImage`]: a lightweight decoded pixel buffer handed to detectors.

mod detection;
mod geometry;
mod image;
mod logger;
mod overlap;
mod piece;

pub use detection::{Detection, RawDetection};
pub use geometry::{BoundingBox, ImageSize};
pub use image::{edge_density, mean_saturation, to_gray, ImageError, RgbImage, RgbImageView};
pub use overlap::{iou, overlaps, DEFAULT_IOU_THRESHOLD};
pub use piece::{normalize_label, Piece, PieceColor, PieceKind, STRATEGIC_KINDS};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_level_filter};
