use boardsight_core::ImageError;
use boardsight_fusion::FusionError;
use boardsight_grid::GridError;

use crate::ConfigError;

/// Errors that fail a whole read. Per-detector failures never end up here;
/// they become warnings on the report.
#[derive(thiserror::Error, Debug)]
pub enum BoardReadError {
    #[error("no image supplied")]
    NoImage,

    #[error("no detector available")]
    NoDetectorAvailable,

    #[error("unsupported request shape: {0}")]
    UnsupportedRequest(String),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Fusion(#[from] FusionError),

    #[error(transparent)]
    Buffer(#[from] ImageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "image")]
    #[error(transparent)]
    Decode(#[from] ::image::ImageError),
}
