#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    #[error("IoU threshold must lie in [0, 1], got {0}")]
    InvalidIouThreshold(f32),
    #[error("model {0:?} is registered twice")]
    DuplicateModel(String),
    #[error("fusion policy lists source {0:?} twice")]
    DuplicateTier(String),
}
