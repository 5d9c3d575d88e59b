use boardsight_core::{RawDetection, RgbImage};
use std::{fs, path::Path};

/// Failure of a single detection source.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },
}

impl AdapterError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        AdapterError::ModelUnavailable {
            reason: reason.into(),
        }
    }
}

/// One object-detection model.
///
/// Implementations must be shareable across threads: loaded weights are
/// read-only after construction and several requests may run inference at
/// the same time.
pub trait DetectionAdapter: Send + Sync {
    /// Run the model and return every detection at or above
    /// `confidence_threshold`.
    fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, AdapterError>;

    /// `false` when the model is known not to be loaded; such sources are
    /// skipped without being called.
    fn is_available(&self) -> bool {
        true
    }
}

impl<F> DetectionAdapter for F
where
    F: Fn(&RgbImage, f32) -> Result<Vec<RawDetection>, AdapterError> + Send + Sync,
{
    fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, AdapterError> {
        self(image, confidence_threshold)
    }
}

/// Adapter that serves a fixed detection list, e.g. recorded model output.
#[derive(Clone, Debug, Default)]
pub struct ReplayAdapter {
    detections: Vec<RawDetection>,
    unavailable: Option<String>,
}

impl ReplayAdapter {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self {
            detections,
            unavailable: None,
        }
    }

    /// An adapter whose model failed to load.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            detections: Vec::new(),
            unavailable: Some(reason.into()),
        }
    }

    /// Load a JSON array of detections from disk.
    ///
    /// A missing or unreadable file means the model is unavailable.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, AdapterError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| AdapterError::unavailable(format!("{}: {e}", path.display())))?;
        let detections: Vec<RawDetection> = serde_json::from_str(&raw)
            .map_err(|e| AdapterError::unavailable(format!("{}: {e}", path.display())))?;
        Ok(Self::new(detections))
    }

    pub fn detections(&self) -> &[RawDetection] {
        &self.detections
    }
}

impl DetectionAdapter for ReplayAdapter {
    fn detect(
        &self,
        _image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, AdapterError> {
        if let Some(reason) = &self.unavailable {
            return Err(AdapterError::unavailable(reason.clone()));
        }
        Ok(self
            .detections
            .iter()
            .filter(|d| d.confidence >= confidence_threshold)
            .cloned()
            .collect())
    }

    fn is_available(&self) -> bool {
        self.unavailable.is_none()
    }
}
