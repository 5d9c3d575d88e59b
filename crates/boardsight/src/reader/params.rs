use std::{fmt, str::FromStr, time::Duration};

use boardsight_fusion::{DetectorRole, FusionParams};
use boardsight_grid::GridParams;
use serde::{Deserialize, Serialize};

use crate::{ImageKindParams, WarningThresholds};

/// Which detectors a read uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorMode {
    /// Strategic-piece specialist only.
    Specialist,
    /// Broad-coverage generalist only.
    Generalist,
    /// Every registered detector, fused.
    #[default]
    Ensemble,
    /// Pick by image kind: specialist for diagrams, generalist for photos.
    Auto,
}

impl DetectorMode {
    pub fn name(self) -> &'static str {
        match self {
            DetectorMode::Specialist => "specialist",
            DetectorMode::Generalist => "generalist",
            DetectorMode::Ensemble => "ensemble",
            DetectorMode::Auto => "auto",
        }
    }

    /// Role of a single-detector mode.
    pub fn role(self) -> Option<DetectorRole> {
        match self {
            DetectorMode::Specialist => Some(DetectorRole::Specialist),
            DetectorMode::Generalist => Some(DetectorRole::Generalist),
            DetectorMode::Ensemble | DetectorMode::Auto => None,
        }
    }
}

impl fmt::Display for DetectorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DetectorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "specialist" => Ok(DetectorMode::Specialist),
            "generalist" => Ok(DetectorMode::Generalist),
            "ensemble" => Ok(DetectorMode::Ensemble),
            "auto" => Ok(DetectorMode::Auto),
            other => Err(format!(
                "unknown detector mode {other:?} (expected specialist, generalist, ensemble or auto)"
            )),
        }
    }
}

fn default_confidence_threshold() -> f32 {
    0.25
}

fn default_adapter_timeout_ms() -> u64 {
    10_000
}

/// Parameters for [`crate::BoardReader`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReaderParams {
    /// Minimum detector confidence, in `(0, 1]`.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default)]
    pub mode: DetectorMode,
    #[serde(default)]
    pub fusion: FusionParams,
    #[serde(default)]
    pub grid: GridParams,
    /// Budget for one adapter call; late detectors are skipped.
    #[serde(default = "default_adapter_timeout_ms")]
    pub adapter_timeout_ms: u64,
    #[serde(default)]
    pub warnings: WarningThresholds,
    #[serde(default)]
    pub image_kind: ImageKindParams,
}

impl Default for ReaderParams {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            mode: DetectorMode::default(),
            fusion: FusionParams::default(),
            grid: GridParams::default(),
            adapter_timeout_ms: default_adapter_timeout_ms(),
            warnings: WarningThresholds::default(),
            image_kind: ImageKindParams::default(),
        }
    }
}

impl ReaderParams {
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }
}
