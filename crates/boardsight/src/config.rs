//! JSON configuration for building a [`BoardReader`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use boardsight_core::PieceKind;
use boardsight_fusion::{
    DetectorRole, FusionError, FusionParams, FusionStrategy, ModelRegistry, ReplayAdapter,
};
use boardsight_grid::{CollisionPolicy, GridParams};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{BoardReadError, BoardReader, DetectorMode, ImageKindParams, ReaderParams, WarningThresholds};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One detector entry of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub role: DetectorRole,
    /// Recorded detections served by a replay adapter. Without it the model
    /// is registered as not loaded.
    #[serde(default)]
    pub detections_path: Option<String>,
}

fn default_confidence_threshold() -> f32 {
    0.25
}

fn default_iou_threshold() -> f32 {
    boardsight_core::DEFAULT_IOU_THRESHOLD
}

fn default_adapter_timeout_ms() -> u64 {
    10_000
}

/// Configuration for the `boardsight` reader and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSightConfig {
    #[serde(default)]
    pub models: Vec<ModelSpec>,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default)]
    pub mode: DetectorMode,
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
    #[serde(default)]
    pub strategy: FusionStrategy,
    #[serde(default)]
    pub strategic_kinds: Option<Vec<PieceKind>>,
    #[serde(default = "default_adapter_timeout_ms")]
    pub adapter_timeout_ms: u64,
    #[serde(default)]
    pub collision: CollisionPolicy,
    #[serde(default)]
    pub warnings: Option<WarningThresholds>,
    #[serde(default)]
    pub image_kind: Option<ImageKindParams>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl Default for BoardSightConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            confidence_threshold: default_confidence_threshold(),
            mode: DetectorMode::default(),
            iou_threshold: default_iou_threshold(),
            strategy: FusionStrategy::default(),
            strategic_kinds: None,
            adapter_timeout_ms: default_adapter_timeout_ms(),
            collision: CollisionPolicy::default(),
            warnings: None,
            image_kind: None,
            output_path: None,
        }
    }
}

impl BoardSightConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Where to write the report when the caller names no path. Relative
    /// paths resolve against `base_dir`, like detection files.
    pub fn output_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.output_path.as_ref().map(|p| base_dir.join(p))
    }

    /// Build reader parameters, applying overrides from the config.
    pub fn build_params(&self) -> ReaderParams {
        let mut params = ReaderParams {
            confidence_threshold: self.confidence_threshold,
            mode: self.mode,
            fusion: FusionParams {
                iou_threshold: self.iou_threshold,
                strategy: self.strategy,
                ..FusionParams::default()
            },
            grid: GridParams {
                collision: self.collision,
            },
            adapter_timeout_ms: self.adapter_timeout_ms,
            ..ReaderParams::default()
        };
        if let Some(kinds) = self.strategic_kinds.clone() {
            params.fusion.strategic_kinds = kinds;
        }
        if let Some(warnings) = self.warnings.clone() {
            params.warnings = warnings;
        }
        if let Some(image_kind) = self.image_kind.clone() {
            params.image_kind = image_kind;
        }
        params
    }

    /// Register every configured model. Relative detection paths resolve
    /// against `base_dir`.
    ///
    /// A model whose detections cannot be loaded is registered as not
    /// loaded so reads degrade instead of failing.
    pub fn build_registry(&self, base_dir: &Path) -> Result<ModelRegistry, FusionError> {
        let mut registry = ModelRegistry::new();
        for entry in &self.models {
            let adapter = match &entry.detections_path {
                Some(path) => {
                    let path = base_dir.join(path);
                    ReplayAdapter::load_json(&path).unwrap_or_else(|e| {
                        warn!("model {} not loaded: {e}", entry.name);
                        ReplayAdapter::unavailable(e.to_string())
                    })
                }
                None => ReplayAdapter::unavailable("no detections configured"),
            };
            registry.register(entry.name.clone(), entry.role, adapter)?;
        }
        Ok(registry)
    }

    /// Build a reader from this config.
    pub fn build_reader(&self, base_dir: &Path) -> Result<BoardReader, BoardReadError> {
        let registry = self.build_registry(base_dir)?;
        BoardReader::new(registry, self.build_params())
    }
}
