use boardsight_core::{PieceKind, DEFAULT_IOU_THRESHOLD, STRATEGIC_KINDS};
use serde::{Deserialize, Serialize};

/// How detections from several sources are merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionStrategy {
    /// Tiered: higher-priority sources win overlapping regions.
    #[default]
    Priority,
    /// Pool all sources and run per-piece non-maximum suppression.
    Nms,
    /// Keep the single source with the highest mean confidence.
    Voting,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusionParams {
    /// Overlap above which a candidate is suppressed (strictly greater).
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
    #[serde(default)]
    pub strategy: FusionStrategy,
    /// Kinds specialists are trusted with.
    #[serde(default = "default_strategic_kinds")]
    pub strategic_kinds: Vec<PieceKind>,
}

fn default_iou_threshold() -> f32 {
    DEFAULT_IOU_THRESHOLD
}

fn default_strategic_kinds() -> Vec<PieceKind> {
    STRATEGIC_KINDS.to_vec()
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            iou_threshold: default_iou_threshold(),
            strategy: FusionStrategy::default(),
            strategic_kinds: default_strategic_kinds(),
        }
    }
}
