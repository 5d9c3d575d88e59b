use boardsight_core::Detection;
use serde::Serialize;

use crate::DetectorRole;

/// One member of the fused set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FusedDetection {
    /// 1-based, dense, in admission order.
    pub id: usize,
    #[serde(flatten)]
    pub detection: Detection,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ran {
        /// Detections returned by the adapter.
        raw: usize,
        /// Dropped during normalization (unknown label, non-finite values).
        malformed: usize,
        /// Contributed to the fused set.
        admitted: usize,
    },
    Unavailable {
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub name: String,
    pub role: DetectorRole,
    #[serde(flatten)]
    pub status: SourceStatus,
}

impl SourceSummary {
    pub fn ran(&self) -> bool {
        matches!(self.status, SourceStatus::Ran { .. })
    }
}

/// Fused detections plus per-source bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FusionOutcome {
    pub detections: Vec<FusedDetection>,
    pub sources: Vec<SourceSummary>,
    /// Candidates dropped for overlapping an admitted detection.
    pub suppressed: usize,
}

impl FusionOutcome {
    /// `true` when at least one source produced a result.
    pub fn any_source_ran(&self) -> bool {
        self.sources.iter().any(SourceSummary::ran)
    }

    /// Names of sources that produced a result, in run order.
    pub fn sources_used(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|s| s.ran())
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn unavailable_sources(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.sources.iter().filter_map(|s| match &s.status {
            SourceStatus::Unavailable { reason } => Some((s.name.as_str(), reason.as_str())),
            SourceStatus::Ran { .. } => None,
        })
    }

    pub fn malformed(&self) -> usize {
        self.sources
            .iter()
            .map(|s| match s.status {
                SourceStatus::Ran { malformed, .. } => malformed,
                SourceStatus::Unavailable { .. } => 0,
            })
            .sum()
    }

    pub fn mean_confidence(&self) -> f32 {
        if self.detections.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.detections.iter().map(|d| d.detection.confidence).sum();
        sum / self.detections.len() as f32
    }

    /// Fused detections without ids, in id order.
    pub fn iter_detections(&self) -> impl Iterator<Item = &Detection> + '_ {
        self.detections.iter().map(|d| &d.detection)
    }
}
