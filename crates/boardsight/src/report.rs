//! Final response object and quality warnings.

use std::fmt;

use boardsight_core::{BoundingBox, ImageSize};
use boardsight_fusion::{DetectorRole, FusionOutcome};
use boardsight_grid::{BoardNotation, GridMapping, OccupancyGrid};
use serde::{Deserialize, Serialize, Serializer};

use crate::{DetectorMode, ImageKind};

fn default_low_confidence() -> f32 {
    0.8
}

fn default_min_pieces() -> usize {
    2
}

/// Limits below which a report carries advisory warnings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WarningThresholds {
    #[serde(default = "default_low_confidence")]
    pub low_confidence: f32,
    #[serde(default = "default_min_pieces")]
    pub min_pieces: usize,
}

impl Default for WarningThresholds {
    fn default() -> Self {
        Self {
            low_confidence: default_low_confidence(),
            min_pieces: default_min_pieces(),
        }
    }
}

/// Advisory note attached to a report. Serialized as its message.
#[derive(Clone, Debug, PartialEq)]
pub enum QualityWarning {
    LowConfidence { mean: f32, threshold: f32 },
    FewPieces { count: usize, min: usize },
    SourceUnavailable { source: String, reason: String },
    FallbackDetector { requested: DetectorRole, used: String },
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityWarning::LowConfidence { mean, threshold } => write!(
                f,
                "low confidence detections (mean {mean:.4} < {threshold}); image quality may be poor"
            ),
            QualityWarning::FewPieces { count, min } => write!(
                f,
                "few pieces detected ({count} < {min}); check that the image shows a full board"
            ),
            QualityWarning::SourceUnavailable { source, reason } => {
                write!(f, "detector {source} skipped: {reason}")
            }
            QualityWarning::FallbackDetector { requested, used } => {
                write!(f, "no {requested} detector available; fell back to {used}")
            }
        }
    }
}

impl Serialize for QualityWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Float summation noise tolerated below the low-confidence threshold.
const MEAN_TOLERANCE: f32 = 1e-6;

/// Warnings derived from the fused set alone. `mean_confidence` is the
/// unrounded mean.
pub fn quality_warnings(
    mean_confidence: f32,
    piece_count: usize,
    thresholds: &WarningThresholds,
) -> Vec<QualityWarning> {
    let mut out = Vec::new();
    if mean_confidence < thresholds.low_confidence - MEAN_TOLERANCE {
        out.push(QualityWarning::LowConfidence {
            mean: mean_confidence,
            threshold: thresholds.low_confidence,
        });
    }
    if piece_count < thresholds.min_pieces {
        out.push(QualityWarning::FewPieces {
            count: piece_count,
            min: thresholds.min_pieces,
        });
    }
    out
}

fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = 10f32.powi(decimals);
    (value * scale).round() / scale
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoxReport {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub width: f32,
    pub height: f32,
}

impl From<&BoundingBox> for BoxReport {
    fn from(b: &BoundingBox) -> Self {
        Self {
            x1: round_to(b.x1, 2),
            y1: round_to(b.y1, 2),
            x2: round_to(b.x2, 2),
            y2: round_to(b.y2, 2),
            width: round_to(b.width(), 2),
            height: round_to(b.height(), 2),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieceReport {
    pub id: usize,
    /// Label as reported by the detector.
    pub class: String,
    pub symbol: char,
    /// Algebraic square of the box center, e.g. `b7`.
    pub square: String,
    pub confidence: f32,
    pub bbox: BoxReport,
    pub source: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct BoardReport {
    pub notation: String,
    pub pieces: Vec<PieceReport>,
    pub piece_count: usize,
    pub mean_confidence: f32,
    pub warnings: Vec<QualityWarning>,
    pub description: String,
    pub mode: DetectorMode,
    /// Models that produced a result for this request.
    pub sources: Vec<String>,
    pub image_size: ImageSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_kind: Option<ImageKind>,
    #[serde(skip)]
    pub grid: OccupancyGrid,
}

/// Request-level facts the assembler cannot derive from the fused set.
#[derive(Clone, Debug)]
pub(crate) struct ReportContext {
    pub mode: DetectorMode,
    pub image_size: ImageSize,
    pub image_kind: Option<ImageKind>,
    pub warnings: Vec<QualityWarning>,
}

impl BoardReport {
    pub(crate) fn assemble(
        outcome: &FusionOutcome,
        mapping: GridMapping,
        context: ReportContext,
        thresholds: &WarningThresholds,
    ) -> Self {
        let pieces: Vec<PieceReport> = outcome
            .detections
            .iter()
            .zip(&mapping.squares)
            .map(|(fused, square)| {
                let det = &fused.detection;
                PieceReport {
                    id: fused.id,
                    class: det.label.clone(),
                    symbol: det.piece.symbol(),
                    square: square.algebraic(),
                    confidence: round_to(det.confidence, 3),
                    bbox: BoxReport::from(&det.bbox),
                    source: det.source.clone(),
                }
            })
            .collect();

        let piece_count = outcome.detections.len();
        let mean = round_to(outcome.mean_confidence(), 3);
        let sources: Vec<String> = outcome
            .sources_used()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut warnings = context.warnings;
        warnings.extend(
            outcome
                .unavailable_sources()
                .map(|(source, reason)| QualityWarning::SourceUnavailable {
                    source: source.to_string(),
                    reason: reason.to_string(),
                }),
        );
        warnings.extend(quality_warnings(
            outcome.mean_confidence(),
            piece_count,
            thresholds,
        ));

        let description = format!(
            "Detected {piece_count} pieces using {} ({} mode)",
            if sources.is_empty() {
                "no detector".to_string()
            } else {
                sources.join(" + ")
            },
            context.mode
        );

        Self {
            notation: BoardNotation::from_grid(&mapping.grid).to_string(),
            pieces,
            piece_count,
            mean_confidence: mean,
            warnings,
            description,
            mode: context.mode,
            sources,
            image_size: context.image_size,
            image_kind: context.image_kind,
            grid: mapping.grid,
        }
    }

    /// Placement field of [`BoardReport::notation`].
    pub fn placement(&self) -> &str {
        self.notation.split(' ').next().unwrap_or("")
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
