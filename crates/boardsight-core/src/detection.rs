use serde::{Deserialize, Serialize};

use crate::{normalize_label, BoundingBox, ImageSize, Piece};

/// One detector output, before label normalization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Class label as emitted by the model (`white-king`, `knight`, ...).
    #[serde(alias = "class")]
    pub label: String,
    pub confidence: f32,
    #[serde(alias = "box")]
    pub bbox: BoundingBox,
}

impl RawDetection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }

    /// Normalize into a [`Detection`] attributed to `source`.
    ///
    /// The box is reordered and clamped into the image and the confidence is
    /// clamped into `[0, 1]`. Returns `None` for malformed detections: an
    /// unknown label, or a non-finite confidence or box.
    pub fn normalize(&self, source: &str, image: ImageSize) -> Option<Detection> {
        let piece = normalize_label(&self.label)?;
        if !self.confidence.is_finite() || !self.bbox.is_finite() {
            return None;
        }
        Some(Detection {
            piece,
            label: self.label.clone(),
            confidence: self.confidence.clamp(0.0, 1.0),
            bbox: self.bbox.clamped_to(image),
            source: source.to_string(),
        })
    }
}

/// A normalized detection: canonical piece, clamped box, known source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub piece: Piece,
    /// Original detector label, kept for display.
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// Name of the model that produced this detection.
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_box_and_confidence() {
        let raw = RawDetection::new("black-rook", 1.2, BoundingBox::new(-5.0, 10.0, 50.0, 900.0));
        let det = raw
            .normalize("gear", ImageSize::new(640, 640))
            .expect("valid label");
        assert_eq!(det.piece.symbol(), 'r');
        assert_eq!(det.confidence, 1.0);
        assert_eq!(det.bbox, BoundingBox::new(0.0, 10.0, 50.0, 640.0));
        assert_eq!(det.source, "gear");
        assert_eq!(det.label, "black-rook");
    }

    #[test]
    fn normalize_drops_malformed_detections() {
        let size = ImageSize::new(100, 100);
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(RawDetection::new("chessboard", 0.9, bbox)
            .normalize("m", size)
            .is_none());
        assert!(RawDetection::new("pawn", f32::NAN, bbox)
            .normalize("m", size)
            .is_none());
        let bad_box = BoundingBox::new(f32::INFINITY, 0.0, 10.0, 10.0);
        assert!(RawDetection::new("pawn", 0.5, bad_box)
            .normalize("m", size)
            .is_none());
    }

    #[test]
    fn deserializes_class_and_box_aliases() {
        let json = r#"{"class": "white-king", "confidence": 0.9,
                       "box": {"x1": 1.0, "y1": 2.0, "x2": 3.0, "y2": 4.0}}"#;
        let raw: RawDetection = serde_json::from_str(json).expect("json");
        assert_eq!(raw.label, "white-king");
        assert_eq!(raw.bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }
}
