//! Box overlap measures.

use crate::BoundingBox;

/// Overlap above which two detections are taken to be the same piece.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;

/// Intersection-over-union of two axis-aligned boxes.
///
/// Returns a value in `[0, 1]`, and `0` when the union area is zero.
/// Symmetric in its arguments.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let intersection = ix * iy;
    let union = a.area() + b.area() - intersection;
    if union > 0.0 && union.is_finite() {
        (intersection / union).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `true` when `iou(a, b)` is strictly above `threshold`.
#[inline]
pub fn overlaps(a: &BoundingBox, b: &BoundingBox, threshold: f32) -> bool {
    iou(a, b) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_boxes() -> Vec<BoundingBox> {
        vec![
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            BoundingBox::new(5.0, 5.0, 15.0, 15.0),
            BoundingBox::new(100.0, 100.0, 140.0, 140.0),
            BoundingBox::new(102.0, 98.0, 141.0, 139.5),
            BoundingBox::new(0.0, 0.0, 0.0, 0.0),
            BoundingBox::new(3.0, 3.0, 4.0, 4.0),
            BoundingBox::new(-20.0, 0.0, 20.0, 1.0),
            BoundingBox::new(8.0, 2.0, 2.0, 8.0),
        ]
    }

    #[test]
    fn iou_is_symmetric_and_bounded() {
        let boxes = sample_boxes();
        for a in &boxes {
            for b in &boxes {
                let ab = iou(a, b);
                assert_eq!(ab, iou(b, a), "asymmetric for {a:?} / {b:?}");
                assert!((0.0..=1.0).contains(&ab), "out of range: {ab}");
            }
        }
    }

    #[test]
    fn iou_of_box_with_itself_is_one() {
        for b in sample_boxes().iter().filter(|b| b.area() > 0.0) {
            assert_abs_diff_eq!(iou(b, b), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn degenerate_boxes_never_overlap() {
        let point = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
        assert_eq!(iou(&point, &point), 0.0);
        assert_eq!(iou(&point, &BoundingBox::new(0.0, 0.0, 10.0, 10.0)), 0.0);
    }

    #[test]
    fn partial_overlap_matches_hand_computation() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        // intersection 25, union 175
        assert_abs_diff_eq!(iou(&a, &b), 25.0 / 175.0, epsilon = 1e-6);
    }

    #[test]
    fn disjoint_and_touching_boxes_have_zero_iou() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(iou(&a, &BoundingBox::new(20.0, 20.0, 30.0, 30.0)), 0.0);
        assert_eq!(iou(&a, &BoundingBox::new(10.0, 0.0, 20.0, 10.0)), 0.0);
    }

    #[test]
    fn overlap_threshold_is_strict() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(0.0, 0.0, 10.0, 5.0);
        assert_abs_diff_eq!(iou(&a, &b), 0.5, epsilon = 1e-6);
        assert!(!overlaps(&a, &b, 0.5));
        assert!(overlaps(&a, &b, 0.49));
    }
}
