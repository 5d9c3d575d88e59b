use std::cmp::Ordering;

use boardsight_core::{overlaps, Detection};

use super::{Admission, NormalizedRun};

/// Pool every available source, then greedy NMS within each piece class.
///
/// Output is grouped by piece, highest confidence first inside a group.
/// Equal confidences keep source order.
pub(crate) fn fuse(runs: &[NormalizedRun<'_>], iou_threshold: f32) -> Admission {
    let mut pool: Vec<(usize, usize, &Detection)> = runs
        .iter()
        .enumerate()
        .filter_map(|(ri, r)| r.detections.as_ref().map(|d| (ri, d)))
        .flat_map(|(ri, dets)| dets.iter().enumerate().map(move |(di, d)| (ri, di, d)))
        .collect();

    pool.sort_by(|a, b| {
        a.2.piece.cmp(&b.2.piece).then_with(|| {
            b.2.confidence
                .partial_cmp(&a.2.confidence)
                .unwrap_or(Ordering::Equal)
        })
    });

    let mut out = Admission::default();
    let mut kept: Vec<&Detection> = Vec::new();
    for (ri, di, det) in pool {
        if kept
            .iter()
            .any(|k| k.piece == det.piece && overlaps(&k.bbox, &det.bbox, iou_threshold))
        {
            out.suppressed += 1;
            continue;
        }
        kept.push(det);
        out.picks.push((ri, di));
    }
    out
}
