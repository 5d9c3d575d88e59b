use boardsight_core::{overlaps, BoundingBox};
use log::{debug, trace};

use super::{Admission, NormalizedRun};
use crate::FusionPolicy;

/// Walk the tiers in order. A candidate is checked only against boxes
/// admitted by earlier tiers, never against its own tier.
pub(crate) fn fuse(runs: &[NormalizedRun<'_>], policy: &FusionPolicy, iou_threshold: f32) -> Admission {
    let mut out = Admission::default();
    let mut reference: Vec<BoundingBox> = Vec::new();

    for tier in policy.tiers() {
        let Some((run_idx, run)) = runs
            .iter()
            .enumerate()
            .find(|(_, r)| r.source == tier.source)
        else {
            debug!("tier {:?} has no matching source", tier.source);
            continue;
        };
        let Some(detections) = &run.detections else {
            debug!("tier {:?} unavailable, skipping", tier.source);
            continue;
        };

        let mut admitted_here = Vec::new();
        for (det_idx, det) in detections.iter().enumerate() {
            if !tier.categories.accepts(det.piece.kind) {
                continue;
            }
            if reference
                .iter()
                .any(|b| overlaps(b, &det.bbox, iou_threshold))
            {
                trace!("{} {} suppressed by a higher tier", tier.source, det.piece.label());
                out.suppressed += 1;
                continue;
            }
            out.picks.push((run_idx, det_idx));
            admitted_here.push(det.bbox);
        }
        debug!("tier {:?} admitted {}", tier.source, admitted_here.len());
        reference.extend(admitted_here);
    }
    out
}
