use log::debug;

use super::{Admission, NormalizedRun};

/// Keep the whole output of the source with the highest mean confidence.
/// Empty or unavailable sources do not compete; ties go to the earlier one.
pub(crate) fn fuse(runs: &[NormalizedRun<'_>]) -> Admission {
    let mut best: Option<(usize, f32)> = None;
    for (ri, run) in runs.iter().enumerate() {
        let Some(dets) = run.detections.as_ref().filter(|d| !d.is_empty()) else {
            continue;
        };
        let mean = dets.iter().map(|d| d.confidence).sum::<f32>() / dets.len() as f32;
        debug!("{} mean confidence {:.3}", run.source, mean);
        if best.is_none_or(|(_, m)| mean > m) {
            best = Some((ri, mean));
        }
    }

    let mut out = Admission::default();
    for (ri, run) in runs.iter().enumerate() {
        let Some(dets) = &run.detections else {
            continue;
        };
        if best.is_some_and(|(winner, _)| winner == ri) {
            out.picks.extend((0..dets.len()).map(|di| (ri, di)));
        } else {
            out.suppressed += dets.len();
        }
    }
    out
}
