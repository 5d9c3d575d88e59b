use std::{sync::Arc, time::Duration};

use boardsight_core::{ImageSize, RgbImage};
use log::{debug, info};

use super::{nms, priority, voting, Admission, NormalizedRun};
use crate::{
    run_adapters, FusedDetection, FusionError, FusionOutcome, FusionParams, FusionPolicy,
    FusionStrategy, RegisteredModel, SourceRun, SourceStatus, SourceSummary,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Merges the outputs of several detectors into one detection set.
#[derive(Clone, Debug)]
pub struct EnsembleFusion {
    params: FusionParams,
}

impl EnsembleFusion {
    pub fn new(params: FusionParams) -> Result<Self, FusionError> {
        if !(0.0..=1.0).contains(&params.iou_threshold) {
            return Err(FusionError::InvalidIouThreshold(params.iou_threshold));
        }
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &FusionParams {
        &self.params
    }

    /// Role-derived priority policy for the given runs.
    pub fn policy_for(&self, runs: &[SourceRun]) -> FusionPolicy {
        FusionPolicy::from_roles(
            runs.iter().map(|r| (r.source.as_str(), r.role)),
            &self.params.strategic_kinds,
        )
    }

    /// Fuse with the role-derived policy.
    pub fn fuse(&self, runs: &[SourceRun], image: ImageSize) -> FusionOutcome {
        let policy = self.policy_for(runs);
        self.fuse_with_policy(runs, &policy, image)
    }

    /// Fuse runs into a fused set with ids `1..=N`.
    ///
    /// `policy` only matters for [`FusionStrategy::Priority`]. Sources the
    /// policy does not list contribute nothing under that strategy.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, runs, policy), fields(runs = runs.len(), strategy = ?self.params.strategy))
    )]
    pub fn fuse_with_policy(
        &self,
        runs: &[SourceRun],
        policy: &FusionPolicy,
        image: ImageSize,
    ) -> FusionOutcome {
        let mut malformed = vec![0usize; runs.len()];
        let normalized: Vec<NormalizedRun<'_>> = runs
            .iter()
            .enumerate()
            .map(|(i, run)| {
                let detections = run.result.as_ref().ok().map(|raw| {
                    let dets: Vec<_> = raw
                        .iter()
                        .filter_map(|r| r.normalize(&run.source, image))
                        .collect();
                    malformed[i] = raw.len() - dets.len();
                    if malformed[i] > 0 {
                        debug!("{}: dropped {} malformed detections", run.source, malformed[i]);
                    }
                    dets
                });
                NormalizedRun {
                    source: &run.source,
                    detections,
                }
            })
            .collect();

        let admission = match self.params.strategy {
            FusionStrategy::Priority => {
                priority::fuse(&normalized, policy, self.params.iou_threshold)
            }
            FusionStrategy::Nms => nms::fuse(&normalized, self.params.iou_threshold),
            FusionStrategy::Voting => voting::fuse(&normalized),
        };

        let outcome = assemble(runs, &normalized, &malformed, admission);
        info!(
            "fused {} detections from {} sources ({} suppressed, {} malformed)",
            outcome.detections.len(),
            outcome.sources_used().len(),
            outcome.suppressed,
            outcome.malformed()
        );
        outcome
    }

    /// Run `models` concurrently on `image`, then fuse their outputs.
    pub fn run(
        &self,
        models: &[RegisteredModel],
        image: &Arc<RgbImage>,
        confidence_threshold: f32,
        timeout: Duration,
    ) -> FusionOutcome {
        let runs = run_adapters(models, image, confidence_threshold, timeout);
        self.fuse(&runs, image.size())
    }
}

fn assemble(
    runs: &[SourceRun],
    normalized: &[NormalizedRun<'_>],
    malformed: &[usize],
    admission: Admission,
) -> FusionOutcome {
    let mut admitted = vec![0usize; runs.len()];
    let mut detections = Vec::with_capacity(admission.picks.len());
    for (ri, di) in admission.picks {
        let Some(det) = normalized[ri]
            .detections
            .as_ref()
            .and_then(|d| d.get(di))
        else {
            continue;
        };
        admitted[ri] += 1;
        detections.push(FusedDetection {
            id: detections.len() + 1,
            detection: det.clone(),
        });
    }

    let sources = runs
        .iter()
        .enumerate()
        .map(|(i, run)| SourceSummary {
            name: run.source.clone(),
            role: run.role,
            status: match &run.result {
                Ok(raw) => SourceStatus::Ran {
                    raw: raw.len(),
                    malformed: malformed[i],
                    admitted: admitted[i],
                },
                Err(e) => SourceStatus::Unavailable {
                    reason: e.to_string(),
                },
            },
        })
        .collect();

    FusionOutcome {
        detections,
        sources,
        suppressed: admission.suppressed,
    }
}
