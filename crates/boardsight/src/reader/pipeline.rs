use std::sync::Arc;

use boardsight_core::RgbImage;
use boardsight_fusion::{
    run_adapters, EnsembleFusion, FusionParams, FusionPolicy, FusionStrategy, ModelRegistry,
    SourceRun,
};
use boardsight_grid::{GridError, GridMapper};
use log::{info, warn};

use super::selection::{self, Merge, Plan};
use super::{BoardReadError, DetectorMode, ReaderParams};
use crate::report::{BoardReport, ReportContext};
use crate::QualityWarning;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One read request. Unset fields fall back to the reader's parameters.
#[derive(Clone, Debug, Default)]
pub struct BoardRequest {
    pub image: Option<Arc<RgbImage>>,
    pub confidence_threshold: Option<f32>,
    pub mode: Option<DetectorMode>,
}

impl BoardRequest {
    pub fn new(image: RgbImage) -> Self {
        Self::shared(Arc::new(image))
    }

    pub fn shared(image: Arc<RgbImage>) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: DetectorMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }
}

/// Image-to-position reader over a fixed set of detectors.
///
/// Requests share nothing but the read-only registry, so one reader can
/// serve several threads.
#[derive(Debug)]
pub struct BoardReader {
    registry: ModelRegistry,
    params: ReaderParams,
    ensemble: EnsembleFusion,
    single: EnsembleFusion,
    voting: EnsembleFusion,
    mapper: GridMapper,
}

impl BoardReader {
    pub fn new(registry: ModelRegistry, params: ReaderParams) -> Result<Self, BoardReadError> {
        validate_confidence(params.confidence_threshold)?;
        let with_strategy = |strategy: FusionStrategy| FusionParams {
            strategy,
            ..params.fusion.clone()
        };
        Ok(Self {
            ensemble: EnsembleFusion::new(params.fusion.clone())?,
            single: EnsembleFusion::new(with_strategy(FusionStrategy::Priority))?,
            voting: EnsembleFusion::new(with_strategy(FusionStrategy::Voting))?,
            mapper: GridMapper::new(params.grid.clone()),
            registry,
            params,
        })
    }

    #[inline]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    #[inline]
    pub fn params(&self) -> &ReaderParams {
        &self.params
    }

    /// Read one board image.
    ///
    /// Detectors that fail or time out are skipped and reported as warnings;
    /// the read fails only when no detector produced a result.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, request), fields(mode = ?request.mode))
    )]
    pub fn read(&self, request: BoardRequest) -> Result<BoardReport, BoardReadError> {
        let image = request.image.ok_or(BoardReadError::NoImage)?;
        let threshold = request
            .confidence_threshold
            .unwrap_or(self.params.confidence_threshold);
        validate_confidence(threshold)?;

        let size = image.size();
        if !size.is_valid() {
            return Err(GridError::InvalidImageDimensions {
                width: size.width,
                height: size.height,
            }
            .into());
        }

        let mode = request.mode.unwrap_or(self.params.mode);
        let mut plan = selection::plan(mode, &self.registry, &image, &self.params)?;

        let mut runs = run_adapters(
            &plan.models,
            &image,
            threshold,
            self.params.adapter_timeout(),
        );
        if matches!(plan.merge, Merge::Single(_)) {
            self.run_backups(&mut plan, &mut runs, &image, threshold);
        }
        let outcome = match &plan.merge {
            Merge::Ensemble => self.ensemble.fuse(&runs, size),
            Merge::Single(policy) => self.single.fuse_with_policy(&runs, policy, size),
            Merge::Voting => self.voting.fuse(&runs, size),
        };
        if !outcome.any_source_ran() {
            return Err(BoardReadError::NoDetectorAvailable);
        }

        let mapping = self.mapper.map(outcome.iter_detections(), size)?;
        let report = BoardReport::assemble(
            &outcome,
            mapping,
            ReportContext {
                mode,
                image_size: size,
                image_kind: plan.image_kind,
                warnings: plan.warnings,
            },
            &self.params.warnings,
        );
        info!(
            "{} mode read {} pieces: {}",
            mode, report.piece_count, report.notation
        );
        Ok(report)
    }

    /// Try the plan's backup models one at a time until one of them runs.
    /// Failed runs stay in `runs` so they surface as warnings.
    fn run_backups(
        &self,
        plan: &mut Plan,
        runs: &mut Vec<SourceRun>,
        image: &Arc<RgbImage>,
        threshold: f32,
    ) {
        let mut backups = std::mem::take(&mut plan.fallback).into_iter();
        while !runs.iter().any(SourceRun::is_available) {
            let Some(model) = backups.next() else {
                break;
            };
            warn!("single detector failed, retrying with {}", model.name);
            runs.extend(run_adapters(
                std::slice::from_ref(&model),
                image,
                threshold,
                self.params.adapter_timeout(),
            ));
            plan.merge = Merge::Single(FusionPolicy::single(model.name.clone()));
            if let Some(requested) = plan.requested.filter(|r| *r != model.role) {
                plan.warnings
                    .retain(|w| !matches!(w, QualityWarning::FallbackDetector { .. }));
                plan.warnings.push(QualityWarning::FallbackDetector {
                    requested,
                    used: model.name.clone(),
                });
            }
        }
    }

    /// Read with the reader's default threshold and mode.
    pub fn read_image(&self, image: RgbImage) -> Result<BoardReport, BoardReadError> {
        self.read(BoardRequest::new(image))
    }
}

fn validate_confidence(threshold: f32) -> Result<(), BoardReadError> {
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(BoardReadError::UnsupportedRequest(format!(
            "confidence threshold must lie in (0, 1], got {threshold}"
        )))
    }
}
