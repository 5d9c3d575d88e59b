use boardsight_core::RgbImage;
use boardsight_fusion::{DetectorRole, FusionPolicy, ModelRegistry, RegisteredModel};
use log::{info, warn};

use super::{BoardReadError, DetectorMode, ReaderParams};
use crate::{classify_image, ImageKind, QualityWarning};

/// How the selected models' outputs are merged.
#[derive(Debug)]
pub(super) enum Merge {
    /// Configured ensemble strategy with the role-derived policy.
    Ensemble,
    /// One source taken as is.
    Single(FusionPolicy),
    /// Whole output of the most confident source.
    Voting,
}

#[derive(Debug)]
pub(super) struct Plan {
    pub models: Vec<RegisteredModel>,
    pub merge: Merge,
    /// Role asked for by a single-detector plan.
    pub requested: Option<DetectorRole>,
    /// Loaded models to try in order when the single model fails to run.
    pub fallback: Vec<RegisteredModel>,
    pub image_kind: Option<ImageKind>,
    pub warnings: Vec<QualityWarning>,
}

pub(super) fn plan(
    mode: DetectorMode,
    registry: &ModelRegistry,
    image: &RgbImage,
    params: &ReaderParams,
) -> Result<Plan, BoardReadError> {
    if registry.available().next().is_none() {
        return Err(BoardReadError::NoDetectorAvailable);
    }

    match mode {
        DetectorMode::Ensemble => Ok(Plan {
            models: registry.models().to_vec(),
            merge: Merge::Ensemble,
            requested: None,
            fallback: Vec::new(),
            image_kind: None,
            warnings: Vec::new(),
        }),
        DetectorMode::Specialist | DetectorMode::Generalist => {
            let role = mode.role().unwrap_or(DetectorRole::Generalist);
            let (candidates, warnings) = candidates_for(registry, role);
            single(registry, role, candidates, None, warnings)
        }
        DetectorMode::Auto => {
            let kind = classify_image(&image.view(), &params.image_kind);
            let role = kind.preferred_role();
            info!("auto mode: {kind} image, preferring {role} detectors");
            let (candidates, warnings) = candidates_for(registry, role);
            match candidates.len() {
                0 | 1 => single(registry, role, candidates, Some(kind), warnings),
                _ => Ok(Plan {
                    models: candidates,
                    merge: Merge::Voting,
                    requested: None,
                    fallback: Vec::new(),
                    image_kind: Some(kind),
                    warnings,
                }),
            }
        }
    }
}

/// Available models of `role`, or of the other role when there are none.
fn candidates_for(
    registry: &ModelRegistry,
    role: DetectorRole,
) -> (Vec<RegisteredModel>, Vec<QualityWarning>) {
    let preferred: Vec<RegisteredModel> = registry
        .with_role(role)
        .filter(|m| m.is_available())
        .cloned()
        .collect();
    if !preferred.is_empty() {
        return (preferred, Vec::new());
    }

    let fallback: Vec<RegisteredModel> = registry
        .with_role(role.other())
        .filter(|m| m.is_available())
        .cloned()
        .collect();
    let warnings = fallback
        .first()
        .map(|m| {
            warn!("no {role} detector available, falling back to {}", m.name);
            QualityWarning::FallbackDetector {
                requested: role,
                used: m.name.clone(),
            }
        })
        .into_iter()
        .collect();
    (fallback, warnings)
}

/// Plan around the first candidate. The other loaded models back it up,
/// remaining candidates first, so a model that fails at run time does not
/// end the read while another one can still answer.
fn single(
    registry: &ModelRegistry,
    requested: DetectorRole,
    candidates: Vec<RegisteredModel>,
    image_kind: Option<ImageKind>,
    warnings: Vec<QualityWarning>,
) -> Result<Plan, BoardReadError> {
    let mut candidates = candidates.into_iter();
    let model = candidates
        .next()
        .ok_or(BoardReadError::NoDetectorAvailable)?;
    let mut fallback: Vec<RegisteredModel> = candidates.collect();
    for m in registry.available() {
        if m.name != model.name && !fallback.iter().any(|f| f.name == m.name) {
            fallback.push(m.clone());
        }
    }
    Ok(Plan {
        merge: Merge::Single(FusionPolicy::single(model.name.clone())),
        models: vec![model],
        requested: Some(requested),
        fallback,
        image_kind,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsight_fusion::ReplayAdapter;

    fn registry(specialist_up: bool, generalist_up: bool) -> ModelRegistry {
        let adapter = |up: bool| {
            if up {
                ReplayAdapter::default()
            } else {
                ReplayAdapter::unavailable("not loaded")
            }
        };
        let mut reg = ModelRegistry::new();
        reg.register("haki", DetectorRole::Specialist, adapter(specialist_up))
            .expect("haki");
        reg.register("gear", DetectorRole::Generalist, adapter(generalist_up))
            .expect("gear");
        reg
    }

    fn blank() -> RgbImage {
        RgbImage::blank(64, 64).expect("image")
    }

    #[test]
    fn ensemble_uses_every_model() {
        let plan = plan(
            DetectorMode::Ensemble,
            &registry(true, false),
            &blank(),
            &ReaderParams::default(),
        )
        .expect("plan");
        assert_eq!(plan.models.len(), 2);
        assert!(matches!(plan.merge, Merge::Ensemble));
    }

    #[test]
    fn single_mode_falls_back_with_warning() {
        let plan = plan(
            DetectorMode::Specialist,
            &registry(false, true),
            &blank(),
            &ReaderParams::default(),
        )
        .expect("plan");
        assert_eq!(plan.models[0].name, "gear");
        assert_eq!(
            plan.warnings,
            vec![QualityWarning::FallbackDetector {
                requested: DetectorRole::Specialist,
                used: "gear".into(),
            }]
        );
    }

    #[test]
    fn auto_mode_routes_flat_images_to_the_specialist() {
        let plan = plan(
            DetectorMode::Auto,
            &registry(true, true),
            &blank(),
            &ReaderParams::default(),
        )
        .expect("plan");
        assert_eq!(plan.image_kind, Some(ImageKind::Diagram2d));
        assert_eq!(plan.models[0].name, "haki");
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn single_mode_keeps_loaded_models_as_backup() {
        let plan = plan(
            DetectorMode::Specialist,
            &registry(true, true),
            &blank(),
            &ReaderParams::default(),
        )
        .expect("plan");
        assert_eq!(plan.models[0].name, "haki");
        assert_eq!(plan.requested, Some(DetectorRole::Specialist));
        let backup: Vec<_> = plan.fallback.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(backup, vec!["gear"]);
    }

    #[test]
    fn backup_skips_unloaded_models() {
        let plan = plan(
            DetectorMode::Generalist,
            &registry(false, true),
            &blank(),
            &ReaderParams::default(),
        )
        .expect("plan");
        assert!(plan.fallback.is_empty());
    }

    #[test]
    fn nothing_available_is_an_error() {
        let err = plan(
            DetectorMode::Generalist,
            &registry(false, false),
            &blank(),
            &ReaderParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BoardReadError::NoDetectorAvailable));
    }
}
