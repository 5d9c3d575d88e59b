//! End-to-end fusion over registered adapters.

use std::{sync::Arc, time::Duration};

use boardsight_core::{BoundingBox, RawDetection, RgbImage};
use boardsight_fusion::{
    AdapterError, DetectorRole, EnsembleFusion, FusionParams, ModelRegistry, ReplayAdapter,
    SourceStatus,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn det(label: &str, conf: f32, x: f32, y: f32) -> RawDetection {
    RawDetection::new(label, conf, BoundingBox::new(x, y, x + 40.0, y + 40.0))
}

fn image() -> Arc<RgbImage> {
    Arc::new(RgbImage::blank(640, 640).expect("image"))
}

#[test]
fn two_detector_ensemble_over_registry() {
    init_logger();
    let mut registry = ModelRegistry::new();
    registry
        .register(
            "haki",
            DetectorRole::Specialist,
            ReplayAdapter::new(vec![det("white-king", 0.95, 100.0, 100.0)]),
        )
        .expect("haki");
    registry
        .register(
            "gear",
            DetectorRole::Generalist,
            ReplayAdapter::new(vec![
                det("white-queen", 0.70, 102.0, 102.0),
                det("white-knight", 0.88, 300.0, 300.0),
                det("black-pawn", 0.10, 500.0, 500.0),
            ]),
        )
        .expect("gear");

    let fusion = EnsembleFusion::new(FusionParams::default()).expect("fusion");
    let outcome = fusion.run(registry.models(), &image(), 0.25, Duration::from_secs(5));

    let symbols: Vec<char> = outcome
        .iter_detections()
        .map(|d| d.piece.symbol())
        .collect();
    assert_eq!(symbols, vec!['K', 'N']);
    assert_eq!(outcome.suppressed, 1);
    assert_eq!(
        outcome.sources[1].status,
        SourceStatus::Ran {
            raw: 2,
            malformed: 0,
            admitted: 1
        }
    );
}

#[test]
fn failing_adapter_does_not_abort_the_ensemble() {
    init_logger();
    let mut registry = ModelRegistry::new();
    registry
        .register(
            "haki",
            DetectorRole::Specialist,
            |_: &RgbImage, _: f32| -> Result<Vec<RawDetection>, AdapterError> {
                Err(AdapterError::unavailable("CUDA out of memory"))
            },
        )
        .expect("haki");
    registry
        .register(
            "gear",
            DetectorRole::Generalist,
            ReplayAdapter::new(vec![det("black-rook", 0.9, 0.0, 0.0)]),
        )
        .expect("gear");

    let fusion = EnsembleFusion::new(FusionParams::default()).expect("fusion");
    let outcome = fusion.run(registry.models(), &image(), 0.25, Duration::from_secs(5));
    assert_eq!(outcome.detections.len(), 1);
    assert_eq!(outcome.sources_used(), vec!["gear"]);
    let reasons: Vec<_> = outcome.unavailable_sources().collect();
    assert_eq!(reasons.len(), 1);
    assert!(reasons[0].1.contains("CUDA"));
}

#[test]
fn replay_adapter_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gear.json");
    std::fs::write(
        &path,
        r#"[{"class": "white-bishop", "confidence": 0.77,
             "box": {"x1": 10, "y1": 10, "x2": 50, "y2": 50}}]"#,
    )
    .expect("write");
    let mut registry = ModelRegistry::new();
    registry
        .register(
            "gear",
            DetectorRole::Generalist,
            ReplayAdapter::load_json(&path).expect("load"),
        )
        .expect("register");
    let fusion = EnsembleFusion::new(FusionParams::default()).expect("fusion");
    let outcome = fusion.run(registry.models(), &image(), 0.25, Duration::from_secs(5));
    assert_eq!(outcome.detections[0].detection.piece.symbol(), 'B');
    assert_eq!(outcome.detections[0].id, 1);
}
