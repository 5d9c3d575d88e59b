//! Full reads over replayed detections.

use std::{sync::Arc, time::Duration};

use approx::assert_relative_eq;
use boardsight::core::{BoundingBox, RawDetection, RgbImage};
use boardsight::fusion::{AdapterError, DetectorRole, ModelRegistry, ReplayAdapter};
use boardsight::grid::{OccupancyGrid, Square};
use boardsight::{
    BoardReadError, BoardReader, BoardRequest, DetectorMode, QualityWarning, ReaderParams,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn det(label: &str, conf: f32, bbox: [f32; 4]) -> RawDetection {
    RawDetection::new(label, conf, BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]))
}

fn board() -> RgbImage {
    RgbImage::blank(640, 640).expect("image")
}

fn two_model_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry
        .register(
            "haki",
            DetectorRole::Specialist,
            ReplayAdapter::new(vec![det("white-king", 0.9, [100.0, 100.0, 140.0, 140.0])]),
        )
        .expect("haki");
    registry
        .register(
            "gear",
            DetectorRole::Generalist,
            ReplayAdapter::new(vec![det("knight", 0.7, [300.0, 300.0, 340.0, 340.0])]),
        )
        .expect("gear");
    registry
}

#[test]
fn specialist_king_and_generalist_knight() {
    init_logger();
    let reader = BoardReader::new(two_model_registry(), ReaderParams::default()).expect("reader");
    let report = reader.read_image(board()).expect("read");

    assert_eq!(report.piece_count, 2);
    assert_eq!(
        report.grid.get(Square::new(1, 1).expect("square")).map(|p| p.symbol()),
        Some('K')
    );
    assert_eq!(
        report.grid.get(Square::new(4, 4).expect("square")).map(|p| p.symbol()),
        Some('N')
    );
    let ranks: Vec<&str> = report.placement().split('/').collect();
    assert_eq!(ranks[1], "1K6");
    assert_eq!(ranks[4], "4N3");
    assert_eq!(report.notation, "8/1K6/8/8/4N3/8/8/8 w KQkq - 0 1");

    assert_eq!(report.pieces[0].id, 1);
    assert_eq!(report.pieces[0].square, "b7");
    assert_eq!(report.pieces[1].id, 2);
    assert_eq!(report.pieces[1].square, "e4");
    assert_relative_eq!(report.mean_confidence, 0.8, epsilon = 1e-6);
    assert_eq!(report.sources, vec!["haki", "gear"]);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let parsed = OccupancyGrid::from_placement(&report.notation).expect("parse");
    assert_eq!(parsed, report.grid);
}

#[test]
fn json_report_shape() {
    let reader = BoardReader::new(two_model_registry(), ReaderParams::default()).expect("reader");
    let report = reader.read_image(board()).expect("read");
    let json = serde_json::to_value(&report).expect("json");

    assert_eq!(json["notation"], "8/1K6/8/8/4N3/8/8/8 w KQkq - 0 1");
    assert_eq!(json["piece_count"], 2);
    assert_eq!(json["mode"], "ensemble");
    assert_eq!(json["pieces"][0]["class"], "white-king");
    assert_eq!(json["pieces"][0]["symbol"], "K");
    assert_eq!(json["pieces"][1]["bbox"]["width"], 40.0);
    assert_eq!(json["image_size"]["width"], 640);
    assert!(json.get("image_kind").is_none());
    assert!(json.get("grid").is_none());
}

#[test]
fn unavailable_specialist_degrades_to_generalist() {
    let mut registry = ModelRegistry::new();
    registry
        .register(
            "haki",
            DetectorRole::Specialist,
            ReplayAdapter::unavailable("weights missing"),
        )
        .expect("haki");
    registry
        .register(
            "gear",
            DetectorRole::Generalist,
            ReplayAdapter::new(vec![
                det("white-queen", 0.95, [0.0, 0.0, 80.0, 80.0]),
                det("black-pawn", 0.9, [80.0, 80.0, 160.0, 160.0]),
            ]),
        )
        .expect("gear");
    let reader = BoardReader::new(registry, ReaderParams::default()).expect("reader");
    let report = reader.read_image(board()).expect("read");

    assert_eq!(report.placement(), "Q7/1p6/8/8/8/8/8/8");
    assert_eq!(report.sources, vec!["gear"]);
    assert!(matches!(
        &report.warnings[..],
        [QualityWarning::SourceUnavailable { source, .. }] if source == "haki"
    ));
}

#[test]
fn every_detector_failing_is_no_detector_available() {
    let mut registry = ModelRegistry::new();
    registry
        .register(
            "gear",
            DetectorRole::Generalist,
            |_: &RgbImage, _: f32| -> Result<Vec<RawDetection>, AdapterError> {
                Err(AdapterError::unavailable("runtime crashed"))
            },
        )
        .expect("gear");
    let reader = BoardReader::new(registry, ReaderParams::default()).expect("reader");
    let err = reader.read_image(board()).unwrap_err();
    assert!(matches!(err, BoardReadError::NoDetectorAvailable));
    assert_eq!(err.to_string(), "no detector available");
}

#[test]
fn zero_pieces_is_not_an_error() {
    let mut registry = ModelRegistry::new();
    registry
        .register("gear", DetectorRole::Generalist, ReplayAdapter::default())
        .expect("gear");
    let reader = BoardReader::new(registry, ReaderParams::default()).expect("reader");
    let report = reader.read_image(board()).expect("read");
    assert_eq!(report.piece_count, 0);
    assert_eq!(report.mean_confidence, 0.0);
    assert_eq!(report.placement(), "8/8/8/8/8/8/8/8");
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn single_detector_modes() {
    let reader = BoardReader::new(two_model_registry(), ReaderParams::default()).expect("reader");

    let specialist = reader
        .read(BoardRequest::new(board()).with_mode(DetectorMode::Specialist))
        .expect("read");
    assert_eq!(specialist.placement(), "8/1K6/8/8/8/8/8/8");
    assert_eq!(specialist.sources, vec!["haki"]);

    let generalist = reader
        .read(BoardRequest::new(board()).with_mode(DetectorMode::Generalist))
        .expect("read");
    assert_eq!(generalist.placement(), "8/8/8/8/4N3/8/8/8");
    assert_eq!(generalist.mode, DetectorMode::Generalist);
}

#[test]
fn single_detector_failing_at_run_time_falls_back() {
    let mut registry = ModelRegistry::new();
    registry
        .register(
            "haki",
            DetectorRole::Specialist,
            |_: &RgbImage, _: f32| -> Result<Vec<RawDetection>, AdapterError> {
                Err(AdapterError::unavailable("CUDA OOM"))
            },
        )
        .expect("haki");
    registry
        .register(
            "gear",
            DetectorRole::Generalist,
            ReplayAdapter::new(vec![det("pawn", 0.9, [300.0, 300.0, 340.0, 340.0])]),
        )
        .expect("gear");
    let reader = BoardReader::new(registry, ReaderParams::default()).expect("reader");

    let report = reader
        .read(BoardRequest::new(board()).with_mode(DetectorMode::Specialist))
        .expect("read");
    assert_eq!(report.placement(), "8/8/8/8/4P3/8/8/8");
    assert_eq!(report.sources, vec!["gear"]);
    assert!(report.warnings.contains(&QualityWarning::FallbackDetector {
        requested: DetectorRole::Specialist,
        used: "gear".into(),
    }));
    assert!(report.warnings.contains(&QualityWarning::SourceUnavailable {
        source: "haki".into(),
        reason: "model unavailable: CUDA OOM".into(),
    }));
}

#[test]
fn auto_mode_reports_image_kind() {
    let reader = BoardReader::new(two_model_registry(), ReaderParams::default()).expect("reader");
    let report = reader
        .read(BoardRequest::new(board()).with_mode(DetectorMode::Auto))
        .expect("read");
    assert_eq!(report.image_kind, Some(boardsight::ImageKind::Diagram2d));
    assert_eq!(report.sources, vec!["haki"]);
}

#[test]
fn slow_detector_is_skipped_after_timeout() {
    let mut registry = two_model_registry();
    registry
        .register(
            "slow",
            DetectorRole::Generalist,
            |_: &RgbImage, _: f32| -> Result<Vec<RawDetection>, AdapterError> {
                std::thread::sleep(Duration::from_millis(400));
                Ok(Vec::new())
            },
        )
        .expect("slow");
    let params = ReaderParams {
        adapter_timeout_ms: 50,
        ..ReaderParams::default()
    };
    let reader = BoardReader::new(registry, params).expect("reader");
    let report = reader.read_image(board()).expect("read");
    assert_eq!(report.piece_count, 2);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, QualityWarning::SourceUnavailable { source, .. } if source == "slow")));
}

#[test]
fn reader_is_shareable_across_threads() {
    let reader = Arc::new(
        BoardReader::new(two_model_registry(), ReaderParams::default()).expect("reader"),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let reader = Arc::clone(&reader);
            std::thread::spawn(move || reader.read_image(board()).map(|r| r.notation))
        })
        .collect();
    for handle in handles {
        let notation = handle.join().expect("join").expect("read");
        assert_eq!(notation, "8/1K6/8/8/4N3/8/8/8 w KQkq - 0 1");
    }
}
