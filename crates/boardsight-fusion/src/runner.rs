use std::{
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use boardsight_core::{RawDetection, RgbImage};
use log::{debug, warn};

use crate::{AdapterError, DetectorRole, RegisteredModel};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Output of one source for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceRun {
    pub source: String,
    pub role: DetectorRole,
    pub result: Result<Vec<RawDetection>, AdapterError>,
}

impl SourceRun {
    pub fn ok(source: impl Into<String>, role: DetectorRole, detections: Vec<RawDetection>) -> Self {
        Self {
            source: source.into(),
            role,
            result: Ok(detections),
        }
    }

    pub fn unavailable(
        source: impl Into<String>,
        role: DetectorRole,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            role,
            result: Err(AdapterError::unavailable(reason)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.result.is_ok()
    }
}

type Reply = Result<Vec<RawDetection>, AdapterError>;

enum Slot {
    Done(SourceRun),
    Waiting {
        source: String,
        role: DetectorRole,
        rx: Receiver<Reply>,
    },
}

/// Run every model on the image concurrently, one worker thread per model.
///
/// All workers share one deadline `timeout` from the call. A worker that
/// misses it, panics or cannot be spawned yields an unavailable run; the
/// thread itself is left to finish in the background. Results are returned
/// in `models` order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(models, image), fields(count = models.len()))
)]
pub fn run_adapters(
    models: &[RegisteredModel],
    image: &Arc<RgbImage>,
    confidence_threshold: f32,
    timeout: Duration,
) -> Vec<SourceRun> {
    let deadline = Instant::now() + timeout;

    let slots: Vec<Slot> = models
        .iter()
        .map(|model| {
            if !model.is_available() {
                return Slot::Done(SourceRun::unavailable(
                    &model.name,
                    model.role,
                    "model not loaded",
                ));
            }
            let (tx, rx) = mpsc::channel();
            let adapter = Arc::clone(&model.adapter);
            let image = Arc::clone(image);
            let spawned = thread::Builder::new()
                .name(format!("detect-{}", model.name))
                .spawn(move || {
                    // Receiver may be gone after a timeout.
                    let _ = tx.send(adapter.detect(&image, confidence_threshold));
                });
            match spawned {
                Ok(_) => Slot::Waiting {
                    source: model.name.clone(),
                    role: model.role,
                    rx,
                },
                Err(e) => Slot::Done(SourceRun::unavailable(
                    &model.name,
                    model.role,
                    format!("failed to start worker: {e}"),
                )),
            }
        })
        .collect();

    let runs: Vec<SourceRun> = slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Done(run) => run,
            Slot::Waiting { source, role, rx } => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let result = match rx.recv_timeout(remaining) {
                    Ok(result) => result,
                    Err(RecvTimeoutError::Timeout) => Err(AdapterError::unavailable(format!(
                        "timed out after {} ms",
                        timeout.as_millis()
                    ))),
                    Err(RecvTimeoutError::Disconnected) => {
                        Err(AdapterError::unavailable("detector worker panicked"))
                    }
                };
                SourceRun {
                    source,
                    role,
                    result,
                }
            }
        })
        .collect();

    for run in &runs {
        match &run.result {
            Ok(dets) => debug!("{} returned {} detections", run.source, dets.len()),
            Err(e) => warn!("{} skipped: {e}", run.source),
        }
    }
    runs
}
