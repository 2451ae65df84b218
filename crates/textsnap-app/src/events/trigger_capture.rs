use std::time::{Duration, Instant};

use textsnap_core::{
    BinaryFrame, DefaultTextCleaner, PreprocessError, Preprocessor, TextCleaner,
    ThresholdPreprocessor, map_to_frame,
};
use textsnap_ocr::{CaptureSession, Orientation, PreviewSettings, SessionError, recognize_with_timeout};
use textsnap_types::{AppEvent, ErrorKind};
use uuid::Uuid;

use super::LoopState;
use super::selection::current_region;
use crate::context::CaptureContext;

/// Why a capture never reached the recognizer
#[derive(Debug, thiserror::Error)]
pub enum CaptureFailure {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Region(#[from] PreprocessError),

    #[error("No capture region selected")]
    NoRegion,

    #[error("Capture task failed: {0}")]
    Task(String),
}

impl CaptureFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureFailure::Session(SessionError::PermissionDenied { .. }) => {
                ErrorKind::PermissionDenied
            }
            CaptureFailure::Session(_) | CaptureFailure::Task(_) => ErrorKind::Device,
            CaptureFailure::Region(_) | CaptureFailure::NoRegion => ErrorKind::InvalidRegion,
        }
    }
}

/// Capture settings read once per trigger so a config change mid-capture can't mix values
struct CapturePlan {
    preprocessor: ThresholdPreprocessor,
    orientation: Orientation,
    timeout: Duration,
    preview: PreviewSettings,
}

/// One user-initiated capture.
///
/// Capture and preprocessing run on the blocking pool with the session moved in
/// and handed back; recognition is spawned so the loop keeps serving pointer
/// events. Only one capture may be in flight.
pub async fn handle_capture_trigger(
    ctx: &CaptureContext,
    loop_state: &mut LoopState,
) -> anyhow::Result<()> {
    let Some(slot) = ctx.state.try_begin_capture() else {
        tracing::warn!(">>> [CAPTURE] Already in progress, ignoring trigger");
        ctx.emit(AppEvent::ShowError {
            capture_id: None,
            kind: ErrorKind::Busy,
            message: "A capture is already in progress".to_string(),
        })
        .await;
        return Ok(());
    };

    let capture_id = Uuid::new_v4();
    let (plan, overlay) = {
        let config = ctx.state.config.read().await;
        let orientation = Orientation::from_degrees(config.ocr.orientation).unwrap_or_else(|| {
            tracing::warn!(
                "Unsupported orientation {}°, using 0°",
                config.ocr.orientation
            );
            Orientation::Deg0
        });
        let plan = CapturePlan {
            preprocessor: ThresholdPreprocessor::from_config(&config.ocr),
            orientation,
            timeout: Duration::from_millis(config.ocr.timeout_ms),
            preview: PreviewSettings {
                width: config.capture.preview_width,
                height: config.capture.preview_height,
            },
        };
        (plan, config.overlay.clone())
    };

    ctx.state.status.capture_started().await;
    ctx.emit(AppEvent::OcrStatusUpdate {
        status: "Capturing".to_string(),
        capturing: true,
    })
    .await;

    let Some(region) = current_region(&overlay, loop_state) else {
        report_failure(ctx, capture_id, CaptureFailure::NoRegion).await;
        return Ok(());
    };
    tracing::info!(%capture_id, %region, ">>> [CAPTURE] Capturing region");

    let session = loop_state.session.take();
    let devices = ctx.devices.clone();
    let surface = loop_state.surface;
    let CapturePlan {
        preprocessor,
        orientation,
        timeout,
        preview,
    } = plan;

    let joined = tokio::task::spawn_blocking(move || {
        let mut session = match session {
            Some(session) if !session.is_closed() => session,
            _ => match CaptureSession::start(devices(), preview) {
                Ok(session) => session,
                Err(e) => return (None, Err(CaptureFailure::from(e))),
            },
        };

        let result = session
            .capture()
            .map_err(CaptureFailure::from)
            .and_then(|frame| {
                let frame_region = map_to_frame(region, surface, frame.dimensions())?;
                tracing::debug!(
                    "Cropping {} of {}x{} frame",
                    frame_region,
                    frame.width(),
                    frame.height()
                );
                preprocessor
                    .process(&frame, frame_region)
                    .map_err(CaptureFailure::from)
            });
        (Some(session), result)
    })
    .await;

    let binary = match joined {
        Ok((session, result)) => {
            // A closed session is dropped; the next trigger opens a new one
            loop_state.session = session.filter(|s| !s.is_closed());
            match result {
                Ok(binary) => binary,
                Err(failure) => {
                    report_failure(ctx, capture_id, failure).await;
                    return Ok(());
                }
            }
        }
        Err(e) => {
            report_failure(ctx, capture_id, CaptureFailure::Task(e.to_string())).await;
            return Ok(());
        }
    };

    let task_ctx = ctx.clone();
    loop_state.pending = Some(tokio::spawn(async move {
        let _slot = slot;
        run_recognition(&task_ctx, capture_id, binary, orientation, timeout).await;
    }));

    Ok(())
}

/// Hand the binarized crop to the recognizer and publish whatever comes back
pub async fn run_recognition(
    ctx: &CaptureContext,
    capture_id: Uuid,
    binary: BinaryFrame,
    orientation: Orientation,
    timeout: Duration,
) {
    let started = Instant::now();
    let result =
        recognize_with_timeout(ctx.recognizer.as_ref(), &binary, orientation, timeout).await;

    match result {
        Ok(raw) => {
            let text = DefaultTextCleaner.clean(&raw);
            tracing::debug!(
                %capture_id,
                ">>> [OCR] Got text: {} chars in {:?}",
                text.len(),
                started.elapsed()
            );

            let status = if text.is_empty() {
                "No text found"
            } else {
                tracing::info!(%capture_id, "OCR result: {}", text);
                ctx.emit(AppEvent::ShowText { capture_id, text }).await;
                "Ready"
            };

            ctx.state.status.capture_finished(status).await;
            ctx.emit(AppEvent::OcrStatusUpdate {
                status: status.to_string(),
                capturing: false,
            })
            .await;
        }
        Err(e) => {
            tracing::error!(%capture_id, ">>> [OCR] Failed: {}", e);
            let message = format!("OCR failed: {e}");
            ctx.state.status.capture_failed(message.clone()).await;
            ctx.emit(AppEvent::ShowError {
                capture_id: Some(capture_id),
                kind: ErrorKind::Recognition,
                message,
            })
            .await;
            ctx.emit(AppEvent::OcrStatusUpdate {
                status: "Failed".to_string(),
                capturing: false,
            })
            .await;
        }
    }
}

async fn report_failure(ctx: &CaptureContext, capture_id: Uuid, failure: CaptureFailure) {
    let kind = failure.kind();
    tracing::error!(%capture_id, ?kind, ">>> [CAPTURE] Failed: {}", failure);

    let message = failure.to_string();
    ctx.state.status.capture_failed(message.clone()).await;
    ctx.emit(AppEvent::ShowError {
        capture_id: Some(capture_id),
        kind,
        message: message.clone(),
    })
    .await;
    ctx.emit(AppEvent::OcrStatusUpdate {
        status: format!("Failed: {message}"),
        capturing: false,
    })
    .await;
}
