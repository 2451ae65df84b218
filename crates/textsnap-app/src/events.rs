use kanal::AsyncReceiver;
use textsnap_config::Config;
use textsnap_core::SelectionTracker;
use textsnap_ocr::{CaptureDevice, CaptureSession};
use textsnap_types::AppEvent;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::CaptureContext;

pub mod config_update;
pub mod selection;
pub mod trigger_capture;

use config_update::handle_config_update;
use selection::{handle_pointer, handle_resize, handle_toggle, publish_overlay};
use trigger_capture::handle_capture_trigger;

/// State owned by the event loop and handed to whichever handler runs
pub struct LoopState {
    /// Open capture session, `None` until the first capture or after a device failure
    pub session: Option<CaptureSession<Box<dyn CaptureDevice>>>,
    pub tracker: SelectionTracker,
    /// Current preview surface size
    pub surface: (u32, u32),
    /// Recognition task of the latest capture
    pub pending: Option<JoinHandle<()>>,
}

impl LoopState {
    pub fn new(config: &Config) -> Self {
        Self {
            session: None,
            tracker: SelectionTracker::new(),
            surface: (config.overlay.surface_width, config.overlay.surface_height),
            pending: None,
        }
    }
}

/// App's main loop
pub async fn event_loop(
    ctx: CaptureContext,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut loop_state = {
        let config = ctx.state.config.read().await;
        LoopState::new(&config)
    };

    ctx.emit(AppEvent::BackendReady).await;
    publish_overlay(&ctx, &mut loop_state).await;

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled");
                break;
            }
            event = ui_to_app_rx.recv() => event?,
        };

        tracing::debug!(
            "[EVENT_LOOP] EVENT RECEIVED: {:?}",
            std::mem::discriminant(&event)
        );
        if !handle_events(&ctx, &mut loop_state, event).await? {
            break;
        }
    }

    if let Some(session) = loop_state.session.as_mut() {
        session.close();
    }
    Ok(())
}

/// Returns `false` once the loop should stop
async fn handle_events(
    ctx: &CaptureContext,
    loop_state: &mut LoopState,
    event: AppEvent,
) -> anyhow::Result<bool> {
    match event {
        AppEvent::TriggerCapture => {
            tracing::debug!(">>> [CAPTURE] Triggered");
            handle_capture_trigger(ctx, loop_state).await?;
        }
        AppEvent::Pointer(pointer) => {
            handle_pointer(ctx, loop_state, pointer).await;
        }
        AppEvent::SetSelectionEnabled(enabled) => {
            handle_toggle(ctx, loop_state, enabled).await;
        }
        AppEvent::SurfaceResized { width, height } => {
            handle_resize(ctx, loop_state, width, height).await;
        }
        AppEvent::ConfigUpdate { field, value } => {
            handle_config_update(ctx, loop_state, &field, &value).await;
        }
        AppEvent::ConfigChanged => {
            publish_overlay(ctx, loop_state).await;
        }
        AppEvent::Quit => {
            tracing::info!("Quit requested");
            // Let the in-flight recognition deliver its result first
            if let Some(pending) = loop_state.pending.take() {
                if let Err(e) = pending.await {
                    tracing::error!("Recognition task failed: {}", e);
                }
            }
            ctx.emit(AppEvent::Quit).await;
            return Ok(false);
        }
        AppEvent::OverlayChanged(_)
        | AppEvent::ShowText { .. }
        | AppEvent::ShowError { .. }
        | AppEvent::OcrStatusUpdate { .. }
        | AppEvent::BackendReady => {
            // Presentation-only events, ignore in backend
        }
    }

    Ok(true)
}
