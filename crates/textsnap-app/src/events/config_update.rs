use textsnap_types::AppEvent;

use super::LoopState;
use super::selection::publish_overlay;
use crate::context::CaptureContext;

pub async fn handle_config_update(
    ctx: &CaptureContext,
    loop_state: &mut LoopState,
    field: &str,
    value: &str,
) {
    let result = {
        let mut config = ctx.state.config.write().await;
        config.update_field(field, value)
    };

    let status = match result {
        Ok(()) => {
            tracing::info!("Config updated: {} = {}", field, value);
            format!("{field} = {value}")
        }
        Err(e) => {
            tracing::warn!("Config update rejected: {}", e);
            format!("Config error: {e}")
        }
    };

    ctx.emit(AppEvent::OcrStatusUpdate {
        status,
        capturing: ctx.state.is_capturing(),
    })
    .await;

    if field.starts_with("overlay.") {
        publish_overlay(ctx, loop_state).await;
    }
}
