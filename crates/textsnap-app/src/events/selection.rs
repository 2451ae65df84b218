use textsnap_config::overlay::{OverlayConfig, RegionMode};
use textsnap_core::overlay_band;
use textsnap_types::{AppEvent, PointerEvent, Region};

use super::LoopState;
use crate::context::CaptureContext;

/// Crop region for the next capture, in surface coordinates
pub fn current_region(overlay: &OverlayConfig, loop_state: &LoopState) -> Option<Region> {
    match overlay.mode {
        RegionMode::Band => Some(overlay_band(
            loop_state.surface.0,
            loop_state.surface.1,
            overlay.band_fraction,
        )),
        RegionMode::Selection => loop_state.tracker.selection(),
        RegionMode::Fixed => overlay.fixed_region,
    }
}

/// Tell the presentation layer which rectangle to outline
pub async fn publish_overlay(ctx: &CaptureContext, loop_state: &mut LoopState) {
    let overlay = ctx.state.config.read().await.overlay.clone();
    if let Some(region) = current_region(&overlay, loop_state) {
        ctx.emit(AppEvent::OverlayChanged(region)).await;
    }
}

pub async fn handle_pointer(ctx: &CaptureContext, loop_state: &mut LoopState, event: PointerEvent) {
    if !loop_state.tracker.handle(event) {
        tracing::trace!("Selection disabled, pointer event passed through");
        return;
    }

    if let (PointerEvent::Move { .. }, Some(rect)) = (event, loop_state.tracker.raw()) {
        ctx.emit(AppEvent::OverlayChanged(rect.normalized())).await;
    }
}

/// Enabling selection also switches the crop source to the dragged rectangle
pub async fn handle_toggle(ctx: &CaptureContext, loop_state: &mut LoopState, enabled: bool) {
    loop_state.tracker.set_enabled(enabled);
    if enabled {
        ctx.state.config.write().await.overlay.mode = RegionMode::Selection;
    }
    tracing::info!(
        "Region selection {}",
        if enabled { "enabled" } else { "disabled" }
    );
}

pub async fn handle_resize(
    ctx: &CaptureContext,
    loop_state: &mut LoopState,
    width: u32,
    height: u32,
) {
    loop_state.surface = (width, height);
    tracing::debug!("Surface resized to {}x{}", width, height);
    publish_overlay(ctx, loop_state).await;
}
