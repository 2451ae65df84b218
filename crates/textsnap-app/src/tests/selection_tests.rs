use std::sync::Arc;

use textsnap_config::overlay::RegionMode;
use textsnap_core::Frame;
use textsnap_types::{AppEvent, ErrorKind, PointerEvent, Region};

use super::*;

fn overlay(event: &AppEvent) -> Option<Region> {
    match event {
        AppEvent::OverlayChanged(region) => Some(*region),
        _ => None,
    }
}

fn white_harness(recognizer: Arc<MockRecognizer>) -> Harness {
    Harness::start(
        small_config(),
        recognizer,
        static_devices(Frame::filled(200, 100, [255, 255, 255])),
    )
}

async fn drag(harness: &Harness, from: (f32, f32), to: (f32, f32)) {
    harness
        .send(AppEvent::Pointer(PointerEvent::Down {
            x: from.0,
            y: from.1,
        }))
        .await;
    harness
        .send(AppEvent::Pointer(PointerEvent::Move { x: to.0, y: to.1 }))
        .await;
    harness
        .send(AppEvent::Pointer(PointerEvent::Up { x: to.0, y: to.1 }))
        .await;
}

#[tokio::test]
async fn startup_publishes_centered_band() {
    let harness = white_harness(Arc::new(MockRecognizer::new("")));

    let event = harness.expect(|e| overlay(e).is_some()).await;
    assert_eq!(overlay(&event), Some(Region::new(0, 37, 200, 62)));
    harness.quit().await;
}

#[tokio::test]
async fn resize_moves_the_band() {
    let harness = white_harness(Arc::new(MockRecognizer::new("")));
    harness.expect(|e| overlay(e).is_some()).await;

    harness
        .send(AppEvent::SurfaceResized {
            width: 400,
            height: 800,
        })
        .await;
    let event = harness.expect(|e| overlay(e).is_some()).await;
    assert_eq!(overlay(&event), Some(Region::new(0, 300, 400, 500)));
    harness.quit().await;
}

#[tokio::test]
async fn dragged_selection_is_captured() {
    let recognizer = Arc::new(MockRecognizer::new("PICKED"));
    let harness = white_harness(recognizer.clone());
    harness.expect(|e| overlay(e).is_some()).await;

    harness.send(AppEvent::SetSelectionEnabled(true)).await;
    drag(&harness, (10.0, 10.0), (60.9, 40.2)).await;

    let event = harness.expect(|e| overlay(e).is_some()).await;
    assert_eq!(overlay(&event), Some(Region::new(10, 10, 60, 40)));
    assert_eq!(
        harness.state.config.read().await.overlay.mode,
        RegionMode::Selection
    );

    harness.send(AppEvent::TriggerCapture).await;
    harness
        .expect(|e| matches!(e, AppEvent::ShowText { .. }))
        .await;

    let seen = recognizer.seen();
    assert_eq!((seen[0].width, seen[0].height), (50, 30));
    harness.quit().await;
}

#[tokio::test]
async fn upward_drag_is_flipped() {
    let recognizer = Arc::new(MockRecognizer::new("FLIPPED"));
    let harness = white_harness(recognizer.clone());
    harness.expect(|e| overlay(e).is_some()).await;

    harness.send(AppEvent::SetSelectionEnabled(true)).await;
    drag(&harness, (60.0, 40.0), (10.0, 10.0)).await;

    let event = harness.expect(|e| overlay(e).is_some()).await;
    assert_eq!(overlay(&event), Some(Region::new(10, 10, 60, 40)));

    harness.send(AppEvent::TriggerCapture).await;
    harness
        .expect(|e| matches!(e, AppEvent::ShowText { .. }))
        .await;
    let seen = recognizer.seen();
    assert_eq!((seen[0].width, seen[0].height), (50, 30));
    harness.quit().await;
}

#[tokio::test]
async fn selection_mode_without_drag_is_an_invalid_region() {
    let recognizer = Arc::new(MockRecognizer::new("never"));
    let harness = white_harness(recognizer.clone());

    harness.send(AppEvent::SetSelectionEnabled(true)).await;
    harness.send(AppEvent::TriggerCapture).await;

    let event = harness
        .expect(|e| matches!(e, AppEvent::ShowError { .. }))
        .await;
    assert!(matches!(
        event,
        AppEvent::ShowError {
            kind: ErrorKind::InvalidRegion,
            ..
        }
    ));

    harness.wait_idle().await;
    assert!(recognizer.seen().is_empty());
    harness.quit().await;
}

#[tokio::test]
async fn pointer_events_pass_through_while_disabled() {
    let recognizer = Arc::new(MockRecognizer::new("BAND"));
    let harness = white_harness(recognizer.clone());
    harness.expect(|e| overlay(e).is_some()).await;

    drag(&harness, (10.0, 10.0), (20.0, 20.0)).await;
    harness.send(AppEvent::TriggerCapture).await;

    // No overlay update from the drag, the band is still what gets captured
    let events = harness
        .collect_until(|e| matches!(e, AppEvent::ShowText { .. }))
        .await;
    assert!(events.iter().all(|e| overlay(e).is_none()));
    assert_eq!(recognizer.seen()[0].height, 25);
    harness.quit().await;
}

#[tokio::test]
async fn fixed_region_outside_frame_is_rejected() {
    let mut config = small_config();
    config.overlay.mode = RegionMode::Fixed;
    config.overlay.fixed_region = Some(Region::new(150, 0, 250, 50));
    let harness = Harness::start(
        config,
        Arc::new(MockRecognizer::new("never")),
        static_devices(Frame::filled(200, 100, [255, 255, 255])),
    );

    harness.send(AppEvent::TriggerCapture).await;
    let event = harness
        .expect(|e| matches!(e, AppEvent::ShowError { .. }))
        .await;
    assert!(matches!(
        event,
        AppEvent::ShowError {
            kind: ErrorKind::InvalidRegion,
            ..
        }
    ));
    harness.quit().await;
}

#[tokio::test]
async fn fixed_region_off_a_larger_surface_is_rejected() {
    // Downscaling to the 200x100 frame would pull these edges inside it
    let mut config = small_config();
    config.overlay.surface_width = 400;
    config.overlay.surface_height = 200;
    config.overlay.mode = RegionMode::Fixed;
    config.overlay.fixed_region = Some(Region::new(-1, -1, 401, 50));

    let recognizer = Arc::new(MockRecognizer::new("never"));
    let harness = Harness::start(
        config,
        recognizer.clone(),
        static_devices(Frame::filled(200, 100, [255, 255, 255])),
    );

    harness.send(AppEvent::TriggerCapture).await;
    let event = harness
        .expect(|e| matches!(e, AppEvent::ShowError { .. }))
        .await;
    assert!(matches!(
        event,
        AppEvent::ShowError {
            kind: ErrorKind::InvalidRegion,
            ..
        }
    ));

    harness.wait_idle().await;
    assert!(recognizer.seen().is_empty());
    harness.quit().await;
}

#[tokio::test]
async fn full_surface_region_maps_onto_smaller_frame() {
    let mut config = small_config();
    config.overlay.surface_width = 400;
    config.overlay.surface_height = 200;
    config.overlay.mode = RegionMode::Fixed;
    config.overlay.fixed_region = Some(Region::new(0, 0, 400, 100));

    let recognizer = Arc::new(MockRecognizer::new("HALF"));
    let harness = Harness::start(
        config,
        recognizer.clone(),
        static_devices(Frame::filled(200, 100, [255, 255, 255])),
    );

    harness.send(AppEvent::TriggerCapture).await;
    harness
        .expect(|e| matches!(e, AppEvent::ShowText { .. }))
        .await;

    let seen = recognizer.seen();
    assert_eq!((seen[0].width, seen[0].height), (200, 50));
    harness.quit().await;
}
