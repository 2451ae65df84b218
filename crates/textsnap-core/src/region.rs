use textsnap_types::{PointerEvent, Region};

use crate::error::PreprocessError;

/// Check that `region` is a non-empty rectangle inside a `width` x `height` frame
pub fn check_bounds(region: Region, width: u32, height: u32) -> Result<(), PreprocessError> {
    if region.is_inverted() {
        return Err(PreprocessError::Inverted { region });
    }
    if region.is_empty() {
        return Err(PreprocessError::Empty { region });
    }
    if region.left < 0
        || region.top < 0
        || region.right as i64 > width as i64
        || region.bottom as i64 > height as i64
    {
        return Err(PreprocessError::OutOfBounds {
            region,
            width,
            height,
        });
    }
    Ok(())
}

/// Full-width band centered vertically, `fraction` of the surface height tall.
///
/// Recomputed from the current surface size on every call.
pub fn overlay_band(surface_width: u32, surface_height: u32, fraction: f32) -> Region {
    let width = i32::try_from(surface_width).unwrap_or(i32::MAX);
    let height = i32::try_from(surface_height).unwrap_or(i32::MAX);
    let band_height = (height as f64 * fraction.clamp(0.0, 1.0) as f64) as i32;

    let left = 0;
    let top = (height - band_height) / 2;
    Region::new(left, top, left + width, top + band_height)
}

/// Scale a region drawn on the preview surface into captured frame coordinates.
///
/// The region must lie on the surface; scaling never pulls an outside edge in.
pub fn map_to_frame(
    region: Region,
    surface: (u32, u32),
    frame: (u32, u32),
) -> Result<Region, PreprocessError> {
    check_bounds(region, surface.0, surface.1)?;
    if surface == frame {
        return Ok(region);
    }

    let scale = |v: i32, from: u32, to: u32| -> i32 {
        let scaled = v as i64 * to as i64 / from as i64;
        scaled.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    };

    Ok(Region::new(
        scale(region.left, surface.0, frame.0),
        scale(region.top, surface.1, frame.1),
        scale(region.right, surface.0, frame.0),
        scale(region.bottom, surface.1, frame.1),
    ))
}

/// Tracks a user-dragged rectangle.
///
/// Pointer-down anchors the rectangle, pointer-move drags its bottom-right
/// corner, pointer-up keeps whatever the last move produced. While disabled
/// every event is left unhandled.
#[derive(Debug, Default, Clone)]
pub struct SelectionTracker {
    enabled: bool,
    rect: Option<Region>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns `true` if the event was consumed
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        if !self.enabled {
            return false;
        }

        let (x, y) = event.position();
        match event {
            PointerEvent::Down { .. } => {
                self.rect = Some(Region::at(x, y));
            }
            PointerEvent::Move { .. } => {
                if let Some(rect) = self.rect.as_mut() {
                    rect.right = x;
                    rect.bottom = y;
                }
            }
            PointerEvent::Up { .. } => {}
        }
        true
    }

    /// Rectangle exactly as dragged; may have negative width or height
    pub fn raw(&self) -> Option<Region> {
        self.rect
    }

    /// Dragged rectangle with inverted edges flipped, `None` if it has no area
    pub fn selection(&self) -> Option<Region> {
        self.rect
            .map(|rect| rect.normalized())
            .filter(|rect| !rect.is_empty())
    }

    pub fn clear(&mut self) {
        self.rect = None;
    }
}
