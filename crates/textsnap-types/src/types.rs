use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum AppEvent {
    ConfigChanged,
    ConfigUpdate {
        field: String,
        value: String,
    },
    /// User asked for a still capture of the current region
    TriggerCapture,
    Pointer(PointerEvent),
    SetSelectionEnabled(bool),
    SurfaceResized {
        width: u32,
        height: u32,
    },
    /// Rectangle the presentation layer should outline
    OverlayChanged(Region),
    ShowText {
        capture_id: Uuid,
        text: String,
    },
    ShowError {
        capture_id: Option<Uuid>,
        kind: ErrorKind,
        message: String,
    },
    OcrStatusUpdate {
        status: String,
        capturing: bool,
    },
    BackendReady,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    Device,
    InvalidRegion,
    Recognition,
    Busy,
}

impl ErrorKind {
    /// Permission problems block the user until resolved, everything else is transient
    pub fn is_blocking(self) -> bool {
        matches!(self, ErrorKind::PermissionDenied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
}

impl PointerEvent {
    /// Integer position, truncated toward zero
    pub fn position(&self) -> (i32, i32) {
        let (x, y) = match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } => {
                (x, y)
            }
        };
        (x as i32, y as i32)
    }
}

/// Axis-aligned rectangle in frame (or surface) coordinates.
///
/// `right` and `bottom` are exclusive. A rectangle produced by dragging up or
/// left has `right < left` or `bottom < top`; use [`Region::normalized`] to flip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Region {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Degenerate rectangle anchored at a single point
    pub const fn at(x: i32, y: i32) -> Self {
        Self::new(x, y, x, y)
    }

    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }

    pub fn is_inverted(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Same rectangle with its edges ordered so width and height are non-negative
    pub fn normalized(&self) -> Self {
        Self {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}] ({}x{})",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}
