use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use textsnap_config::Config;
use tokio::sync::RwLock;

use crate::status::AppStatus;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub status: AppStatus,
    /// Set while a capture is between trigger and recognition result
    pub capture_in_flight: AtomicBool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            status: AppStatus::new(),
            capture_in_flight: AtomicBool::new(false),
        }
    }

    /// Claim the single capture slot; `None` if a capture is already running
    pub fn try_begin_capture(self: &Arc<Self>) -> Option<CaptureSlot> {
        if self.capture_in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(CaptureSlot {
            state: Arc::clone(self),
        })
    }

    pub fn is_capturing(&self) -> bool {
        self.capture_in_flight.load(Ordering::SeqCst)
    }
}

/// Releases the capture slot when dropped, even if the pipeline task panics
pub struct CaptureSlot {
    state: Arc<AppState>,
}

impl Drop for CaptureSlot {
    fn drop(&mut self) {
        self.state.capture_in_flight.store(false, Ordering::SeqCst);
    }
}
