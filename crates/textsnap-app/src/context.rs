use std::sync::Arc;

use kanal::AsyncSender;
use textsnap_ocr::{CaptureDevice, Recognizer};
use textsnap_types::AppEvent;

use crate::state::AppState;

/// Builds a fresh capture device whenever a session has to be (re)opened
pub type DeviceFactory = Arc<dyn Fn() -> Box<dyn CaptureDevice> + Send + Sync>;

/// Shared dependencies of the capture pipeline
#[derive(Clone)]
pub struct CaptureContext {
    pub state: Arc<AppState>,
    pub event_tx: AsyncSender<AppEvent>,
    pub recognizer: Arc<dyn Recognizer>,
    pub devices: DeviceFactory,
}

impl CaptureContext {
    pub fn new(
        state: Arc<AppState>,
        event_tx: AsyncSender<AppEvent>,
        recognizer: Arc<dyn Recognizer>,
        devices: DeviceFactory,
    ) -> Self {
        Self {
            state,
            event_tx,
            recognizer,
            devices,
        }
    }

    /// Send to the presentation side; a closed channel only means nobody is listening anymore
    pub async fn emit(&self, event: AppEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            tracing::warn!("Presentation channel closed, dropping event: {}", e);
        }
    }
}
