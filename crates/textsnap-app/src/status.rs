use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// OCR status information
#[derive(Clone, Debug, Default)]
pub struct OcrStatus {
    pub capturing: bool,
    pub last_capture_time: Option<SystemTime>,
    pub capture_count: u64,
    pub error_count: u64,
    pub current_message: String,
}

/// Application status
pub struct AppStatus {
    pub ocr: Arc<RwLock<OcrStatus>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            ocr: Arc::new(RwLock::new(OcrStatus::default())),
        }
    }

    pub async fn capture_started(&self) {
        let mut ocr = self.ocr.write().await;
        ocr.capturing = true;
        ocr.capture_count += 1;
        ocr.last_capture_time = Some(SystemTime::now());
        ocr.current_message = "Capturing".to_string();
    }

    pub async fn capture_finished(&self, message: impl Into<String>) {
        let mut ocr = self.ocr.write().await;
        ocr.capturing = false;
        ocr.current_message = message.into();
    }

    pub async fn capture_failed(&self, message: impl Into<String>) {
        let mut ocr = self.ocr.write().await;
        ocr.capturing = false;
        ocr.error_count += 1;
        ocr.current_message = message.into();
    }

    pub async fn snapshot(&self) -> OcrStatus {
        self.ocr.read().await.clone()
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}
