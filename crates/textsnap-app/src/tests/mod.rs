//! Event loop tests driven through the same channels the app wires up

mod selection_tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kanal::{AsyncReceiver, AsyncSender};
use textsnap_config::Config;
use textsnap_core::{BinaryFrame, Frame};
use textsnap_ocr::{
    CaptureDevice, DeviceError, Orientation, Permission, PreviewSettings, RecognitionError,
    Recognizer, StaticDevice,
};
use textsnap_types::AppEvent;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::{CaptureContext, DeviceFactory};
use crate::events::event_loop;
use crate::state::AppState;

pub(crate) const WAIT: Duration = Duration::from_secs(5);

/// What the recognizer was handed
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Seen {
    pub width: u32,
    pub height: u32,
    pub white_ratio: f64,
}

pub(crate) struct MockRecognizer {
    reply: String,
    delay: Duration,
    pub seen: Mutex<Vec<Seen>>,
}

impl MockRecognizer {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(reply)
        }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(
        &self,
        image: &BinaryFrame,
        _orientation: Orientation,
    ) -> Result<String, RecognitionError> {
        self.seen.lock().unwrap().push(Seen {
            width: image.width(),
            height: image.height(),
            white_ratio: image.white_ratio(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.clone())
    }
}

/// Device whose user refused camera access
pub(crate) struct DeniedDevice;

impl CaptureDevice for DeniedDevice {
    fn name(&self) -> &str {
        "denied"
    }

    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        panic!("a denied device must never be opened");
    }

    fn configure(&mut self, _settings: PreviewSettings) -> Result<(), DeviceError> {
        Ok(())
    }

    fn set_repeating(&mut self, _enabled: bool) -> Result<(), DeviceError> {
        Ok(())
    }

    fn capture_still(&mut self) -> Result<Frame, DeviceError> {
        Err(DeviceError::NotOpen)
    }

    fn close(&mut self) {}
}

/// Fails its first still, then behaves; counts how often it was built
pub(crate) struct FlakyDevice {
    inner: StaticDevice,
    failures: Arc<AtomicUsize>,
}

impl CaptureDevice for FlakyDevice {
    fn name(&self) -> &str {
        "flaky"
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        self.inner.open()
    }

    fn configure(&mut self, settings: PreviewSettings) -> Result<(), DeviceError> {
        self.inner.configure(settings)
    }

    fn set_repeating(&mut self, enabled: bool) -> Result<(), DeviceError> {
        self.inner.set_repeating(enabled)
    }

    fn capture_still(&mut self) -> Result<Frame, DeviceError> {
        if self.failures.swap(0, Ordering::SeqCst) > 0 {
            return Err(DeviceError::Other("camera disconnected".to_string()));
        }
        self.inner.capture_still()
    }

    fn close(&mut self) {
        self.inner.close()
    }
}

pub(crate) fn static_devices(frame: Frame) -> DeviceFactory {
    Arc::new(move || Box::new(StaticDevice::new(frame.clone())) as Box<dyn CaptureDevice>)
}

pub(crate) fn flaky_devices(frame: Frame, built: Arc<AtomicUsize>) -> DeviceFactory {
    let failures = Arc::new(AtomicUsize::new(1));
    Arc::new(move || {
        built.fetch_add(1, Ordering::SeqCst);
        Box::new(FlakyDevice {
            inner: StaticDevice::new(frame.clone()),
            failures: failures.clone(),
        }) as Box<dyn CaptureDevice>
    })
}

/// 200x100 surface matching a 200x100 frame, so surface and frame coordinates agree
pub(crate) fn small_config() -> Config {
    let mut config = Config::default();
    config.overlay.surface_width = 200;
    config.overlay.surface_height = 100;
    config
}

pub(crate) struct Harness {
    pub tx: AsyncSender<AppEvent>,
    pub rx: AsyncReceiver<AppEvent>,
    pub state: Arc<AppState>,
    pub cancel: CancellationToken,
    pub handle: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    pub fn start(config: Config, recognizer: Arc<dyn Recognizer>, devices: DeviceFactory) -> Self {
        let (ui_tx, ui_rx) = kanal::bounded_async(64);
        let (app_tx, app_rx) = kanal::bounded_async(256);
        let state = Arc::new(AppState::new(config));
        let cancel = CancellationToken::new();

        let ctx = CaptureContext::new(state.clone(), app_tx, recognizer, devices);
        let handle = tokio::spawn(event_loop(ctx, ui_rx, cancel.clone()));

        Self {
            tx: ui_tx,
            rx: app_rx,
            state,
            cancel,
            handle,
        }
    }

    pub async fn send(&self, event: AppEvent) {
        self.tx.send(event).await.unwrap();
    }

    /// Next event matching `pred`, skipping everything else
    pub async fn expect(&self, pred: impl Fn(&AppEvent) -> bool) -> AppEvent {
        tokio::time::timeout(WAIT, async {
            loop {
                let event = self.rx.recv().await.unwrap();
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    /// Every event up to and including the first one matching `pred`
    pub async fn collect_until(&self, pred: impl Fn(&AppEvent) -> bool) -> Vec<AppEvent> {
        tokio::time::timeout(WAIT, async {
            let mut events = Vec::new();
            loop {
                let event = self.rx.recv().await.unwrap();
                let done = pred(&event);
                events.push(event);
                if done {
                    return events;
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    /// Wait until the capture slot is free again
    pub async fn wait_idle(&self) {
        tokio::time::timeout(WAIT, async {
            while self.state.is_capturing() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("capture slot never released");
    }

    /// Send `Quit` and wait for the loop to finish
    pub async fn quit(self) {
        self.send(AppEvent::Quit).await;
        let result = tokio::time::timeout(WAIT, self.handle)
            .await
            .expect("event loop did not stop");
        result.unwrap().unwrap();
    }
}
