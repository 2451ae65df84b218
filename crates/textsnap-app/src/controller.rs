use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use textsnap_ocr::Recognizer;
use textsnap_types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::context::{CaptureContext, DeviceFactory};
use crate::events::event_loop;
use crate::io::spawn_stdin_watcher;
use crate::presenter::presenter_loop;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256), // overlay updates while dragging
            ui_to_app: kanal::bounded_async(64),  // user input
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(
        &self,
        recognizer: Arc<dyn Recognizer>,
        devices: DeviceFactory,
    ) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        let ctx = CaptureContext::new(
            self.state.clone(),
            self.channels.app_to_ui.0.clone(),
            recognizer,
            devices,
        );
        tasks.spawn(event_loop(
            ctx,
            self.channels.ui_to_app.1.clone(),
            self.cancel_token.child_token(),
        ));

        // Presenter
        tasks.spawn(presenter_loop(
            self.channels.app_to_ui.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    /// Start reading commands from stdin
    pub fn spawn_input(&self) -> std::io::Result<()> {
        // Detached: the thread ends on EOF, `quit`, or with the process
        spawn_stdin_watcher(self.sender(), self.cancel_token.child_token())?;
        Ok(())
    }

    /// Sender into the event loop
    pub fn sender(&self) -> AsyncSender<AppEvent> {
        self.channels.ui_to_app.0.clone()
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
