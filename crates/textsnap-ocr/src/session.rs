use textsnap_core::Frame;

use crate::capture::{CaptureDevice, DeviceError, Permission, PreviewSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opened,
    Configured,
    Previewing,
    Capturing,
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Permission to use capture device '{device}' was not granted")]
    PermissionDenied { device: String },

    #[error("Capture device failed: {0}")]
    Device(#[from] DeviceError),

    #[error("Cannot {action} while the session is {state:?}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },
}

/// Sole owner of a capture device.
///
/// Moves through `Opened -> Configured -> Previewing`, then alternates
/// `Previewing -> Capturing -> Previewing` for each still. Any device failure
/// closes the session; a closed session is never reopened, build a new one.
pub struct CaptureSession<D: CaptureDevice> {
    device: D,
    state: SessionState,
    settings: Option<PreviewSettings>,
}

impl<D: CaptureDevice> CaptureSession<D> {
    /// Check permission and open the device
    pub fn open(mut device: D) -> Result<Self, SessionError> {
        if device.permission() == Permission::Denied {
            tracing::warn!("Capture permission denied for {}", device.name());
            return Err(SessionError::PermissionDenied {
                device: device.name().to_string(),
            });
        }

        device.open()?;
        tracing::info!("Capture device opened: {}", device.name());

        Ok(Self {
            device,
            state: SessionState::Opened,
            settings: None,
        })
    }

    /// Open, configure and start the preview in one go
    pub fn start(device: D, settings: PreviewSettings) -> Result<Self, SessionError> {
        let mut session = Self::open(device)?;
        session.configure(settings)?;
        session.start_preview()?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }

    pub fn settings(&self) -> Option<PreviewSettings> {
        self.settings
    }

    pub fn configure(&mut self, settings: PreviewSettings) -> Result<(), SessionError> {
        self.expect_state("configure", &[SessionState::Opened, SessionState::Configured])?;

        if let Err(e) = self.device.configure(settings) {
            return Err(self.fail(e));
        }
        self.settings = Some(settings);
        self.state = SessionState::Configured;
        tracing::debug!(
            "Session configured for {}x{} preview",
            settings.width,
            settings.height
        );
        Ok(())
    }

    pub fn start_preview(&mut self) -> Result<(), SessionError> {
        self.expect_state("start preview", &[SessionState::Configured])?;

        if let Err(e) = self.device.set_repeating(true) {
            return Err(self.fail(e));
        }
        self.state = SessionState::Previewing;
        Ok(())
    }

    /// Stop the preview, take one still, resume the preview
    pub fn capture(&mut self) -> Result<Frame, SessionError> {
        self.expect_state("capture", &[SessionState::Previewing])?;
        self.state = SessionState::Capturing;

        let frame = match self
            .device
            .set_repeating(false)
            .and_then(|_| self.device.capture_still())
        {
            Ok(frame) => frame,
            Err(e) => return Err(self.fail(e)),
        };

        if let Err(e) = self.device.set_repeating(true) {
            return Err(self.fail(e));
        }
        self.state = SessionState::Previewing;

        tracing::debug!(
            "Captured {}x{} frame from {}",
            frame.width(),
            frame.height(),
            self.device.name()
        );
        Ok(frame)
    }

    /// Idempotent; also runs on drop
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if matches!(
            self.state,
            SessionState::Previewing | SessionState::Capturing
        ) {
            if let Err(e) = self.device.set_repeating(false) {
                tracing::warn!("Failed to stop preview on {}: {}", self.device.name(), e);
            }
        }
        self.device.close();
        self.state = SessionState::Closed;
        tracing::info!("Capture session closed: {}", self.device.name());
    }

    fn fail(&mut self, error: DeviceError) -> SessionError {
        tracing::error!("Capture device {} failed: {}", self.device.name(), error);
        self.close();
        SessionError::Device(error)
    }

    fn expect_state(
        &self,
        action: &'static str,
        allowed: &[SessionState],
    ) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                action,
                state: self.state,
            })
        }
    }
}

impl<D: CaptureDevice> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        self.close();
    }
}
