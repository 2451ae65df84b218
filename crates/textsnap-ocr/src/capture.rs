use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use textsnap_core::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Requested preview stream size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to open capture source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode capture source {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Device is not open")]
    NotOpen,

    #[error("{0}")]
    Other(String),
}

/// Blocking camera-like source of still frames.
///
/// Call from a blocking context; [`crate::CaptureSession`] drives the calls in order.
pub trait CaptureDevice: Send {
    fn name(&self) -> &str;

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn open(&mut self) -> Result<(), DeviceError>;

    fn configure(&mut self, settings: PreviewSettings) -> Result<(), DeviceError>;

    /// Start or stop the repeating preview stream
    fn set_repeating(&mut self, enabled: bool) -> Result<(), DeviceError>;

    fn capture_still(&mut self) -> Result<Frame, DeviceError>;

    fn close(&mut self);
}

impl<D: CaptureDevice + ?Sized> CaptureDevice for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn permission(&self) -> Permission {
        (**self).permission()
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        (**self).open()
    }

    fn configure(&mut self, settings: PreviewSettings) -> Result<(), DeviceError> {
        (**self).configure(settings)
    }

    fn set_repeating(&mut self, enabled: bool) -> Result<(), DeviceError> {
        (**self).set_repeating(enabled)
    }

    fn capture_still(&mut self) -> Result<Frame, DeviceError> {
        (**self).capture_still()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Serves the image file at `path`, decoded fresh on every still capture
pub struct ImageFileDevice {
    path: PathBuf,
    name: String,
    is_open: bool,
    settings: Option<PreviewSettings>,
}

impl ImageFileDevice {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("file:{}", path.display());
        Self {
            path,
            name,
            is_open: false,
            settings: None,
        }
    }
}

impl CaptureDevice for ImageFileDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn permission(&self) -> Permission {
        match File::open(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Permission::Denied,
            _ => Permission::Granted,
        }
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        File::open(&self.path).map_err(|source| DeviceError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.is_open = true;
        Ok(())
    }

    fn configure(&mut self, settings: PreviewSettings) -> Result<(), DeviceError> {
        if !self.is_open {
            return Err(DeviceError::NotOpen);
        }
        self.settings = Some(settings);
        Ok(())
    }

    fn set_repeating(&mut self, _enabled: bool) -> Result<(), DeviceError> {
        if !self.is_open {
            return Err(DeviceError::NotOpen);
        }
        Ok(())
    }

    fn capture_still(&mut self) -> Result<Frame, DeviceError> {
        if !self.is_open {
            return Err(DeviceError::NotOpen);
        }

        let image = image::open(&self.path).map_err(|source| DeviceError::Decode {
            path: self.path.clone(),
            source,
        })?;
        let frame = Frame::from_dynamic(&image);

        let preview = self.settings.map(|s| (s.width, s.height));
        if let Some((width, height)) = preview.filter(|size| *size != frame.dimensions()) {
            tracing::debug!(
                "Captured {}x{} from {}, preview configured for {}x{}",
                frame.width(),
                frame.height(),
                self.path.display(),
                width,
                height
            );
        }
        Ok(frame)
    }

    fn close(&mut self) {
        self.is_open = false;
    }
}

/// Hands out clones of one in-memory frame
pub struct StaticDevice {
    frame: Frame,
    is_open: bool,
}

impl StaticDevice {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            is_open: false,
        }
    }
}

impl CaptureDevice for StaticDevice {
    fn name(&self) -> &str {
        "static"
    }

    fn open(&mut self) -> Result<(), DeviceError> {
        self.is_open = true;
        Ok(())
    }

    fn configure(&mut self, _settings: PreviewSettings) -> Result<(), DeviceError> {
        Ok(())
    }

    fn set_repeating(&mut self, _enabled: bool) -> Result<(), DeviceError> {
        Ok(())
    }

    fn capture_still(&mut self) -> Result<Frame, DeviceError> {
        if !self.is_open {
            return Err(DeviceError::NotOpen);
        }
        Ok(self.frame.clone())
    }

    fn close(&mut self) {
        self.is_open = false;
    }
}
