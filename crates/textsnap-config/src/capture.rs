use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::env_or;

fn default_preview_width() -> u32 {
    1920
}

fn default_preview_height() -> u32 {
    1080
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CaptureConfig {
    /// Image file served as the capture device
    pub source: Option<PathBuf>,
    #[serde(default = "default_preview_width")]
    pub preview_width: u32,
    #[serde(default = "default_preview_height")]
    pub preview_height: u32,
}

impl CaptureConfig {
    pub fn new() -> Self {
        let defaults = Self::default();
        Self {
            source: env::var_os("TEXTSNAP_SOURCE").map(PathBuf::from),
            preview_width: env_or("TEXTSNAP_PREVIEW_WIDTH", defaults.preview_width),
            preview_height: env_or("TEXTSNAP_PREVIEW_HEIGHT", defaults.preview_height),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: None,
            preview_width: default_preview_width(),
            preview_height: default_preview_height(),
        }
    }
}
