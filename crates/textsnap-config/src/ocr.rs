use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::env_or;

fn default_enabled() -> bool {
    true
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_tesseract_path() -> String {
    "tesseract".to_string()
}

fn default_threshold() -> u8 {
    128
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// How the weighted luminance sum is converted back to an 8-bit value
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LumaRounding {
    /// Nearest integer; pure white stays 255
    #[default]
    Round,
    /// Drop the fraction; pure white becomes 254
    Truncate,
}

impl FromStr for LumaRounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" => Ok(Self::Round),
            "truncate" | "trunc" => Ok(Self::Truncate),
            other => Err(format!("unknown luma rounding: {other}")),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Tesseract language code (e.g. "eng", "spa")
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,
    /// Luminance strictly above this becomes white
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    pub luma_rounding: LumaRounding,
    /// Rotation hint handed to the recognizer, in degrees
    pub orientation: u16,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl OcrConfig {
    pub fn new() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("TEXTSNAP_OCR_ENABLED", defaults.enabled),
            language: env_or("TEXTSNAP_LANGUAGE", defaults.language),
            tesseract_path: env_or("TEXTSNAP_TESSERACT", defaults.tesseract_path),
            threshold: env_or("TEXTSNAP_THRESHOLD", defaults.threshold),
            luma_rounding: env_or("TEXTSNAP_LUMA_ROUNDING", defaults.luma_rounding),
            orientation: env_or("TEXTSNAP_ORIENTATION", defaults.orientation),
            timeout_ms: env_or("TEXTSNAP_OCR_TIMEOUT_MS", defaults.timeout_ms),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            language: default_language(),
            tesseract_path: default_tesseract_path(),
            threshold: default_threshold(),
            luma_rounding: LumaRounding::default(),
            orientation: 0,
            timeout_ms: default_timeout_ms(),
        }
    }
}
