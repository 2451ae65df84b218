use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::capture::CaptureConfig;
use self::ocr::OcrConfig;
use self::overlay::OverlayConfig;

pub mod capture;
pub mod ocr;
pub mod overlay;

#[derive(Default, Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub overlay: OverlayConfig,
    pub capture: CaptureConfig,
}

impl Config {
    /// Defaults overridden by `TEXTSNAP_*` environment variables
    pub fn new() -> Self {
        Config {
            ocr: OcrConfig::new(),
            overlay: OverlayConfig::new(),
            capture: CaptureConfig::new(),
        }
    }

    /// Apply a single `section.field = value` update coming from the user.
    ///
    /// Returns an error message if the field is unknown or the value does not parse.
    pub fn update_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        fn parse<T: FromStr>(field: &str, value: &str) -> Result<T, String> {
            value
                .trim()
                .parse()
                .map_err(|_| format!("invalid value for {field}: '{value}'"))
        }

        match field {
            "ocr.threshold" => self.ocr.threshold = parse(field, value)?,
            "ocr.luma_rounding" => self.ocr.luma_rounding = parse(field, value)?,
            "ocr.language" => self.ocr.language = value.trim().to_string(),
            "ocr.orientation" => self.ocr.orientation = parse(field, value)?,
            "ocr.timeout_ms" => self.ocr.timeout_ms = parse(field, value)?,
            "overlay.mode" => self.overlay.mode = parse(field, value)?,
            "overlay.band_fraction" => {
                let fraction: f32 = parse(field, value)?;
                if !(0.0..=1.0).contains(&fraction) {
                    return Err(format!("{field} must be within 0.0..=1.0"));
                }
                self.overlay.band_fraction = fraction;
            }
            _ => return Err(format!("unknown config field: {field}")),
        }
        Ok(())
    }
}

/// Read and parse an environment variable, falling back to `default` when unset or malformed
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::LumaRounding;
    use crate::overlay::RegionMode;

    #[test]
    fn defaults_match_reference_pipeline() {
        let config = Config::default();
        assert_eq!(config.ocr.threshold, 128);
        assert_eq!(config.ocr.orientation, 0);
        assert_eq!(config.ocr.luma_rounding, LumaRounding::Round);
        assert_eq!(config.overlay.mode, RegionMode::Band);
        assert!((config.overlay.band_fraction - 0.25).abs() < f32::EPSILON);
        assert_eq!(
            (config.capture.preview_width, config.capture.preview_height),
            (1920, 1080)
        );
    }

    #[test]
    fn update_field_parses_known_fields() {
        let mut config = Config::default();
        config.update_field("ocr.threshold", "140").unwrap();
        config.update_field("overlay.mode", "selection").unwrap();
        config.update_field("ocr.luma_rounding", "truncate").unwrap();

        assert_eq!(config.ocr.threshold, 140);
        assert_eq!(config.overlay.mode, RegionMode::Selection);
        assert_eq!(config.ocr.luma_rounding, LumaRounding::Truncate);
    }

    #[test]
    fn update_field_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.update_field("ocr.threshold", "300").is_err());
        assert!(config.update_field("overlay.band_fraction", "1.5").is_err());
        assert!(config.update_field("nope", "1").is_err());
        assert_eq!(config.ocr.threshold, 128);
    }

    #[test]
    fn env_or_falls_back_on_missing_key() {
        let value: u32 = env_or("TEXTSNAP_TEST_KEY_THAT_IS_NEVER_SET", 7);
        assert_eq!(value, 7);
    }
}
