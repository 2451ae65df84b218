use std::str::FromStr;

use serde::{Deserialize, Serialize};
use textsnap_types::Region;

use crate::env_or;

fn default_band_fraction() -> f32 {
    0.25
}

fn default_surface_width() -> u32 {
    1920
}

fn default_surface_height() -> u32 {
    1080
}

/// Where the crop region for the next capture comes from
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegionMode {
    /// Full-width band centered vertically on the surface
    #[default]
    Band,
    /// Rectangle dragged by the user
    Selection,
    /// `fixed_region` from the config
    Fixed,
}

impl FromStr for RegionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "band" => Ok(Self::Band),
            "selection" | "select" => Ok(Self::Selection),
            "fixed" => Ok(Self::Fixed),
            other => Err(format!("unknown region mode: {other}")),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct OverlayConfig {
    pub mode: RegionMode,
    /// Band height as a fraction of the surface height
    #[serde(default = "default_band_fraction")]
    pub band_fraction: f32,
    /// Size of the preview surface regions are drawn on
    #[serde(default = "default_surface_width")]
    pub surface_width: u32,
    #[serde(default = "default_surface_height")]
    pub surface_height: u32,
    pub fixed_region: Option<Region>,
}

impl OverlayConfig {
    pub fn new() -> Self {
        let defaults = Self::default();
        Self {
            mode: env_or("TEXTSNAP_REGION_MODE", defaults.mode),
            band_fraction: env_or("TEXTSNAP_BAND_FRACTION", defaults.band_fraction),
            surface_width: env_or("TEXTSNAP_SURFACE_WIDTH", defaults.surface_width),
            surface_height: env_or("TEXTSNAP_SURFACE_HEIGHT", defaults.surface_height),
            fixed_region: defaults.fixed_region,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            mode: RegionMode::default(),
            band_fraction: default_band_fraction(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
            fixed_region: None,
        }
    }
}
