use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use textsnap_config::Config;

/// Profile picked up from the working directory when none is given
pub const DEFAULT_PROFILE: &str = "textsnap.json";

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Load a profile file
pub fn load_profile(path: &Path) -> anyhow::Result<Profile> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let profile = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse profile {}", path.display()))?;
    Ok(profile)
}

/// Write a profile holding the current defaults (env overrides included)
pub fn write_default_profile(path: &Path, name: &str) -> anyhow::Result<PathBuf> {
    let profile = Profile {
        name: name.into(),
        value: Config::new(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&profile)?)?;
    tracing::info!("Created profile {name} at {}", path.display());
    Ok(path.to_path_buf())
}

/// Explicit profile, else `textsnap.json` in the working directory, else env defaults
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        let profile = load_profile(path)?;
        tracing::info!("Using profile {} from {}", profile.name, path.display());
        return Ok(profile.value);
    }

    let default_path = Path::new(DEFAULT_PROFILE);
    if default_path.exists() {
        let profile = load_profile(default_path)?;
        tracing::info!("Using profile {} from {}", profile.name, DEFAULT_PROFILE);
        Ok(profile.value)
    } else {
        tracing::debug!("No profile found, using environment defaults");
        Ok(Config::new())
    }
}
