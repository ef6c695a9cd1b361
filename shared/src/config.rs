use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Startup options read from JSON. Dim and tint values are never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Let screenshots and screen recordings see the overlays.
    #[serde(default)]
    pub allow_capture: bool,
    #[serde(default)]
    pub debug_logging: bool,
}

pub fn config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("dimtint").join("config.json")
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    try_load_config_from(path).unwrap_or_else(|err| {
        warn!("{err:#}, using defaults");
        AppConfig::default()
    })
}

/// Like [`load_config_from`], but hands a read or parse failure back to the
/// caller. A missing file is not a failure.
pub fn try_load_config_from(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid config {}", path.display()))
}
