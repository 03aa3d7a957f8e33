use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::settings::LabSettings;
use crate::error::LabResult;

pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("narrative-lab");
    path
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn templates_dir() -> PathBuf {
    config_dir().join("templates")
}

/// Reads settings, falling back to defaults when the file is missing or
/// unreadable.
pub fn load_settings(path: &Path) -> LabSettings {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|err| {
            log::warn!("ignoring invalid settings in {}: {err}", path.display());
            LabSettings::default()
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::debug!("no settings at {}, using defaults", path.display());
            LabSettings::default()
        }
        Err(err) => {
            log::warn!("could not read {}: {err}", path.display());
            LabSettings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &LabSettings) -> LabResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
