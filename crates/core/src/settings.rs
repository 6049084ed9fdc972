use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Used when `location_match_radius` is unset or unusable.
pub const DEFAULT_MATCH_RADIUS_MILES: f64 = 0.2;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk shape of `settings.toml`. Everything is optional.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    database_path: Option<PathBuf>,
    receipts_storage_folder: Option<PathBuf>,
    import_folder: Option<PathBuf>,
    // Kept loose so a quoted or garbage value falls back instead of failing the load.
    location_match_radius: Option<toml::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub receipts_storage_folder: PathBuf,
    pub import_folder: Option<PathBuf>,
    pub location_match_radius: f64,
}

impl Settings {
    /// Defaults rooted at the application data directory.
    pub fn defaults(data_dir: &Path) -> Self {
        Settings {
            database_path: data_dir.join("tally.db"),
            receipts_storage_folder: data_dir.join("receipts"),
            import_folder: None,
            location_match_radius: DEFAULT_MATCH_RADIUS_MILES,
        }
    }

    /// Load `path`, or fall back to defaults if it does not exist.
    pub fn load(path: &Path, data_dir: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::defaults(data_dir));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, data_dir)
    }

    pub fn from_toml_str(text: &str, data_dir: &Path) -> Result<Self, SettingsError> {
        let raw: RawSettings = toml::from_str(text)?;
        let defaults = Self::defaults(data_dir);

        Ok(Settings {
            database_path: raw.database_path.unwrap_or(defaults.database_path),
            receipts_storage_folder: raw
                .receipts_storage_folder
                .unwrap_or(defaults.receipts_storage_folder),
            import_folder: raw.import_folder,
            location_match_radius: raw
                .location_match_radius
                .as_ref()
                .map(match_radius_from_value)
                .unwrap_or(DEFAULT_MATCH_RADIUS_MILES),
        })
    }
}

fn match_radius_from_value(value: &toml::Value) -> f64 {
    let parsed = match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(r) if r.is_finite() && r >= 0.0 => r,
        _ => {
            tracing::warn!(
                "Ignoring location_match_radius = {value}; using {DEFAULT_MATCH_RADIUS_MILES} miles"
            );
            DEFAULT_MATCH_RADIUS_MILES
        }
    }
}
