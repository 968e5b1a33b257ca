//! Configuration persistence for mregion settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::Rgba;

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Polygon-close snap radius in view (screen) pixels
    #[serde(default = "default_snap_radius_px")]
    pub snap_radius_px: f64,
    /// Vertex handle hit radius in view (screen) pixels
    #[serde(default = "default_handle_radius_px")]
    pub handle_radius_px: f64,
    /// Label present in every new session
    #[serde(default = "default_label")]
    pub default_label: String,
    /// Colour of the default label
    #[serde(default)]
    pub default_label_color: Rgba,
    /// Units offered by the scale dialog
    #[serde(default = "default_scale_units")]
    pub scale_units: Vec<String>,
    /// Longest side of the display preview
    #[serde(default = "default_preview_max_side")]
    pub preview_max_side: u32,
    /// Whether drawing tools need an open image
    #[serde(default = "default_require_image")]
    pub require_image: bool,
}

fn default_snap_radius_px() -> f64 {
    10.0
}

fn default_handle_radius_px() -> f64 {
    5.0
}

fn default_label() -> String {
    "object".to_string()
}

fn default_scale_units() -> Vec<String> {
    ["cm", "mm", "um", "nm"].map(String::from).to_vec()
}

fn default_preview_max_side() -> u32 {
    4096
}

fn default_require_image() -> bool {
    true
}

impl AppConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "mregion";

    /// Location of the config file, if the platform has a config dir
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from an explicit path, falling back to defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Could not read config {}: {:?}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match Self::path() {
            Some(path) => {
                if let Err(err) = self.save_to(&path) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            None => log::error!("Could not locate config directory for saving"),
        }
    }

    /// Save to an explicit path, creating parent directories
    pub fn save_to(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snap_radius_px: default_snap_radius_px(),
            handle_radius_px: default_handle_radius_px(),
            default_label: default_label(),
            default_label_color: Rgba::default(),
            scale_units: default_scale_units(),
            preview_max_side: default_preview_max_side(),
            require_image: default_require_image(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"snap_radius_px": 14.0}"#).unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.snap_radius_px, 14.0);
        assert_eq!(config.default_label, "object");
        assert_eq!(config.scale_units, ["cm", "mm", "um", "nm"]);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            require_image: false,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), config);
    }
}
