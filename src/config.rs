use crate::error::ConfigError;
use crate::palette::DEFAULT_PALETTE_SIZE;
use crate::settings::FireSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory name used under the platform config dir
pub const APP_DIR: &str = "doom-fire";

/// Complete application configuration for export/import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Fire simulation parameters
    pub settings: FireSettings,
    /// Number of palette entries
    pub palette_size: usize,
    /// Frames per second the viewer aims for
    pub target_fps: u32,
    /// Terminal pixels per simulation cell along each axis
    pub downscale: u16,
    /// Colorize through the fire palette instead of grayscale
    pub use_palette: bool,
}

impl AppConfig {
    /// Default config file location, `<config_dir>/doom-fire/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.json"))
    }

    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Import config from a JSON file, rejecting invalid fire parameters
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.settings.validate()?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            settings: FireSettings::default(),
            palette_size: DEFAULT_PALETTE_SIZE,
            target_fps: 30,
            downscale: 1,
            use_palette: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FireError;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig {
            version: 1,
            settings: FireSettings {
                fade_speed: 1.75,
                spread: 2.0,
                wind: -0.5,
                precision_bits: 32,
                fire_active: false,
            },
            palette_size: 64,
            target_fps: 60,
            downscale: 2,
            use_palette: false,
        };

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig::default();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.version, config.version);
        assert_eq!(loaded.settings, config.settings);
        assert_eq!(loaded.palette_size, DEFAULT_PALETTE_SIZE);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let json = r#"{"target_fps": 12, "settings": {"spread": 3.0}}"#;
        std::fs::write(temp_file.path(), json).unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.target_fps, 12);
        assert_eq!(loaded.settings.spread, 3.0);
        assert_eq!(loaded.settings.fade_speed, 4.5);
        assert!(loaded.use_palette);
    }

    #[test]
    fn test_out_of_range_settings_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), r#"{"settings": {"precision_bits": 99}}"#).unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(
            result,
            Err(ConfigError::Fire(FireError::InvalidPrecision(99)))
        ));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
