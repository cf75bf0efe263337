use crate::config::APP_DIR;
use crate::error::ConfigError;
use crate::settings::FireSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A named bundle of fire settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub settings: FireSettings,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        settings: FireSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            settings,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-in presets plus any user presets in the platform config dir
    pub fn new() -> Self {
        Self::with_dir(Self::default_dir())
    }

    /// Built-in presets plus user presets stored in `dir` (none if `None`)
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Get the presets directory path
    fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("presets"))
    }

    /// Load user presets from disk, skipping unreadable files
    fn load_user_presets(&mut self) {
        let Some(dir) = self.dir.as_deref() else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match read_preset(&path) {
                Ok(preset) => {
                    debug!(name = %preset.name, "loaded user preset");
                    self.user.push(preset);
                }
                Err(err) => warn!(path = %path.display(), %err, "skipping user preset"),
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Save a preset to disk, replacing a user preset of the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<(), ConfigError> {
        preset.settings.validate()?;
        let dir = self.dir.as_deref().ok_or(ConfigError::NoConfigDir)?;
        fs::create_dir_all(dir)?;

        let path = preset_path(dir, &preset.name);
        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json)?;

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(())
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let dir = self.dir.as_deref().ok_or(ConfigError::NoConfigDir)?;

        if let Some(pos) = self.user.iter().position(|p| p.name == name) {
            self.user.remove(pos);
        }

        let path = preset_path(dir, name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.builtin.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Preset at `index`, wrapping around the combined list
    pub fn cycle(&self, index: usize) -> Option<&Preset> {
        if self.is_empty() {
            return None;
        }
        self.all_presets().nth(index % self.len())
    }
}

fn read_preset(path: &Path) -> Result<Preset, ConfigError> {
    let content = fs::read_to_string(path)?;
    let preset: Preset = serde_json::from_str(&content)?;
    preset.settings.validate()?;
    Ok(preset)
}

/// File path for a preset name, with unsafe characters replaced
fn preset_path(dir: &Path, name: &str) -> PathBuf {
    let filename = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect::<String>();
    dir.join(format!("{}.json", filename))
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        // Classic - default settings
        Preset::new("Classic", "Steady flames with gentle flicker", FireSettings::default()),
        Preset::new(
            "Inferno",
            "Tall, slow-fading blaze",
            FireSettings {
                fade_speed: 1.75,
                spread: 2.0,
                ..Default::default()
            },
        ),
        Preset::new(
            "Embers",
            "Low glowing bed of coals",
            FireSettings {
                fade_speed: 12.0,
                spread: 1.0,
                ..Default::default()
            },
        ),
        Preset::new(
            "Windy",
            "Flames leaning to the right",
            FireSettings {
                fade_speed: 3.0,
                spread: 1.5,
                wind: 0.6,
                ..Default::default()
            },
        ),
        Preset::new(
            "Gale",
            "Strong wind tearing flames sideways",
            FireSettings {
                fade_speed: 3.5,
                spread: 2.0,
                wind: -1.5,
                ..Default::default()
            },
        ),
        // Few random bits give blocky, banded flames
        Preset::new(
            "Coarse",
            "Low-entropy draws with visible banding",
            FireSettings {
                precision_bits: 2,
                ..Default::default()
            },
        ),
        Preset::new(
            "Frozen",
            "No randomness: heat rises straight up without fading",
            FireSettings {
                precision_bits: 0,
                ..Default::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_presets_are_valid() {
        let manager = PresetManager::with_dir(None);
        assert!(manager.len() >= 7);
        for preset in manager.all_presets() {
            assert!(preset.settings.validate().is_ok(), "{}", preset.name);
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let manager = PresetManager::with_dir(None);
        assert_eq!(manager.find("inferno").unwrap().name, "Inferno");
        assert!(manager.find("missing").is_none());
    }

    #[test]
    fn test_save_load_and_delete_user_preset() {
        let dir = tempdir().unwrap();
        let mut manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        let builtin_count = manager.len();

        let preset = Preset::new(
            "My Fire/1",
            "test",
            FireSettings {
                wind: 2.0,
                ..Default::default()
            },
        );
        manager.save_preset(preset.clone()).unwrap();
        assert!(dir.path().join("My_Fire_1.json").exists());
        assert_eq!(manager.len(), builtin_count + 1);

        // Saving again replaces rather than duplicates
        manager.save_preset(preset.clone()).unwrap();
        assert_eq!(manager.len(), builtin_count + 1);

        let reloaded = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert_eq!(reloaded.find("my fire/1"), Some(&preset));

        manager.delete_preset("My Fire/1").unwrap();
        assert!(!dir.path().join("My_Fire_1.json").exists());
        assert_eq!(manager.len(), builtin_count);
    }

    #[test]
    fn test_bad_user_presets_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        fs::write(
            dir.path().join("bad_bits.json"),
            r#"{"name": "Bad", "description": "", "settings": {"precision_bits": 80}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let manager = PresetManager::with_dir(Some(dir.path().to_path_buf()));
        assert!(manager.user.is_empty());
    }

    #[test]
    fn test_save_without_dir_fails() {
        let mut manager = PresetManager::with_dir(None);
        let result = manager.save_preset(Preset::new("x", "", FireSettings::default()));
        assert!(matches!(result, Err(ConfigError::NoConfigDir)));
    }

    #[test]
    fn test_cycle_wraps() {
        let manager = PresetManager::with_dir(None);
        let n = manager.len();
        assert_eq!(manager.cycle(0).unwrap().name, "Classic");
        assert_eq!(manager.cycle(n).unwrap().name, "Classic");
        assert_eq!(manager.cycle(1).unwrap().name, manager.preset_names()[1]);
    }
}
