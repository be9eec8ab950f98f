use crate::speech::catalog::CollapsePolicy;
use crate::speech::speed::SpeedProfile;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted user preferences.
///
/// Read once at startup; the caller writes it back when the user picks a
/// voice or speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Speech
    pub voice_name: Option<String>,
    pub voice_speed: String,
    pub speak_in_parts: bool,
    pub auto_speak: bool,
    pub collapse: CollapsePolicy,

    // Meta
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            voice_name: None,
            voice_speed: SpeedProfile::DEFAULT.label.to_string(),
            speak_in_parts: true,
            auto_speak: true,
            collapse: CollapsePolicy::default(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                // Graceful degradation: log warning and use defaults
                tracing::warn!("⚠️ Settings file corrupted or invalid, using defaults: {}", e);
                // Backup corrupt file for debugging
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The stored speed preset, or the default when the label is unknown
    pub fn speed(&self) -> SpeedProfile {
        SpeedProfile::by_label(&self.voice_speed).unwrap_or_default()
    }

    pub fn set_speed(&mut self, speed: &SpeedProfile) {
        self.voice_speed = speed.label.to_string();
    }
}

pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tuxreader")
        .join("settings.json")
}
