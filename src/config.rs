use crate::chat::client::{ClientSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::chat::log::DEFAULT_LOG_CAPACITY;
use crate::chat::typewriter::DEFAULT_CHAR_DELAY_MS;
use crate::effects::particles::DEFAULT_PARTICLE_COUNT;
use crate::effects::{Capabilities, EffectOptions};
use crate::page::controller::{ControllerOptions, DEFAULT_ACTIVATION_FADE_MS, DEFAULT_FADE_MS};
use crate::styles::ThemeType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote chat completion settings
    pub chat: ChatConfig,
    /// Fade and reveal timings
    pub timing: TimingConfig,
    /// Effect toggles and density
    pub effects: EffectsConfig,
    /// System log settings
    pub log: LogConfig,
    /// Color theme
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    /// API key; `GEMINI_API_KEY` is used when unset
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Page fade duration (ms)
    pub fade_ms: u64,
    /// Splash dismissal duration (ms)
    pub activation_fade_ms: u64,
    /// Typewriter delay per character (ms)
    pub typewriter_ms: u64,
    /// Render and simulation frame interval (ms)
    pub frame_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_ms: DEFAULT_FADE_MS,
            activation_fade_ms: DEFAULT_ACTIVATION_FADE_MS,
            typewriter_ms: DEFAULT_CHAR_DELAY_MS,
            frame_ms: 33,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub audio: bool,
    pub flocking: bool,
    pub particles: bool,
    pub scroll_scaling: bool,
    /// Flock quantity behind the hub
    pub home_flock_quantity: u16,
    /// Flock quantity on the visualizer page
    pub visualizer_flock_quantity: u16,
    pub particle_count: usize,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            audio: true,
            flocking: true,
            particles: true,
            scroll_scaling: true,
            home_flock_quantity: 3,
            visualizer_flock_quantity: 15,
            particle_count: DEFAULT_PARTICLE_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Entries kept in the on-screen system log
    pub max_entries: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_LOG_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: ThemeType,
}

impl Config {
    /// Load configuration from file, writing defaults if it does not exist
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config =
                toml::from_str(&content).with_context(|| "Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file with secure permissions
    pub fn save(&self, config_path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        // The file may hold an API key (600: owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(config_path)
                .with_context(|| format!("Failed to get file metadata: {:?}", config_path))?
                .permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(config_path, perms)
                .with_context(|| format!("Failed to set file permissions: {:?}", config_path))?;
        }

        Ok(())
    }

    /// API key from the file, falling back to the environment
    pub fn api_key(&self) -> Option<String> {
        self.chat
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.chat.endpoint.clone(),
            model: self.chat.model.clone(),
            api_key: self.api_key(),
            timeout: Duration::from_secs(self.chat.timeout_secs.max(1)),
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            fade_ms: self.timing.fade_ms,
            activation_fade_ms: self.timing.activation_fade_ms,
            effects: EffectOptions {
                capabilities: Capabilities {
                    audio: self.effects.audio,
                    flocking: self.effects.flocking,
                    particles: self.effects.particles,
                    scroll_trigger: self.effects.scroll_scaling,
                },
                flock_low: self.effects.home_flock_quantity,
                flock_high: self.effects.visualizer_flock_quantity,
                particle_count: self.effects.particle_count,
            },
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.effects.home_flock_quantity, 3);
        assert_eq!(config.effects.visualizer_flock_quantity, 15);
        assert_eq!(config.log.max_entries, 20);
        assert_eq!(config.timing.typewriter_ms, 30);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.timing.fade_ms = 250;
        config.effects.audio = false;
        config.save(&config_path).unwrap();

        let loaded = Config::load_or_create(&config_path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_missing_file_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let config = Config::load_or_create(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert!(config_path.exists());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[timing]\nfade_ms = 100\n").unwrap();

        let config = Config::load_or_create(&config_path).unwrap();
        assert_eq!(config.timing.fade_ms, 100);
        assert_eq!(config.timing.activation_fade_ms, DEFAULT_ACTIVATION_FADE_MS);
        assert_eq!(config.chat.model, DEFAULT_MODEL);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        Config::default().save(&config_path).unwrap();
        let mode = std::fs::metadata(&config_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_controller_options_follow_config() {
        let mut config = Config::default();
        config.effects.flocking = false;
        config.effects.visualizer_flock_quantity = 9;
        let options = config.controller_options();
        assert!(!options.effects.capabilities.flocking);
        assert_eq!(options.effects.flock_high, 9);
    }
}
