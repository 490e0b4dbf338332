use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoiceError};
use crate::types::SessionConfig;

/// Top-level configuration for the voicefeed widget.
///
/// Loaded from `~/.voicefeed/config.toml` by default. Every section is
/// optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceFeedConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub widget: WidgetSettings,
}

impl VoiceFeedConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoiceFeedConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VoiceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Raise a host-level alert for unsupported-platform errors when no
    /// error handler is registered. When false the error is only logged.
    pub alert_when_unhandled: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            alert_when_unhandled: true,
        }
    }
}

/// Recognition session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// BCP 47 language tag. Empty means "use the platform locale".
    pub language: String,
    /// Keep listening after each result until stopped.
    pub continuous: bool,
    /// Stop automatically after the first final result (single-shot only).
    pub auto_stop: bool,
    /// Delay in milliseconds between a result and the automatic stop.
    pub auto_stop_delay_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            language: String::new(),
            continuous: false,
            auto_stop: true,
            auto_stop_delay_ms: 100,
        }
    }
}

impl SessionSettings {
    /// Build the runtime session configuration.
    pub fn to_session_config(&self) -> SessionConfig {
        let language = match self.language.trim() {
            "" => None,
            lang => Some(lang.to_string()),
        };
        SessionConfig {
            language,
            continuous: self.continuous,
            auto_stop: self.auto_stop,
            auto_stop_delay: Duration::from_millis(self.auto_stop_delay_ms),
        }
    }
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    /// Render the latest transcript below the button.
    pub show_transcript: bool,
    /// Custom button label while idle. Localized default when unset.
    pub start_label: Option<String>,
    /// Custom button label while listening. Localized default when unset.
    pub stop_label: Option<String>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            show_transcript: true,
            start_label: None,
            stop_label: None,
        }
    }
}
