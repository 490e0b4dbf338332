//! CLI argument definitions for the voicefeed console demo.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use voicefeed_core::config::VoiceFeedConfig;

/// voicefeed — dictate text through a speech-recognition engine.
#[derive(Parser, Debug)]
#[command(name = "voicefeed", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Recognition language (BCP 47), e.g. "tr-TR".
    #[arg(short = 'L', long = "language")]
    pub language: Option<String>,

    /// Keep listening after each result until stopped.
    #[arg(long = "continuous")]
    pub continuous: bool,

    /// Do not stop automatically after the first result.
    #[arg(long = "no-auto-stop")]
    pub no_auto_stop: bool,

    /// Delay in milliseconds before the automatic stop.
    #[arg(long = "auto-stop-delay-ms")]
    pub auto_stop_delay_ms: Option<u64>,

    /// Hide the transcript line.
    #[arg(long = "hide-transcript")]
    pub hide_transcript: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Simulate a host without speech recognition.
    #[arg(long = "unsupported")]
    pub unsupported: bool,

    /// Platform locale reported by the simulated host.
    #[arg(long = "locale", env = "LANG")]
    pub locale: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VOICEFEED_CONFIG env var > ~/.voicefeed/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("VOICEFEED_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config: &VoiceFeedConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }

    /// Fold CLI overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut VoiceFeedConfig) {
        if let Some(ref lang) = self.language {
            config.session.language = lang.clone();
        }
        if self.continuous {
            config.session.continuous = true;
        }
        if self.no_auto_stop {
            config.session.auto_stop = false;
        }
        if let Some(ms) = self.auto_stop_delay_ms {
            config.session.auto_stop_delay_ms = ms;
        }
        if self.hide_transcript {
            config.widget.show_transcript = false;
        }
    }

    /// Platform locale as a language tag: `tr_TR.UTF-8` becomes `tr-TR`.
    pub fn platform_locale(&self) -> Option<String> {
        let raw = self.locale.as_deref()?;
        let tag = raw.split('.').next().unwrap_or(raw).replace('_', "-");
        match tag.as_str() {
            "" | "C" | "POSIX" => None,
            _ => Some(tag),
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".voicefeed").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".voicefeed").join("config.toml");
    }
    PathBuf::from("config.toml")
}
