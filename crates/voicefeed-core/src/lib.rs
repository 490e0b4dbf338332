//! Shared types for voicefeed: session model, error taxonomy, configuration,
//! domain events and localized strings.

pub mod config;
pub mod error;
pub mod events;
pub mod locale;
pub mod types;

pub use config::VoiceFeedConfig;
pub use error::{Result, VoiceError};
pub use events::SessionEvent;
pub use locale::UiLanguage;
pub use types::*;
