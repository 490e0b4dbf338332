use thiserror::Error;

use crate::types::{EngineErrorCode, SessionState};

/// Top-level error type for voicefeed.
///
/// Session failures (`UnsupportedPlatform`, `Recognition`) are never returned
/// from the controller's public operations. They are handed to the owner's
/// error handler, or to the fallback when no handler is registered.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum VoiceError {
    /// The host offers no speech-recognition capability.
    #[error("{0}")]
    UnsupportedPlatform(String),

    /// The recognition engine reported a runtime failure.
    #[error("{message}")]
    Recognition {
        code: EngineErrorCode,
        message: String,
    },

    /// A lifecycle operation was requested from a state that does not allow it.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: SessionState, to: SessionState },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl VoiceError {
    /// Wrap an engine error code into a recognition error with the standard message.
    pub fn recognition(code: EngineErrorCode) -> Self {
        let message = format!("Speech recognition error: {}", code);
        VoiceError::Recognition { code, message }
    }
}

impl From<std::io::Error> for VoiceError {
    fn from(err: std::io::Error) -> Self {
        VoiceError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for VoiceError {
    fn from(err: toml::de::Error) -> Self {
        VoiceError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoiceError {
    fn from(err: toml::ser::Error) -> Self {
        VoiceError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VoiceError {
    fn from(err: serde_json::Error) -> Self {
        VoiceError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for voicefeed operations.
pub type Result<T> = std::result::Result<T, VoiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_message() {
        let err = VoiceError::recognition(EngineErrorCode::NoSpeech);
        assert_eq!(err.to_string(), "Speech recognition error: no-speech");
        match err {
            VoiceError::Recognition { code, .. } => assert_eq!(code, EngineErrorCode::NoSpeech),
            _ => panic!("Expected Recognition variant"),
        }
    }

    #[test]
    fn test_recognition_message_other_code() {
        let err = VoiceError::recognition(EngineErrorCode::Other("phonemes".to_string()));
        assert_eq!(err.to_string(), "Speech recognition error: phonemes");
    }

    #[test]
    fn test_unsupported_platform_displays_message_verbatim() {
        let err = VoiceError::UnsupportedPlatform("no engine".to_string());
        assert_eq!(err.to_string(), "no engine");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = VoiceError::InvalidStateTransition {
            from: SessionState::Idle,
            to: SessionState::Stopping,
        };
        assert_eq!(err.to_string(), "Invalid state transition: Idle -> Stopping");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: VoiceError = io_err.into();
        assert!(matches!(err, VoiceError::Io(_)));
        assert!(err.to_string().contains("missing file"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: VoiceError = err.unwrap_err().into();
        assert!(matches!(err, VoiceError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: VoiceError = err.unwrap_err().into();
        assert!(matches!(err, VoiceError::Serialization(_)));
    }
}
