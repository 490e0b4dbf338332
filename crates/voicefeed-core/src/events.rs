use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::EngineErrorCode;

/// Domain events emitted by a session controller.
///
/// Consumed by the event log and by anything that wants a lifecycle audit
/// trail without registering callbacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SessionEvent {
    /// No recognition capability was found at configure time.
    PlatformUnsupported {
        language: String,
        timestamp: DateTime<Utc>,
    },

    /// The engine confirmed that capture started.
    SessionStarted {
        session_id: Uuid,
        language: String,
        timestamp: DateTime<Utc>,
    },

    /// A final result was delivered to the owner.
    TranscriptReceived {
        session_id: Option<Uuid>,
        text_length: usize,
        timestamp: DateTime<Utc>,
    },

    /// The engine reported a runtime failure.
    RecognitionFailed {
        session_id: Option<Uuid>,
        code: EngineErrorCode,
        timestamp: DateTime<Utc>,
    },

    /// The engine ended capture and the controller returned to idle.
    SessionEnded {
        session_id: Option<Uuid>,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::PlatformUnsupported { timestamp, .. }
            | SessionEvent::SessionStarted { timestamp, .. }
            | SessionEvent::TranscriptReceived { timestamp, .. }
            | SessionEvent::RecognitionFailed { timestamp, .. }
            | SessionEvent::SessionEnded { timestamp, .. } => *timestamp,
        }
    }

    /// Short event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::PlatformUnsupported { .. } => "platform_unsupported",
            SessionEvent::SessionStarted { .. } => "session_started",
            SessionEvent::TranscriptReceived { .. } => "transcript_received",
            SessionEvent::RecognitionFailed { .. } => "recognition_failed",
            SessionEvent::SessionEnded { .. } => "session_ended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_tagged() {
        let event = SessionEvent::RecognitionFailed {
            session_id: None,
            code: EngineErrorCode::Network,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "recognition_failed");
        assert_eq!(json["code"], "network");
    }

    #[test]
    fn test_round_trip_session_started() {
        let event = SessionEvent::SessionStarted {
            session_id: Uuid::new_v4(),
            language: "tr-TR".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.name(), "session_started");
    }

    #[test]
    fn test_timestamp_accessor() {
        let ts = Utc::now();
        let event = SessionEvent::SessionEnded {
            session_id: None,
            duration_secs: 1.5,
            timestamp: ts,
        };
        assert_eq!(event.timestamp(), ts);
    }
}
