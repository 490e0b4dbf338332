use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Language used when neither the owner nor the platform names one.
pub const FALLBACK_LANGUAGE: &str = "en-US";

/// Delay between a final result and the automatic stop request.
pub const DEFAULT_AUTO_STOP_DELAY: Duration = Duration::from_millis(100);

// =============================================================================
// Session lifecycle
// =============================================================================

/// Lifecycle state of a session controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No capture in progress. Ready to start.
    #[default]
    Idle,
    /// Start was requested; waiting for the engine to confirm.
    Starting,
    /// The engine is capturing speech.
    Listening,
    /// Stop was requested; waiting for the engine to end.
    Stopping,
    /// The controller was torn down. Terminal.
    Disposed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Starting => write!(f, "Starting"),
            SessionState::Listening => write!(f, "Listening"),
            SessionState::Stopping => write!(f, "Stopping"),
            SessionState::Disposed => write!(f, "Disposed"),
        }
    }
}

impl SessionState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Idle, SessionState::Starting)
                | (SessionState::Starting, SessionState::Listening)
                | (SessionState::Listening, SessionState::Stopping)
                // Engine end, whatever caused it
                | (SessionState::Starting, SessionState::Idle)
                | (SessionState::Listening, SessionState::Idle)
                | (SessionState::Stopping, SessionState::Idle)
                // Teardown
                | (SessionState::Idle, SessionState::Disposed)
                | (SessionState::Starting, SessionState::Disposed)
                | (SessionState::Listening, SessionState::Disposed)
                | (SessionState::Stopping, SessionState::Disposed)
        )
    }

    /// Whether the engine is capturing audio in this state.
    pub fn is_listening(&self) -> bool {
        matches!(self, SessionState::Listening | SessionState::Stopping)
    }
}

/// Owner-supplied configuration for one controller.
///
/// `auto_stop` only has an effect when `continuous` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// BCP 47 tag. `None` or empty means "use the platform locale".
    pub language: Option<String>,
    /// Keep listening after a final result until explicitly stopped.
    pub continuous: bool,
    /// Stop automatically after the first final result.
    pub auto_stop: bool,
    /// Delay between that result and the stop request.
    pub auto_stop_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: None,
            continuous: false,
            auto_stop: true,
            auto_stop_delay: DEFAULT_AUTO_STOP_DELAY,
        }
    }
}

impl SessionConfig {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    pub fn with_auto_stop(mut self, auto_stop: bool) -> Self {
        self.auto_stop = auto_stop;
        self
    }

    pub fn with_auto_stop_delay(mut self, delay: Duration) -> Self {
        self.auto_stop_delay = delay;
        self
    }

    /// Whether a final result should schedule a stop request.
    pub fn auto_stop_applies(&self) -> bool {
        self.auto_stop && !self.continuous
    }

    /// The explicitly requested language, ignoring empty strings.
    pub fn explicit_language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
    }
}

/// A final recognition hypothesis delivered to the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
    pub is_final: bool,
}

/// Read-only view of a controller, published to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: SessionState,
    pub is_listening: bool,
    pub transcript: String,
}

/// Bookkeeping for one start-to-idle session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub language: String,
    pub started_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            language: language.into(),
            started_at: Utc::now(),
        }
    }

    /// Seconds elapsed since the session started.
    pub fn elapsed_secs(&self) -> f64 {
        let elapsed = Utc::now() - self.started_at;
        elapsed.num_milliseconds() as f64 / 1000.0
    }
}

// =============================================================================
// Engine contract
// =============================================================================

/// Settings applied to an engine handle when it is allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl EngineSettings {
    /// Final results only, top hypothesis only.
    pub fn new(lang: impl Into<String>, continuous: bool) -> Self {
        Self {
            lang: lang.into(),
            continuous,
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// One hypothesis for a recognized utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// One recognized utterance with its hypotheses, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechResult {
    pub is_final: bool,
    pub alternatives: Vec<SpeechAlternative>,
}

/// Payload of an engine `result` event.
///
/// `results` is the session's result list so far and `result_index` points at
/// the first entry that changed with this event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionEvent {
    pub result_index: usize,
    pub results: Vec<SpeechResult>,
}

impl RecognitionEvent {
    /// An event carrying a single final result with one hypothesis.
    pub fn single_final(transcript: impl Into<String>) -> Self {
        Self {
            result_index: 0,
            results: vec![SpeechResult {
                is_final: true,
                alternatives: vec![SpeechAlternative {
                    transcript: transcript.into(),
                    confidence: 1.0,
                }],
            }],
        }
    }

    /// The top hypothesis of the result this event produced, if it is final.
    pub fn final_result(&self) -> Option<RecognitionResult> {
        let result = self.results.get(self.result_index)?;
        if !result.is_final {
            return None;
        }
        let top = result.alternatives.first()?;
        Some(RecognitionResult {
            text: top.transcript.clone(),
            is_final: true,
        })
    }
}

/// Error codes reported by a recognition engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EngineErrorCode {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    BadGrammar,
    LanguageNotSupported,
    Other(String),
}

impl EngineErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            EngineErrorCode::NoSpeech => "no-speech",
            EngineErrorCode::Aborted => "aborted",
            EngineErrorCode::AudioCapture => "audio-capture",
            EngineErrorCode::Network => "network",
            EngineErrorCode::NotAllowed => "not-allowed",
            EngineErrorCode::ServiceNotAllowed => "service-not-allowed",
            EngineErrorCode::BadGrammar => "bad-grammar",
            EngineErrorCode::LanguageNotSupported => "language-not-supported",
            EngineErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineErrorCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "no-speech" => EngineErrorCode::NoSpeech,
            "aborted" => EngineErrorCode::Aborted,
            "audio-capture" => EngineErrorCode::AudioCapture,
            "network" => EngineErrorCode::Network,
            "not-allowed" => EngineErrorCode::NotAllowed,
            "service-not-allowed" => EngineErrorCode::ServiceNotAllowed,
            "bad-grammar" => EngineErrorCode::BadGrammar,
            "language-not-supported" => EngineErrorCode::LanguageNotSupported,
            other => EngineErrorCode::Other(other.to_string()),
        })
    }
}

impl From<String> for EngineErrorCode {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(code) => code,
            Err(never) => match never {},
        }
    }
}

impl From<EngineErrorCode> for String {
    fn from(code: EngineErrorCode) -> Self {
        code.as_str().to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
