//! Capability contract between the session controller and the host platform.
//!
//! The host supplies a [`SpeechPlatform`] at configure time. It reports the
//! user's locale and, when speech recognition is available, allocates
//! [`RecognitionEngine`] handles. Engines report back asynchronously by
//! emitting [`EngineEvent`]s into the [`EventSink`] attached to them.

use tokio::sync::mpsc;

use voicefeed_core::types::{EngineErrorCode, EngineSettings, RecognitionEvent};

/// Events a recognition engine reports.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Audio capture began.
    Started,
    /// Capture ended, whatever the cause.
    Ended,
    /// The engine produced (or revised) a result.
    Result(RecognitionEvent),
    /// The engine hit a runtime failure.
    Error(EngineErrorCode),
}

/// An engine event tagged with the handle generation that produced it.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub generation: u64,
    pub event: EngineEvent,
}

/// Write end of the controller's event queue, handed to one engine handle.
///
/// Each sink carries the generation of the handle it was attached to. Once
/// the controller replaces or drops that handle, events sent through the old
/// sink are discarded on arrival.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EventSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { generation, tx }
    }

    /// Queue an event for the controller.
    ///
    /// Returns `false` if the controller no longer exists.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx
            .send(Envelope {
                generation: self.generation,
                event,
            })
            .is_ok()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One speech-recognition engine handle.
///
/// `start` and `stop` are fire-and-forget. Their outcome is observed through
/// the `Started`, `Ended` and `Error` events emitted into the attached sink.
pub trait RecognitionEngine: Send {
    /// Apply language, mode and result settings. Called once, before `attach`.
    fn apply(&mut self, settings: &EngineSettings);

    /// Bind the event sink. Events emitted before this are lost.
    fn attach(&mut self, sink: EventSink);

    /// Drop the event sink. No events may be emitted afterwards.
    fn detach(&mut self);

    /// Begin capture. An `Err` means the engine rejected the call outright.
    fn start(&mut self) -> Result<(), EngineErrorCode>;

    /// Stop capture and deliver any pending result.
    fn stop(&mut self);

    /// Stop capture and discard pending results.
    fn abort(&mut self) {
        self.stop();
    }
}

/// Host capabilities injected into the controller.
pub trait SpeechPlatform: Send + Sync {
    /// Primary locale of the host, e.g. `"tr-TR"`.
    fn locale(&self) -> Option<String>;

    /// User's preferred languages, most preferred first.
    fn preferred_languages(&self) -> Vec<String> {
        Vec::new()
    }

    /// Allocate a new engine handle, or `None` if the host has no
    /// speech-recognition capability.
    fn create_engine(&self) -> Option<Box<dyn RecognitionEngine>>;

    /// Surface a message to the user when nobody else will.
    fn alert(&self, message: &str) {
        tracing::error!(message, "Host alert");
    }
}
