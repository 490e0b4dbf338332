//! In-process speech platform for tests and demos.
//!
//! `SimulatedPlatform` hands out `SimulatedEngine` handles that record every
//! call made on them. An `EngineProbe` shares that record and lets the caller
//! play the engine's side: fire `start`, `result`, `error` and `end` events
//! into whichever sink is currently attached.
//!
//! With `auto_ack` enabled the engine acknowledges its own calls the way a
//! browser engine does: `start()` emits `Started` and `stop()` emits `Ended`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use voicefeed_core::types::{EngineErrorCode, EngineSettings, RecognitionEvent};

use crate::engine::{EngineEvent, EventSink, RecognitionEngine, SpeechPlatform};

/// A call made on a simulated engine handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Apply,
    Attach(u64),
    Detach,
    Start,
    Stop,
    Abort,
}

#[derive(Debug, Default)]
struct EngineLog {
    created: usize,
    live: usize,
    settings: Vec<EngineSettings>,
    calls: Vec<EngineCall>,
    sink: Option<EventSink>,
    capturing: bool,
    reject_next_start: Option<EngineErrorCode>,
    alerts: Vec<String>,
}

#[derive(Debug, Default)]
struct Shared(Mutex<EngineLog>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineLog> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Speech platform backed by simulated engines.
#[derive(Debug, Clone)]
pub struct SimulatedPlatform {
    shared: Arc<Shared>,
    supported: bool,
    locale: Option<String>,
    languages: Vec<String>,
    auto_ack: bool,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPlatform {
    /// A platform with recognition support and no reported locale.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            supported: true,
            locale: None,
            languages: Vec::new(),
            auto_ack: false,
        }
    }

    /// A platform without any recognition capability.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    /// Make engines acknowledge `start()`/`stop()` with `Started`/`Ended`.
    pub fn with_auto_ack(mut self, auto_ack: bool) -> Self {
        self.auto_ack = auto_ack;
        self
    }

    /// Observer and remote control for engines created by this platform.
    pub fn probe(&self) -> EngineProbe {
        EngineProbe {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl SpeechPlatform for SimulatedPlatform {
    fn locale(&self) -> Option<String> {
        self.locale.clone()
    }

    fn preferred_languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn create_engine(&self) -> Option<Box<dyn RecognitionEngine>> {
        if !self.supported {
            return None;
        }
        {
            let mut log = self.shared.lock();
            log.created += 1;
            log.live += 1;
        }
        Some(Box::new(SimulatedEngine {
            shared: Arc::clone(&self.shared),
            auto_ack: self.auto_ack,
            sink: None,
        }))
    }

    fn alert(&self, message: &str) {
        tracing::warn!(message, "Simulated host alert");
        self.shared.lock().alerts.push(message.to_string());
    }
}

/// Engine handle allocated by [`SimulatedPlatform`].
#[derive(Debug)]
pub struct SimulatedEngine {
    shared: Arc<Shared>,
    auto_ack: bool,
    sink: Option<EventSink>,
}

impl SimulatedEngine {
    fn ack(&self, event: EngineEvent) {
        if self.auto_ack {
            if let Some(sink) = &self.sink {
                sink.emit(event);
            }
        }
    }
}

impl RecognitionEngine for SimulatedEngine {
    fn apply(&mut self, settings: &EngineSettings) {
        let mut log = self.shared.lock();
        log.calls.push(EngineCall::Apply);
        log.settings.push(settings.clone());
    }

    fn attach(&mut self, sink: EventSink) {
        let mut log = self.shared.lock();
        log.calls.push(EngineCall::Attach(sink.generation()));
        log.sink = Some(sink.clone());
        self.sink = Some(sink);
    }

    fn detach(&mut self) {
        let mut log = self.shared.lock();
        log.calls.push(EngineCall::Detach);
        log.sink = None;
        self.sink = None;
    }

    fn start(&mut self) -> Result<(), EngineErrorCode> {
        {
            let mut log = self.shared.lock();
            log.calls.push(EngineCall::Start);
            if let Some(code) = log.reject_next_start.take() {
                return Err(code);
            }
            if log.capturing {
                return Err(EngineErrorCode::Other("invalid-state".to_string()));
            }
            log.capturing = true;
        }
        self.ack(EngineEvent::Started);
        Ok(())
    }

    fn stop(&mut self) {
        {
            let mut log = self.shared.lock();
            log.calls.push(EngineCall::Stop);
            if self.auto_ack {
                log.capturing = false;
            }
        }
        self.ack(EngineEvent::Ended);
    }

    fn abort(&mut self) {
        {
            let mut log = self.shared.lock();
            log.calls.push(EngineCall::Abort);
            log.capturing = false;
        }
        self.ack(EngineEvent::Ended);
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        let mut log = self.shared.lock();
        log.live = log.live.saturating_sub(1);
    }
}

/// Shared view of every engine a [`SimulatedPlatform`] created.
#[derive(Debug, Clone)]
pub struct EngineProbe {
    shared: Arc<Shared>,
}

impl EngineProbe {
    pub fn engines_created(&self) -> usize {
        self.shared.lock().created
    }

    /// Engine handles not yet dropped.
    pub fn live_engines(&self) -> usize {
        self.shared.lock().live
    }

    /// Settings applied to the most recently configured engine.
    pub fn settings(&self) -> Option<EngineSettings> {
        self.shared.lock().settings.last().cloned()
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.shared.lock().calls.clone()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.shared
            .lock()
            .calls
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    /// The sink currently attached to an engine, if any.
    pub fn sink(&self) -> Option<EventSink> {
        self.shared.lock().sink.clone()
    }

    pub fn is_capturing(&self) -> bool {
        self.shared.lock().capturing
    }

    /// Messages raised through the platform's host alert.
    pub fn alerts(&self) -> Vec<String> {
        self.shared.lock().alerts.clone()
    }

    /// Make the next `start()` call fail synchronously with `code`.
    pub fn reject_next_start(&self, code: EngineErrorCode) {
        self.shared.lock().reject_next_start = Some(code);
    }

    /// Emit an event through the attached sink. Returns `false` if no sink is
    /// attached or the controller is gone.
    pub fn fire(&self, event: EngineEvent) -> bool {
        let sink = self.sink();
        match sink {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    pub fn fire_start(&self) -> bool {
        self.shared.lock().capturing = true;
        self.fire(EngineEvent::Started)
    }

    pub fn fire_result(&self, transcript: &str) -> bool {
        self.fire(EngineEvent::Result(RecognitionEvent::single_final(transcript)))
    }

    pub fn fire_error(&self, code: EngineErrorCode) -> bool {
        self.fire(EngineEvent::Error(code))
    }

    pub fn fire_end(&self) -> bool {
        self.shared.lock().capturing = false;
        self.fire(EngineEvent::Ended)
    }
}
