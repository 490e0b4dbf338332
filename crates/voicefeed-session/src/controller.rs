//! Session controller owning one recognition-engine handle.
//!
//! The `SessionController` wires engine events to the lifecycle state
//! machine, applies configuration, arms the auto-stop timer and delivers
//! each lifecycle callback exactly once. It is driven from a single task:
//! engine events are queued through the attached [`EventSink`] and processed
//! by [`SessionController::next_event`] or
//! [`SessionController::process_pending`].

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch};

use voicefeed_core::error::VoiceError;
use voicefeed_core::events::SessionEvent;
use voicefeed_core::locale::UiLanguage;
use voicefeed_core::types::{
    EngineErrorCode, EngineSettings, RecognitionEvent, SessionConfig, SessionRecord,
    SessionState, Snapshot, FALLBACK_LANGUAGE,
};

use crate::engine::{EngineEvent, Envelope, EventSink, RecognitionEngine, SpeechPlatform};
use crate::handlers::SessionHandlers;
use crate::state::StateMachine;
use crate::timer::AutoStopTimer;

const DOMAIN_EVENT_CAPACITY: usize = 64;

/// Resolve the effective recognition language.
///
/// Priority: explicit configured tag > platform locale > first preferred
/// platform language > `"en-US"`.
pub fn resolve_language(config: &SessionConfig, platform: &dyn SpeechPlatform) -> String {
    if let Some(lang) = config.explicit_language() {
        return lang.to_string();
    }
    platform
        .locale()
        .into_iter()
        .chain(platform.preferred_languages())
        .map(|lang| lang.trim().to_string())
        .find(|lang| !lang.is_empty())
        .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
}

enum Wake {
    Engine(Option<Envelope>),
    AutoStop,
}

/// Owns one engine handle and the lifecycle of its sessions.
pub struct SessionController {
    platform: Arc<dyn SpeechPlatform>,
    config: SessionConfig,
    language: String,
    handlers: SessionHandlers,
    engine: Option<Box<dyn RecognitionEngine>>,
    generation: u64,
    state: StateMachine,
    transcript: String,
    session: Option<SessionRecord>,
    auto_stop: AutoStopTimer,
    events_tx: mpsc::UnboundedSender<Envelope>,
    events_rx: mpsc::UnboundedReceiver<Envelope>,
    snapshot_tx: watch::Sender<Snapshot>,
    domain_tx: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("language", &self.language)
            .field("handlers", &self.handlers)
            .field("has_engine", &self.engine.is_some())
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("auto_stop", &self.auto_stop)
            .finish()
    }
}

impl SessionController {
    /// Build a controller and allocate its engine handle.
    ///
    /// Never fails. If the platform has no recognition capability the
    /// unsupported-platform error goes to `on_error` (or the alert fallback)
    /// and the controller stays idle without an engine.
    pub fn configure(
        platform: Arc<dyn SpeechPlatform>,
        config: SessionConfig,
        handlers: SessionHandlers,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(Snapshot::default());
        let (domain_tx, _) = broadcast::channel(DOMAIN_EVENT_CAPACITY);
        let language = resolve_language(&config, platform.as_ref());

        let mut controller = Self {
            platform,
            config,
            language,
            handlers,
            engine: None,
            generation: 0,
            state: StateMachine::new(),
            transcript: String::new(),
            session: None,
            auto_stop: AutoStopTimer::new(),
            events_tx,
            events_rx,
            snapshot_tx,
            domain_tx,
        };
        controller.install_engine();
        controller
    }

    /// Replace configuration and handlers.
    ///
    /// The current engine handle is torn down silently (no callbacks) before
    /// a new one is allocated. The transcript is kept.
    pub fn reconfigure(&mut self, config: SessionConfig, handlers: SessionHandlers) {
        if self.state.is_disposed() {
            tracing::warn!("Reconfigure ignored: controller is disposed");
            return;
        }
        self.teardown_engine();
        self.state.reset();
        self.session = None;
        self.config = config;
        self.handlers = handlers;
        self.language = resolve_language(&self.config, self.platform.as_ref());
        self.install_engine();
        self.publish();
    }

    /// Begin a new session. No-op unless idle with an engine.
    pub fn start(&mut self) {
        if self.engine.is_none() {
            tracing::debug!("Start ignored: no recognition engine");
            return;
        }
        if let Err(e) = self.state.transition(SessionState::Starting) {
            tracing::debug!(error = %e, "Start ignored");
            return;
        }

        self.auto_stop.cancel();
        self.transcript.clear();
        let record = SessionRecord::new(self.language.clone());
        tracing::info!(
            session_id = %record.id,
            language = %record.language,
            continuous = self.config.continuous,
            "Voice session starting"
        );
        self.session = Some(record);

        let outcome = match self.engine.as_mut() {
            Some(engine) => engine.start(),
            None => Ok(()),
        };
        if let Err(code) = outcome {
            tracing::warn!(code = %code, "Engine rejected start");
            if let Err(e) = self.state.transition(SessionState::Idle) {
                tracing::debug!(error = %e, "Could not revert rejected start");
            }
            self.session = None;
            self.report_recognition_error(code);
        }
        self.publish();
    }

    /// Request the end of the current session. No-op unless listening.
    pub fn stop(&mut self) {
        if let Err(e) = self.state.transition(SessionState::Stopping) {
            tracing::debug!(error = %e, "Stop ignored");
            return;
        }
        self.auto_stop.cancel();
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
        tracing::debug!("Voice session stopping");
        self.publish();
    }

    /// Take the pending transcript, leaving the buffer empty.
    pub fn submit_transcript(&mut self) -> Option<String> {
        if self.state.is_disposed() {
            return None;
        }
        let text = std::mem::take(&mut self.transcript);
        self.publish();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Discard the pending transcript.
    pub fn cancel_transcript(&mut self) {
        if self.state.is_disposed() {
            return;
        }
        self.transcript.clear();
        self.publish();
    }

    pub fn state(&self) -> SessionState {
        self.state.current()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.current();
        Snapshot {
            state,
            is_listening: state.is_listening(),
            transcript: self.transcript.clone(),
        }
    }

    /// Observe snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Observe domain events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.domain_tx.subscribe()
    }

    /// Effective recognition language.
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether an engine handle is currently allocated.
    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Wait for the next engine event or auto-stop expiry and process it.
    ///
    /// Returns `false` once the controller is disposed.
    pub async fn next_event(&mut self) -> bool {
        if self.state.is_disposed() {
            return false;
        }
        let wake = match self.auto_stop.deadline() {
            Some(deadline) => tokio::select! {
                biased;
                envelope = self.events_rx.recv() => Wake::Engine(envelope),
                () = tokio::time::sleep_until(deadline) => Wake::AutoStop,
            },
            None => Wake::Engine(self.events_rx.recv().await),
        };
        match wake {
            Wake::Engine(Some(envelope)) => {
                self.dispatch(envelope);
                true
            }
            Wake::Engine(None) => false,
            Wake::AutoStop => {
                self.auto_stop.cancel();
                self.auto_stop_elapsed();
                true
            }
        }
    }

    /// Process every queued engine event and an expired auto-stop deadline
    /// without waiting. Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while !self.state.is_disposed() {
            if let Ok(envelope) = self.events_rx.try_recv() {
                self.dispatch(envelope);
                handled += 1;
            } else if self.auto_stop.take_if_due() {
                self.auto_stop_elapsed();
                handled += 1;
            } else {
                break;
            }
        }
        handled
    }

    /// Release the engine handle and enter the terminal `Disposed` state.
    ///
    /// Pending events and the auto-stop deadline are discarded; no callback
    /// fires after this returns.
    pub fn dispose(&mut self) {
        if self.state.is_disposed() {
            return;
        }
        self.teardown_engine();
        if let Err(e) = self.state.transition(SessionState::Disposed) {
            tracing::debug!(error = %e, "Dispose transition rejected");
        }
        self.session = None;
        while self.events_rx.try_recv().is_ok() {}
        tracing::debug!("Session controller disposed");
        self.publish();
    }

    // -------------------------------------------------------------------------
    // Engine handle management
    // -------------------------------------------------------------------------

    fn install_engine(&mut self) {
        match self.platform.create_engine() {
            Some(mut engine) => {
                self.generation += 1;
                engine.apply(&EngineSettings::new(
                    self.language.clone(),
                    self.config.continuous,
                ));
                engine.attach(EventSink::new(self.generation, self.events_tx.clone()));
                tracing::debug!(
                    generation = self.generation,
                    language = %self.language,
                    continuous = self.config.continuous,
                    auto_stop = self.config.auto_stop_applies(),
                    "Recognition engine configured"
                );
                self.engine = Some(engine);
            }
            None => {
                let message = UiLanguage::from_tag(&self.language).unsupported_platform();
                tracing::warn!(language = %self.language, "Speech recognition unavailable");
                self.emit(SessionEvent::PlatformUnsupported {
                    language: self.language.clone(),
                    timestamp: Utc::now(),
                });
                self.report_error(VoiceError::UnsupportedPlatform(message.to_string()));
            }
        }
    }

    fn teardown_engine(&mut self) {
        self.auto_stop.cancel();
        if let Some(mut engine) = self.engine.take() {
            let state = self.state.current();
            if matches!(
                state,
                SessionState::Starting | SessionState::Listening | SessionState::Stopping
            ) {
                engine.abort();
            }
            engine.detach();
            tracing::debug!(generation = self.generation, "Recognition engine released");
        }
        // Anything still queued from the old handle is now stale.
        self.generation += 1;
    }

    // -------------------------------------------------------------------------
    // Event handling
    // -------------------------------------------------------------------------

    fn dispatch(&mut self, envelope: Envelope) {
        if envelope.generation != self.generation || self.engine.is_none() {
            tracing::debug!(
                event_generation = envelope.generation,
                current_generation = self.generation,
                "Dropping event from released engine"
            );
            return;
        }
        match envelope.event {
            EngineEvent::Started => self.on_engine_started(),
            EngineEvent::Ended => self.on_engine_ended(),
            EngineEvent::Result(event) => self.on_engine_result(event),
            EngineEvent::Error(code) => self.on_engine_error(code),
        }
    }

    fn on_engine_started(&mut self) {
        if let Err(e) = self.state.transition(SessionState::Listening) {
            tracing::debug!(error = %e, "Ignoring engine start");
            return;
        }
        self.publish();
        self.handlers.started();
        if let Some(record) = &self.session {
            tracing::info!(session_id = %record.id, "Voice session listening");
            let event = SessionEvent::SessionStarted {
                session_id: record.id,
                language: record.language.clone(),
                timestamp: Utc::now(),
            };
            self.emit(event);
        }
    }

    fn on_engine_ended(&mut self) {
        if let Err(e) = self.state.transition(SessionState::Idle) {
            tracing::debug!(error = %e, "Ignoring engine end");
            return;
        }
        self.auto_stop.cancel();
        let record = self.session.take();
        let duration_secs = record.as_ref().map(|r| r.elapsed_secs()).unwrap_or(0.0);
        tracing::info!(
            session_id = ?record.as_ref().map(|r| r.id),
            duration_secs,
            "Voice session ended"
        );
        self.publish();
        self.handlers.ended();
        self.emit(SessionEvent::SessionEnded {
            session_id: record.map(|r| r.id),
            duration_secs,
            timestamp: Utc::now(),
        });
    }

    fn on_engine_result(&mut self, event: RecognitionEvent) {
        if self.state.current() == SessionState::Idle {
            tracing::debug!("Ignoring result outside a session");
            return;
        }
        let Some(result) = event.final_result() else {
            tracing::debug!(result_index = event.result_index, "Ignoring non-final result");
            return;
        };

        tracing::info!(text_len = result.text.len(), "Recognized text");
        self.transcript = result.text;
        self.publish();
        let text = self.transcript.clone();
        self.handlers.transcript(&text);
        self.emit(SessionEvent::TranscriptReceived {
            session_id: self.session.as_ref().map(|r| r.id),
            text_length: text.len(),
            timestamp: Utc::now(),
        });

        // The first result of a session fixes the deadline; later results
        // must not push it back.
        if self.config.auto_stop_applies() && !self.auto_stop.is_armed() {
            self.auto_stop.arm(self.config.auto_stop_delay);
            tracing::debug!(
                delay_ms = self.config.auto_stop_delay.as_millis() as u64,
                "Auto-stop scheduled"
            );
        }
    }

    fn on_engine_error(&mut self, code: EngineErrorCode) {
        tracing::warn!(code = %code, state = %self.state.current(), "Engine reported error");
        self.report_recognition_error(code);
    }

    fn auto_stop_elapsed(&mut self) {
        if self.state.current() == SessionState::Listening {
            tracing::debug!("Auto-stop firing");
            self.stop();
        } else {
            tracing::debug!(state = %self.state.current(), "Auto-stop skipped");
        }
    }

    // -------------------------------------------------------------------------
    // Outbound
    // -------------------------------------------------------------------------

    fn report_recognition_error(&mut self, code: EngineErrorCode) {
        self.emit(SessionEvent::RecognitionFailed {
            session_id: self.session.as_ref().map(|r| r.id),
            code: code.clone(),
            timestamp: Utc::now(),
        });
        self.report_error(VoiceError::recognition(code));
    }

    fn report_error(&mut self, error: VoiceError) {
        if self.handlers.error(&error) {
            return;
        }
        match &error {
            VoiceError::UnsupportedPlatform(message) if self.handlers.alert_unhandled => {
                self.platform.alert(message);
            }
            _ => tracing::error!(error = %error, "Unhandled voice error"),
        }
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.domain_tx.send(event);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.dispose();
    }
}

// =============================================================================
// Tests
// =============================================================================
