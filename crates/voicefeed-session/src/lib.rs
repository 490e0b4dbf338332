//! voicefeed session crate - recognition session controller.
//!
//! Owns one host-supplied speech-recognition engine handle and drives it
//! through the session lifecycle: Idle -> Starting -> Listening -> Stopping
//! -> Idle. Engine events, auto-stop timing and owner callbacks are all
//! handled on the controller's single control task.

pub mod controller;
pub mod engine;
pub mod handlers;
pub mod simulated;
pub mod state;
pub mod timer;

pub use controller::{resolve_language, SessionController};
pub use engine::{EngineEvent, EventSink, RecognitionEngine, SpeechPlatform};
pub use handlers::SessionHandlers;
pub use simulated::{EngineCall, EngineProbe, SimulatedPlatform};
pub use state::StateMachine;
pub use timer::AutoStopTimer;
