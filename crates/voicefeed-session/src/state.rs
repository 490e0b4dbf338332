//! Session lifecycle state machine.
//!
//! Enforces the valid transitions of a recognition session:
//! - Idle -> Starting (start requested)
//! - Starting -> Listening (engine confirmed start)
//! - Listening -> Stopping (stop or auto-stop requested)
//! - Starting | Listening | Stopping -> Idle (engine ended)
//! - any live state -> Disposed (teardown)

use voicefeed_core::error::{Result, VoiceError};
use voicefeed_core::types::SessionState;

/// Single-owner state machine for session transitions.
///
/// Owned by the controller and mutated only through `&mut self`, so no
/// locking is needed. Transitions are validated before being applied.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: SessionState,
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn current(&self) -> SessionState {
        self.state
    }

    /// Attempt to transition to the target state.
    ///
    /// Returns `VoiceError::InvalidStateTransition` and leaves the state
    /// untouched if the transition is not allowed.
    pub fn transition(&mut self, target: SessionState) -> Result<()> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Session state: {} -> {}", self.state, target);
            self.state = target;
            Ok(())
        } else {
            Err(VoiceError::InvalidStateTransition {
                from: self.state,
                to: target,
            })
        }
    }

    /// Force the state machine back to Idle after its engine was replaced.
    ///
    /// A disposed machine stays disposed.
    pub fn reset(&mut self) {
        if self.state == SessionState::Disposed {
            return;
        }
        if self.state != SessionState::Idle {
            tracing::warn!("Session state machine reset to Idle from {}", self.state);
        }
        self.state = SessionState::Idle;
    }

    pub fn is_disposed(&self) -> bool {
        self.state == SessionState::Disposed
    }
}
