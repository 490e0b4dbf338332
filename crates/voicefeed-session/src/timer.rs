//! Cancellable auto-stop deadline.
//!
//! The controller holds at most one pending deadline. It is not a spawned
//! task: the controller's event loop races it against incoming engine
//! events, so cancelling is just clearing the deadline.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct AutoStopTimer {
    deadline: Option<Instant>,
}

impl AutoStopTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to expire `delay` from now, replacing any pending deadline.
    pub fn arm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn take_if_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
