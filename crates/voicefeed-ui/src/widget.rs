//! Voice feedback widget.
//!
//! Renders a toggle button and an optional transcript line from the
//! controller's published snapshot, and turns user intents (press, submit,
//! cancel) into controller calls. It holds no session logic of its own.

use std::fmt;

use serde::Serialize;
use tokio::sync::watch;

use voicefeed_core::types::Snapshot;
use voicefeed_session::SessionController;

use crate::labels::{transcript_label, WidgetOptions};

/// What the widget shows at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetView {
    pub button_label: String,
    pub listening: bool,
    /// `None` when the transcript is hidden.
    pub transcript_line: Option<String>,
}

impl fmt::Display for WidgetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} ]", self.button_label)?;
        if let Some(line) = &self.transcript_line {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

/// Button-plus-transcript widget bound to one session controller.
pub struct VoiceFeedbackWidget {
    controller: SessionController,
    options: WidgetOptions,
    snapshot: watch::Receiver<Snapshot>,
}

impl VoiceFeedbackWidget {
    pub fn new(controller: SessionController, options: WidgetOptions) -> Self {
        let snapshot = controller.subscribe();
        Self {
            controller,
            options,
            snapshot,
        }
    }

    /// Button tap: stop while listening, start otherwise.
    pub fn press(&mut self) {
        if self.snapshot.borrow().is_listening {
            tracing::debug!("Widget press: stop");
            self.controller.stop();
        } else {
            tracing::debug!("Widget press: start");
            self.controller.start();
        }
    }

    /// Consume the pending transcript.
    pub fn submit(&mut self) -> Option<String> {
        self.controller.submit_transcript()
    }

    /// Discard the pending transcript.
    pub fn cancel(&mut self) {
        self.controller.cancel_transcript();
    }

    /// Wait for and process the next controller event.
    ///
    /// Returns `false` once the controller is disposed.
    pub async fn pump(&mut self) -> bool {
        self.controller.next_event().await
    }

    /// Process already-queued controller events without waiting.
    pub fn pump_pending(&mut self) -> usize {
        self.controller.process_pending()
    }

    /// The current view, rendered from the latest snapshot.
    pub fn render(&self) -> WidgetView {
        let snapshot = self.snapshot.borrow();
        let language = self.controller.language();
        let texts = self.options.resolve_button_texts(language);
        let button_label = if snapshot.is_listening {
            texts.stop
        } else {
            texts.start
        };
        let transcript_line = self
            .options
            .show_transcript
            .then(|| format!("{} {}", transcript_label(language), snapshot.transcript));
        WidgetView {
            button_label,
            listening: snapshot.is_listening,
            transcript_line,
        }
    }

    /// Wait until the snapshot changes and return the new view.
    ///
    /// Something else must be driving the controller concurrently, otherwise
    /// this waits forever. Returns `None` once the controller is gone.
    pub async fn changed(&mut self) -> Option<WidgetView> {
        self.snapshot.changed().await.ok()?;
        let _ = self.snapshot.borrow_and_update();
        Some(self.render())
    }

    /// A fresh view if the snapshot changed since the last call.
    pub fn take_update(&mut self) -> Option<WidgetView> {
        match self.snapshot.has_changed() {
            Ok(true) => {
                let _ = self.snapshot.borrow_and_update();
                Some(self.render())
            }
            _ => None,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Tear down the controller. The widget renders as idle afterwards.
    pub fn dispose(&mut self) {
        self.controller.dispose();
    }
}
