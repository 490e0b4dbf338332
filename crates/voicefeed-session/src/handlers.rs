//! Owner callbacks for session lifecycle events.

use voicefeed_core::error::VoiceError;

/// Receives the text of each final result.
pub type TranscriptHandler = Box<dyn FnMut(&str) + Send>;

/// Receives start and end notifications.
pub type LifecycleHandler = Box<dyn FnMut() + Send>;

/// Receives unsupported-platform and recognition errors.
pub type ErrorHandler = Box<dyn FnMut(&VoiceError) + Send>;

/// Callbacks registered by the owner of a controller. All are optional.
///
/// When `on_error` is absent, an unsupported platform is raised as a host
/// alert if `alert_unhandled` is set; every other error is logged.
pub struct SessionHandlers {
    pub on_transcript: Option<TranscriptHandler>,
    pub on_start: Option<LifecycleHandler>,
    pub on_end: Option<LifecycleHandler>,
    pub on_error: Option<ErrorHandler>,
    pub alert_unhandled: bool,
}

impl Default for SessionHandlers {
    fn default() -> Self {
        Self {
            on_transcript: None,
            on_start: None,
            on_end: None,
            on_error: None,
            alert_unhandled: true,
        }
    }
}

impl std::fmt::Debug for SessionHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandlers")
            .field("has_on_transcript", &self.on_transcript.is_some())
            .field("has_on_start", &self.on_start.is_some())
            .field("has_on_end", &self.on_end.is_some())
            .field("has_on_error", &self.on_error.is_some())
            .field("alert_unhandled", &self.alert_unhandled)
            .finish()
    }
}

impl SessionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_transcript(mut self, handler: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_transcript = Some(Box::new(handler));
        self
    }

    pub fn on_start(mut self, handler: impl FnMut() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(handler));
        self
    }

    pub fn on_end(mut self, handler: impl FnMut() + Send + 'static) -> Self {
        self.on_end = Some(Box::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl FnMut(&VoiceError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Whether an unhandled unsupported-platform error raises a host alert.
    pub fn alert_unhandled(mut self, enabled: bool) -> Self {
        self.alert_unhandled = enabled;
        self
    }

    pub(crate) fn transcript(&mut self, text: &str) {
        if let Some(handler) = self.on_transcript.as_mut() {
            handler(text);
        }
    }

    pub(crate) fn started(&mut self) {
        if let Some(handler) = self.on_start.as_mut() {
            handler();
        }
    }

    pub(crate) fn ended(&mut self) {
        if let Some(handler) = self.on_end.as_mut() {
            handler();
        }
    }

    /// Hand the error to `on_error`. Returns `false` if no handler is registered.
    pub(crate) fn error(&mut self, error: &VoiceError) -> bool {
        match self.on_error.as_mut() {
            Some(handler) => {
                handler(error);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_default_has_no_callbacks() {
        let mut handlers = SessionHandlers::default();
        assert!(handlers.alert_unhandled);
        handlers.transcript("ignored");
        handlers.started();
        handlers.ended();
        assert!(!handlers.error(&VoiceError::Config("x".into())));
    }

    #[test]
    fn test_builder_wires_callbacks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c, d) = (seen.clone(), seen.clone(), seen.clone(), seen.clone());
        let mut handlers = SessionHandlers::new()
            .on_transcript(move |t| a.lock().unwrap().push(format!("text:{t}")))
            .on_start(move || b.lock().unwrap().push("start".to_string()))
            .on_end(move || c.lock().unwrap().push("end".to_string()))
            .on_error(move |e| d.lock().unwrap().push(format!("error:{e}")))
            .alert_unhandled(false);

        handlers.started();
        handlers.transcript("hi");
        assert!(handlers.error(&VoiceError::UnsupportedPlatform("nope".into())));
        handlers.ended();

        assert!(!handlers.alert_unhandled);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["start", "text:hi", "error:nope", "end"]
        );
    }

    #[test]
    fn test_debug_lists_registered_callbacks() {
        let handlers = SessionHandlers::new().on_end(|| {});
        let debug = format!("{:?}", handlers);
        assert!(debug.contains("has_on_end: true"));
        assert!(debug.contains("has_on_start: false"));
    }
}
