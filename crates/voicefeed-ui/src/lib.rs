//! voicefeed UI crate - presentation adapter for the session controller.
//!
//! Renders a toggle button and the latest transcript from the controller's
//! snapshot and forwards user intents back to it. Label selection is the
//! only decision made here.
//!
//! # Modules
//!
//! - [`labels`]: localized button captions and transcript label
//! - [`widget`]: the widget binding a [`voicefeed_session::SessionController`]

pub mod labels;
pub mod widget;

pub use labels::{ButtonTexts, WidgetOptions};
pub use widget::{VoiceFeedbackWidget, WidgetView};
