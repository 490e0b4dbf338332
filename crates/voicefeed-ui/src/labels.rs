//! Button and transcript labels.

use serde::{Deserialize, Serialize};

use voicefeed_core::config::WidgetSettings;
use voicefeed_core::locale::UiLanguage;

/// Button captions for the two widget states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonTexts {
    /// Shown while idle.
    pub start: String,
    /// Shown while listening.
    pub stop: String,
}

impl ButtonTexts {
    /// Localized defaults for a language tag.
    pub fn for_language(tag: &str) -> Self {
        let lang = UiLanguage::from_tag(tag);
        Self {
            start: lang.start_label().to_string(),
            stop: lang.stop_label().to_string(),
        }
    }
}

/// Presentation options for [`crate::VoiceFeedbackWidget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOptions {
    pub show_transcript: bool,
    /// Custom captions. Localized defaults are used when `None`.
    pub button_texts: Option<ButtonTexts>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            show_transcript: true,
            button_texts: None,
        }
    }
}

impl WidgetOptions {
    /// Build options from the `[widget]` config section.
    ///
    /// A single custom label is completed with the localized default for the
    /// other one.
    pub fn from_settings(settings: &WidgetSettings, language: &str) -> Self {
        let button_texts = match (&settings.start_label, &settings.stop_label) {
            (None, None) => None,
            (start, stop) => {
                let defaults = ButtonTexts::for_language(language);
                Some(ButtonTexts {
                    start: start.clone().unwrap_or(defaults.start),
                    stop: stop.clone().unwrap_or(defaults.stop),
                })
            }
        };
        Self {
            show_transcript: settings.show_transcript,
            button_texts,
        }
    }

    /// Captions to render for a language tag.
    pub fn resolve_button_texts(&self, language: &str) -> ButtonTexts {
        self.button_texts
            .clone()
            .unwrap_or_else(|| ButtonTexts::for_language(language))
    }
}

/// Label printed before the transcript.
pub fn transcript_label(language: &str) -> &'static str {
    UiLanguage::from_tag(language).transcript_label()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_defaults() {
        let tr = ButtonTexts::for_language("tr");
        assert_eq!(tr.start, "🎤 Sesli Geri Bildirim Başlat");
        assert_eq!(tr.stop, "🎙️ Dinleniyor...");

        let en = ButtonTexts::for_language("en-US");
        assert_eq!(en.start, "🎤 Start Voice Feedback");
        assert_eq!(en.stop, "🎙️ Listening...");
    }

    #[test]
    fn test_custom_texts_win() {
        let options = WidgetOptions {
            show_transcript: true,
            button_texts: Some(ButtonTexts {
                start: "Talk".to_string(),
                stop: "Done".to_string(),
            }),
        };
        let texts = options.resolve_button_texts("tr-TR");
        assert_eq!(texts.start, "Talk");
        assert_eq!(texts.stop, "Done");
    }

    #[test]
    fn test_from_settings_fills_missing_label() {
        let settings = WidgetSettings {
            show_transcript: false,
            start_label: Some("Go".to_string()),
            stop_label: None,
        };
        let options = WidgetOptions::from_settings(&settings, "tr");
        assert!(!options.show_transcript);
        let texts = options.button_texts.unwrap();
        assert_eq!(texts.start, "Go");
        assert_eq!(texts.stop, "🎙️ Dinleniyor...");
    }

    #[test]
    fn test_from_default_settings() {
        let options = WidgetOptions::from_settings(&WidgetSettings::default(), "en");
        assert_eq!(options, WidgetOptions::default());
    }

    #[test]
    fn test_transcript_label() {
        assert_eq!(transcript_label("tr-TR"), "Metin:");
        assert_eq!(transcript_label("en-GB"), "Text:");
    }
}
