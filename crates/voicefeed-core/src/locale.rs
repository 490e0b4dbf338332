//! Localized user-facing strings.
//!
//! Only Turkish and English are bundled. Any language tag starting with `tr`
//! selects Turkish; everything else falls back to English.

/// Languages with bundled strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiLanguage {
    English,
    Turkish,
}

impl UiLanguage {
    /// Pick the bundled language for a BCP 47 tag.
    pub fn from_tag(tag: &str) -> Self {
        if tag.starts_with("tr") {
            UiLanguage::Turkish
        } else {
            UiLanguage::English
        }
    }

    /// Shown when the host has no speech-recognition capability.
    pub fn unsupported_platform(&self) -> &'static str {
        match self {
            UiLanguage::Turkish => "Tarayıcınız Speech Recognition desteklemiyor.",
            UiLanguage::English => "Your browser doesn't support Speech Recognition.",
        }
    }

    pub fn start_label(&self) -> &'static str {
        match self {
            UiLanguage::Turkish => "🎤 Sesli Geri Bildirim Başlat",
            UiLanguage::English => "🎤 Start Voice Feedback",
        }
    }

    pub fn stop_label(&self) -> &'static str {
        match self {
            UiLanguage::Turkish => "🎙️ Dinleniyor...",
            UiLanguage::English => "🎙️ Listening...",
        }
    }

    pub fn transcript_label(&self) -> &'static str {
        match self {
            UiLanguage::Turkish => "Metin:",
            UiLanguage::English => "Text:",
        }
    }
}
