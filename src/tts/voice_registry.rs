use super::interface::{Gender, VoiceProfile};
use crate::utils::text::contains_any;

const FEMALE_NAME_KW: &[&str] = &[
    "female",
    "woman",
    "siri",
    "victoria",
    "google uk english female",
];

const MALE_NAME_KW: &[&str] = &["male", "man", "daniel", "google us english"];

/// Ordered snapshot of the voices an engine reports.
///
/// Order matters: selection falls back to the *first* English voice and
/// then the *first* voice overall, mirroring the platform's own listing.
pub struct VoiceRegistry {
    voices: Vec<VoiceProfile>,
}

impl VoiceRegistry {
    pub fn new(voices: Vec<VoiceProfile>) -> Self {
        Self { voices }
    }

    /// Voices tagged `en-*` / `en_*`, in listing order.
    pub fn english(&self) -> impl Iterator<Item = &VoiceProfile> {
        self.voices.iter().filter(|v| is_english(&v.language))
    }

    /// Pick the voice for a gender hint.
    ///
    /// Fallback chain: hinted English voice → first English voice → first
    /// voice → `None` (engine default).
    pub fn pick(&self, hint: Gender) -> Option<&VoiceProfile> {
        let hinted = match hint {
            Gender::Neutral => None,
            _ => self.english().find(|v| matches_hint(v, hint)),
        };
        hinted
            .or_else(|| self.english().next())
            .or_else(|| self.voices.first())
    }
}

fn is_english(language: &str) -> bool {
    let lang = language.to_lowercase();
    lang.starts_with("en-") || lang.starts_with("en_")
}

fn matches_hint(voice: &VoiceProfile, hint: Gender) -> bool {
    if voice.gender == hint {
        return true;
    }
    let name = voice.name.to_lowercase();
    match hint {
        Gender::Female => contains_any(&name, FEMALE_NAME_KW, true),
        Gender::Male => contains_any(&name, MALE_NAME_KW, true),
        Gender::Neutral => false,
    }
}
