use async_trait::async_trait;

use super::interface::{Playback, SpeechEngine, SpeechError, Utterance, VoiceProfile};

/// Stand-in for hosts without any speech capability.
///
/// Every playback request fails synchronously; the driver turns that into
/// an immediate start/end pair so the speaking indicator never sticks.
pub struct UnavailableSpeechEngine;

#[async_trait]
impl SpeechEngine for UnavailableSpeechEngine {
    fn id(&self) -> String {
        "none".to_string()
    }

    fn voices(&self) -> Vec<VoiceProfile> {
        Vec::new()
    }

    async fn is_available(&self) -> bool {
        false
    }

    fn start(&self, _utterance: &Utterance) -> Result<Playback, SpeechError> {
        Err(SpeechError::Unavailable(
            "no speech engine configured".to_string(),
        ))
    }

    fn cancel(&self) {}
}
