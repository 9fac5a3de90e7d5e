use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::config::SpeechConfig;
use super::interface::{Playback, PlaybackEvent, SpeechEngine, SpeechError, Utterance, VoiceProfile};

const MIN_PLAYBACK: Duration = Duration::from_millis(200);

/// Speech engine that plays nothing but keeps real timing.
///
/// Playback length is estimated from the word count, the configured
/// words-per-minute and the utterance rate, so the speaking indicator
/// behaves the way it would with a real synthesizer.
pub struct SimulatedSpeechEngine {
    voices: Vec<VoiceProfile>,
    words_per_minute: u32,
    voices_ready_at: Option<Instant>,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedSpeechEngine {
    pub fn new(voices: Vec<VoiceProfile>, words_per_minute: u32) -> Self {
        Self {
            voices,
            words_per_minute: words_per_minute.max(1),
            voices_ready_at: None,
            current: Mutex::new(None),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(config.voices.clone(), config.words_per_minute)
    }

    /// Report no voices until `delay` has passed, like platforms that load
    /// their voice list lazily.
    pub fn with_voice_load_delay(mut self, delay: Duration) -> Self {
        self.voices_ready_at = Some(Instant::now() + delay);
        self
    }

    /// Estimated playback time for an utterance.
    pub fn duration_for(&self, utterance: &Utterance) -> Duration {
        let words = utterance.text.split_whitespace().count().max(1) as f64;
        let rate = f64::from(utterance.tone.rate).max(0.1);
        let secs = words * 60.0 / f64::from(self.words_per_minute) / rate;
        Duration::from_secs_f64(secs).max(MIN_PLAYBACK)
    }

    fn replace_current(&self, task: Option<JoinHandle<()>>) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = std::mem::replace(&mut *current, task) {
                previous.abort();
            }
        }
    }
}

#[async_trait]
impl SpeechEngine for SimulatedSpeechEngine {
    fn id(&self) -> String {
        "simulated".to_string()
    }

    fn voices(&self) -> Vec<VoiceProfile> {
        match self.voices_ready_at {
            Some(ready) if Instant::now() < ready => Vec::new(),
            _ => self.voices.clone(),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn start(&self, utterance: &Utterance) -> Result<Playback, SpeechError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::StartFailed(format!("no async runtime: {}", e)))?;

        let (tx, playback) = Playback::channel();
        let duration = self.duration_for(utterance);
        tracing::debug!(
            "[TTS] Simulating {:?} for {}ms",
            utterance.text,
            duration.as_millis()
        );

        let task = runtime.spawn(async move {
            let _ = tx.send(PlaybackEvent::Started);
            tokio::time::sleep(duration).await;
            let _ = tx.send(PlaybackEvent::Finished);
        });
        self.replace_current(Some(task));

        Ok(playback)
    }

    fn cancel(&self) {
        self.replace_current(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::interface::ToneParams;

    fn utterance(text: &str, rate: f32) -> Utterance {
        Utterance {
            text: text.to_string(),
            lang: "en-US".to_string(),
            voice: None,
            tone: ToneParams { pitch: 1.0, rate },
        }
    }

    #[test]
    fn faster_rate_is_shorter() {
        let engine = SimulatedSpeechEngine::new(Vec::new(), 120);
        let text = "one two three four five six seven eight nine ten";
        let slow = engine.duration_for(&utterance(text, 0.9));
        let fast = engine.duration_for(&utterance(text, 1.2));
        assert!(fast < slow);
        assert_eq!(engine.duration_for(&utterance(text, 1.0)), Duration::from_secs(5));
    }

    #[test]
    fn short_text_has_minimum_length() {
        // One word at 1000 wpm is 60ms
        let engine = SimulatedSpeechEngine::new(Vec::new(), 1000);
        assert_eq!(engine.duration_for(&utterance("hi", 1.0)), MIN_PLAYBACK);
        assert_eq!(engine.duration_for(&utterance("", 1.0)), MIN_PLAYBACK);

        let slow = SimulatedSpeechEngine::new(Vec::new(), 170);
        assert!(slow.duration_for(&utterance("hi", 1.0)) > MIN_PLAYBACK);
    }

    #[test]
    fn start_outside_runtime_fails_synchronously() {
        let engine = SimulatedSpeechEngine::new(Vec::new(), 170);
        let result = engine.start(&utterance("hi", 1.0));
        assert!(matches!(result, Err(SpeechError::StartFailed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn reports_start_then_finish() {
        let engine = SimulatedSpeechEngine::new(Vec::new(), 170);
        let mut playback = engine.start(&utterance("hello there", 1.0)).unwrap();
        assert_eq!(playback.next_event().await, Some(PlaybackEvent::Started));
        assert_eq!(playback.next_event().await, Some(PlaybackEvent::Finished));
        assert_eq!(playback.next_event().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_closes_the_stream_without_finishing() {
        let engine = SimulatedSpeechEngine::new(Vec::new(), 170);
        let mut playback = engine.start(&utterance("a long sentence to say", 1.0)).unwrap();
        assert_eq!(playback.next_event().await, Some(PlaybackEvent::Started));
        engine.cancel();
        assert_eq!(playback.next_event().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn voices_appear_after_load_delay() {
        let voices = vec![VoiceProfile::new("en-us", "US", "en-US")];
        let engine = SimulatedSpeechEngine::new(voices, 170)
            .with_voice_load_delay(Duration::from_millis(500));
        assert!(engine.voices().is_empty());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(engine.voices().len(), 1);
    }
}
