//! Speech Driver — one utterance at a time, with a lifecycle that always closes.
//!
//! Every `speak` call first cancels the utterance that is currently playing,
//! so the single speech channel belongs to the most recent caller. Each
//! utterance reports `on_start` at most once and `on_end` exactly once,
//! whether it completes, is cancelled, or never manages to start.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::command::CommandSpeechEngine;
use super::config::{EngineKind, SpeechConfig};
use super::interface::{Gender, PlaybackEvent, SpeechEngine, ToneParams, Utterance, VoiceProfile};
use super::simulated::SimulatedSpeechEngine;
use super::unavailable::UnavailableSpeechEngine;
use super::voice_registry::VoiceRegistry;

const UTTERANCE_LANG: &str = "en-US";
const VOICE_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ── Callbacks ──────────────────────────────────────────

/// Why an utterance stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEnd {
    Completed,
    Cancelled,
    Failed(String),
}

type StartCallback = Box<dyn FnOnce() + Send + 'static>;
type EndCallback = Box<dyn FnOnce(SpeechEnd) + Send + 'static>;

#[derive(Default)]
pub struct SpeechCallbacks {
    on_start: Option<StartCallback>,
    on_end: Option<EndCallback>,
}

impl SpeechCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_end(mut self, f: impl FnOnce(SpeechEnd) + Send + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fire_start(lifecycle: &Mutex<SpeechCallbacks>) {
    let callback = lock(lifecycle).on_start.take();
    if let Some(callback) = callback {
        callback();
    }
}

/// Close the lifecycle. After this neither callback can fire again.
fn fire_end(lifecycle: &Mutex<SpeechCallbacks>, reason: SpeechEnd) {
    let callback = {
        let mut callbacks = lock(lifecycle);
        callbacks.on_start = None;
        callbacks.on_end.take()
    };
    if let Some(callback) = callback {
        callback(reason);
    }
}

// ── Driver ─────────────────────────────────────────────

struct ActiveUtterance {
    id: u64,
    lifecycle: Arc<Mutex<SpeechCallbacks>>,
    watcher: JoinHandle<()>,
}

pub struct SpeechDriver {
    engine: Arc<dyn SpeechEngine>,
    active: Arc<Mutex<Option<ActiveUtterance>>>,
    next_id: AtomicU64,
}

/// Build the engine named by the config.
pub fn build_engine(config: &SpeechConfig) -> Arc<dyn SpeechEngine> {
    match config.engine {
        EngineKind::Simulated => Arc::new(SimulatedSpeechEngine::from_config(config)),
        EngineKind::Command => Arc::new(CommandSpeechEngine::from_config(config)),
        EngineKind::None => Arc::new(UnavailableSpeechEngine),
    }
}

impl SpeechDriver {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        let engine = build_engine(config);
        tracing::info!("[TTS] Using speech engine: {}", engine.id());
        Self::new(engine)
    }

    pub fn engine_id(&self) -> String {
        self.engine.id()
    }

    pub async fn is_available(&self) -> bool {
        self.engine.is_available().await
    }

    /// True while an utterance is outstanding.
    pub fn is_speaking(&self) -> bool {
        lock(&self.active).is_some()
    }

    /// Choose the voice for a gender hint from the engine's current list.
    pub fn pick_voice(&self, hint: Gender) -> Option<VoiceProfile> {
        VoiceRegistry::new(self.engine.voices()).pick(hint).cloned()
    }

    /// Poll the engine until it reports voices or `timeout` passes.
    /// Returns the number of voices found.
    pub async fn wait_for_voices(&self, timeout: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut ticker = tokio::time::interval(VOICE_POLL_INTERVAL);
        loop {
            ticker.tick().await;
            let count = self.engine.voices().len();
            if count > 0 || tokio::time::Instant::now() >= deadline {
                return count;
            }
        }
    }

    /// Speak `text`, superseding anything already playing.
    ///
    /// Returns the utterance id. If the engine cannot start playback the
    /// failure is logged and `on_start`/`on_end` fire immediately.
    pub fn speak(
        &self,
        text: &str,
        tone: ToneParams,
        voice_hint: Gender,
        callbacks: SpeechCallbacks,
    ) -> u64 {
        self.cancel_with(SpeechEnd::Cancelled);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let utterance = Utterance {
            text: text.to_string(),
            lang: UTTERANCE_LANG.to_string(),
            voice: self.pick_voice(voice_hint),
            tone,
        };
        let lifecycle = Arc::new(Mutex::new(callbacks));

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                Self::complete_immediately(id, &lifecycle, format!("no async runtime: {}", e));
                return id;
            }
        };

        // Hold the slot while starting so the watcher cannot clear it before
        // it has been filled.
        let mut slot = lock(&self.active);
        let mut playback = match self.engine.start(&utterance) {
            Ok(playback) => playback,
            Err(e) => {
                drop(slot);
                Self::complete_immediately(id, &lifecycle, e.to_string());
                return id;
            }
        };

        let watcher_lifecycle = lifecycle.clone();
        let active = self.active.clone();
        let watcher = runtime.spawn(async move {
            let end = loop {
                match playback.next_event().await {
                    Some(PlaybackEvent::Started) => fire_start(&watcher_lifecycle),
                    Some(PlaybackEvent::Finished) => break SpeechEnd::Completed,
                    Some(PlaybackEvent::Failed(msg)) => {
                        tracing::warn!("[TTS] Utterance {} failed: {}", id, msg);
                        break SpeechEnd::Failed(msg);
                    }
                    None => break SpeechEnd::Cancelled,
                }
            };
            {
                let mut slot = lock(&active);
                if slot.as_ref().map(|a| a.id) == Some(id) {
                    *slot = None;
                }
            }
            fire_end(&watcher_lifecycle, end);
        });

        *slot = Some(ActiveUtterance {
            id,
            lifecycle,
            watcher,
        });
        tracing::debug!("[TTS] Utterance {} started on {}", id, self.engine.id());
        id
    }

    fn complete_immediately(id: u64, lifecycle: &Mutex<SpeechCallbacks>, reason: String) {
        tracing::warn!("[TTS] Utterance {} could not start ({}); ending it now", id, reason);
        fire_start(lifecycle);
        fire_end(lifecycle, SpeechEnd::Failed(reason));
    }

    /// Stop the active utterance, if any. Its `on_end` fires with `Cancelled`.
    pub fn cancel(&self) {
        self.cancel_with(SpeechEnd::Cancelled);
    }

    fn cancel_with(&self, reason: SpeechEnd) {
        let previous = lock(&self.active).take();
        if let Some(previous) = previous {
            previous.watcher.abort();
            self.engine.cancel();
            tracing::debug!("[TTS] Utterance {} cancelled", previous.id);
            fire_end(&previous.lifecycle, reason);
        }
    }
}

impl Drop for SpeechDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::emotion_tts::DEFAULT_TONE;
    use crate::tts::interface::{Playback, SpeechError};
    use async_trait::async_trait;
    use tokio::sync::mpsc::UnboundedSender;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(log: &Log, name: &'static str) -> SpeechCallbacks {
        let start_log = log.clone();
        let end_log = log.clone();
        SpeechCallbacks::new()
            .on_start(move || start_log.lock().unwrap().push(format!("{}:start", name)))
            .on_end(move |end| end_log.lock().unwrap().push(format!("{}:end:{:?}", name, end)))
    }

    fn entries(log: &Log, name: &str) -> Vec<String> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(name))
            .cloned()
            .collect()
    }

    fn simulated() -> SpeechDriver {
        let voices = vec![VoiceProfile::new("en-us", "Google US English", "en-US")];
        SpeechDriver::new(Arc::new(SimulatedSpeechEngine::new(voices, 170)))
    }

    /// Records utterances and keeps playback open until told otherwise.
    struct RecordingEngine {
        voices: Vec<VoiceProfile>,
        seen: Mutex<Vec<Utterance>>,
        senders: Mutex<Vec<UnboundedSender<PlaybackEvent>>>,
    }

    #[async_trait]
    impl SpeechEngine for RecordingEngine {
        fn id(&self) -> String {
            "recording".to_string()
        }
        fn voices(&self) -> Vec<VoiceProfile> {
            self.voices.clone()
        }
        async fn is_available(&self) -> bool {
            true
        }
        fn start(&self, utterance: &Utterance) -> Result<Playback, SpeechError> {
            self.seen.lock().unwrap().push(utterance.clone());
            let (tx, playback) = Playback::channel();
            self.senders.lock().unwrap().push(tx);
            Ok(playback)
        }
        fn cancel(&self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn utterance_starts_and_completes() {
        let driver = simulated();
        let log: Log = Default::default();
        driver.speak("hello there friend", DEFAULT_TONE, Gender::Neutral, recorder(&log, "A"));
        assert!(driver.is_speaking());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(entries(&log, "A"), vec!["A:start", "A:end:Completed"]);
        assert!(!driver.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn new_utterance_supersedes_active_one() {
        let driver = simulated();
        let log: Log = Default::default();
        driver.speak(
            "a fairly long first sentence to say",
            DEFAULT_TONE,
            Gender::Neutral,
            recorder(&log, "A"),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        driver.speak("second", DEFAULT_TONE, Gender::Neutral, recorder(&log, "B"));

        tokio::time::sleep(Duration::from_secs(10)).await;

        let a_ends: Vec<_> = entries(&log, "A:end");
        assert_eq!(a_ends, vec!["A:end:Cancelled"]);
        assert_eq!(entries(&log, "B"), vec!["B:start", "B:end:Completed"]);

        // A closes before B opens
        let all = log.lock().unwrap().clone();
        let a_end = all.iter().position(|e| e == "A:end:Cancelled").unwrap();
        let b_start = all.iter().position(|e| e == "B:start").unwrap();
        assert!(a_end < b_start);
        assert!(!driver.is_speaking());
    }

    #[tokio::test]
    async fn unavailable_engine_still_starts_and_ends() {
        let driver = SpeechDriver::new(Arc::new(UnavailableSpeechEngine));
        let log: Log = Default::default();
        driver.speak("hello", DEFAULT_TONE, Gender::Neutral, recorder(&log, "A"));

        // Both fire synchronously, exactly once
        let seen = entries(&log, "A");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], "A:start");
        assert!(seen[1].starts_with("A:end:Failed"));
        assert!(!driver.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_ends_active_utterance() {
        let driver = simulated();
        let log: Log = Default::default();
        driver.speak(
            "some words to say out loud",
            DEFAULT_TONE,
            Gender::Neutral,
            recorder(&log, "A"),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        driver.cancel();
        assert!(!driver.is_speaking());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(entries(&log, "A:end"), vec!["A:end:Cancelled"]);
    }

    #[tokio::test]
    async fn engine_failure_mid_playback_ends_once() {
        let engine = Arc::new(RecordingEngine {
            voices: Vec::new(),
            seen: Mutex::new(Vec::new()),
            senders: Mutex::new(Vec::new()),
        });
        let driver = SpeechDriver::new(engine.clone());
        let log: Log = Default::default();
        driver.speak("hi", DEFAULT_TONE, Gender::Neutral, recorder(&log, "A"));

        {
            let senders = engine.senders.lock().unwrap();
            senders[0].send(PlaybackEvent::Started).unwrap();
            senders[0].send(PlaybackEvent::Failed("device lost".into())).unwrap();
            senders[0].send(PlaybackEvent::Finished).unwrap();
        }
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            entries(&log, "A"),
            vec!["A:start", "A:end:Failed(\"device lost\")"]
        );
        assert!(!driver.is_speaking());
    }

    #[tokio::test]
    async fn utterance_carries_tone_language_and_voice() {
        let engine = Arc::new(RecordingEngine {
            voices: vec![
                VoiceProfile::new("samantha", "Samantha", "en-US"),
                VoiceProfile::new("victoria", "Victoria", "en-US"),
            ],
            seen: Mutex::new(Vec::new()),
            senders: Mutex::new(Vec::new()),
        });
        let driver = SpeechDriver::new(engine.clone());
        let tone = ToneParams {
            pitch: 1.2,
            rate: 1.04,
        };
        driver.speak("hey", tone, Gender::Female, SpeechCallbacks::new());

        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen[0].lang, "en-US");
        assert_eq!(seen[0].tone, tone);
        assert_eq!(seen[0].voice.as_ref().unwrap().voice_id, "victoria");
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_lazy_voices() {
        let voices = vec![VoiceProfile::new("en-us", "US", "en-US")];
        let engine = SimulatedSpeechEngine::new(voices, 170)
            .with_voice_load_delay(Duration::from_millis(600));
        let driver = SpeechDriver::new(Arc::new(engine));
        assert_eq!(driver.wait_for_voices(Duration::from_secs(2)).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn voice_wait_gives_up_after_timeout() {
        let voices = vec![VoiceProfile::new("en-us", "US", "en-US")];
        let engine = SimulatedSpeechEngine::new(voices, 170)
            .with_voice_load_delay(Duration::from_secs(30));
        let driver = SpeechDriver::new(Arc::new(engine));
        assert_eq!(driver.wait_for_voices(Duration::from_secs(1)).await, 0);
    }

    #[test]
    fn builds_engine_from_config() {
        let mut config = SpeechConfig::default();
        assert_eq!(build_engine(&config).id(), "simulated");
        config.engine = EngineKind::Command;
        assert_eq!(build_engine(&config).id(), "command");
        config.engine = EngineKind::None;
        assert_eq!(build_engine(&config).id(), "none");
    }
}
