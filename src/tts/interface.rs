use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

// ── Error Types ────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpeechError {
    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to start playback: {0}")]
    StartFailed(String),
}

// ── Voice Profiles ─────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Neutral,
}

/// A synthesized voice as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceProfile {
    pub voice_id: String,
    pub name: String,
    /// BCP-47 style tag, e.g. "en-US".
    pub language: String,
    /// Platforms rarely report this; `Neutral` means unknown.
    #[serde(default)]
    pub gender: Gender,
}

impl VoiceProfile {
    pub fn new(voice_id: &str, name: &str, language: &str) -> Self {
        Self {
            voice_id: voice_id.to_string(),
            name: name.to_string(),
            language: language.to_string(),
            gender: Gender::Neutral,
        }
    }
}

// ── Synthesis Parameters ───────────────────────────────

/// Pitch and rate multipliers (1.0 = engine default).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ToneParams {
    pub pitch: f32,
    pub rate: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            rate: 1.0,
        }
    }
}

/// One playback request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    /// `None` lets the engine use its system default voice.
    pub voice: Option<VoiceProfile>,
    pub tone: ToneParams,
}

// ── Playback Lifecycle ─────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Started,
    Finished,
    Failed(String),
}

/// Lifecycle stream of a started utterance.
///
/// Dropping the engine side of the channel without a terminal event is
/// treated as the playback having been stopped.
pub struct Playback {
    events: mpsc::UnboundedReceiver<PlaybackEvent>,
}

impl Playback {
    /// Create a playback and the sender the engine reports through.
    pub fn channel() -> (mpsc::UnboundedSender<PlaybackEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { events: rx })
    }

    pub async fn next_event(&mut self) -> Option<PlaybackEvent> {
        self.events.recv().await
    }
}

// ── Engine Trait ───────────────────────────────────────

/// The platform speech capability: voice enumeration plus playback with
/// start/end lifecycle events.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Unique identifier for this engine (e.g., "simulated", "command")
    fn id(&self) -> String;

    /// Voices currently available. May be empty until the platform loads them.
    fn voices(&self) -> Vec<VoiceProfile>;

    /// Check if the engine is currently operational
    async fn is_available(&self) -> bool;

    /// Begin playing an utterance. Fails synchronously when playback cannot
    /// be started at all.
    fn start(&self, utterance: &Utterance) -> Result<Playback, SpeechError>;

    /// Stop whatever is playing or queued.
    fn cancel(&self);
}
