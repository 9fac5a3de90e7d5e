pub mod command;
pub mod config;
pub mod driver;
pub mod emotion_tts;
pub mod interface;
pub mod simulated;
pub mod unavailable;
pub mod voice_registry;

pub use config::{EngineKind, SpeechConfig};
pub use driver::{build_engine, SpeechCallbacks, SpeechDriver, SpeechEnd};
pub use emotion_tts::tone_for;
pub use interface::{
    Gender, Playback, PlaybackEvent, SpeechEngine, SpeechError, ToneParams, Utterance,
    VoiceProfile,
};
