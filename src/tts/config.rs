use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::interface::{Gender, VoiceProfile};

// ── Engine Selection ───────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Timer-driven playback, no audio device needed.
    #[default]
    Simulated,
    /// An external synthesizer program such as `espeak-ng`.
    Command,
    /// No speech capability at all.
    None,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineKind::Simulated => "simulated",
            EngineKind::Command => "command",
            EngineKind::None => "none",
        };
        f.write_str(s)
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulated" => Ok(EngineKind::Simulated),
            "command" => Ok(EngineKind::Command),
            "none" => Ok(EngineKind::None),
            other => Err(format!("Unknown speech engine: {}", other)),
        }
    }
}

// ── Speech Config ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub engine: EngineKind,
    /// Speaking speed at rate 1.0, used to time simulated playback.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
    /// Synthesizer program for the command engine.
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments for the program. `{text}`, `{voice}`, `{pitch}` and `{rate}`
    /// are substituted per utterance.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Voices the engine reports, in listing order.
    #[serde(default = "default_voices")]
    pub voices: Vec<VoiceProfile>,
    /// How long to wait for voices to load at startup.
    #[serde(default = "default_voice_wait_ms")]
    pub voice_wait_ms: u64,
}

fn default_words_per_minute() -> u32 {
    170
}

fn default_program() -> String {
    "espeak-ng".to_string()
}

fn default_args() -> Vec<String> {
    ["-v", "{voice}", "-p", "{pitch}", "-s", "{rate}", "{text}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_voices() -> Vec<VoiceProfile> {
    let mut daniel = VoiceProfile::new("en-gb", "Daniel", "en-GB");
    daniel.gender = Gender::Male;
    vec![
        VoiceProfile::new("en-us", "Google US English", "en-US"),
        VoiceProfile::new("en-gb-x-rp", "Google UK English Female", "en-GB"),
        daniel,
        VoiceProfile::new("fr-fr", "Amélie", "fr-FR"),
    ]
}

fn default_voice_wait_ms() -> u64 {
    1000
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            words_per_minute: default_words_per_minute(),
            program: default_program(),
            args: default_args(),
            voices: default_voices(),
            voice_wait_ms: default_voice_wait_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg: SpeechConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.engine, EngineKind::Simulated);
        assert_eq!(cfg.words_per_minute, 170);
        assert_eq!(cfg.program, "espeak-ng");
        assert_eq!(cfg.voices.len(), 4);
    }

    #[test]
    fn engine_kind_round_trips_through_text() {
        for kind in [EngineKind::Simulated, EngineKind::Command, EngineKind::None] {
            assert_eq!(kind.to_string().parse::<EngineKind>(), Ok(kind));
        }
        assert!("browser".parse::<EngineKind>().is_err());
    }

    #[test]
    fn engine_parses_from_json() {
        let cfg: SpeechConfig = serde_json::from_str(r#"{"engine": "none"}"#).unwrap();
        assert_eq!(cfg.engine, EngineKind::None);
    }
}
