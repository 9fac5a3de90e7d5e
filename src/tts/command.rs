use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;
use tokio::task::JoinHandle;

use super::config::SpeechConfig;
use super::interface::{Playback, PlaybackEvent, SpeechEngine, SpeechError, Utterance, VoiceProfile};

const DEFAULT_VOICE: &str = "en-us";

/// Speech engine backed by an external synthesizer process (e.g. `espeak-ng`).
///
/// Each utterance spawns one child process; cancelling drops the watcher
/// task, and `kill_on_drop` takes the child down with it.
pub struct CommandSpeechEngine {
    program: String,
    args: Vec<String>,
    voices: Vec<VoiceProfile>,
    words_per_minute: u32,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl CommandSpeechEngine {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            voices: config.voices.clone(),
            words_per_minute: config.words_per_minute.max(1),
            current: Mutex::new(None),
        }
    }

    /// Substitute utterance values into the configured argument template.
    ///
    /// Pitch maps onto espeak's 0-99 scale (50 = normal) and rate onto
    /// words per minute.
    pub fn render_args(&self, utterance: &Utterance) -> Vec<String> {
        let pitch = ((utterance.tone.pitch * 50.0).round() as i32).clamp(0, 99);
        let rate = (self.words_per_minute as f32 * utterance.tone.rate).round() as u32;
        let voice = utterance
            .voice
            .as_ref()
            .map(|v| v.voice_id.as_str())
            .unwrap_or(DEFAULT_VOICE);

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{voice}", voice)
                    .replace("{pitch}", &pitch.to_string())
                    .replace("{rate}", &rate.to_string())
                    .replace("{text}", &utterance.text)
            })
            .collect()
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
impl SpeechEngine for CommandSpeechEngine {
    fn id(&self) -> String {
        "command".to_string()
    }

    fn voices(&self) -> Vec<VoiceProfile> {
        self.voices.clone()
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok()
    }

    fn start(&self, utterance: &Utterance) -> Result<Playback, SpeechError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::StartFailed(format!("no async runtime: {}", e)))?;

        // Spawning needs the runtime's reactor
        let _guard = runtime.enter();
        let mut child = Command::new(&self.program)
            .args(self.render_args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SpeechError::StartFailed(format!("failed to spawn '{}': {}", self.program, e))
            })?;

        let (tx, playback) = Playback::channel();
        let program = self.program.clone();
        let task = runtime.spawn(async move {
            let _ = tx.send(PlaybackEvent::Started);
            let event = match child.wait().await {
                Ok(status) if status.success() => PlaybackEvent::Finished,
                Ok(status) => PlaybackEvent::Failed(format!("{} exited with {}", program, status)),
                Err(e) => PlaybackEvent::Failed(format!("{} wait failed: {}", program, e)),
            };
            let _ = tx.send(event);
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

    fn utterance(voice: Option<VoiceProfile>) -> Utterance {
        Utterance {
            text: "Hello there".to_string(),
            lang: "en-US".to_string(),
            voice,
            tone: ToneParams {
                pitch: 1.2,
                rate: 1.04,
            },
        }
    }

    #[test]
    fn renders_default_argument_template() {
        let engine = CommandSpeechEngine::from_config(&SpeechConfig::default());
        let args = engine.render_args(&utterance(None));
        assert_eq!(args, vec!["-v", "en-us", "-p", "60", "-s", "177", "Hello there"]);
    }

    #[test]
    fn selected_voice_is_passed_through() {
        let engine = CommandSpeechEngine::from_config(&SpeechConfig::default());
        let voice = VoiceProfile::new("en-gb", "Daniel", "en-GB");
        let args = engine.render_args(&utterance(Some(voice)));
        assert_eq!(args[1], "en-gb");
    }

    #[test]
    fn pitch_is_clamped() {
        let engine = CommandSpeechEngine::from_config(&SpeechConfig::default());
        let mut u = utterance(None);
        u.tone.pitch = 5.0;
        assert_eq!(engine.render_args(&u)[3], "99");
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let config = SpeechConfig {
            program: "definitely-not-a-speech-program-1f3a".to_string(),
            ..SpeechConfig::default()
        };
        let engine = CommandSpeechEngine::from_config(&config);
        let result = engine.start(&utterance(None));
        assert!(matches!(result, Err(SpeechError::StartFailed(_))));
        assert!(!engine.is_available().await);
    }
}
