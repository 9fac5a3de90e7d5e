pub mod ai;
pub mod avatar;
pub mod config;
pub mod conversation;
pub mod terminal;
pub mod tts;
pub mod utils;

use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::ai::classifier::ReactionMode;
use crate::ai::persona::Persona;
use crate::config::{default_config_path, CompanionConfig};
use crate::conversation::{ControllerSettings, ConversationController};
use crate::terminal::Terminal;
use crate::tts::{EngineKind, SpeechDriver};

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub persona: Option<Persona>,
    pub mode: Option<ReactionMode>,
    pub engine: Option<EngineKind>,
    /// Write the effective config back before starting.
    pub save_config: bool,
}

/// Install the global tracing subscriber. Logs go to stderr so they do not
/// interleave with the chat on stdout. `RUST_LOG` overrides the default.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("avatar_companion_lib=info,avatar_companion=info")
        }))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn effective_config(options: &RunOptions) -> (CompanionConfig, PathBuf) {
    let path = options.config_path.clone().unwrap_or_else(default_config_path);
    let mut config = CompanionConfig::load(&path);
    if let Some(persona) = options.persona {
        config.persona = persona;
    }
    if let Some(mode) = options.mode {
        config.mode = mode;
    }
    if let Some(engine) = options.engine {
        config.speech.engine = engine;
    }
    (config, path)
}

/// Run the companion in the terminal until EOF or `/quit`.
pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    let (config, path) = effective_config(&options);
    if options.save_config {
        config
            .save(&path)
            .with_context(|| format!("saving config to {}", path.display()))?;
    }

    let speech = SpeechDriver::from_config(&config.speech);
    if !speech.is_available().await {
        tracing::warn!(
            "[TTS] Engine '{}' is not available; replies will be text only",
            speech.engine_id()
        );
    }
    let voices = speech
        .wait_for_voices(Duration::from_millis(config.speech.voice_wait_ms))
        .await;
    tracing::info!("[TTS] {} voice(s) available", voices);

    let controller = ConversationController::new(ControllerSettings::from(&config), speech);
    let renderer = terminal::spawn_renderer(&controller);

    println!(
        "Avatar Companion v{}  (/help for commands)",
        env!("CARGO_PKG_VERSION")
    );
    for message in controller.messages() {
        println!("{}> {}", controller.persona(), message.content());
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = Terminal::new(controller.clone()).run(stdin).await;

    controller.speech().cancel();
    renderer.abort();
    result.context("reading terminal input")
}
