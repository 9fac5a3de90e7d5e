use clap::Parser;
use std::path::PathBuf;

use avatar_companion_lib::ai::classifier::ReactionMode;
use avatar_companion_lib::ai::persona::Persona;
use avatar_companion_lib::tts::EngineKind;
use avatar_companion_lib::RunOptions;

/// Chat with an animated companion that talks back and emotes.
#[derive(Parser)]
#[command(name = "avatar-companion", version, about)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Persona to start as (Chitti, Vikki, Nova).
    #[arg(short, long)]
    persona: Option<Persona>,

    /// React with facial emotions or body emotes (emotion, action).
    #[arg(short, long)]
    mode: Option<ReactionMode>,

    /// Speech engine (simulated, command, none).
    #[arg(short, long)]
    engine: Option<EngineKind>,

    /// Save the effective config before starting.
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    avatar_companion_lib::init_logging();

    let cli = Cli::parse();
    avatar_companion_lib::run(RunOptions {
        config_path: cli.config,
        persona: cli.persona,
        mode: cli.mode,
        engine: cli.engine,
        save_config: cli.save_config,
    })
    .await
}
