//! Line-oriented terminal front end.
//!
//! Plain lines are chat input. A trailing `\` continues the message on the
//! next line (Shift+Enter). Lines starting with `/` are commands when no
//! message is being composed.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::ai::persona::Persona;
use crate::avatar::{ActionsBar, PersonaSwitcher, SceneOverlay};
use crate::conversation::{CompanionEvent, Composer, ConversationController, Key, Message, Role};

const HELP: &str = "\
Commands:
  /persona <name>   switch persona (Chitti, Vikki, Nova)
  /toggle           flip between Chitti and Vikki
  /emote <name>     walk, jump, dance, wave or clear
  /history          print the conversation so far
  /help             show this help
  /quit             leave
End a line with \\ to keep typing on the next line.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Persona(String),
    Toggle,
    Emote(String),
    History,
    Help,
    Quit,
    Unknown(String),
}

/// Parse a `/command`. Returns `None` for ordinary chat lines.
pub fn parse_command(line: &str) -> Option<Command> {
    let rest = line.trim().strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let command = match name.to_lowercase().as_str() {
        "persona" => Command::Persona(arg.to_string()),
        "toggle" => Command::Toggle,
        "emote" => Command::Emote(arg.to_string()),
        "history" => Command::History,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(name.to_string()),
    };
    Some(command)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Terminal {
    controller: ConversationController,
    composer: Composer,
    switcher: PersonaSwitcher,
    actions: ActionsBar,
}

impl Terminal {
    pub fn new(controller: ConversationController) -> Self {
        Self {
            switcher: PersonaSwitcher::for_controller(&controller),
            actions: ActionsBar::new(controller.clone()),
            composer: Composer::new(),
            controller,
        }
    }

    pub fn draft(&self) -> &str {
        self.composer.draft()
    }

    /// Feed one input line. Output for commands is returned as text.
    pub fn handle_line(&mut self, line: &str) -> (Flow, Option<String>) {
        if self.composer.draft().is_empty() {
            if let Some(command) = parse_command(line) {
                return self.run_command(command);
            }
        }

        let (body, continued) = match line.strip_suffix('\\') {
            Some(body) => (body, true),
            None => (line, false),
        };
        for c in body.chars() {
            self.composer.on_key(Key::Char(c), false);
        }
        if let Some(text) = self.composer.on_key(Key::Enter, continued) {
            self.controller.submit(&text);
        } else if !continued {
            // Whitespace-only; nothing to keep
            self.composer.set_draft("");
        }
        (Flow::Continue, None)
    }

    fn run_command(&mut self, command: Command) -> (Flow, Option<String>) {
        let output = match command {
            Command::Persona(name) => match name.parse::<Persona>() {
                Ok(persona) => {
                    if !self.switcher.select(persona) {
                        self.controller.set_persona(persona);
                    }
                    None
                }
                Err(e) => Some(e),
            },
            Command::Toggle => {
                self.switcher.toggle();
                None
            }
            Command::Emote(name) => match self.actions.press(&name) {
                Some(_) => None,
                None => {
                    let names: Vec<&str> = self.actions.buttons().iter().map(|b| b.label).collect();
                    Some(format!("Unknown emote {:?}. Try one of: {}", name, names.join(", ")))
                }
            },
            Command::History => Some(
                self.controller
                    .messages()
                    .iter()
                    .map(|m| format_message(m, self.controller.persona()))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Command::Help => Some(HELP.to_string()),
            Command::Quit => return (Flow::Quit, None),
            Command::Unknown(name) => Some(format!("Unknown command /{}. Type /help.", name)),
        };
        (Flow::Continue, output)
    }

    /// Read lines until EOF or `/quit`.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> std::io::Result<()> {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let (flow, output) = self.handle_line(&line);
            if let Some(output) = output {
                println!("{}", output);
            }
            if flow == Flow::Quit {
                break;
            }
        }
        Ok(())
    }
}

// ── Rendering ──────────────────────────────────────────

fn format_message(message: &Message, persona: Persona) -> String {
    match message.role() {
        Role::User => format!("you> {}", message.content()),
        Role::Assistant => format!("{}> {}", persona, message.content()),
    }
}

/// One printable line for an event, or `None` for events not shown.
pub fn render_event(event: &CompanionEvent, persona: Persona) -> Option<String> {
    match event {
        // The terminal already echoes what the user typed
        CompanionEvent::MessageAppended { message, .. } if message.role() == Role::User => None,
        CompanionEvent::MessageAppended { message, .. } => Some(format_message(message, persona)),
        CompanionEvent::HistoryReset { persona, seed } => Some(format!(
            "── {} ──\n{}",
            persona,
            format_message(seed, *persona)
        )),
        CompanionEvent::SpeakingChanged { speaking: true } => Some("  (speaking…)".to_string()),
        CompanionEvent::SpeakingChanged { speaking: false } => None,
        CompanionEvent::EmotionChanged { emotion } => Some(format!("  [{}]", emotion)),
        CompanionEvent::EmoteChanged { emote: None } => None,
        CompanionEvent::EmoteChanged { emote } => {
            Some(format!("  {}", SceneOverlay::from_emote(*emote).caption()))
        }
        CompanionEvent::PersonaChanged { .. } => None,
    }
}

/// Print controller events as they arrive.
pub fn spawn_renderer(controller: &ConversationController) -> JoinHandle<()> {
    let mut rx = controller.subscribe();
    let controller = controller.clone();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(line) = render_event(&event, controller.persona()) {
                        println!("{}", line);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("[Terminal] Renderer skipped {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
