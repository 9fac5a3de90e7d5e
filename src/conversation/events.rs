use serde::Serialize;

use super::history::Message;
use crate::ai::classifier::{Emote, Emotion};
use crate::ai::persona::Persona;

/// State changes published by the conversation controller.
///
/// Presentation consumers subscribe to these and never write back.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompanionEvent {
    MessageAppended { index: usize, message: Message },
    HistoryReset { persona: Persona, seed: Message },
    SpeakingChanged { speaking: bool },
    EmotionChanged { emotion: Emotion },
    EmoteChanged { emote: Option<Emote> },
    PersonaChanged { persona: Persona },
}
