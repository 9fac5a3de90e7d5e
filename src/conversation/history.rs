use serde::{Deserialize, Serialize};

use crate::ai::persona::Persona;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat line. Immutable once created.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Append-only message log for one session.
///
/// Messages are never edited or reordered; the only other mutation is a
/// wholesale reset to a single seed greeting.
#[derive(Debug, Clone)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    /// A fresh history holding the persona's greeting.
    pub fn seeded(persona: Persona) -> Self {
        Self {
            messages: vec![Message::assistant(persona.seed_greeting())],
        }
    }

    /// Append a message, returning its index.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Replace everything with the persona's greeting.
    pub fn reset(&mut self, persona: Persona) {
        self.messages = vec![Message::assistant(persona.seed_greeting())];
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
