//! Persona table — the named identities the avatar can present as.
//!
//! Each persona is a plain data record: display name, a voice gender hint
//! for voice selection, and a theme of palette tokens for the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tts::Gender;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Persona {
    #[default]
    Chitti,
    Vikki,
    Nova,
}

/// Palette tokens consumed by the presentation layer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PersonaTheme {
    pub accent: &'static str,
    pub face: &'static str,
    pub glow: &'static str,
    pub bubble: &'static str,
}

struct PersonaRecord {
    persona: Persona,
    name: &'static str,
    voice_hint: Gender,
    /// How far the face moves from rest (0.0-1.0).
    expressiveness: f32,
    theme: PersonaTheme,
}

const PERSONAS: &[PersonaRecord] = &[
    PersonaRecord {
        persona: Persona::Chitti,
        name: "Chitti",
        voice_hint: Gender::Male,
        expressiveness: 0.6,
        theme: PersonaTheme {
            accent: "#0ea5e9",
            face: "#e0f2fe",
            glow: "#38bdf8",
            bubble: "#f4f4f5",
        },
    },
    PersonaRecord {
        persona: Persona::Vikki,
        name: "Vikki",
        voice_hint: Gender::Female,
        expressiveness: 0.8,
        theme: PersonaTheme {
            accent: "#ec4899",
            face: "#fce7f3",
            glow: "#f472b6",
            bubble: "#fdf2f8",
        },
    },
    PersonaRecord {
        persona: Persona::Nova,
        name: "Nova",
        voice_hint: Gender::Neutral,
        expressiveness: 0.5,
        theme: PersonaTheme {
            accent: "#18181b",
            face: "#a1a1aa",
            glow: "#22c55e",
            bubble: "#f4f4f5",
        },
    },
];

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Chitti, Persona::Vikki, Persona::Nova];

    fn record(self) -> &'static PersonaRecord {
        // Every variant has an entry; fall back to the first for safety.
        PERSONAS
            .iter()
            .find(|r| r.persona == self)
            .unwrap_or(&PERSONAS[0])
    }

    pub fn name(self) -> &'static str {
        self.record().name
    }

    pub fn voice_hint(self) -> Gender {
        self.record().voice_hint
    }

    pub fn expressiveness(self) -> f32 {
        self.record().expressiveness
    }

    pub fn theme(self) -> PersonaTheme {
        self.record().theme
    }

    /// The assistant message a fresh session opens with.
    pub fn seed_greeting(self) -> String {
        format!(
            "Hi! I'm {}. I chat like a person, speak aloud, and show expressions.",
            self.name()
        )
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PERSONAS
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(wanted))
            .map(|r| r.persona)
            .ok_or_else(|| format!("Unknown persona: {}", s))
    }
}
