//! Local reply brain — persona-flavoured canned replies.
//!
//! Deterministic and total: every input, including the empty string,
//! produces a non-empty reply. No model call is involved.

use super::classifier::{classify_intent, Emote, Intent, Tag};
use super::persona::Persona;

fn intent_reply(intent: Intent, persona: Persona, input: &str) -> String {
    match intent {
        Intent::Greeting => format!("Hello! I'm {}. Great to meet you.", persona),
        Intent::Gratitude => "You're welcome! Happy to help.".to_string(),
        Intent::Sadness => "I'm here for you. Want to talk about it?".to_string(),
        Intent::Joke => concat!(
            "Okay, one quick joke: Why did the developer go broke? ",
            "Because he used up all his cache."
        )
        .to_string(),
        Intent::Brainstorm => "Let's think this through together.".to_string(),
        Intent::Surprise => "Wild, right?".to_string(),
        Intent::Identity => format!(
            "I'm {}, your virtual friend — here to chat in natural language.",
            persona
        ),
        Intent::Chat => format!("{}: {} — got it. Here's what I think…", persona, input),
    }
}

fn emote_reply(emote: Emote, persona: Persona) -> String {
    match emote {
        Emote::Dance => format!("Cue the music! {} is dancing for you.", persona),
        Emote::Jump => "Up we go! Watch me jump.".to_string(),
        Emote::Walk => "Taking a little stroll around the scene.".to_string(),
        Emote::Wave => format!("*waves* Hi there, {} says hello!", persona),
    }
}

/// The prompt shown when there is nothing to respond to.
pub fn canned_prompt(persona: Persona) -> String {
    format!("Hi, I'm {}. How can I help today?", persona)
}

/// Compute the assistant reply for one turn.
///
/// Action tags with an emote answer with a motion line; everything else
/// is answered from the emotion rules, falling back to echoing the
/// trimmed input.
pub fn respond(text: &str, persona: Persona, tag: Tag) -> String {
    let input = text.trim();
    if input.is_empty() {
        return canned_prompt(persona);
    }

    if let Some(emote) = tag.emote() {
        return emote_reply(emote, persona);
    }

    intent_reply(classify_intent(input), persona, input)
}
