//! Intent Classifier — maps raw chat input to a discrete reaction tag.
//!
//! Uses ordered keyword rule tables (fast, no model call). Rules are
//! evaluated in declaration order and the first match wins, so the
//! result for any input is fully determined by the table layout.
//!
//! Two disjoint tag spaces exist: emotions (tone and expression) and
//! actions (body emotes). A controller runs in exactly one of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::text::contains_any;

// ── Tag Types ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Excited,
    Thinking,
    Surprised,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Excited,
        Emotion::Thinking,
        Emotion::Surprised,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Excited => "excited",
            Emotion::Thinking => "thinking",
            Emotion::Surprised => "surprised",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient body motion shown as an overlay on the scene.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Emote {
    Walk,
    Jump,
    Dance,
    Wave,
}

impl Emote {
    pub const ALL: [Emote; 4] = [Emote::Walk, Emote::Jump, Emote::Dance, Emote::Wave];

    pub fn as_str(self) -> &'static str {
        match self {
            Emote::Walk => "walk",
            Emote::Jump => "jump",
            Emote::Dance => "dance",
            Emote::Wave => "wave",
        }
    }
}

impl fmt::Display for Emote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Emote::ALL
            .into_iter()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| format!("Unknown emote: {}", s))
    }
}

/// Which tag space a conversation reacts in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReactionMode {
    #[default]
    Emotion,
    Action,
}

impl FromStr for ReactionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "emotion" => Ok(ReactionMode::Emotion),
            "action" => Ok(ReactionMode::Action),
            other => Err(format!("Unknown reaction mode: {}", other)),
        }
    }
}

/// The classification result for one turn.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "space", content = "value", rename_all = "lowercase")]
pub enum Tag {
    Emotion(Emotion),
    Action(Option<Emote>),
}

impl Tag {
    /// Emotion used for speech tone and facial expression.
    /// Action turns speak with the neutral tone.
    pub fn emotion(&self) -> Emotion {
        match self {
            Tag::Emotion(e) => *e,
            Tag::Action(_) => Emotion::Neutral,
        }
    }

    pub fn emote(&self) -> Option<Emote> {
        match self {
            Tag::Emotion(_) => None,
            Tag::Action(a) => *a,
        }
    }
}

/// The emotion rule that matched. Several intents share an emotion, so
/// the responder keys its replies on this rather than on the tag.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Greeting,
    Gratitude,
    Sadness,
    Joke,
    Brainstorm,
    Surprise,
    Identity,
    Chat,
}

impl Intent {
    pub fn emotion(self) -> Emotion {
        match self {
            Intent::Greeting | Intent::Gratitude => Emotion::Happy,
            Intent::Sadness => Emotion::Sad,
            Intent::Joke => Emotion::Excited,
            Intent::Brainstorm => Emotion::Thinking,
            Intent::Surprise => Emotion::Surprised,
            Intent::Identity | Intent::Chat => Emotion::Neutral,
        }
    }
}

// ── Rule Tables ────────────────────────────────────────────

struct KeywordRule<T: 'static> {
    keywords: &'static [&'static str],
    /// Keyword must also end at a word boundary ("hi" must not match "hide").
    whole_word: bool,
    tag: T,
}

const INTENT_RULES: &[KeywordRule<Intent>] = &[
    KeywordRule {
        keywords: &["hi", "hello", "hey", "yo"],
        whole_word: true,
        tag: Intent::Greeting,
    },
    KeywordRule {
        keywords: &["thanks", "thank you", "appreciate"],
        whole_word: false,
        tag: Intent::Gratitude,
    },
    KeywordRule {
        keywords: &["sad", "down", "upset", "bad day"],
        whole_word: false,
        tag: Intent::Sadness,
    },
    KeywordRule {
        keywords: &["joke", "funny"],
        whole_word: false,
        tag: Intent::Joke,
    },
    KeywordRule {
        keywords: &["idea", "brainstorm", "think"],
        whole_word: false,
        tag: Intent::Brainstorm,
    },
    KeywordRule {
        keywords: &["wow", "no way", "really?", "amazing"],
        whole_word: false,
        tag: Intent::Surprise,
    },
    KeywordRule {
        keywords: &["your name", "who are you", "what are you"],
        whole_word: false,
        tag: Intent::Identity,
    },
];

const ACTION_RULES: &[KeywordRule<Emote>] = &[
    KeywordRule {
        keywords: &["dance", "groove", "music"],
        whole_word: true,
        tag: Emote::Dance,
    },
    KeywordRule {
        keywords: &["jump", "hop"],
        whole_word: true,
        tag: Emote::Jump,
    },
    KeywordRule {
        keywords: &["walk", "stroll", "run"],
        whole_word: true,
        tag: Emote::Walk,
    },
    KeywordRule {
        keywords: &["wave", "hello"],
        whole_word: true,
        tag: Emote::Wave,
    },
];

fn first_match<T: Copy>(rules: &[KeywordRule<T>], lower: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| contains_any(lower, rule.keywords, rule.whole_word))
        .map(|rule| rule.tag)
}

// ── Public API ─────────────────────────────────────────────

/// Find the first matching emotion rule, or `Intent::Chat`.
pub fn classify_intent(text: &str) -> Intent {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return Intent::Chat;
    }
    first_match(INTENT_RULES, &lower).unwrap_or(Intent::Chat)
}

/// Classify text into the emotion tag space. Empty input is neutral.
pub fn classify(text: &str) -> Emotion {
    classify_intent(text).emotion()
}

/// Classify text into the action tag space. Empty input has no action.
pub fn classify_action(text: &str) -> Option<Emote> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    first_match(ACTION_RULES, &lower)
}

/// Classify text in the given tag space.
pub fn classify_tag(text: &str, mode: ReactionMode) -> Tag {
    match mode {
        ReactionMode::Emotion => Tag::Emotion(classify(text)),
        ReactionMode::Action => Tag::Action(classify_action(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input_is_neutral() {
        assert_eq!(classify(""), Emotion::Neutral);
        assert_eq!(classify("   \n\t"), Emotion::Neutral);
        assert_eq!(classify_action(""), None);
    }

    #[test]
    fn greeting_outranks_gratitude() {
        assert_eq!(classify_intent("hello, thanks"), Intent::Greeting);
        assert_eq!(classify_intent("thanks, hello"), Intent::Greeting);
        assert_eq!(classify("hello, thanks"), Emotion::Happy);
    }

    #[test]
    fn each_rule_reachable() {
        assert_eq!(classify_intent("Hey there"), Intent::Greeting);
        assert_eq!(classify_intent("Thank you so much"), Intent::Gratitude);
        assert_eq!(classify("I had a bad day"), Emotion::Sad);
        assert_eq!(classify("tell me a joke"), Emotion::Excited);
        assert_eq!(classify("let's brainstorm"), Emotion::Thinking);
        assert_eq!(classify("WOW"), Emotion::Surprised);
        assert_eq!(classify_intent("what's your name"), Intent::Identity);
        assert_eq!(classify_intent("the weather today"), Intent::Chat);
    }

    #[test]
    fn sadness_outranks_joke() {
        assert_eq!(classify("I'm upset, cheer me up with a joke"), Emotion::Sad);
    }

    #[test]
    fn greeting_needs_word_boundaries() {
        assert_eq!(classify_intent("hide the keys"), Intent::Chat);
        assert_eq!(classify_intent("this is fine"), Intent::Chat);
        assert_eq!(classify_intent("you there"), Intent::Chat);
    }

    #[test]
    fn prefix_keywords_match_inflections() {
        assert_eq!(classify("any ideas?"), Emotion::Thinking);
        assert_eq!(classify("I'm thinking"), Emotion::Thinking);
        assert_eq!(classify("really appreciated"), Emotion::Happy);
    }

    #[test]
    fn sadness_matches_word_prefixes() {
        assert_eq!(classify("I feel sadness today"), Emotion::Sad);
        assert_eq!(classify("that is so upsetting"), Emotion::Sad);
        assert_eq!(classify("I'm saddened"), Emotion::Sad);
        assert_eq!(classify("feeling downhearted"), Emotion::Sad);
        // Still anchored at the start of a word
        assert_eq!(classify("a crusade"), Emotion::Neutral);
    }

    #[test]
    fn action_keywords() {
        assert_eq!(classify_action("let's dance"), Some(Emote::Dance));
        assert_eq!(classify_action("put on some MUSIC"), Some(Emote::Dance));
        assert_eq!(classify_action("can you hop"), Some(Emote::Jump));
        assert_eq!(classify_action("go for a stroll"), Some(Emote::Walk));
        assert_eq!(classify_action("hello!"), Some(Emote::Wave));
        assert_eq!(classify_action("what's up"), None);
    }

    #[test]
    fn action_priority_follows_table() {
        assert_eq!(classify_action("walk then dance"), Some(Emote::Dance));
        assert_eq!(classify_action("hello, jump"), Some(Emote::Jump));
    }

    #[test]
    fn action_needs_whole_words() {
        assert_eq!(classify_action("I hope so"), None);
        assert_eq!(classify_action("runtime error"), None);
    }

    #[test]
    fn tag_spaces_stay_separate() {
        let emotion = classify_tag("let's dance", ReactionMode::Emotion);
        assert_eq!(emotion, Tag::Emotion(Emotion::Neutral));
        assert_eq!(emotion.emote(), None);

        let action = classify_tag("let's dance", ReactionMode::Action);
        assert_eq!(action, Tag::Action(Some(Emote::Dance)));
        assert_eq!(action.emotion(), Emotion::Neutral);
    }

    #[test]
    fn parses_modes_and_emotes() {
        assert_eq!("Action".parse::<ReactionMode>(), Ok(ReactionMode::Action));
        assert_eq!("wave".parse::<Emote>(), Ok(Emote::Wave));
        assert!("fly".parse::<Emote>().is_err());
    }

    proptest! {
        #[test]
        fn classify_is_total_and_deterministic(s in ".*") {
            let first = classify(&s);
            prop_assert!(Emotion::ALL.contains(&first));
            prop_assert_eq!(first, classify(&s));
            prop_assert_eq!(classify_action(&s), classify_action(&s));
        }
    }
}
