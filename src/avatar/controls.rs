//! Actions bar and persona switcher.

use crate::ai::classifier::Emote;
use crate::ai::persona::Persona;
use crate::conversation::ConversationController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionButton {
    pub label: &'static str,
    /// `None` is the clear button.
    pub emote: Option<Emote>,
}

const ACTION_BUTTONS: [ActionButton; 5] = [
    ActionButton {
        label: "Walk",
        emote: Some(Emote::Walk),
    },
    ActionButton {
        label: "Jump",
        emote: Some(Emote::Jump),
    },
    ActionButton {
        label: "Dance",
        emote: Some(Emote::Dance),
    },
    ActionButton {
        label: "Wave",
        emote: Some(Emote::Wave),
    },
    ActionButton {
        label: "Clear",
        emote: None,
    },
];

/// Manual emote triggers. Pressing a button goes through the controller so
/// the auto-clear timer is shared with chat-triggered emotes.
pub struct ActionsBar {
    controller: ConversationController,
}

impl ActionsBar {
    pub fn new(controller: ConversationController) -> Self {
        Self { controller }
    }

    pub fn buttons(&self) -> &'static [ActionButton] {
        &ACTION_BUTTONS
    }

    /// Press a button by label (case-insensitive). Returns the button if
    /// one matched.
    pub fn press(&self, label: &str) -> Option<ActionButton> {
        let label = label.trim();
        let button = ACTION_BUTTONS
            .iter()
            .find(|b| b.label.eq_ignore_ascii_case(label))
            .copied()?;
        tracing::debug!("[Avatar] Action button {}", button.label);
        self.controller.trigger_emote(button.emote);
        Some(button)
    }
}

type ChangeHandler = Box<dyn Fn(Persona) + Send + Sync>;

/// Two-state persona toggle. The switcher only offers Chitti and Vikki;
/// other personas are reachable through configuration.
pub struct PersonaSwitcher {
    value: Persona,
    on_change: Option<ChangeHandler>,
}

impl PersonaSwitcher {
    pub const OPTIONS: [Persona; 2] = [Persona::Chitti, Persona::Vikki];

    pub fn new(value: Persona) -> Self {
        Self {
            value,
            on_change: None,
        }
    }

    pub fn on_change(mut self, f: impl Fn(Persona) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Switcher wired straight to a controller.
    pub fn for_controller(controller: &ConversationController) -> Self {
        let controller = controller.clone();
        Self::new(controller.persona()).on_change(move |p| controller.set_persona(p))
    }

    pub fn value(&self) -> Persona {
        self.value
    }

    /// Whether `persona` is the pressed option.
    pub fn is_pressed(&self, persona: Persona) -> bool {
        self.value == persona
    }

    /// Select an option. Returns `false` for personas the switcher does
    /// not offer.
    pub fn select(&mut self, persona: Persona) -> bool {
        if !Self::OPTIONS.contains(&persona) {
            return false;
        }
        self.value = persona;
        if let Some(handler) = &self.on_change {
            handler(persona);
        }
        true
    }

    /// Flip to the other option. Anything other than Chitti flips to Chitti.
    pub fn toggle(&mut self) -> Persona {
        let next = if self.value == Persona::Chitti {
            Persona::Vikki
        } else {
            Persona::Chitti
        };
        self.select(next);
        next
    }
}
