//! Presentation contracts — what the renderer, scene host and controls
//! consume. Nothing in here mutates conversation state directly; controls
//! hand their intent back to the controller.

pub mod controls;
pub mod overlay;

use serde::Serialize;

use crate::ai::classifier::Emotion;
use crate::ai::expression_driver::{compute_expression_frame, ExpressionFrame};
use crate::ai::persona::{Persona, PersonaTheme};

pub use controls::{ActionButton, ActionsBar, PersonaSwitcher};
pub use overlay::SceneOverlay;

const WAVEFORM_BARS: usize = 12;
const BAR_REST_HEIGHT: u8 = 6;

/// Everything the avatar renderer is a function of.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AvatarState {
    pub speaking: bool,
    pub emotion: Emotion,
    pub persona: Persona,
}

impl AvatarState {
    pub fn expression(&self) -> ExpressionFrame {
        compute_expression_frame(self.emotion, self.speaking, self.persona.expressiveness())
    }

    pub fn theme(&self) -> PersonaTheme {
        self.persona.theme()
    }

    pub fn status_label(&self) -> &'static str {
        if self.speaking {
            "Speaking…"
        } else {
            "Idle"
        }
    }

    /// Heights of the speaking indicator bars. Flat at rest.
    pub fn waveform(&self) -> [u8; WAVEFORM_BARS] {
        let mut bars = [BAR_REST_HEIGHT; WAVEFORM_BARS];
        if self.speaking {
            for (idx, bar) in bars.iter_mut().enumerate() {
                *bar = BAR_REST_HEIGHT + ((idx * 7) % 18) as u8;
            }
        }
        bars
    }
}
