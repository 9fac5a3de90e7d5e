use serde::Serialize;

use crate::ai::classifier::Emote;

/// The token the scene host shows over the 3D scene.
///
/// The host only displays it; clearing is the controller's job.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SceneOverlay {
    pub emote: Option<Emote>,
}

impl SceneOverlay {
    pub fn from_emote(emote: Option<Emote>) -> Self {
        Self { emote }
    }

    pub fn is_visible(&self) -> bool {
        self.emote.is_some()
    }

    pub fn icon(&self) -> Option<&'static str> {
        self.emote.map(|e| match e {
            Emote::Walk => "🚶",
            Emote::Jump => "⤴",
            Emote::Dance => "🎉",
            Emote::Wave => "👋",
        })
    }

    /// Short caption, e.g. `🎉 dance`. Empty when hidden.
    pub fn caption(&self) -> String {
        match (self.icon(), self.emote) {
            (Some(icon), Some(emote)) => format!("{} {}", icon, emote.as_str()),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_without_emote() {
        let overlay = SceneOverlay::from_emote(None);
        assert!(!overlay.is_visible());
        assert_eq!(overlay.caption(), "");
    }

    #[test]
    fn caption_names_emote() {
        let overlay = SceneOverlay::from_emote(Some(Emote::Dance));
        assert!(overlay.is_visible());
        assert_eq!(overlay.caption(), "🎉 dance");
    }
}
