//! Chat input draft.
//!
//! Enter sends, Shift+Enter starts a new line. Sending trims the draft and
//! clears it; a draft that is empty after trimming is not sent and is left
//! untouched.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
}

#[derive(Debug, Default)]
pub struct Composer {
    draft: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Handle a key press. Returns the text to submit when the key sends.
    pub fn on_key(&mut self, key: Key, shift: bool) -> Option<String> {
        match key {
            Key::Enter if shift => {
                self.draft.push('\n');
                None
            }
            Key::Enter => self.send(),
            Key::Backspace => {
                self.draft.pop();
                None
            }
            Key::Char(c) => {
                self.draft.push(c);
                None
            }
        }
    }

    /// The explicit send action.
    pub fn send(&mut self) -> Option<String> {
        let text = self.draft.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        self.draft.clear();
        Some(text)
    }
}
