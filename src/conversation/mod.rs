pub mod composer;
pub mod controller;
pub mod events;
pub mod history;

pub use composer::{Composer, Key};
pub use controller::{ControllerSettings, ConversationController, Turn};
pub use events::CompanionEvent;
pub use history::{History, Message, Role};
