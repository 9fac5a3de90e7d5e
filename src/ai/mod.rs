pub mod classifier;
pub mod expression_driver;
pub mod persona;
pub mod responder;
pub mod typing_sim;

pub use classifier::{classify, classify_action, classify_tag, Emote, Emotion, ReactionMode, Tag};
pub use persona::Persona;
pub use responder::respond;
pub use typing_sim::ThinkingDelay;
