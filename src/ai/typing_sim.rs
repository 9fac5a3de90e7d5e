//! Typing Simulation — the short "thinking" pause before a reply.
//!
//! The pause is a presentation choice: the reply is already known, the
//! delay only makes the companion feel like it is considering the message.
//! Delays are drawn uniformly from a configured window.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThinkingDelay {
    #[serde(default = "default_min_ms")]
    pub min_ms: u64,
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

fn default_min_ms() -> u64 {
    250
}
fn default_max_ms() -> u64 {
    350
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        Self {
            min_ms: default_min_ms(),
            max_ms: default_max_ms(),
        }
    }
}

impl ThinkingDelay {
    /// A delay that always takes exactly `ms`.
    pub fn fixed(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
        }
    }

    /// Draw a delay for the next reply. A reversed window is treated as fixed
    /// at its minimum.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }
}
