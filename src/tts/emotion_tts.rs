//! Emotion-driven speech tone.
//!
//! Maps the turn's emotion to pitch and rate multipliers so the companion's
//! voice sounds like it matches the expression on its face.

use super::interface::ToneParams;
use crate::ai::classifier::Emotion;

/// Tone used when no emotion applies.
pub const DEFAULT_TONE: ToneParams = ToneParams {
    pitch: 1.05,
    rate: 1.02,
};

/// Look up the tone for an emotion.
pub fn tone_for(emotion: Emotion) -> ToneParams {
    let (pitch, rate) = match emotion {
        Emotion::Happy => (1.2, 1.04),      // Brighter, a touch faster
        Emotion::Sad => (0.9, 0.95),        // Lower and slower
        Emotion::Excited => (1.25, 1.12),   // Higher and noticeably faster
        Emotion::Thinking => (1.0, 0.98),   // Even pitch, unhurried
        Emotion::Surprised => (1.3, 1.05),  // Highest pitch
        Emotion::Neutral => return DEFAULT_TONE,
    };
    ToneParams { pitch, rate }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_uses_default() {
        assert_eq!(tone_for(Emotion::Neutral), DEFAULT_TONE);
    }

    #[test]
    fn happy_is_brighter_than_sad() {
        let happy = tone_for(Emotion::Happy);
        let sad = tone_for(Emotion::Sad);
        assert!(happy.pitch > sad.pitch);
        assert!(happy.rate > sad.rate);
    }

    #[test]
    fn table_values() {
        assert_eq!(
            tone_for(Emotion::Excited),
            ToneParams {
                pitch: 1.25,
                rate: 1.12
            }
        );
        assert_eq!(
            tone_for(Emotion::Surprised),
            ToneParams {
                pitch: 1.3,
                rate: 1.05
            }
        );
        assert_eq!(
            tone_for(Emotion::Thinking),
            ToneParams {
                pitch: 1.0,
                rate: 0.98
            }
        );
    }
}
