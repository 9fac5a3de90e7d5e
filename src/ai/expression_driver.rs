//! Expression Driver — turns the avatar state into face parameters.
//!
//! The avatar renderer is a pure function of `{speaking, emotion, persona}`;
//! this module does the numeric part of that mapping so every renderer
//! draws the same face for the same state.

use serde::Serialize;

use super::classifier::Emotion;

/// A single frame of expression parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionFrame {
    pub emotion: Emotion,
    pub speaking: bool,
    /// Expression intensity (0.0 = subtle, 1.0 = exaggerated).
    pub intensity: f32,
    pub micro: MicroExpressions,
}

/// Fine-grained facial parameters.
#[derive(Debug, Clone, Serialize)]
pub struct MicroExpressions {
    /// Blink frequency modifier (0.0 = rarely, 1.0 = frequently).
    pub blink_rate: f32,
    /// Mouth curve: -1.0 = frown, 0.0 = neutral, 1.0 = smile.
    pub mouth_curve: f32,
    /// Mouth openness: 0.0 = closed, 1.0 = wide open. Animated while speaking.
    pub mouth_open: f32,
    /// Eyebrow position: -1.0 = furrowed, 0.0 = neutral, 1.0 = raised.
    pub eyebrow_position: f32,
    /// Eye openness: 0.0 = squinting, 0.5 = normal, 1.0 = wide.
    pub eye_openness: f32,
    /// Head tilt: -1.0 = left, 0.0 = center, 1.0 = right.
    pub head_tilt: f32,
}

/// Compute an expression frame.
///
/// `expressiveness` (0.0-1.0) scales how far the face moves from rest.
pub fn compute_expression_frame(
    emotion: Emotion,
    speaking: bool,
    expressiveness: f32,
) -> ExpressionFrame {
    let (blink, mouth, eyebrow, eye_open, tilt) = match emotion {
        Emotion::Happy => (0.4, 0.7, 0.3, 0.6, 0.1),
        Emotion::Excited => (0.6, 0.9, 0.5, 0.8, 0.2),
        Emotion::Sad => (0.3, -0.5, -0.3, 0.3, -0.1),
        Emotion::Surprised => (0.1, 0.3, 0.8, 1.0, 0.0),
        Emotion::Thinking => (0.3, 0.0, 0.4, 0.4, 0.3),
        Emotion::Neutral => (0.3, 0.0, 0.0, 0.5, 0.0),
    };

    let intensity = expressiveness.clamp(0.0, 1.0);
    let scale = 0.5 + intensity * 0.5; // Range: 0.5–1.0

    // Open mouth while speaking, wider for high-energy emotions
    let mouth_open = if speaking {
        match emotion {
            Emotion::Excited | Emotion::Surprised => 0.8,
            Emotion::Sad | Emotion::Thinking => 0.4,
            _ => 0.6,
        }
    } else if emotion == Emotion::Surprised {
        0.3
    } else {
        0.0
    };

    ExpressionFrame {
        emotion,
        speaking,
        intensity,
        micro: MicroExpressions {
            blink_rate: (blink * scale).clamp(0.0, 1.0),
            mouth_curve: (mouth * scale).clamp(-1.0, 1.0),
            mouth_open: (mouth_open * scale).clamp(0.0, 1.0),
            eyebrow_position: (eyebrow * scale).clamp(-1.0, 1.0),
            eye_openness: (eye_open * scale).clamp(0.0, 1.0),
            head_tilt: (tilt * scale).clamp(-1.0, 1.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_character_smiles() {
        let frame = compute_expression_frame(Emotion::Happy, false, 0.7);
        assert!(frame.micro.mouth_curve > 0.3);
    }

    #[test]
    fn sad_character_frowns() {
        let frame = compute_expression_frame(Emotion::Sad, false, 0.7);
        assert!(frame.micro.mouth_curve < 0.0);
    }

    #[test]
    fn mouth_opens_only_while_speaking() {
        let quiet = compute_expression_frame(Emotion::Neutral, false, 0.6);
        let talking = compute_expression_frame(Emotion::Neutral, true, 0.6);
        assert_eq!(quiet.micro.mouth_open, 0.0);
        assert!(talking.micro.mouth_open > 0.0);
    }

    #[test]
    fn surprised_has_wide_eyes() {
        let frame = compute_expression_frame(Emotion::Surprised, false, 0.8);
        assert!(frame.micro.eye_openness > 0.7);
    }

    #[test]
    fn all_values_in_range() {
        for emotion in Emotion::ALL {
            for speaking in [false, true] {
                for expr in [-1.0, 0.0, 0.5, 1.0, 2.0] {
                    let f = compute_expression_frame(emotion, speaking, expr);
                    assert!((0.0..=1.0).contains(&f.intensity));
                    assert!((0.0..=1.0).contains(&f.micro.blink_rate));
                    assert!((-1.0..=1.0).contains(&f.micro.mouth_curve));
                    assert!((0.0..=1.0).contains(&f.micro.mouth_open));
                    assert!((-1.0..=1.0).contains(&f.micro.eyebrow_position));
                    assert!((0.0..=1.0).contains(&f.micro.eye_openness));
                    assert!((-1.0..=1.0).contains(&f.micro.head_tilt));
                }
            }
        }
    }
}
