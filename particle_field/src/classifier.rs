//! Gesture classification.
//!
//! Turns one [`HandObservation`] into a [`Mode`] plus the two auxiliary
//! points the force field needs.  Classification is a pure function of the
//! observation; one-shot behaviour (the explosion burst) lives in
//! [`crate::transition`].
//!
//! ## Rules (first match wins)
//!
//! | Hands | Condition | Mode |
//! |---|---|---|
//! | 2 | wrists more than 0.15 apart | `Explosion` |
//! | 1 | every fingertip > 0.15 from palm centre | `Repel` (open palm) |
//! | 1 | every fingertip < 0.12 from palm centre | `Attract` (fist) |
//! | any other | — | `None` |

use crate::landmark::{Canvas, HandObservation, Point};

/// Minimum wrist separation (normalized) for two detections to count as two hands.
pub const TWO_HAND_MIN_WRIST_DIST: f32 = 0.15;
/// Every fingertip must be farther than this from the palm for an open palm.
pub const OPEN_PALM_MIN_SPREAD:    f32 = 0.15;
/// Every fingertip must be closer than this to the palm for a fist.
pub const FIST_MAX_SPREAD:         f32 = 0.12;

// ════════════════════════════════════════════════════════════════════════════
// Mode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    None,
    Repel,
    Attract,
    Explosion,
}

impl Mode {
    /// True for every mode that actively drives the particles.
    pub fn is_gesture(self) -> bool { self != Mode::None }

    pub fn label(self) -> &'static str {
        match self {
            Mode::None      => "NONE",
            Mode::Repel     => "REPEL",
            Mode::Attract   => "ATTRACT",
            Mode::Explosion => "EXPLOSION",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classification
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Classification {
    pub mode:      Mode,
    /// First hand's index fingertip in canvas pixels, unmirrored.
    /// Present whenever at least one hand is, regardless of mode.
    pub fingertip: Option<Point>,
    /// Mirrored wrist midpoint, only set when `mode == Explosion`.
    pub midpoint:  Option<Point>,
}

pub fn classify(obs: &HandObservation, canvas: Canvas) -> Classification {
    let fingertip = obs.first().map(|h| canvas.scale(h.index_tip()));

    if obs.len() == 2 {
        let (a, b) = (obs.hands[0].wrist(), obs.hands[1].wrist());
        if a.distance(b) > TWO_HAND_MIN_WRIST_DIST {
            let mid = canvas.mirror(canvas.scale(a.midpoint(b)));
            return Classification { mode: Mode::Explosion, fingertip, midpoint: Some(mid) };
        }
    }

    let mode = match obs.hands.as_slice() {
        [hand] => {
            let spread = hand.fingertip_spread();
            if spread.iter().all(|&d| d > OPEN_PALM_MIN_SPREAD) {
                Mode::Repel
            } else if spread.iter().all(|&d| d < FIST_MAX_SPREAD) {
                Mode::Attract
            } else {
                Mode::None
            }
        }
        _ => Mode::None,
    };

    Classification { mode, fingertip, midpoint: None }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::landmark::{Hand, Landmark, FINGERTIPS, MIDDLE_MCP, WRIST};

    /// A hand whose palm centre sits at (`px`, `py`) and whose fingertips are
    /// at the given distances from it.
    pub(crate) fn hand_with_spread(px: f32, py: f32, spread: [f32; 5]) -> Hand {
        let mut lms = [Landmark::new(px, py); 21];
        lms[WRIST]      = Landmark::new(px, py + 0.05);
        lms[MIDDLE_MCP] = Landmark::new(px, py - 0.05);
        for (k, &tip) in FINGERTIPS.iter().enumerate() {
            let angle = -std::f32::consts::FRAC_PI_2 + (k as f32 - 2.0) * 0.3;
            lms[tip] = Landmark::new(px + spread[k] * angle.cos(), py + spread[k] * angle.sin());
        }
        Hand::new(lms)
    }

    pub(crate) fn open_palm(px: f32, py: f32) -> Hand { hand_with_spread(px, py, [0.3; 5]) }
    pub(crate) fn fist(px: f32, py: f32)      -> Hand { hand_with_spread(px, py, [0.05; 5]) }

    const CANVAS: Canvas = Canvas::new(640.0, 480.0);

    #[test]
    fn no_hands_is_none() {
        let c = classify(&HandObservation::empty(), CANVAS);
        assert_eq!(c.mode, Mode::None);
        assert_eq!(c.fingertip, None);
    }

    #[test]
    fn open_palm_repels() {
        let obs = HandObservation::new(vec![open_palm(0.5, 0.5)]);
        assert_eq!(classify(&obs, CANVAS).mode, Mode::Repel);
    }

    #[test]
    fn fist_attracts() {
        let obs = HandObservation::new(vec![fist(0.5, 0.5)]);
        assert_eq!(classify(&obs, CANVAS).mode, Mode::Attract);
    }

    #[test]
    fn mixed_hand_is_none_but_keeps_fingertip() {
        let hand = hand_with_spread(0.5, 0.5, [0.3, 0.3, 0.05, 0.05, 0.3]);
        let tip = CANVAS.scale(hand.index_tip());
        let c = classify(&HandObservation::new(vec![hand]), CANVAS);
        assert_eq!(c.mode, Mode::None);
        assert_eq!(c.fingertip, Some(tip));
    }

    #[test]
    fn two_hands_far_apart_explode() {
        let obs = HandObservation::new(vec![fist(0.3, 0.5), fist(0.5, 0.5)]);
        let c = classify(&obs, CANVAS);
        assert_eq!(c.mode, Mode::Explosion);
        let mid = c.midpoint.unwrap();
        // wrists at x = 0.3 / 0.5 → average 0.4 → mirrored 0.6 of width
        assert!((mid.x - 0.6 * 640.0).abs() < 1e-3);
        assert!((mid.y - 0.55 * 480.0).abs() < 1e-3);
    }

    #[test]
    fn two_hands_too_close_never_explode() {
        let obs = HandObservation::new(vec![open_palm(0.50, 0.5), open_palm(0.55, 0.5)]);
        let c = classify(&obs, CANVAS);
        assert_eq!(c.mode, Mode::None);
        assert_eq!(c.midpoint, None);
    }

    #[test]
    fn three_hands_is_none() {
        let obs = HandObservation::new(vec![open_palm(0.1, 0.5), open_palm(0.5, 0.5), open_palm(0.9, 0.5)]);
        assert_eq!(classify(&obs, CANVAS).mode, Mode::None);
    }

    #[test]
    fn classification_is_deterministic() {
        let obs = HandObservation::new(vec![open_palm(0.4, 0.6)]);
        assert_eq!(classify(&obs, CANVAS), classify(&obs, CANVAS));
    }
}
