//! Hand landmark model.
//!
//! The tracker reports each detected hand as 21 normalized points in the
//! usual hand-skeleton order.  Only a handful of them matter here: the wrist,
//! the middle-finger knuckle (for the palm centre) and the five fingertips.

use crate::error::TrackingError;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARKS_PER_HAND: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP:   usize = 16;
pub const PINKY_TIP:  usize = 20;

/// All five fingertips, thumb first.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

// ════════════════════════════════════════════════════════════════════════════
// Point — canvas-space position
// ════════════════════════════════════════════════════════════════════════════

/// A position in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Point { x, y } }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — frame dimensions supplied by the frame clock
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width:  f32,
    pub height: f32,
}

impl Canvas {
    pub const fn new(width: f32, height: f32) -> Self { Canvas { width, height } }

    /// Scale a normalized landmark to canvas pixels (no mirroring).
    pub fn scale(&self, lm: Landmark) -> Point {
        Point::new(lm.x * self.width, lm.y * self.height)
    }

    /// Flip a canvas point horizontally to match the mirrored video feed.
    pub fn mirror(&self, p: Point) -> Point {
        Point::new(self.width - p.x, p.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark / Hand / HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One normalized skeleton point, `x` and `y` in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self { Landmark { x, y } }

    pub fn distance(self, other: Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: Landmark) -> Landmark {
        Landmark::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A complete hand skeleton.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub landmarks: [Landmark; LANDMARKS_PER_HAND],
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARKS_PER_HAND]) -> Self { Hand { landmarks } }

    /// Build a hand from a tracker-supplied point list.
    pub fn from_points(points: Vec<Landmark>) -> Result<Hand, TrackingError> {
        let got = points.len();
        let landmarks: [Landmark; LANDMARKS_PER_HAND] = points.try_into()
            .map_err(|_| TrackingError::MalformedObservation {
                expected: LANDMARKS_PER_HAND,
                got,
            })?;
        Ok(Hand { landmarks })
    }

    pub fn wrist(&self)     -> Landmark { self.landmarks[WRIST] }
    pub fn index_tip(&self) -> Landmark { self.landmarks[INDEX_TIP] }

    /// Midpoint of the wrist and the middle-finger knuckle.
    pub fn palm_center(&self) -> Landmark {
        self.landmarks[WRIST].midpoint(self.landmarks[MIDDLE_MCP])
    }

    /// Distance of each fingertip from the palm centre, thumb first.
    pub fn fingertip_spread(&self) -> [f32; 5] {
        let palm = self.palm_center();
        FINGERTIPS.map(|i| self.landmarks[i].distance(palm))
    }
}

/// All hands reported for one tracker frame, in detection order.
///
/// Detection order is not stable: the hand at index 0 may be a different
/// physical hand on the next frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandObservation {
    pub hands: Vec<Hand>,
}

impl HandObservation {
    pub fn empty() -> Self { HandObservation::default() }

    pub fn new(hands: Vec<Hand>) -> Self { HandObservation { hands } }

    /// Strict conversion: any malformed hand rejects the whole frame.
    pub fn from_raw(raw: Vec<Vec<Landmark>>) -> Result<Self, TrackingError> {
        let hands = raw.into_iter()
            .map(Hand::from_points)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HandObservation { hands })
    }

    /// Like [`from_raw`](Self::from_raw) but a malformed frame becomes
    /// "no hands" instead of an error.
    pub fn from_raw_lossy(raw: Vec<Vec<Landmark>>) -> Self {
        match Self::from_raw(raw) {
            Ok(obs) => obs,
            Err(e)  => {
                log::warn!("{}; treating frame as empty", e);
                HandObservation::empty()
            }
        }
    }

    pub fn len(&self) -> usize { self.hands.len() }

    pub fn is_empty(&self) -> bool { self.hands.is_empty() }

    pub fn first(&self) -> Option<&Hand> { self.hands.first() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_rejects_short_hand() {
        let err = Hand::from_points(vec![Landmark::default(); 20]).unwrap_err();
        assert_eq!(err, TrackingError::MalformedObservation { expected: 21, got: 20 });
    }

    #[test]
    fn from_raw_lossy_drops_whole_frame() {
        let raw = vec![vec![Landmark::default(); 21], vec![Landmark::default(); 3]];
        assert!(HandObservation::from_raw_lossy(raw).is_empty());
    }

    #[test]
    fn palm_center_is_wrist_knuckle_midpoint() {
        let mut lms = [Landmark::default(); 21];
        lms[WRIST]      = Landmark::new(0.2, 0.8);
        lms[MIDDLE_MCP] = Landmark::new(0.4, 0.4);
        let palm = Hand::new(lms).palm_center();
        assert!((palm.x - 0.3).abs() < 1e-6);
        assert!((palm.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn canvas_mirror_flips_x_only() {
        let c = Canvas::new(640.0, 480.0);
        assert_eq!(c.mirror(Point::new(100.0, 50.0)), Point::new(540.0, 50.0));
    }
}
