//! Fingertip motion → smoothed intensity and drift direction.

use crate::force::map_range;
use crate::landmark::Point;

/// Displacement (pixels/frame) that maps to full intensity.
const FULL_INTENSITY_DISPLACEMENT: f32 = 20.0;
/// Displacements at or below this leave the direction untouched.
const DIRECTION_DEADBAND: f32 = 0.1;
/// Pixels of displacement per unit of direction.
const DIRECTION_SCALE: f32 = 10.0;

/// Hand motion summary fed to the force field each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionSignal {
    /// 0–100.
    pub intensity:   f32,
    /// −1–1, already flipped to match the mirrored video.
    pub direction_x: f32,
    /// −1–1.
    pub direction_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct MotionEstimator {
    previous: Option<Point>,
    signal:   MotionSignal,
}

impl MotionEstimator {
    pub fn new() -> Self { MotionEstimator::default() }

    pub fn signal(&self) -> MotionSignal { self.signal }

    /// Feed this frame's fingertip (or `None` when no hand is visible).
    pub fn update(&mut self, fingertip: Option<Point>) -> MotionSignal {
        let Some(current) = fingertip else {
            self.previous = None;
            self.signal = MotionSignal::default();
            return self.signal;
        };

        if let Some(prev) = self.previous {
            let dx = current.x - prev.x;
            let dy = current.y - prev.y;
            let displacement = current.distance(prev);

            self.signal.intensity =
                map_range(displacement, 0.0, FULL_INTENSITY_DISPLACEMENT, 0.0, 100.0)
                    .clamp(0.0, 100.0);

            if displacement > DIRECTION_DEADBAND {
                self.signal.direction_x = (-dx / DIRECTION_SCALE).clamp(-1.0, 1.0);
                self.signal.direction_y = ( dy / DIRECTION_SCALE).clamp(-1.0, 1.0);
            }
        }

        self.previous = Some(current);
        self.signal
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_has_no_motion() {
        let mut m = MotionEstimator::new();
        assert_eq!(m.update(Some(Point::new(100.0, 100.0))), MotionSignal::default());
    }

    #[test]
    fn ten_pixel_jump_is_half_intensity() {
        let mut m = MotionEstimator::new();
        m.update(Some(Point::new(100.0, 100.0)));
        let s = m.update(Some(Point::new(110.0, 100.0)));
        assert!((s.intensity - 50.0).abs() < 1e-4);
        assert_eq!(s.direction_x, -1.0);
        assert_eq!(s.direction_y, 0.0);
    }

    #[test]
    fn intensity_saturates_at_100() {
        let mut m = MotionEstimator::new();
        m.update(Some(Point::new(0.0, 0.0)));
        let s = m.update(Some(Point::new(0.0, 80.0)));
        assert_eq!(s.intensity, 100.0);
        assert_eq!(s.direction_y, 1.0);
    }

    #[test]
    fn deadband_keeps_direction_but_updates_intensity() {
        let mut m = MotionEstimator::new();
        m.update(Some(Point::new(100.0, 100.0)));
        m.update(Some(Point::new(100.0, 105.0)));
        let s = m.update(Some(Point::new(100.05, 105.0)));
        assert!((s.direction_y - 0.5).abs() < 1e-4);
        assert!(s.intensity < 1.0);
    }

    #[test]
    fn hand_loss_zeroes_and_forgets() {
        let mut m = MotionEstimator::new();
        m.update(Some(Point::new(0.0, 0.0)));
        m.update(Some(Point::new(20.0, 0.0)));
        assert_eq!(m.update(None), MotionSignal::default());
        // Reappearing far away must not register as a jump.
        assert_eq!(m.update(Some(Point::new(500.0, 500.0))).intensity, 0.0);
    }
}
