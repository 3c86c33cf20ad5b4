//! Mode history → one-shot events and countdown timers.
//!
//! Two things happen on mode *changes* rather than on mode *values*:
//!
//! * entering `Explosion` fires exactly one burst, and the explosion force
//!   then decays over `explosion_duration` frames;
//! * leaving any gesture for `None` starts a `recovery_duration`-frame
//!   dispersal that fades out linearly.
//!
//! Both are driven by comparing the previous frame's mode with this one, so
//! holding two hands apart for many frames still yields a single burst.

use crate::classifier::Mode;
use crate::landmark::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionState {
    pub midpoint:        Point,
    pub ticks_remaining: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RecoveryState {
    pub ticks_remaining: u32,
}

impl RecoveryState {
    pub fn is_active(&self) -> bool { self.ticks_remaining > 0 }
}

#[derive(Clone, Debug)]
pub struct TransitionController {
    previous_mode:      Mode,
    explosion:          Option<ExplosionState>,
    recovery:           RecoveryState,
    explosion_duration: u32,
    recovery_duration:  u32,
}

impl TransitionController {
    pub fn new(explosion_duration: u32, recovery_duration: u32) -> Self {
        TransitionController {
            previous_mode: Mode::None,
            explosion:     None,
            recovery:      RecoveryState::default(),
            explosion_duration,
            recovery_duration,
        }
    }

    pub fn explosion(&self)          -> Option<&ExplosionState> { self.explosion.as_ref() }
    pub fn recovery(&self)           -> RecoveryState          { self.recovery }
    pub fn explosion_duration(&self) -> u32                    { self.explosion_duration }
    pub fn recovery_duration(&self)  -> u32                    { self.recovery_duration }

    /// Record this frame's mode.
    ///
    /// Returns the burst origin when the mode has just become `Explosion`.
    /// `midpoint` is the mirrored wrist midpoint from the classifier.
    pub fn observe(&mut self, mode: Mode, midpoint: Option<Point>) -> Option<Point> {
        let previous = std::mem::replace(&mut self.previous_mode, mode);

        if previous != Mode::None && mode == Mode::None {
            log::debug!("{} released; recovery for {} frames", previous.label(), self.recovery_duration);
            self.recovery.ticks_remaining = self.recovery_duration;
        }

        if previous != Mode::Explosion && mode == Mode::Explosion {
            if let Some(mid) = midpoint {
                log::debug!("explosion at ({:.0}, {:.0})", mid.x, mid.y);
                self.explosion = Some(ExplosionState {
                    midpoint:        mid,
                    ticks_remaining: self.explosion_duration,
                });
                return Some(mid);
            }
        }
        None
    }

    /// Advance both timers by one frame.
    pub fn tick(&mut self) {
        if self.recovery.ticks_remaining > 0 {
            self.recovery.ticks_remaining -= 1;
        }
        if let Some(ex) = self.explosion.as_mut() {
            ex.ticks_remaining = ex.ticks_remaining.saturating_sub(1);
            if ex.ticks_remaining == 0 {
                self.explosion = None;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
