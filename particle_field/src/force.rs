//! Per-particle force field.
//!
//! [`apply_forces`] adds every velocity contribution for one particle in a
//! fixed order and finishes with damping and the velocity clamp:
//!
//! 1. ambient motion coupling (hand drift direction)
//! 2. repel from / attract toward the mirrored fingertip
//! 3. explosion push away from the burst midpoint, fading with time
//! 4. recovery dispersal after a gesture is released, fading with time
//! 5. ambient jitter
//! 6. damping ×0.95, then clamp each component to ±8
//!
//! Size and alpha easing are separate so the renderer-facing fields can be
//! updated after integration.

use rand::Rng;

use crate::classifier::Mode;
use crate::landmark::{Canvas, Point};
use crate::motion::MotionSignal;
use crate::pool::Particle;
use crate::transition::{ExplosionState, RecoveryState};

pub const MOTION_COUPLING: f32 = 0.7;

pub const HAND_MIN_DIST: f32 = 1.0;
pub const HAND_MAX_DIST: f32 = 300.0;

pub const REPEL_BASE:      f32 = 8.0;
pub const REPEL_FALLOFF:   f32 = 0.0005;
pub const REPEL_MAX:       f32 = 5.0;

pub const ATTRACT_BASE:    f32 = 2.5;
pub const ATTRACT_FALLOFF: f32 = 0.02;
pub const ATTRACT_MAX:     f32 = 1.5;

pub const EXPLOSION_BASE:    f32 = 5.0;
pub const EXPLOSION_FALLOFF: f32 = 0.01;
pub const EXPLOSION_MAX:     f32 = 4.0;

pub const RECOVERY_JITTER: f32 = 0.15;
pub const AMBIENT_JITTER:  f32 = 0.05;

pub const DAMPING:      f32 = 0.95;
pub const MAX_VELOCITY: f32 = 8.0;

pub const GESTURE_SIZE_SCALE: f32 = 3.0;
pub const SIZE_EASING:        f32 = 0.08;
pub const ALPHA_EASING:       f32 = 0.1;
pub const MAX_ALPHA:          f32 = 100.0;

/// Linear remap of `v` from `[a0, a1]` to `[b0, b1]`, unclamped.
pub fn map_range(v: f32, a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    b0 + (v - a0) * (b1 - b0) / (a1 - a0)
}

// ════════════════════════════════════════════════════════════════════════════
// ForceContext — everything shared by all particles in one frame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct ForceContext {
    pub mode:               Mode,
    /// Mirrored fingertip; `None` when no hand is visible.
    pub hand:               Option<Point>,
    pub motion:             MotionSignal,
    pub explosion:          Option<ExplosionState>,
    pub explosion_duration: u32,
    pub recovery:           RecoveryState,
    pub recovery_duration:  u32,
}

impl ForceContext {
    /// `fingertip` is the unmirrored canvas position from the classifier.
    pub fn new(mode: Mode, fingertip: Option<Point>, canvas: Canvas, motion: MotionSignal) -> Self {
        ForceContext {
            mode,
            hand: fingertip.map(|p| canvas.mirror(p)),
            motion,
            explosion:          None,
            explosion_duration: 1,
            recovery:           RecoveryState::default(),
            recovery_duration:  1,
        }
    }

    pub fn with_explosion(mut self, explosion: Option<ExplosionState>, duration: u32) -> Self {
        self.explosion = explosion;
        self.explosion_duration = duration.max(1);
        self
    }

    pub fn with_recovery(mut self, recovery: RecoveryState, duration: u32) -> Self {
        self.recovery = recovery;
        self.recovery_duration = duration.max(1);
        self
    }

    /// Linear 1 → 0 fade of the recovery dispersal; zero once it has run out
    /// or while a gesture is held.
    pub fn recovery_factor(&self) -> f32 {
        if self.mode != Mode::None || !self.recovery.is_active() {
            return 0.0;
        }
        self.recovery.ticks_remaining as f32 / self.recovery_duration as f32
    }

    pub fn gesture_active(&self) -> bool { self.mode.is_gesture() }
}

// ════════════════════════════════════════════════════════════════════════════
// Velocity contributions
// ════════════════════════════════════════════════════════════════════════════

/// Unit vector from `from` to `to` and the distance between them.
fn heading(from: Point, to: Point) -> (f32, f32, f32) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    (dx / dist, dy / dist, dist)
}

fn push(p: &mut Particle, nx: f32, ny: f32, strength: f32) {
    p.vx += nx * strength;
    p.vy += ny * strength;
}

pub fn repel_strength(dist: f32) -> f32 {
    (REPEL_BASE / (1.0 + dist * dist * REPEL_FALLOFF)).min(REPEL_MAX)
}

pub fn attract_strength(dist: f32) -> f32 {
    (ATTRACT_BASE / (1.0 + dist * ATTRACT_FALLOFF)).min(ATTRACT_MAX)
}

pub fn explosion_strength(dist: f32, time_factor: f32) -> f32 {
    (EXPLOSION_BASE * time_factor / (1.0 + dist * EXPLOSION_FALLOFF)).min(EXPLOSION_MAX)
}

/// Add every force for this frame to `p`'s velocity, then damp and clamp.
pub fn apply_forces<R: Rng>(p: &mut Particle, ctx: &ForceContext, rng: &mut R) {
    let pos = Point::new(p.x, p.y);

    p.vx += ctx.motion.direction_x * MOTION_COUPLING;
    p.vy += ctx.motion.direction_y * MOTION_COUPLING;

    if let Some(hand) = ctx.hand {
        match ctx.mode {
            Mode::Repel => {
                let (nx, ny, dist) = heading(hand, pos);
                if dist > HAND_MIN_DIST && dist < HAND_MAX_DIST {
                    push(p, nx, ny, repel_strength(dist));
                }
            }
            Mode::Attract => {
                let (nx, ny, dist) = heading(pos, hand);
                if dist > HAND_MIN_DIST && dist < HAND_MAX_DIST {
                    push(p, nx, ny, attract_strength(dist));
                }
            }
            Mode::None | Mode::Explosion => {}
        }
    }

    if let Some(ex) = ctx.explosion {
        let (nx, ny, dist) = heading(ex.midpoint, pos);
        if dist > 1.0 {
            let time_factor = ex.ticks_remaining as f32 / ctx.explosion_duration as f32;
            push(p, nx, ny, explosion_strength(dist, time_factor));
        }
    }

    let recovery = ctx.recovery_factor();
    if recovery > 0.0 {
        p.vx += rng.gen_range(-RECOVERY_JITTER..RECOVERY_JITTER) * recovery;
        p.vy += rng.gen_range(-RECOVERY_JITTER..RECOVERY_JITTER) * recovery;
    }

    p.vx += rng.gen_range(-AMBIENT_JITTER..AMBIENT_JITTER);
    p.vy += rng.gen_range(-AMBIENT_JITTER..AMBIENT_JITTER);

    p.vx = (p.vx * DAMPING).clamp(-MAX_VELOCITY, MAX_VELOCITY);
    p.vy = (p.vy * DAMPING).clamp(-MAX_VELOCITY, MAX_VELOCITY);
}

// ════════════════════════════════════════════════════════════════════════════
// Size / alpha easing
// ════════════════════════════════════════════════════════════════════════════

pub fn ease_size(p: &mut Particle, gesture_active: bool) {
    p.target_size = if gesture_active { p.base_size * GESTURE_SIZE_SCALE } else { p.base_size };
    p.current_size += (p.target_size - p.current_size) * SIZE_EASING;
    p.current_size = p.current_size.max(0.0);
}

pub fn ease_alpha(p: &mut Particle, gesture_active: bool, intensity: f32) {
    let resting = map_range(intensity, 0.0, 100.0, 20.0, 90.0);
    if gesture_active {
        p.alpha = (resting + 5.0).clamp(0.0, 95.0);
    } else {
        p.alpha += (resting - p.alpha) * ALPHA_EASING;
    }
    p.alpha = p.alpha.clamp(0.0, MAX_ALPHA);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CANVAS: Canvas = Canvas::new(640.0, 480.0);

    fn still_particle(x: f32, y: f32) -> Particle {
        Particle {
            x, y,
            vx: 0.0, vy: 0.0,
            base_speed: 1.0,
            base_size: 3.0,
            current_size: 3.0,
            target_size: 3.0,
            hue: 200.0,
            alpha: 50.0,
        }
    }

    fn rng() -> StdRng { StdRng::seed_from_u64(7) }

    #[test]
    fn map_range_is_linear() {
        assert_eq!(map_range(10.0, 0.0, 20.0, 0.0, 100.0), 50.0);
        assert_eq!(map_range(50.0, 0.0, 100.0, 0.5, 3.0), 1.75);
    }

    #[test]
    fn strengths_respect_caps() {
        assert_eq!(repel_strength(2.0), REPEL_MAX);
        assert!(repel_strength(200.0) < REPEL_MAX);
        assert_eq!(attract_strength(2.0), ATTRACT_MAX);
        assert!(explosion_strength(1000.0, 1.0) < EXPLOSION_MAX);
        assert_eq!(explosion_strength(50.0, 0.0), 0.0);
    }

    #[test]
    fn repel_pushes_away_from_mirrored_fingertip() {
        // Fingertip at x=540 unmirrored → hand at x=100 on screen.
        let ctx = ForceContext::new(Mode::Repel, Some(Point::new(540.0, 240.0)), CANVAS,
                                    MotionSignal::default());
        let mut p = still_particle(150.0, 240.0);
        apply_forces(&mut p, &ctx, &mut rng());
        assert!(p.vx > 1.0, "vx = {}", p.vx);
        assert!(p.vy.abs() < 0.1);
    }

    #[test]
    fn attract_pulls_toward_hand() {
        let ctx = ForceContext::new(Mode::Attract, Some(Point::new(540.0, 240.0)), CANVAS,
                                    MotionSignal::default());
        let mut p = still_particle(150.0, 240.0);
        apply_forces(&mut p, &ctx, &mut rng());
        assert!(p.vx < -0.5, "vx = {}", p.vx);
    }

    #[test]
    fn hand_beyond_range_has_no_pull() {
        let ctx = ForceContext::new(Mode::Attract, Some(Point::new(540.0, 240.0)), CANVAS,
                                    MotionSignal::default());
        let mut p = still_particle(500.0, 240.0);
        apply_forces(&mut p, &ctx, &mut rng());
        assert!(p.vx.abs() < 0.1);
    }

    #[test]
    fn explosion_pushes_outward() {
        let ex = ExplosionState { midpoint: Point::new(320.0, 240.0), ticks_remaining: 60 };
        let ctx = ForceContext::new(Mode::Explosion, None, CANVAS, MotionSignal::default())
            .with_explosion(Some(ex), 60);
        let mut p = still_particle(320.0, 140.0);
        apply_forces(&mut p, &ctx, &mut rng());
        assert!(p.vy < -1.0, "vy = {}", p.vy);
    }

    #[test]
    fn recovery_factor_is_zero_when_spent_or_gesturing() {
        let spent = ForceContext::new(Mode::None, None, CANVAS, MotionSignal::default())
            .with_recovery(RecoveryState { ticks_remaining: 0 }, 120);
        assert_eq!(spent.recovery_factor(), 0.0);

        let holding = ForceContext::new(Mode::Repel, None, CANVAS, MotionSignal::default())
            .with_recovery(RecoveryState { ticks_remaining: 60 }, 120);
        assert_eq!(holding.recovery_factor(), 0.0);

        let half = ForceContext::new(Mode::None, None, CANVAS, MotionSignal::default())
            .with_recovery(RecoveryState { ticks_remaining: 60 }, 120);
        assert_eq!(half.recovery_factor(), 0.5);
    }

    #[test]
    fn velocity_is_clamped() {
        let motion = MotionSignal { intensity: 100.0, direction_x: 1.0, direction_y: -1.0 };
        let ctx = ForceContext::new(Mode::None, None, CANVAS, motion);
        let mut p = still_particle(10.0, 10.0);
        p.vx = 50.0;
        p.vy = -50.0;
        apply_forces(&mut p, &ctx, &mut rng());
        assert_eq!(p.vx, MAX_VELOCITY);
        assert_eq!(p.vy, -MAX_VELOCITY);
    }

    #[test]
    fn size_eases_toward_gesture_target() {
        let mut p = still_particle(0.0, 0.0);
        ease_size(&mut p, true);
        assert_eq!(p.target_size, 9.0);
        assert!((p.current_size - (3.0 + 6.0 * 0.08)).abs() < 1e-5);
        for _ in 0..200 { ease_size(&mut p, true); }
        assert!((p.current_size - 9.0).abs() < 1e-3);
    }

    #[test]
    fn alpha_snaps_while_active_and_eases_otherwise() {
        let mut p = still_particle(0.0, 0.0);
        ease_alpha(&mut p, true, 100.0);
        assert_eq!(p.alpha, 95.0);
        ease_alpha(&mut p, false, 0.0);
        assert!((p.alpha - (95.0 + (20.0 - 95.0) * 0.1)).abs() < 1e-4);
    }
}
