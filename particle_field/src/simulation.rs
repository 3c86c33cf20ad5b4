//! Per-frame driver.
//!
//! `Simulation` owns every piece of state that survives between frames
//! (the last hand observation, motion history, transition timers, the
//! particle pool and the RNG) and advances it exactly once per [`step`].
//!
//! ```text
//!  mailbox ──► observation ──► classify ──► motion ──► transitions
//!                                                        │ burst?
//!                                                        ▼
//!                     pool.trim_and_respawn ◄── Mode::None      pool.spawn_burst
//!                                                        │
//!                              per particle: forces → integrate → size/alpha
//!                                                        │
//!                                                  timers tick
//! ```
//!
//! [`step`]: Simulation::step

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::classifier::{classify, Classification, Mode};
use crate::config::FieldConfig;
use crate::force::{apply_forces, ease_alpha, ease_size, ForceContext};
use crate::landmark::{Canvas, HandObservation};
use crate::mailbox::{GestureMailbox, TrackerStatus};
use crate::motion::{MotionEstimator, MotionSignal};
use crate::pool::{Particle, ParticlePool};
use crate::transition::{RecoveryState, TransitionController};

// ════════════════════════════════════════════════════════════════════════════
// Renderer-facing views
// ════════════════════════════════════════════════════════════════════════════

/// Everything the renderer needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pub particles:      &'a [Particle],
    /// Any gesture mode is active; drives glow and trail styling.
    pub gesture_active: bool,
    pub mode:           Mode,
    pub motion:         MotionSignal,
}

/// Debug overlay contents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugSnapshot {
    pub mode:           Mode,
    pub hand_detected:  bool,
    pub tracker_ready:  bool,
    pub tracker:        TrackerStatus,
    pub particle_count: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation
// ════════════════════════════════════════════════════════════════════════════

pub struct Simulation {
    config:         FieldConfig,
    rng:            StdRng,
    pool:           ParticlePool,
    motion:         MotionEstimator,
    transitions:    TransitionController,
    /// Last observation received; retained while the tracker is silent.
    observation:    HandObservation,
    classification: Classification,
    tracker:        TrackerStatus,
    frames:         u64,
    bursts:         u64,
}

impl Simulation {
    pub fn new(config: FieldConfig, canvas: Canvas) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let pool = ParticlePool::new(config.max_particles, canvas, &mut rng);
        let transitions = TransitionController::new(config.explosion_duration,
                                                    config.recovery_duration);
        log::info!("particle field: {} particles on {}x{}", pool.len(), canvas.width, canvas.height);

        Simulation {
            config,
            rng,
            pool,
            motion:         MotionEstimator::new(),
            transitions,
            observation:    HandObservation::empty(),
            classification: Classification::default(),
            tracker:        TrackerStatus::Starting,
            frames:         0,
            bursts:         0,
        }
    }

    /// Default field with a fixed RNG seed; two simulations built with the
    /// same seed and fed the same frames stay identical.
    pub fn with_seed(seed: u64, canvas: Canvas) -> Self {
        Simulation::new(FieldConfig { seed: Some(seed), ..FieldConfig::default() }, canvas)
    }

    /// Advance one frame using whatever the tracker has published since the
    /// previous frame.
    pub fn step(&mut self, canvas: Canvas, mailbox: &GestureMailbox) {
        let latest = mailbox.take_latest();
        self.step_with(canvas, latest, mailbox.status());
    }

    /// Advance one frame with an explicit tracker result.
    ///
    /// `latest == None` means the tracker produced nothing new this frame and
    /// the previous observation stays in effect.  An unavailable tracker
    /// always counts as "no hands".
    pub fn step_with(&mut self, canvas: Canvas, latest: Option<HandObservation>, status: TrackerStatus) {
        self.tracker = status;
        if status == TrackerStatus::Unavailable {
            self.observation = HandObservation::empty();
        } else if let Some(obs) = latest {
            self.observation = obs;
        }

        let c = classify(&self.observation, canvas);
        if c.mode != self.classification.mode {
            log::debug!("mode {} -> {}", self.classification.mode.label(), c.mode.label());
        }

        let motion = self.motion.update(c.fingertip);

        if let Some(origin) = self.transitions.observe(c.mode, c.midpoint) {
            self.pool.spawn_burst(origin, self.config.burst_count, canvas, &mut self.rng);
            self.bursts += 1;
        }

        if c.mode == Mode::None {
            self.pool.trim_and_respawn(self.config.respawn_per_frame, canvas, &mut self.rng);
        }

        let ctx = ForceContext::new(c.mode, c.fingertip, canvas, motion)
            .with_explosion(self.transitions.explosion().copied(),
                            self.transitions.explosion_duration())
            .with_recovery(self.transitions.recovery(), self.transitions.recovery_duration());
        let active = ctx.gesture_active();

        for p in self.pool.particles_mut() {
            apply_forces(p, &ctx, &mut self.rng);
            ParticlePool::integrate(p, canvas, motion.intensity);
            ease_size(p, active);
            ease_alpha(p, active, motion.intensity);
        }

        self.transitions.tick();
        self.classification = c;
        self.frames += 1;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn frame(&self) -> FrameView<'_> {
        FrameView {
            particles:      self.pool.particles(),
            gesture_active: self.classification.mode.is_gesture(),
            mode:           self.classification.mode,
            motion:         self.motion.signal(),
        }
    }

    pub fn debug(&self) -> DebugSnapshot {
        DebugSnapshot {
            mode:           self.classification.mode,
            hand_detected:  !self.observation.is_empty(),
            tracker_ready:  self.tracker == TrackerStatus::Ready,
            tracker:        self.tracker,
            particle_count: self.pool.len(),
        }
    }

    pub fn mode(&self)           -> Mode           { self.classification.mode }
    pub fn classification(&self) -> Classification { self.classification }
    pub fn pool(&self)           -> &ParticlePool  { &self.pool }
    pub fn recovery(&self)       -> RecoveryState  { self.transitions.recovery() }
    pub fn frames(&self)         -> u64            { self.frames }
    pub fn bursts(&self)         -> u64            { self.bursts }

    /// Strength of the recovery dispersal the next frame would apply.
    pub fn recovery_factor(&self) -> f32 {
        ForceContext::new(self.mode(), None, Canvas::new(0.0, 0.0), MotionSignal::default())
            .with_recovery(self.transitions.recovery(), self.transitions.recovery_duration())
            .recovery_factor()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::{fist, hand_with_spread, open_palm};
    use crate::error::TrackingError;
    use crate::force::MAX_VELOCITY;

    const CANVAS: Canvas = Canvas::new(640.0, 480.0);
    const READY: TrackerStatus = TrackerStatus::Ready;

    fn sim() -> Simulation {
        Simulation::with_seed(1234, CANVAS)
    }

    fn two_hands() -> HandObservation {
        HandObservation::new(vec![fist(0.3, 0.5), fist(0.5, 0.5)])
    }

    fn assert_invariants(s: &Simulation) {
        for p in s.frame().particles {
            assert!(p.x >= 0.0 && p.x <= CANVAS.width, "x = {}", p.x);
            assert!(p.y >= 0.0 && p.y <= CANVAS.height, "y = {}", p.y);
            assert!(p.vx.abs() <= MAX_VELOCITY && p.vy.abs() <= MAX_VELOCITY);
            assert!(p.alpha >= 0.0 && p.alpha <= 100.0);
            assert!(p.current_size >= 0.0);
        }
    }

    #[test]
    fn bounds_hold_across_every_mode() {
        let mut s = sim();
        let script: Vec<HandObservation> = vec![
            HandObservation::new(vec![open_palm(0.5, 0.5)]),
            HandObservation::new(vec![fist(0.2, 0.3)]),
            two_hands(),
            HandObservation::empty(),
        ];
        for (i, obs) in script.iter().cycle().take(400).enumerate() {
            // hold each gesture for 25 frames
            let latest = if i % 25 == 0 { Some(obs.clone()) } else { None };
            s.step_with(CANVAS, latest, READY);
            assert_invariants(&s);
        }
    }

    #[test]
    fn held_explosion_bursts_once_then_trims_back() {
        let mut s = sim();
        for _ in 0..30 {
            s.step_with(CANVAS, Some(two_hands()), READY);
        }
        assert_eq!(s.bursts(), 1);
        assert_eq!(s.pool().len(), 140);
        assert_eq!(s.mode(), Mode::Explosion);

        s.step_with(CANVAS, Some(HandObservation::empty()), READY);
        assert_eq!(s.pool().len(), 100);
    }

    #[test]
    fn close_hands_never_burst() {
        let mut s = sim();
        let obs = HandObservation::new(vec![fist(0.50, 0.5), fist(0.55, 0.5)]);
        for _ in 0..10 {
            s.step_with(CANVAS, Some(obs.clone()), READY);
        }
        assert_eq!(s.bursts(), 0);
        assert_eq!(s.mode(), Mode::None);
    }

    #[test]
    fn stale_frames_keep_previous_mode() {
        let mut s = sim();
        s.step_with(CANVAS, Some(HandObservation::new(vec![open_palm(0.5, 0.5)])), READY);
        for _ in 0..5 {
            s.step_with(CANVAS, None, READY);
            assert_eq!(s.mode(), Mode::Repel);
        }
    }

    #[test]
    fn unavailable_tracker_forces_no_hands() {
        let mut s = sim();
        s.step_with(CANVAS, Some(HandObservation::new(vec![fist(0.5, 0.5)])), READY);
        assert_eq!(s.mode(), Mode::Attract);
        s.step_with(CANVAS, Some(HandObservation::new(vec![fist(0.5, 0.5)])), TrackerStatus::Unavailable);
        assert_eq!(s.mode(), Mode::None);
        let d = s.debug();
        assert!(!d.hand_detected);
        assert!(!d.tracker_ready);
    }

    #[test]
    fn step_reads_from_mailbox() {
        let mut s = sim();
        let mb = GestureMailbox::new();
        s.step(CANVAS, &mb);
        assert_eq!(s.debug().tracker, TrackerStatus::Starting);

        mb.publish(HandObservation::new(vec![open_palm(0.5, 0.5)]));
        s.step(CANVAS, &mb);
        assert_eq!(s.mode(), Mode::Repel);
        assert!(s.debug().tracker_ready);

        mb.mark_unavailable(&TrackingError::Unavailable("gone".into()));
        s.step(CANVAS, &mb);
        assert_eq!(s.mode(), Mode::None);
    }

    #[test]
    fn recovery_runs_for_its_duration_then_is_zero() {
        let mut s = sim();
        for _ in 0..5 {
            s.step_with(CANVAS, Some(HandObservation::new(vec![open_palm(0.5, 0.5)])), READY);
        }
        s.step_with(CANVAS, Some(HandObservation::empty()), READY);
        assert_eq!(s.recovery().ticks_remaining, 119);
        assert!(s.recovery_factor() > 0.0);
        for _ in 1..120 {
            s.step_with(CANVAS, None, READY);
        }
        assert_eq!(s.recovery().ticks_remaining, 0);
        assert_eq!(s.recovery_factor(), 0.0);
    }

    #[test]
    fn neutral_field_settles() {
        let mut s = sim();
        for p in s.pool.particles_mut() {
            p.vx = 6.0;
            p.vy = -6.0;
        }
        for _ in 0..300 {
            s.step_with(CANVAS, None, READY);
        }
        for p in s.frame().particles {
            assert!(p.vx.abs() < 1.0 && p.vy.abs() < 1.0, "v = ({}, {})", p.vx, p.vy);
        }
    }

    #[test]
    fn gesture_grows_particles_and_flags_frame() {
        let mut s = sim();
        for _ in 0..100 {
            s.step_with(CANVAS, Some(HandObservation::new(vec![fist(0.5, 0.5)])), READY);
        }
        let f = s.frame();
        assert!(f.gesture_active);
        for p in f.particles {
            assert!(p.current_size > p.base_size * 2.5);
        }
    }

    #[test]
    fn ambiguous_hand_still_reports_detection() {
        let mut s = sim();
        let hand = hand_with_spread(0.5, 0.5, [0.3, 0.3, 0.05, 0.05, 0.3]);
        s.step_with(CANVAS, Some(HandObservation::new(vec![hand])), READY);
        let d = s.debug();
        assert_eq!(d.mode, Mode::None);
        assert!(d.hand_detected);
        assert!(s.classification().fingertip.is_some());
    }

    #[test]
    fn same_seed_runs_are_identical() {
        let mut a = Simulation::with_seed(77, CANVAS);
        let mut b = Simulation::with_seed(77, CANVAS);
        let palm = HandObservation::new(vec![open_palm(0.4, 0.6)]);
        for i in 0..90 {
            let latest = match i {
                0  => Some(palm.clone()),
                30 => Some(two_hands()),
                60 => Some(HandObservation::empty()),
                _  => None,
            };
            a.step_with(CANVAS, latest.clone(), READY);
            b.step_with(CANVAS, latest, READY);
        }
        assert_eq!(a.bursts(), 1);
        assert_eq!(a.frame().particles, b.frame().particles);
    }

    #[test]
    fn tiny_canvas_steps_without_panicking() {
        let tiny = Canvas::new(80.0, 60.0);
        let mut s = Simulation::with_seed(3, tiny);
        for _ in 0..10 {
            s.step_with(tiny, None, READY);
        }
        s.step_with(tiny, Some(HandObservation::new(vec![open_palm(0.5, 0.5)])), READY);
        s.step_with(tiny, Some(HandObservation::empty()), READY);
        assert_eq!(s.frames(), 12);
        for p in s.frame().particles {
            assert!(p.x >= 0.0 && p.x <= tiny.width);
            assert!(p.y >= 0.0 && p.y <= tiny.height);
        }
    }
}
