//! Particle storage, integration and lifecycle.
//!
//! Particles live in one contiguous `Vec` and are never freed individually:
//! a "reset" writes a fresh [`Particle::random`] record in place.  The pool
//! only grows through [`ParticlePool::spawn_burst`], and
//! [`ParticlePool::trim_and_respawn`] truncates the tail back to the nominal
//! size, so the original particles always survive a burst and the burst
//! particles are the ones dropped.

use std::f32::consts::TAU;

use rand::Rng;

use crate::force::{map_range, GESTURE_SIZE_SCALE};
use crate::landmark::{Canvas, Point};

/// Distance from a canvas edge within which a particle may be respawned.
pub const EDGE_MARGIN:    f32 = 20.0;
/// Respawned particles land at least this far inside the canvas.
pub const RESPAWN_MARGIN: f32 = 50.0;
pub const RESPAWN_JITTER: f32 = 0.5;

pub const BURST_SPREAD:    f32 = 5.0;
pub const BURST_MIN_SPEED: f32 = 3.0;
pub const BURST_MAX_SPEED: f32 = 7.0;
pub const BURST_ALPHA:     f32 = 95.0;

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x:            f32,
    pub y:            f32,
    pub vx:           f32,
    pub vy:           f32,
    /// Per-particle speed factor applied at integration.
    pub base_speed:   f32,
    pub base_size:    f32,
    pub current_size: f32,
    pub target_size:  f32,
    /// Degrees, 0–360.
    pub hue:          f32,
    /// 0–100.
    pub alpha:        f32,
}

impl Particle {
    /// A fresh particle somewhere on the canvas.
    pub fn random<R: Rng>(canvas: Canvas, rng: &mut R) -> Self {
        let base_size = rng.gen_range(2.0..5.0);
        Particle {
            x:            rng.gen_range(0.0..canvas.width.max(f32::EPSILON)),
            y:            rng.gen_range(0.0..canvas.height.max(f32::EPSILON)),
            vx:           rng.gen_range(-1.0..1.0),
            vy:           rng.gen_range(-1.0..1.0),
            base_speed:   rng.gen_range(0.5..1.5),
            base_size,
            current_size: base_size,
            target_size:  base_size,
            hue:          rng.gen_range(0.0..360.0),
            alpha:        50.0,
        }
    }

    /// A burst particle flung outward from `origin`.
    pub fn burst<R: Rng>(origin: Point, canvas: Canvas, rng: &mut R) -> Self {
        let mut p = Particle::random(canvas, rng);
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(BURST_MIN_SPEED..BURST_MAX_SPEED);
        p.x = origin.x + rng.gen_range(-BURST_SPREAD..BURST_SPREAD);
        p.y = origin.y + rng.gen_range(-BURST_SPREAD..BURST_SPREAD);
        p.vx = angle.cos() * speed;
        p.vy = angle.sin() * speed;
        p.alpha = BURST_ALPHA;
        p.target_size = p.base_size * GESTURE_SIZE_SCALE;
        p.current_size = p.target_size;
        p
    }

    pub fn near_edge(&self, canvas: Canvas) -> bool {
        self.x < EDGE_MARGIN
            || self.x > canvas.width - EDGE_MARGIN
            || self.y < EDGE_MARGIN
            || self.y > canvas.height - EDGE_MARGIN
    }
}

/// A coordinate at least `RESPAWN_MARGIN` inside `[0, extent]`.  Extents too
/// small to leave an interior band collapse to the centre line.
fn interior<R: Rng>(extent: f32, rng: &mut R) -> f32 {
    let margin = RESPAWN_MARGIN.min(extent / 2.0);
    let hi = extent - margin;
    if hi > margin { rng.gen_range(margin..hi) } else { extent / 2.0 }
}

/// Wrap `v` into `[0, extent)`; leaving one edge re-enters at the other.
fn wrap(v: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    let w = v.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if w >= extent { 0.0 } else { w }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticlePool
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    nominal:   usize,
}

impl ParticlePool {
    pub fn new<R: Rng>(nominal: usize, canvas: Canvas, rng: &mut R) -> Self {
        let particles = (0..nominal).map(|_| Particle::random(canvas, rng)).collect();
        ParticlePool { particles, nominal }
    }

    pub fn len(&self)       -> usize       { self.particles.len() }
    pub fn is_empty(&self)  -> bool        { self.particles.is_empty() }
    pub fn nominal(&self)   -> usize       { self.nominal }
    pub fn particles(&self) -> &[Particle] { &self.particles }

    pub fn particles_mut(&mut self) -> &mut [Particle] { &mut self.particles }

    /// Move one particle by its velocity and wrap it back onto the canvas.
    ///
    /// `intensity` (0–100) scales the step from ×0.5 to ×3.
    pub fn integrate(p: &mut Particle, canvas: Canvas, intensity: f32) {
        let speed = map_range(intensity, 0.0, 100.0, 0.5, 3.0) * p.base_speed;
        p.x = wrap(p.x + p.vx * speed, canvas.width);
        p.y = wrap(p.y + p.vy * speed, canvas.height);
    }

    /// Append `count` burst particles around `origin`.
    pub fn spawn_burst<R: Rng>(&mut self, origin: Point, count: usize, canvas: Canvas, rng: &mut R) {
        self.particles.reserve(count);
        for _ in 0..count {
            self.particles.push(Particle::burst(origin, canvas, rng));
        }
        log::debug!("burst of {} at ({:.0}, {:.0}); pool = {}", count, origin.x, origin.y,
                    self.particles.len());
    }

    /// Shrink back to the nominal size, then recycle up to `respawn` random
    /// particles that have drifted against an edge.  Only called while no
    /// gesture is active.
    pub fn trim_and_respawn<R: Rng>(&mut self, respawn: usize, canvas: Canvas, rng: &mut R) {
        if self.particles.len() > self.nominal {
            self.particles.truncate(self.nominal);
        }
        if self.particles.is_empty() {
            return;
        }

        for _ in 0..respawn {
            let i = rng.gen_range(0..self.particles.len());
            let p = &mut self.particles[i];
            if p.near_edge(canvas) {
                p.x  = interior(canvas.width, rng);
                p.y  = interior(canvas.height, rng);
                p.vx = rng.gen_range(-RESPAWN_JITTER..RESPAWN_JITTER);
                p.vy = rng.gen_range(-RESPAWN_JITTER..RESPAWN_JITTER);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
