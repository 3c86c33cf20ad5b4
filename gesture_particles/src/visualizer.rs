//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ MODE: REPEL  HAND: YES  TRACKER: READY  N: 100             │
//! │                                                            │
//! │        ·   •      ●  particles (hue-coloured discs,        │
//! │     •        ·        glow + velocity streaks while a      │
//! │          ●      •     gesture is active)                   │
//! │                                                            │
//! │ key legend                                                 │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use anyhow::Context;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use particle_field::{DebugSnapshot, FrameView, Particle};

use crate::gesture::{SimInput, SimPose};

// ════════════════════════════════════════════════════════════════════════════
// Style constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:      u32 = 0xFF0A0A14;
const TEXT_COLOR:    u32 = 0xFFEEEEEE;
const LEGEND_COLOR:  u32 = 0xFF888888;
const ACTIVE_COLOR:  u32 = 0xFFFFD700;
/// Fraction of the previous frame kept when trails are drawn.
const TRAIL_KEEP:    f32 = 0.82;
/// Streak length in frames of velocity.
const STREAK_FRAMES: f32 = 3.0;
const GLOW_SCALE:    f32 = 2.2;
const GLOW_ALPHA:    f32 = 0.18;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
    /// Present only when the keyboard/mouse simulator is the gesture source.
    sim_tx: Option<Sender<SimInput>>,
    pose:   SimPose,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Option<Sender<SimInput>>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Gesture Particles",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).context("failed to open visualizer window")?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; width * height],
            width,
            height,
            sim_tx,
            pose: SimPose::Relaxed,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse; in simulation mode forward them as
    /// [`SimInput`].  Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            self.send(SimInput::Quit);
            return false;
        }

        if self.sim_tx.is_none() { return true; }

        if self.window.is_key_pressed(Key::H, KeyRepeat::No) {
            self.send(SimInput::ToggleHand);
        }

        // Held keys select the pose; nothing held = relaxed hand.
        let pose = if self.window.is_key_down(Key::E) {
            SimPose::TwoHands
        } else if self.window.is_key_down(Key::O) {
            SimPose::OpenPalm
        } else if self.window.is_key_down(Key::F) {
            SimPose::Fist
        } else {
            SimPose::Relaxed
        };
        if pose != self.pose {
            self.pose = pose;
            self.send(SimInput::Pose(pose));
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            self.send(SimInput::Pointer {
                x: mx / self.width as f32,
                y: my / self.height as f32,
            });
        }

        true
    }

    fn send(&self, input: SimInput) {
        if let Some(tx) = &self.sim_tx {
            let _ = tx.send(input);
        }
    }

    /// Render one frame.
    pub fn render(&mut self, frame: FrameView<'_>, debug: DebugSnapshot, trails: bool, show_debug: bool) {
        if trails && frame.gesture_active {
            for px in self.buf.iter_mut() {
                *px = blend(BG_COLOR, *px, TRAIL_KEEP);
            }
        } else {
            self.buf.fill(BG_COLOR);
        }

        for p in frame.particles {
            self.draw_particle(p, frame.gesture_active);
        }

        if show_debug {
            let status = format!(
                "MODE: {}  HAND: {}  TRACKER: {}  N: {}  MOTION: {:.0}",
                debug.mode.label(),
                if debug.hand_detected { "YES" } else { "NO" },
                debug.tracker.label(),
                debug.particle_count,
                frame.motion.intensity,
            );
            let color = if frame.gesture_active { ACTIVE_COLOR } else { TEXT_COLOR };
            self.draw_label(&status, 10, 10, color);
        }

        if self.sim_tx.is_some() {
            self.draw_label(
                "MOUSE=FINGER  O=OPEN PALM  F=FIST  E=TWO HANDS  H=HIDE HAND  Q=QUIT",
                10, self.height.saturating_sub(16), LEGEND_COLOR,
            );
        }

        self.window.update_with_buffer(&self.buf, self.width, self.height).ok();
    }

    // ── Particle ──────────────────────────────────────────────────────────

    fn draw_particle(&mut self, p: &Particle, gesture_active: bool) {
        let color = hsv_to_argb(p.hue, 0.65, 1.0);
        let alpha = (p.alpha / 100.0).clamp(0.0, 1.0);
        let radius = (p.current_size / 2.0).max(0.5);

        if gesture_active {
            self.fill_disc(p.x, p.y, radius * GLOW_SCALE, color, alpha * GLOW_ALPHA);
            self.draw_streak(p.x, p.y, p.x - p.vx * STREAK_FRAMES, p.y - p.vy * STREAK_FRAMES,
                             color, alpha * 0.5);
        }
        self.fill_disc(p.x, p.y, radius, color, alpha);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn blend_pixel(&mut self, x: isize, y: isize, color: u32, alpha: f32) {
        if x < 0 || y < 0 { return; }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height { return; }
        let i = y * self.width + x;
        self.buf[i] = blend(self.buf[i], color, alpha);
    }

    fn fill_disc(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32) {
        let r2 = r * r;
        let x0 = (cx - r).floor() as isize;
        let x1 = (cx + r).ceil()  as isize;
        let y0 = (cy - r).floor() as isize;
        let y1 = (cy + r).ceil()  as isize;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    /// Straight line that fades out toward its tail.
    fn draw_streak(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u32, alpha: f32) {
        let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        let steps = len.ceil().max(1.0) as usize;
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.blend_pixel(x as isize, y as isize, color, alpha * (1.0 - t));
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    /// Minimal bitmap font — 3×5 characters for debug/legend text.
    /// Each character is encoded as 5 rows × 3 bits.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > self.width { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Colour helpers
// ────────────────────────────────────────────────────────────────────────────

/// Convert HSV → packed ARGB (0xAARRGGBB, A=0xFF).
pub fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let ri = (r * 255.0) as u32;
    let gi = (g * 255.0) as u32;
    let bi = (b * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
