//! Gesture sources — an external hand tracker or the keyboard/mouse simulator.
//!
//! Both publish [`HandObservation`]s into a [`GestureMailbox`] from their own
//! thread.  The frame loop never learns which kind of source is running; it
//! just reads the newest observation each frame.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use anyhow::{bail, Context};
use serde::Deserialize;

use particle_field::landmark::{FINGERTIPS, INDEX_TIP, LANDMARKS_PER_HAND, MIDDLE_MCP, WRIST};
use particle_field::{GestureMailbox, Hand, HandObservation, Landmark, TrackingError};

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait — unified interface for tracker and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can publish hand observations into a mailbox.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, mailbox: GestureMailbox);
}

/// Run a gesture source on its own thread.
pub fn spawn_gesture_source<G: GestureSource>(source: G, mailbox: GestureMailbox) -> JoinHandle<()> {
    thread::spawn(move || Box::new(source).run(mailbox))
}

// ════════════════════════════════════════════════════════════════════════════
// SubprocessTracker — external landmark detector speaking JSON lines
// ════════════════════════════════════════════════════════════════════════════

/// One line of tracker output.
///
/// ```json
/// {"hands": [[{"x": 0.41, "y": 0.63}, … 21 points …]], "error": null}
/// ```
///
/// Extra landmark fields (e.g. `z`) are ignored.  A non-null `error` means
/// the tracker skipped that camera frame.
#[derive(Debug, Deserialize)]
struct TrackerLine {
    #[serde(default)]
    hands: Vec<Vec<Landmark>>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one stdout line.  `Err(StaleFrame)` means "keep what you had".
pub fn parse_tracker_line(line: &str) -> Result<HandObservation, TrackingError> {
    let parsed: TrackerLine = serde_json::from_str(line).map_err(|e| {
        log::warn!("unreadable tracker line ({}): {:.80}", e, line);
        TrackingError::StaleFrame
    })?;
    if let Some(err) = parsed.error {
        log::debug!("tracker skipped a frame: {}", err);
        return Err(TrackingError::StaleFrame);
    }
    Ok(HandObservation::from_raw_lossy(parsed.hands))
}

#[derive(Debug, Default)]
struct ChildSlot {
    child:    Option<Child>,
    /// Set by [`TrackerHandle::shutdown`]; a child spawned afterwards is
    /// killed immediately.
    shutdown: bool,
}

/// Owner-side handle to a running [`SubprocessTracker`].  Shutting it down
/// kills the child process, which ends the reader thread at EOF.
#[derive(Clone, Debug, Default)]
pub struct TrackerHandle {
    slot: Arc<Mutex<ChildSlot>>,
}

impl TrackerHandle {
    fn lock(&self) -> MutexGuard<'_, ChildSlot> {
        match self.slot.lock() {
            Ok(g)  => g,
            Err(p) => p.into_inner(),
        }
    }

    /// Kill and reap the tracker process, if one is running.
    pub fn shutdown(&self) {
        let mut slot = self.lock();
        slot.shutdown = true;
        if let Some(mut child) = slot.child.take() {
            log::info!("Stopping hand tracker (pid {})", child.id());
            if let Err(e) = child.kill() {
                log::warn!("failed to kill tracker: {}", e);
            }
            let _ = child.wait();
        }
    }

    pub fn is_running(&self) -> bool { self.lock().child.is_some() }
}

/// Hand tracker running as a child process (camera capture and the
/// landmark model live there).  Results are read from its stdout.
pub struct SubprocessTracker {
    pub command: Vec<String>,
    handle:      TrackerHandle,
}

impl SubprocessTracker {
    pub fn new(command: Vec<String>) -> Self {
        SubprocessTracker { command, handle: TrackerHandle::default() }
    }

    /// Handle for stopping the child process from another thread.
    pub fn handle(&self) -> TrackerHandle { self.handle.clone() }

    fn spawn_child(&self) -> anyhow::Result<Child> {
        let Some((program, args)) = self.command.split_first() else {
            bail!("empty tracker command");
        };
        log::info!("Starting hand tracker: {}", self.command.join(" "));
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start tracker `{}`", program))
    }
}

impl GestureSource for SubprocessTracker {
    fn run(self: Box<Self>, mailbox: GestureMailbox) {
        let mut child = match self.spawn_child() {
            Ok(c)  => c,
            Err(e) => {
                mailbox.mark_unavailable(&TrackingError::Unavailable(format!("{:#}", e)));
                return;
            }
        };
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            mailbox.mark_unavailable(&TrackingError::Unavailable("tracker stdout not captured".into()));
            return;
        };
        {
            let mut slot = self.handle.lock();
            if slot.shutdown {
                let _ = child.kill();
                let _ = child.wait();
                mailbox.mark_unavailable(&TrackingError::Unavailable("tracker stopped".into()));
                return;
            }
            slot.child = Some(child);
        }

        let mut announced = false;
        for line in BufReader::new(stdout).lines() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => {
                    log::warn!("tracker read error: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() { continue; }

            match parse_tracker_line(&line) {
                Ok(obs) => {
                    if !announced {
                        log::info!("Hand tracker ready");
                        announced = true;
                    }
                    mailbox.publish(obs);
                }
                Err(_) => mailbox.mark_ready(),
            }
        }

        // `shutdown` may already have reaped the child
        let child = self.handle.lock().child.take();
        let status = match child {
            Some(mut c) => c.wait().map(|s| s.to_string()).unwrap_or_else(|e| e.to_string()),
            None        => "stopped".to_string(),
        };
        mailbox.mark_unavailable(&TrackingError::Unavailable(format!("tracker exited ({})", status)));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Hand shape the simulator is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPose {
    /// Half-curled hand; tracked but not a gesture.
    Relaxed,
    OpenPalm,
    Fist,
    /// Two relaxed hands held apart.
    TwoHands,
}

/// Raw input event from the simulation window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer position in window pixels, normalized to `[0, 1]`.
    Pointer { x: f32, y: f32 },
    Pose(SimPose),
    /// Show / hide the simulated hand.
    ToggleHand,
    Quit,
}

/// Gesture source driven by [`SimInput`] events from the visualizer window.
pub struct SimGestureSource {
    pub rx: Receiver<SimInput>,
}

/// Second simulated hand sits this far (normalized) from the first.
const SIM_HAND_SEPARATION: f32 = 0.3;

impl GestureSource for SimGestureSource {
    fn run(self: Box<Self>, mailbox: GestureMailbox) {
        let mut pointer = (0.5_f32, 0.5_f32);
        let mut pose    = SimPose::Relaxed;
        let mut visible = true;

        mailbox.mark_ready();
        for input in self.rx {
            match input {
                SimInput::Pointer { x, y } => pointer = (x, y),
                SimInput::Pose(p)          => pose = p,
                SimInput::ToggleHand       => {
                    visible = !visible;
                    log::info!("simulated hand {}", if visible { "shown" } else { "hidden" });
                }
                SimInput::Quit             => return,
            }
            let obs = if visible {
                sim_observation(pointer.0, pointer.1, pose)
            } else {
                HandObservation::empty()
            };
            mailbox.publish(obs);
        }
    }
}

/// Build the observation a camera would report for a hand whose index tip
/// appears on screen at (`screen_x`, `screen_y`).
///
/// The camera image is mirrored relative to the screen, so the landmark x
/// coordinate is flipped.
pub fn sim_observation(screen_x: f32, screen_y: f32, pose: SimPose) -> HandObservation {
    let tip = Landmark::new(1.0 - screen_x.clamp(0.0, 1.0), screen_y.clamp(0.0, 1.0));
    match pose {
        SimPose::Relaxed  => HandObservation::new(vec![synthetic_hand(tip, RELAXED)]),
        SimPose::OpenPalm => HandObservation::new(vec![synthetic_hand(tip, [0.2; 5])]),
        SimPose::Fist     => HandObservation::new(vec![synthetic_hand(tip, [0.08; 5])]),
        SimPose::TwoHands => {
            let dx = if tip.x > 0.5 { -SIM_HAND_SEPARATION } else { SIM_HAND_SEPARATION };
            let other = Landmark::new(tip.x + dx, tip.y);
            HandObservation::new(vec![
                synthetic_hand(tip,   RELAXED),
                synthetic_hand(other, RELAXED),
            ])
        }
    }
}

/// Thumb and index out, the other three curled.
const RELAXED: [f32; 5] = [0.16, 0.16, 0.08, 0.08, 0.08];

/// A plausible 21-point hand with the index tip at `index_tip` and each
/// fingertip `spread[k]` away from the palm centre (thumb first).
pub fn synthetic_hand(index_tip: Landmark, spread: [f32; 5]) -> Hand {
    let palm = Landmark::new(index_tip.x, index_tip.y + spread[1]);
    let mut lms = [palm; LANDMARKS_PER_HAND];

    // Fan the fingers out around "straight up"; the index points exactly up
    // so its tip lands on `index_tip`.
    const FAN: [f32; 5] = [-0.9, 0.0, 0.25, 0.5, 0.75];
    for (k, &tip) in FINGERTIPS.iter().enumerate() {
        let angle = -std::f32::consts::FRAC_PI_2 + FAN[k];
        let end = Landmark::new(palm.x + spread[k] * angle.cos(), palm.y + spread[k] * angle.sin());
        // three joints leading up to each tip
        for j in 1..=3 {
            let t = j as f32 / 4.0;
            lms[tip - 4 + j] = Landmark::new(palm.x + (end.x - palm.x) * t,
                                             palm.y + (end.y - palm.y) * t);
        }
        lms[tip] = end;
    }
    // the palm centre is defined by these two, so they go in last
    lms[WRIST]      = Landmark::new(palm.x, palm.y + 0.05);
    lms[MIDDLE_MCP] = Landmark::new(palm.x, palm.y - 0.05);
    lms[INDEX_TIP]  = index_tip;
    Hand::new(lms)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
