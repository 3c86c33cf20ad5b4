//! Top-level application: configuration, frame loop, wiring.
//!
//! `App` owns the [`Simulation`] and the consumer side of the
//! [`GestureMailbox`].  The gesture source (simulator or external tracker)
//! owns the producer side on its own thread.

use std::fs;
use std::path::Path;
use std::sync::mpsc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use particle_field::{Canvas, FieldConfig, GestureMailbox, Simulation};

use crate::gesture::{spawn_gesture_source, SimGestureSource, SimInput, SubprocessTracker, TrackerHandle};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// External hand tracker.  An empty command selects the keyboard/mouse
/// simulator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub command: Vec<String>,
}

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width:      usize,
    pub height:     usize,
    pub field:      FieldConfig,
    pub tracker:    TrackerConfig,
    /// Fade instead of clear while a gesture is active.
    pub trails:     bool,
    pub show_debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:      960,
            height:     640,
            field:      FieldConfig::default(),
            tracker:    TrackerConfig::default(),
            trails:     true,
            show_debug: true,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file.  A missing file gives the defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c)  => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {:?}, using defaults", path);
                return Ok(AppConfig::default());
            }
            Err(e) => return Err(e).with_context(|| format!("failed to read {:?}", path)),
        };
        let cfg: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {:?}", path))?;
        log::info!("Loaded config from {:?}", path);
        Ok(cfg)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width as f32, self.height as f32)
    }

    pub fn uses_simulator(&self) -> bool { self.tracker.command.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// App
// ════════════════════════════════════════════════════════════════════════════

pub struct App {
    sim:     Simulation,
    mailbox: GestureMailbox,
    canvas:  Canvas,
    /// External tracker process, stopped when the app goes away.
    tracker: Option<TrackerHandle>,
}

impl App {
    pub fn new(cfg: &AppConfig, mailbox: GestureMailbox) -> Self {
        let canvas = cfg.canvas();
        App {
            sim: Simulation::new(cfg.field.clone(), canvas),
            mailbox,
            canvas,
            tracker: None,
        }
    }

    pub fn with_tracker(mut self, handle: TrackerHandle) -> Self {
        self.tracker = Some(handle);
        self
    }

    /// Advance the simulation by one rendered frame.
    pub fn tick(&mut self) {
        self.sim.step(self.canvas, &self.mailbox);
        if self.sim.frames() % 600 == 0 {
            let d = self.sim.debug();
            log::debug!(
                "frame {}: mode={} hand={} tracker={} particles={} bursts={}",
                self.sim.frames(), d.mode.label(), d.hand_detected,
                d.tracker.label(), d.particle_count, self.sim.bursts(),
            );
        }
    }

    pub fn sim(&self) -> &Simulation { &self.sim }

    /// Kill the external tracker, if any.  Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.tracker.take() {
            handle.shutdown();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) { self.shutdown(); }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the gesture source (external tracker when configured, simulator
/// otherwise), opens the visualizer and drives the simulation at ~60 fps.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let mailbox = GestureMailbox::new();

    let mut app = App::new(&cfg, mailbox.clone());
    let sim_tx = if cfg.uses_simulator() {
        let (tx, rx) = mpsc::channel::<SimInput>();
        spawn_gesture_source(SimGestureSource { rx }, mailbox);
        Some(tx)
    } else {
        let tracker = SubprocessTracker::new(cfg.tracker.command.clone());
        app = app.with_tracker(tracker.handle());
        spawn_gesture_source(tracker, mailbox);
        None
    };

    let mut vis = Visualizer::new(cfg.width, cfg.height, sim_tx)
        .context("visualizer startup")?;

    while vis.is_open() {
        if !vis.poll_input() { break; }
        app.tick();
        vis.render(app.sim().frame(), app.sim().debug(), cfg.trails, cfg.show_debug);
    }

    log::info!("Window closed after {} frames", app.sim().frames());
    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{sim_observation, SimPose};
    use particle_field::{Mode, TrackerStatus};

    fn seeded() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.field.seed = Some(99);
        cfg
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"width": 640, "field": {"max_particles": 50}}"#
        ).unwrap();
        assert_eq!(cfg.width, 640);
        assert_eq!(cfg.height, 640);
        assert_eq!(cfg.field.max_particles, 50);
        assert_eq!(cfg.field.burst_count, 40);
        assert!(cfg.uses_simulator());
    }

    #[test]
    fn tracker_command_disables_simulator() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"tracker": {"command": ["python3", "track.py"]}}"#
        ).unwrap();
        assert!(!cfg.uses_simulator());
    }

    #[test]
    fn missing_config_file_gives_defaults() {
        let cfg = AppConfig::load(Path::new("/nonexistent/gesture_particles.json")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn bad_config_file_is_an_error() {
        let path = std::env::temp_dir().join("gesture_particles_bad_config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn tick_picks_up_published_gesture() {
        let mb = GestureMailbox::new();
        let mut app = App::new(&seeded(), mb.clone());
        app.tick();
        assert_eq!(app.sim().mode(), Mode::None);

        mb.publish(sim_observation(0.5, 0.5, SimPose::OpenPalm));
        app.tick();
        assert_eq!(app.sim().mode(), Mode::Repel);
        assert_eq!(app.sim().debug().tracker, TrackerStatus::Ready);
    }

    #[test]
    fn two_hand_gesture_bursts_once_through_the_app() {
        let mb = GestureMailbox::new();
        let mut app = App::new(&seeded(), mb.clone());
        for _ in 0..20 {
            mb.publish(sim_observation(0.3, 0.5, SimPose::TwoHands));
            app.tick();
        }
        assert_eq!(app.sim().bursts(), 1);
        assert_eq!(app.sim().pool().len(), 140);
    }

    #[cfg(unix)]
    #[test]
    fn dropping_the_app_stops_its_tracker() {
        let mb = GestureMailbox::new();
        let tracker = SubprocessTracker::new(vec!["sleep".into(), "30".into()]);
        let handle = tracker.handle();
        let reader = spawn_gesture_source(tracker, mb.clone());
        let app = App::new(&seeded(), mb.clone()).with_tracker(handle.clone());

        let started = std::time::Instant::now();
        while !handle.is_running() && started.elapsed() < std::time::Duration::from_secs(5) {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        drop(app);
        reader.join().unwrap();
        assert!(!handle.is_running());
        assert_eq!(mb.status(), TrackerStatus::Unavailable);
    }
}
