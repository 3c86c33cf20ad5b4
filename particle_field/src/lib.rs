//! # particle_field
//!
//! A 2-D particle force field steered by hand gestures.
//!
//! A hand tracker (external, asynchronous) publishes one [`HandObservation`]
//! at a time into a [`GestureMailbox`].  Once per rendered frame the
//! [`Simulation`] reads the newest observation, classifies it into a
//! [`Mode`], estimates fingertip motion, runs the one-shot transitions
//! (explosion burst, release recovery) and pushes every particle through the
//! force field.  The renderer then reads a [`FrameView`].
//!
//! ## Gesture → Mode mapping
//!
//! | Gesture | Mode | Effect on particles |
//! |---|---|---|
//! | Open palm (one hand) | `Repel` | pushed away from the fingertip |
//! | Fist (one hand) | `Attract` | pulled toward the fingertip |
//! | Two hands apart | `Explosion` | 40-particle burst + outward shock |
//! | Anything else | `None` | ambient drift; recovery after release |
//!
//! ## Quick start
//!
//! ```rust
//! use particle_field::{Canvas, FieldConfig, GestureMailbox, Simulation};
//!
//! let canvas  = Canvas::new(640.0, 480.0);
//! let mailbox = GestureMailbox::new();
//! let mut sim = Simulation::new(FieldConfig { seed: Some(1), ..FieldConfig::default() }, canvas);
//!
//! // Hand tracker thread: mailbox.clone().publish(observation)
//! sim.step(canvas, &mailbox);
//! assert_eq!(sim.frame().particles.len(), 100);
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod force;
pub mod landmark;
pub mod mailbox;
pub mod motion;
pub mod pool;
pub mod simulation;
pub mod transition;

pub use classifier::{classify, Classification, Mode};
pub use config::FieldConfig;
pub use error::TrackingError;
pub use landmark::{Canvas, Hand, HandObservation, Landmark, Point};
pub use mailbox::{GestureMailbox, TrackerStatus};
pub use motion::{MotionEstimator, MotionSignal};
pub use pool::{Particle, ParticlePool};
pub use simulation::{DebugSnapshot, FrameView, Simulation};
pub use transition::{ExplosionState, RecoveryState, TransitionController};
