//! # gesture_particles
//!
//! Hand-tracking particle visualizer built on [`particle_field`].
//!
//! A gesture source publishes hand landmarks into a mailbox from its own
//! thread; the window loop steps the simulation once per frame and draws
//! the particles with `minifb`.
//!
//! ## Gesture sources
//!
//! * (default) — **Simulation mode**: the mouse is the index fingertip and
//!   held keys choose the hand shape.
//! * `tracker.command` in the config (or `--tracker …`) — **Tracker mode**:
//!   runs an external landmark detector that prints one JSON line per camera
//!   frame (see [`gesture::SubprocessTracker`]).
//!
//! ### Simulation keyboard shortcuts
//!
//! | Input | Gesture |
//! |---|---|
//! | Mouse | Index fingertip position |
//! | `O` / hold | Open palm → repel |
//! | `F` / hold | Fist → attract |
//! | `E` / hold | Two hands apart → explosion |
//! | `H` | Hide / show the hand |
//! | `Q` / `Escape` | Quit |

pub mod gesture;
pub mod visualizer;
pub mod app;
