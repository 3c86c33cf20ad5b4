//! Simulation tunables.
//!
//! The force constants are fixed in [`crate::force`]; only pool sizing,
//! event durations and the RNG seed are configurable.

use serde::{Deserialize, Serialize};

pub const MAX_PARTICLES:      usize = 100;
pub const BURST_COUNT:        usize = 40;
pub const EXPLOSION_DURATION: u32   = 60;
pub const RECOVERY_DURATION:  u32   = 120;
pub const RESPAWN_PER_FRAME:  usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Nominal pool size; bursts may exceed it until the next neutral frame.
    pub max_particles:      usize,
    /// Particles appended by one explosion.
    pub burst_count:        usize,
    /// Frames an explosion keeps pushing outward.
    pub explosion_duration: u32,
    /// Frames of gentle dispersal after a gesture is released.
    pub recovery_duration:  u32,
    /// Edge particles considered for respawn per neutral frame.
    pub respawn_per_frame:  usize,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    pub seed:               Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            max_particles:      MAX_PARTICLES,
            burst_count:        BURST_COUNT,
            explosion_duration: EXPLOSION_DURATION,
            recovery_duration:  RECOVERY_DURATION,
            respawn_per_frame:  RESPAWN_PER_FRAME,
            seed:               None,
        }
    }
}
