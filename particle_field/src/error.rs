//! Failures reported by the external hand-tracking collaborator.
//!
//! None of these are fatal to the frame loop.  They are swallowed at the
//! tracker boundary and show up only as the absence of a gesture signal.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingError {
    /// The tracker could not be started; the simulation runs with no hands.
    Unavailable(String),
    /// The tracker skipped a frame; the last observation stays in effect.
    StaleFrame,
    /// A hand arrived with the wrong number of landmarks.
    MalformedObservation { expected: usize, got: usize },
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::Unavailable(why) =>
                write!(f, "hand tracker unavailable: {}", why),
            TrackingError::StaleFrame =>
                write!(f, "hand tracker skipped a frame"),
            TrackingError::MalformedObservation { expected, got } =>
                write!(f, "malformed hand: expected {} landmarks, got {}", expected, got),
        }
    }
}

impl std::error::Error for TrackingError {}
