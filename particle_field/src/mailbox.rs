//! Single-slot hand-observation mailbox.
//!
//! The hand tracker runs at its own pace on another thread; the frame loop
//! must never wait for it.  The tracker `publish`es each observation into a
//! one-element slot (overwriting whatever was there), and the frame loop
//! `take_latest`s at most once per frame.  Intermediate observations that
//! were never read are simply lost, which is the intended
//! last-write-wins behaviour.
//!
//! Tracker status is kept alongside in an atomic so that a late
//! "unavailable" is never overwritten by a stale observation.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

use crate::error::TrackingError;
use crate::landmark::HandObservation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerStatus {
    /// No output from the tracker yet.
    Starting,
    /// At least one result has arrived.
    Ready,
    /// The tracker failed or exited; no more observations will come.
    Unavailable,
}

impl TrackerStatus {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => TrackerStatus::Ready,
            2 => TrackerStatus::Unavailable,
            _ => TrackerStatus::Starting,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            TrackerStatus::Starting    => 0,
            TrackerStatus::Ready       => 1,
            TrackerStatus::Unavailable => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackerStatus::Starting    => "STARTING",
            TrackerStatus::Ready       => "READY",
            TrackerStatus::Unavailable => "UNAVAILABLE",
        }
    }
}

#[derive(Debug)]
struct Shared {
    slot:   Mutex<Option<HandObservation>>,
    status: AtomicU8,
}

/// Cloneable handle; the producer and the consumer each hold one.
#[derive(Clone, Debug)]
pub struct GestureMailbox {
    shared: Arc<Shared>,
}

impl Default for GestureMailbox {
    fn default() -> Self { GestureMailbox::new() }
}

impl GestureMailbox {
    pub fn new() -> Self {
        GestureMailbox {
            shared: Arc::new(Shared {
                slot:   Mutex::new(None),
                status: AtomicU8::new(TrackerStatus::Starting.as_u8()),
            }),
        }
    }

    /// Replace the pending observation.  Marks the tracker ready unless it
    /// has already been declared unavailable.
    pub fn publish(&self, obs: HandObservation) {
        let mut slot = match self.shared.slot.lock() {
            Ok(g)  => g,
            Err(p) => p.into_inner(),
        };
        *slot = Some(obs);
        drop(slot);
        self.mark_ready();
    }

    /// Newest unread observation, if any.  Never blocks: if the producer
    /// holds the lock right now this frame sees nothing new.
    pub fn take_latest(&self) -> Option<HandObservation> {
        match self.shared.slot.try_lock() {
            Ok(mut slot)                   => slot.take(),
            Err(TryLockError::Poisoned(p)) => p.into_inner().take(),
            Err(TryLockError::WouldBlock)  => None,
        }
    }

    pub fn mark_ready(&self) {
        let _ = self.shared.status.compare_exchange(
            TrackerStatus::Starting.as_u8(),
            TrackerStatus::Ready.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Declare the tracker dead; subsequent frames run with no hands.
    pub fn mark_unavailable(&self, why: &TrackingError) {
        log::error!("{}", why);
        self.shared.status.store(TrackerStatus::Unavailable.as_u8(), Ordering::Release);
    }

    pub fn status(&self) -> TrackerStatus {
        TrackerStatus::from_u8(self.shared.status.load(Ordering::Acquire))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
