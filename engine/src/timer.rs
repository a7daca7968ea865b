//! Cancellable single-shot timers
//!
//! The engine never sleeps or spawns; it asks the host to arm and cancel
//! timers and is told when one fires. A [`TimerId`] doubles as the cancel
//! token: a fired id that no longer matches its owner's slot is stale and
//! ignored.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Which component owns a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Next interactive frame
    Redraw,
    /// End of the tap-counting window
    TapWindow,
}

/// What the host must do with its timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    Schedule {
        id: TimerId,
        purpose: TimerPurpose,
        delay: Duration,
    },
    Cancel {
        id: TimerId,
    },
}

impl TimerRequest {
    pub fn id(&self) -> TimerId {
        match *self {
            TimerRequest::Schedule { id, .. } | TimerRequest::Cancel { id } => id,
        }
    }
}

/// Hands out ids that are never reused for the engine's lifetime
#[derive(Debug, Default)]
pub struct TimerIds {
    next: u64,
}

impl TimerIds {
    pub fn next_id(&mut self) -> TimerId {
        self.next += 1;
        TimerId(self.next)
    }
}

/// At most one armed timer for a given purpose
#[derive(Debug)]
pub struct TimerSlot {
    purpose: TimerPurpose,
    armed: Option<TimerId>,
}

impl TimerSlot {
    pub fn new(purpose: TimerPurpose) -> Self {
        Self {
            purpose,
            armed: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_id(&self) -> Option<TimerId> {
        self.armed
    }

    /// Arm with a fresh id. Callers disarm first if something is pending.
    pub fn arm(&mut self, ids: &mut TimerIds, delay: Duration) -> TimerRequest {
        debug_assert!(self.armed.is_none(), "{:?} slot armed twice", self.purpose);
        let id = ids.next_id();
        self.armed = Some(id);
        TimerRequest::Schedule {
            id,
            purpose: self.purpose,
            delay,
        }
    }

    /// Drop the pending timer, returning the cancel request for the host
    pub fn disarm(&mut self) -> Option<TimerRequest> {
        self.armed.take().map(|id| TimerRequest::Cancel { id })
    }

    /// Consume a fired timer. Returns false for stale or foreign ids.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.armed == Some(id) {
            self.armed = None;
            true
        } else {
            false
        }
    }
}
