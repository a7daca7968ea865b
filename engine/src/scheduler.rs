//! Redraw scheduler
//!
//! While the face is visible and interactive it keeps exactly one frame timer
//! armed, each aimed at the next whole interval of wall-clock time so the
//! second hand lands on true second boundaries however late the previous
//! frame ran. In ambient or when hidden it stays idle and the host's own
//! low-frequency tick is the only trigger.

use std::time::Duration;

use tracing::debug;

use crate::timer::{TimerId, TimerIds, TimerPurpose, TimerRequest, TimerSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No frame timer pending
    Idle,
    /// One frame timer pending
    Ticking,
}

/// Result of a fired frame timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTick {
    /// The host should draw a frame
    pub draw: bool,
    /// Follow-up timer for the next boundary
    pub next: Option<TimerRequest>,
}

/// Delay from `now_ms` to the next multiple of `interval_ms`
///
/// Always in `1..=interval_ms`; a time exactly on a boundary waits a full
/// interval.
pub fn delay_to_next_boundary(now_ms: i64, interval_ms: u64) -> Duration {
    let interval = interval_ms.max(1) as i64;
    Duration::from_millis((interval - now_ms.rem_euclid(interval)) as u64)
}

#[derive(Debug)]
pub struct RedrawScheduler {
    state: SchedulerState,
    slot: TimerSlot,
    interval_ms: u64,
}

impl RedrawScheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            state: SchedulerState::Idle,
            slot: TimerSlot::new(TimerPurpose::Redraw),
            interval_ms,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.slot.armed_id()
    }

    /// Begin ticking if the face is visible and interactive
    ///
    /// Schedules an immediate frame. Already ticking is a no-op so there is
    /// never more than one frame timer in flight.
    pub fn start(&mut self, visible: bool, ambient: bool, ids: &mut TimerIds) -> Option<TimerRequest> {
        if !visible || ambient || self.state == SchedulerState::Ticking {
            return None;
        }
        self.state = SchedulerState::Ticking;
        debug!("redraw scheduler ticking");
        Some(self.slot.arm(ids, Duration::ZERO))
    }

    /// Cancel any pending frame and go idle
    pub fn stop(&mut self) -> Option<TimerRequest> {
        if self.state == SchedulerState::Ticking {
            debug!("redraw scheduler idle");
        }
        self.state = SchedulerState::Idle;
        self.slot.disarm()
    }

    /// Re-evaluate after a visibility or ambient change
    pub fn update(&mut self, visible: bool, ambient: bool, ids: &mut TimerIds) -> Option<TimerRequest> {
        if visible && !ambient {
            self.start(visible, ambient, ids)
        } else {
            self.stop()
        }
    }

    /// Handle a fired timer; ids this scheduler does not hold are ignored
    pub fn on_timer(&mut self, id: TimerId, now_ms: i64, ids: &mut TimerIds) -> FrameTick {
        if self.state != SchedulerState::Ticking || !self.slot.fire(id) {
            return FrameTick::default();
        }
        let delay = delay_to_next_boundary(now_ms, self.interval_ms);
        FrameTick {
            draw: true,
            next: Some(self.slot.arm(ids, delay)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_delay(req: Option<TimerRequest>) -> Duration {
        match req {
            Some(TimerRequest::Schedule { delay, .. }) => delay,
            other => panic!("expected schedule, got {:?}", other),
        }
    }

    #[test]
    fn test_delay_aligns_to_second() {
        assert_eq!(delay_to_next_boundary(1_700_000_000_250, 1000), Duration::from_millis(750));
        assert_eq!(delay_to_next_boundary(1_700_000_000_999, 1000), Duration::from_millis(1));
        assert_eq!(delay_to_next_boundary(1_700_000_000_000, 1000), Duration::from_millis(1000));
    }

    #[test]
    fn test_start_requires_visible_interactive() {
        let mut ids = TimerIds::default();
        let mut scheduler = RedrawScheduler::new(1000);
        assert_eq!(scheduler.start(false, false, &mut ids), None);
        assert_eq!(scheduler.start(true, true, &mut ids), None);
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        let req = scheduler.start(true, false, &mut ids);
        assert_eq!(schedule_delay(req), Duration::ZERO);
        assert_eq!(scheduler.state(), SchedulerState::Ticking);

        // Second start keeps the one pending timer
        assert_eq!(scheduler.start(true, false, &mut ids), None);
    }

    #[test]
    fn test_fired_timer_draws_and_reschedules() {
        let mut ids = TimerIds::default();
        let mut scheduler = RedrawScheduler::new(1000);
        let first = scheduler.start(true, false, &mut ids).unwrap().id();

        let tick = scheduler.on_timer(first, 5_340, &mut ids);
        assert!(tick.draw);
        assert_eq!(schedule_delay(tick.next), Duration::from_millis(660));
        assert_eq!(scheduler.state(), SchedulerState::Ticking);

        // The first id is spent
        let stale = scheduler.on_timer(first, 6_000, &mut ids);
        assert_eq!(stale, FrameTick::default());
    }

    #[test]
    fn test_ambient_cancels_pending_frame() {
        let mut ids = TimerIds::default();
        let mut scheduler = RedrawScheduler::new(1000);
        let pending = scheduler.start(true, false, &mut ids).unwrap().id();

        let cancel = scheduler.update(true, true, &mut ids);
        assert_eq!(cancel, Some(TimerRequest::Cancel { id: pending }));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.pending_timer(), None);

        // A late delivery of the cancelled timer does nothing
        assert!(!scheduler.on_timer(pending, 10_000, &mut ids).draw);
    }

    #[test]
    fn test_stop_when_idle_is_quiet() {
        let mut scheduler = RedrawScheduler::new(1000);
        assert_eq!(scheduler.stop(), None);
    }
}
