//! Repeated-tap detection
//!
//! Counts completed taps inside a fixed window that opens on the first tap
//! and is not extended by later ones. Reaching the threshold fires the
//! trigger action once and zeroes the count; the window's own expiry still
//! runs and harmlessly zeroes an already-zero count.

use std::time::Duration;

use tracing::{debug, info};

use crate::geometry::Point;
use crate::timer::{TimerId, TimerIds, TimerPurpose, TimerRequest, TimerSlot};

/// Kind of touch event the host reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    /// Finger went down
    Down,
    /// A different gesture took over
    Cancel,
    /// A completed tap
    Tap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    pub kind: TapKind,
    pub position: Point,
    /// Host event time in milliseconds
    pub timestamp_ms: i64,
}

impl TapEvent {
    pub fn tap(x: f32, y: f32, timestamp_ms: i64) -> Self {
        Self {
            kind: TapKind::Tap,
            position: Point { x, y },
            timestamp_ms,
        }
    }
}

/// The one-shot secondary action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TapOutcome {
    pub trigger: Option<TriggerAction>,
    /// Window timer to arm, on the first tap of a window
    pub timer: Option<TimerRequest>,
}

#[derive(Debug)]
pub struct TapGestureCounter {
    count: u32,
    threshold: u32,
    window: Duration,
    slot: TimerSlot,
}

impl TapGestureCounter {
    pub fn new(threshold: u32, window: Duration) -> Self {
        Self {
            count: 0,
            threshold: threshold.max(1),
            window,
            slot: TimerSlot::new(TimerPurpose::TapWindow),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn window_active(&self) -> bool {
        self.slot.is_armed()
    }

    pub fn on_tap(&mut self, ids: &mut TimerIds) -> TapOutcome {
        let mut outcome = TapOutcome::default();
        self.count += 1;

        if !self.slot.is_armed() {
            outcome.timer = Some(self.slot.arm(ids, self.window));
        }

        if self.count >= self.threshold {
            info!(taps = self.count, "tap threshold reached");
            self.count = 0;
            outcome.trigger = Some(TriggerAction);
        }

        outcome
    }

    /// Handle a fired timer; returns false if it was not this window's
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if !self.slot.fire(id) {
            return false;
        }
        debug!(taps = self.count, "tap window expired");
        self.count = 0;
        true
    }

    /// Cancel the window on teardown
    pub fn cancel(&mut self) -> Option<TimerRequest> {
        self.count = 0;
        self.slot.disarm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> TapGestureCounter {
        TapGestureCounter::new(12, Duration::from_millis(3000))
    }

    #[test]
    fn test_twelve_taps_trigger_once() {
        let mut ids = TimerIds::default();
        let mut taps = counter();
        let mut triggers = 0;
        let mut windows = 0;

        for i in 1..=12 {
            let outcome = taps.on_tap(&mut ids);
            triggers += outcome.trigger.iter().count();
            windows += outcome.timer.iter().count();
            if i < 12 {
                assert_eq!(taps.count(), i);
            }
        }

        assert_eq!(triggers, 1);
        assert_eq!(windows, 1);
        assert_eq!(taps.count(), 0);
        // The window keeps running after the trigger
        assert!(taps.window_active());
    }

    #[test]
    fn test_expired_window_resets_count() {
        let mut ids = TimerIds::default();
        let mut taps = counter();

        let window = taps.on_tap(&mut ids).timer.unwrap();
        assert!(matches!(
            window,
            TimerRequest::Schedule { delay, purpose: TimerPurpose::TapWindow, .. }
                if delay == Duration::from_millis(3000)
        ));
        for _ in 0..10 {
            assert_eq!(taps.on_tap(&mut ids), TapOutcome::default());
        }
        assert_eq!(taps.count(), 11);

        assert!(taps.on_timer(window.id()));
        assert_eq!(taps.count(), 0);
        assert!(!taps.window_active());

        let outcome = taps.on_tap(&mut ids);
        assert_eq!(outcome.trigger, None);
        assert!(outcome.timer.is_some());
        assert_eq!(taps.count(), 1);
    }

    #[test]
    fn test_expiry_after_trigger_is_harmless() {
        let mut ids = TimerIds::default();
        let mut taps = counter();
        let window = taps.on_tap(&mut ids).timer.unwrap().id();
        for _ in 0..11 {
            taps.on_tap(&mut ids);
        }
        // Post-trigger taps share the still-open window
        let outcome = taps.on_tap(&mut ids);
        assert_eq!(outcome.timer, None);
        assert_eq!(taps.count(), 1);

        assert!(taps.on_timer(window));
        assert_eq!(taps.count(), 0);
    }

    #[test]
    fn test_foreign_timer_ignored() {
        let mut ids = TimerIds::default();
        let mut taps = counter();
        taps.on_tap(&mut ids);
        let foreign = ids.next_id();
        assert!(!taps.on_timer(foreign));
        assert_eq!(taps.count(), 1);
    }

    #[test]
    fn test_cancel_disarms_window() {
        let mut ids = TimerIds::default();
        let mut taps = counter();
        let window = taps.on_tap(&mut ids).timer.unwrap().id();
        assert_eq!(taps.cancel(), Some(TimerRequest::Cancel { id: window }));
        assert_eq!(taps.count(), 0);
        assert!(!taps.on_timer(window));
    }
}
