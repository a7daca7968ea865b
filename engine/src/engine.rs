//! Face engine - the state a host adapter drives
//!
//! The host owns the window, the timers and the real clock. It forwards its
//! lifecycle events to the callbacks here, carries out the returned
//! [`HostRequest`]s, and asks for a [`DisplayList`] whenever it draws.

use std::time::Duration;

use chrono_tz::Tz;
use image::RgbaImage;
use tracing::{debug, info};

use crate::background::{FaceAssets, RasterId, ScaledBackground};
use crate::config::FaceConfig;
use crate::geometry::{FaceLayout, HandAngles};
use crate::gesture::{TapEvent, TapGestureCounter, TapKind};
use crate::mode::{DisplayMode, DisplayModeState, Palette};
use crate::render::{render, DisplayList, FrameInputs};
use crate::scheduler::{RedrawScheduler, SchedulerState};
use crate::time_source::{configured_timezone, snapshot_at, CalendarSnapshot, TimeSource};
use crate::timer::{TimerId, TimerIds, TimerRequest};

/// Something the host must do on the engine's behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Draw a frame as soon as convenient
    Invalidate,
    Timer(TimerRequest),
    /// Open the secondary screen
    LaunchSecondary,
}

pub struct FaceEngine<C: TimeSource> {
    clock: C,
    timezone: Tz,
    /// Zone pinned by config; `None` follows the system zone
    configured_zone: Option<Tz>,
    /// System zone as of the last check
    system_zone: Tz,
    assets: FaceAssets,
    mode: DisplayModeState,
    scheduler: RedrawScheduler,
    taps: TapGestureCounter,
    timer_ids: TimerIds,
    background: ScaledBackground,
    layout: Option<FaceLayout>,
    visible: bool,
}

impl<C: TimeSource> FaceEngine<C> {
    pub fn new(config: &FaceConfig, assets: FaceAssets, clock: C) -> Self {
        let configured_zone = configured_timezone(config.timezone.as_deref());
        let system_zone = clock.system_timezone().unwrap_or(Tz::UTC);
        let timezone = configured_zone.unwrap_or(system_zone);
        info!(timezone = timezone.name(), "face engine created");
        Self {
            clock,
            timezone,
            configured_zone,
            system_zone,
            assets,
            mode: DisplayModeState::new(Palette::from_config(config)),
            scheduler: RedrawScheduler::new(config.redraw_interval_ms),
            taps: TapGestureCounter::new(
                config.tap_threshold,
                Duration::from_millis(config.tap_window_ms),
            ),
            timer_ids: TimerIds::default(),
            background: ScaledBackground::new(),
            layout: None,
            visible: false,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.mode.mode()
    }

    pub fn mode_state(&self) -> &DisplayModeState {
        &self.mode
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn tap_count(&self) -> u32 {
        self.taps.count()
    }

    pub fn layout(&self) -> Option<&FaceLayout> {
        self.layout.as_ref()
    }

    /// Bumps each time the cached rasters are rebuilt
    pub fn background_generation(&self) -> u64 {
        self.background.generation()
    }

    pub fn raster(&self, id: RasterId) -> Option<&RgbaImage> {
        self.background.raster(id)
    }

    /// Take the calendar snapshot for a frame
    pub fn snapshot(&self) -> CalendarSnapshot {
        snapshot_at(self.timezone, self.clock.now())
    }

    /// Build the frame for the current instant
    pub fn on_draw(&self) -> DisplayList {
        let Some(layout) = self.layout.as_ref() else {
            return DisplayList::default();
        };
        let snapshot = self.snapshot();
        let style = self.mode.style();
        render(&FrameInputs {
            snapshot: &snapshot,
            angles: HandAngles::for_snapshot(&snapshot),
            style: &style,
            layout,
            background: &self.background,
        })
    }

    pub fn on_visibility_changed(&mut self, visible: bool) -> Vec<HostRequest> {
        self.visible = visible;
        let mut requests = Vec::new();
        if visible {
            self.refresh_system_timezone();
            requests.push(HostRequest::Invalidate);
        }
        self.update_scheduler(&mut requests);
        requests
    }

    pub fn on_ambient_changed(&mut self, ambient: bool) -> Vec<HostRequest> {
        let mut requests = Vec::new();
        if self.mode.set_ambient(ambient) {
            debug!(ambient, mode = ?self.mode.mode(), "ambient changed");
            requests.push(HostRequest::Invalidate);
        }
        self.update_scheduler(&mut requests);
        requests
    }

    pub fn on_capabilities_changed(&mut self, low_bit: bool, burn_in: bool) -> Vec<HostRequest> {
        if self.mode.set_capabilities(low_bit, burn_in) {
            debug!(low_bit, burn_in, "display capabilities changed");
            vec![HostRequest::Invalidate]
        } else {
            Vec::new()
        }
    }

    /// Mute follows the host's interruption filter
    pub fn on_mute_changed(&mut self, muted: bool) -> Vec<HostRequest> {
        if self.mode.set_muted(muted) {
            debug!(muted, "mute changed");
            vec![HostRequest::Invalidate]
        } else {
            Vec::new()
        }
    }

    /// The host's own low-frequency tick, the only trigger in ambient
    pub fn on_time_tick(&mut self) -> Vec<HostRequest> {
        vec![HostRequest::Invalidate]
    }

    /// Redraw now, whatever the scheduler is doing
    pub fn on_time_zone_changed(&mut self, timezone: Tz) -> Vec<HostRequest> {
        if timezone != self.timezone {
            info!(from = self.timezone.name(), to = timezone.name(), "timezone changed");
            self.timezone = timezone;
        }
        vec![HostRequest::Invalidate]
    }

    pub fn on_surface_changed(&mut self, width: u32, height: u32) -> Vec<HostRequest> {
        if width == 0 || height == 0 {
            debug!(width, height, "ignoring empty surface");
            return Vec::new();
        }
        self.layout = Some(FaceLayout::calculate(width, height));
        self.background.resize(&self.assets, width, height);
        vec![HostRequest::Invalidate]
    }

    pub fn on_tap(&mut self, event: TapEvent) -> Vec<HostRequest> {
        if event.kind != TapKind::Tap {
            return Vec::new();
        }
        let outcome = self.taps.on_tap(&mut self.timer_ids);
        let mut requests: Vec<HostRequest> = outcome.timer.map(HostRequest::Timer).into_iter().collect();
        if outcome.trigger.is_some() {
            requests.push(HostRequest::LaunchSecondary);
        }
        requests.push(HostRequest::Invalidate);
        requests
    }

    /// A timer the engine asked for has fired
    pub fn on_timer_fired(&mut self, id: TimerId) -> Vec<HostRequest> {
        if self.taps.on_timer(id) {
            return Vec::new();
        }

        let now_ms = self.clock.now_millis();
        let tick = self.scheduler.on_timer(id, now_ms, &mut self.timer_ids);
        let mut requests = Vec::new();
        if tick.draw {
            requests.push(HostRequest::Invalidate);
        }
        requests.extend(tick.next.map(HostRequest::Timer));
        if requests.is_empty() {
            debug!(%id, "ignoring stale timer");
        }
        requests
    }

    /// Cancel every armed timer; the engine can be dropped afterwards
    pub fn shutdown(&mut self) -> Vec<HostRequest> {
        self.visible = false;
        [self.scheduler.stop(), self.taps.cancel()]
            .into_iter()
            .flatten()
            .map(HostRequest::Timer)
            .collect()
    }

    /// Adopt the system zone if it moved while the face was hidden
    fn refresh_system_timezone(&mut self) {
        if self.configured_zone.is_some() {
            return;
        }
        let system = self.clock.system_timezone().unwrap_or(Tz::UTC);
        if system != self.system_zone {
            info!(from = self.system_zone.name(), to = system.name(), "system timezone changed");
            self.system_zone = system;
            self.timezone = system;
        }
    }

    fn update_scheduler(&mut self, requests: &mut Vec<HostRequest>) {
        let change = self
            .scheduler
            .update(self.visible, self.mode.is_ambient(), &mut self.timer_ids);
        requests.extend(change.map(HostRequest::Timer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::tests::test_assets;
    use crate::render::Layer;
    use crate::time_source::ManualClock;
    use chrono::{TimeZone, Utc};

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 0).unwrap() + chrono::Duration::milliseconds(250)
    }

    fn engine(clock: &ManualClock) -> FaceEngine<&ManualClock> {
        let config = FaceConfig {
            timezone: Some("UTC".to_string()),
            ..FaceConfig::default()
        };
        FaceEngine::new(&config, test_assets(), clock)
    }

    fn scheduled(requests: &[HostRequest]) -> Vec<(TimerId, Duration)> {
        requests
            .iter()
            .filter_map(|r| match r {
                HostRequest::Timer(TimerRequest::Schedule { id, delay, .. }) => Some((*id, *delay)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_visible_interactive_starts_ticking() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        face.on_surface_changed(400, 400);

        let requests = face.on_visibility_changed(true);
        assert!(requests.contains(&HostRequest::Invalidate));
        let timers = scheduled(&requests);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].1, Duration::ZERO);
        assert_eq!(face.scheduler_state(), SchedulerState::Ticking);

        let requests = face.on_timer_fired(timers[0].0);
        assert!(requests.contains(&HostRequest::Invalidate));
        assert_eq!(scheduled(&requests)[0].1, Duration::from_millis(750));
    }

    #[test]
    fn test_ambient_while_ticking_goes_idle() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        let pending = scheduled(&face.on_visibility_changed(true))[0].0;

        let requests = face.on_ambient_changed(true);
        assert!(requests.contains(&HostRequest::Timer(TimerRequest::Cancel { id: pending })));
        assert_eq!(face.scheduler_state(), SchedulerState::Idle);

        // Ambient still honours the host tick and timezone changes
        assert_eq!(face.on_time_tick(), vec![HostRequest::Invalidate]);
        let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
        assert_eq!(face.on_time_zone_changed(tokyo), vec![HostRequest::Invalidate]);
        assert_eq!(face.snapshot().hour, 6);

        // And the cancelled frame timer is inert
        assert!(face.on_timer_fired(pending).is_empty());

        let requests = face.on_ambient_changed(false);
        assert_eq!(scheduled(&requests).len(), 1);
        assert_eq!(face.scheduler_state(), SchedulerState::Ticking);
    }

    #[test]
    fn test_unpinned_zone_follows_system_on_show() {
        let clock = ManualClock::new(start());
        clock.set_system_timezone(Some(Tz::Asia__Tokyo));
        let mut face = FaceEngine::new(&FaceConfig::default(), test_assets(), &clock);
        assert_eq!(face.timezone(), Tz::Asia__Tokyo);

        clock.set_system_timezone(Some(Tz::Europe__London));
        face.on_visibility_changed(false);
        assert_eq!(face.timezone(), Tz::Asia__Tokyo);
        face.on_visibility_changed(true);
        assert_eq!(face.timezone(), Tz::Europe__London);
        assert_eq!(face.snapshot().timezone, Tz::Europe__London);
    }

    #[test]
    fn test_host_zone_kept_until_system_moves() {
        let clock = ManualClock::new(start());
        clock.set_system_timezone(Some(Tz::UTC));
        let mut face = FaceEngine::new(&FaceConfig::default(), test_assets(), &clock);

        face.on_time_zone_changed(Tz::Asia__Tokyo);
        face.on_visibility_changed(true);
        assert_eq!(face.timezone(), Tz::Asia__Tokyo);

        clock.set_system_timezone(Some(Tz::America__New_York));
        face.on_visibility_changed(true);
        assert_eq!(face.timezone(), Tz::America__New_York);
    }

    #[test]
    fn test_configured_zone_ignores_system() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        clock.set_system_timezone(Some(Tz::Asia__Tokyo));
        face.on_visibility_changed(true);
        assert_eq!(face.timezone(), Tz::UTC);
    }

    #[test]
    fn test_hidden_face_never_ticks() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        let requests = face.on_visibility_changed(false);
        assert!(requests.is_empty());
        assert_eq!(face.scheduler_state(), SchedulerState::Idle);
    }

    #[test]
    fn test_twelfth_tap_launches_secondary() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        let mut launches = 0;
        let mut window = None;
        for i in 0..12 {
            let requests = face.on_tap(TapEvent::tap(10.0, 10.0, i * 100));
            launches += requests
                .iter()
                .filter(|r| **r == HostRequest::LaunchSecondary)
                .count();
            if let Some((id, _)) = scheduled(&requests).first() {
                window = Some(*id);
            }
        }
        assert_eq!(launches, 1);
        assert_eq!(face.tap_count(), 0);

        // Window expiry after the trigger changes nothing visible
        assert!(face.on_timer_fired(window.unwrap()).is_empty());
        assert_eq!(face.tap_count(), 0);
    }

    #[test]
    fn test_non_tap_events_ignored() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        let mut down = TapEvent::tap(0.0, 0.0, 0);
        down.kind = TapKind::Down;
        assert!(face.on_tap(down).is_empty());
        down.kind = TapKind::Cancel;
        assert!(face.on_tap(down).is_empty());
        assert_eq!(face.tap_count(), 0);
    }

    #[test]
    fn test_background_regenerates_per_size_change_only() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        face.on_surface_changed(320, 320);
        for _ in 0..20 {
            face.on_draw();
        }
        face.on_surface_changed(320, 320);
        face.on_surface_changed(0, 0);
        face.on_surface_changed(480, 480);
        for _ in 0..20 {
            face.on_draw();
        }
        assert_eq!(face.background_generation(), 2);
        assert_eq!(face.layout().unwrap().width, 480);
    }

    #[test]
    fn test_draw_before_surface_is_empty() {
        let clock = ManualClock::new(start());
        let face = engine(&clock);
        assert!(face.on_draw().is_empty());
    }

    #[test]
    fn test_draw_follows_clock() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        face.on_surface_changed(400, 400);
        let before = face.on_draw();
        clock.advance_millis(60_000);
        let after = face.on_draw();
        assert_ne!(
            before.in_layer(Layer::MinuteHand).next(),
            after.in_layer(Layer::MinuteHand).next()
        );
    }

    #[test]
    fn test_mute_invalidates_once() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        assert_eq!(face.on_mute_changed(true), vec![HostRequest::Invalidate]);
        assert!(face.on_mute_changed(true).is_empty());
        assert!(face.display_mode().muted);
    }

    #[test]
    fn test_shutdown_cancels_all_timers() {
        let clock = ManualClock::new(start());
        let mut face = engine(&clock);
        let frame = scheduled(&face.on_visibility_changed(true))[0].0;
        let window = scheduled(&face.on_tap(TapEvent::tap(1.0, 1.0, 0)))[0].0;

        let requests = face.shutdown();
        assert_eq!(requests.len(), 2);
        assert!(requests.contains(&HostRequest::Timer(TimerRequest::Cancel { id: frame })));
        assert!(requests.contains(&HostRequest::Timer(TimerRequest::Cancel { id: window })));
        assert_eq!(face.scheduler_state(), SchedulerState::Idle);
    }
}
