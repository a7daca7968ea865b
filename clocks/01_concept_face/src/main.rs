//! Concept Face
//!
//! Desktop host for the face engine: an analog dial with a creeping hour
//! hand, a tapered minute blade, ambient and mute styles, and a hidden screen
//! behind twelve quick taps. The egui panel stands in for the platform
//! signals a watch would deliver.

mod drawing;
mod ui;

use std::collections::HashMap;
use std::time::Instant;

use chrono::Timelike;
use face_engine::{
    DisplayList, FaceAssets, FaceConfig, FaceEngine, HostRequest, SystemClock, TapEvent, TapKind,
    TimeSource, TimerId, TimerRequest,
};
use ::image::{Rgba, RgbaImage};
use nannou::prelude::*;
use nannou_egui::{self, Egui};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::drawing::{draw_display_list, RasterTextures};
use crate::ui::{draw_host_panel, draw_secondary_screen, draw_status_bar, HostSignals, SignalChanges};

const FACE_NAME: &str = "concept_face";
const WINDOW_SIZE: u32 = 454;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    nannou::app(model).update(update).exit(exit).run();
}

/// Timers the engine asked for, as wall-clock deadlines
#[derive(Default)]
struct PendingTimers {
    deadlines: HashMap<TimerId, Instant>,
}

impl PendingTimers {
    fn apply(&mut self, request: TimerRequest, now: Instant) {
        match request {
            TimerRequest::Schedule { id, delay, .. } => {
                self.deadlines.insert(id, now + delay);
            }
            TimerRequest::Cancel { id } => {
                self.deadlines.remove(&id);
            }
        }
    }

    /// Remove and return every timer due at `now`, earliest first
    fn take_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due: Vec<(Instant, TimerId)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(&id, &deadline)| (deadline, id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }
}

/// Application state
struct Model {
    engine: FaceEngine<SystemClock>,
    timers: PendingTimers,
    /// Set by `Invalidate`; the display list is rebuilt on the next update
    needs_redraw: bool,
    frame: DisplayList,
    textures: RasterTextures,
    signals: HostSignals,
    secondary_open: bool,
    /// Minute of the last host time tick, for ambient redraws
    last_tick_minute: Option<u32>,
    egui: Egui,
}

impl Model {
    fn forward(&mut self, requests: Vec<HostRequest>) {
        let now = Instant::now();
        for request in requests {
            match request {
                HostRequest::Invalidate => self.needs_redraw = true,
                HostRequest::Timer(timer) => self.timers.apply(timer, now),
                HostRequest::LaunchSecondary => {
                    info!("opening secondary screen");
                    self.secondary_open = true;
                }
            }
        }
    }

    fn apply_signal_changes(&mut self, changes: SignalChanges) {
        if changes.visibility {
            let requests = self.engine.on_visibility_changed(self.signals.visible);
            self.forward(requests);
        }
        if changes.capabilities {
            let requests = self
                .engine
                .on_capabilities_changed(self.signals.low_bit_ambient, self.signals.burn_in_protection);
            self.forward(requests);
        }
        if changes.ambient {
            let requests = self.engine.on_ambient_changed(self.signals.ambient);
            self.forward(requests);
        }
        if changes.mute {
            let requests = self.engine.on_mute_changed(self.signals.muted);
            self.forward(requests);
        }
        if let Some(tz) = changes.timezone {
            let requests = self.engine.on_time_zone_changed(tz);
            self.forward(requests);
        }
    }
}

/// Load artwork from the configured directory, or paint placeholders
fn load_assets(config: &FaceConfig) -> FaceAssets {
    let Some(dir) = config.asset_dir.as_ref() else {
        info!("no asset_dir configured, using generated artwork");
        return generated_assets();
    };
    match FaceAssets::load(dir) {
        Ok(assets) => assets,
        Err(e) => {
            error!(%e, dir = %dir.display(), "could not load face assets");
            generated_assets()
        }
    }
}

/// A radial gradient background and a transparent hour-hand layer
fn generated_assets() -> FaceAssets {
    let size = WINDOW_SIZE;
    let c = size as f32 / 2.0;
    let background = RgbaImage::from_fn(size, size, |x, y| {
        let d = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt() / c;
        let t = (1.0 - d).clamp(0.0, 1.0);
        Rgba([
            (20.0 + 40.0 * t) as u8,
            (40.0 + 90.0 * t) as u8,
            (70.0 + 120.0 * t) as u8,
            255,
        ])
    });
    let hour_hand = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    FaceAssets::new(background, hour_hand)
}

fn model(app: &App) -> Model {
    // Create window
    let window_id = app
        .new_window()
        .title("Concept Face")
        .size(WINDOW_SIZE, WINDOW_SIZE)
        .view(view)
        .resized(resized)
        .key_pressed(key_pressed)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);

    // Load configuration
    let config: FaceConfig = match face_engine::load_config(FACE_NAME) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!(%e, "falling back to default config");
            FaceConfig::default()
        }
    };

    let assets = load_assets(&config);
    let engine = FaceEngine::new(&config, assets, SystemClock);
    let signals = HostSignals::new(engine.timezone());

    let mut model = Model {
        engine,
        timers: PendingTimers::default(),
        needs_redraw: true,
        frame: DisplayList::default(),
        textures: RasterTextures::default(),
        signals,
        secondary_open: false,
        last_tick_minute: None,
        egui,
    };

    let rect = window.rect();
    let requests = model.engine.on_surface_changed(rect.w() as u32, rect.h() as u32);
    model.forward(requests);
    let requests = model.engine.on_visibility_changed(true);
    model.forward(requests);

    model
}

fn update(app: &App, model: &mut Model, update: Update) {
    let now = Instant::now();

    // Fire due timers
    for id in model.timers.take_due(now) {
        let requests = model.engine.on_timer_fired(id);
        model.forward(requests);
    }

    // The platform's once-a-minute tick
    let minute = SystemClock.now().minute();
    if model.last_tick_minute != Some(minute) {
        model.last_tick_minute = Some(minute);
        let requests = model.engine.on_time_tick();
        model.forward(requests);
    }

    // Begin egui frame
    model.egui.set_elapsed_time(update.since_start);
    let ctx = model.egui.begin_frame();

    draw_status_bar(
        &ctx,
        &model.engine.snapshot(),
        model.engine.display_mode(),
        model.engine.scheduler_state(),
        model.engine.tap_count(),
    );
    let changes = draw_host_panel(&ctx, &mut model.signals);
    draw_secondary_screen(&ctx, &mut model.secondary_open);

    drop(ctx);

    model.apply_signal_changes(changes);

    model.textures.sync(app, &model.engine);
    if model.needs_redraw {
        model.frame = model.engine.on_draw();
        model.needs_redraw = false;
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    if model.signals.visible {
        draw_display_list(&draw, &model.frame, app.window_rect(), &model.textures);
    }

    // Render to frame
    draw.to_frame(app, &frame).unwrap();

    // Render egui on top
    model.egui.draw_to_frame(&frame).unwrap();
}

fn resized(_app: &App, model: &mut Model, size: Vec2) {
    let requests = model
        .engine
        .on_surface_changed(size.x.max(0.0) as u32, size.y.max(0.0) as u32);
    model.forward(requests);
}

fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    let mut changes = SignalChanges::default();
    let signals = &mut model.signals;
    match key {
        Key::V => {
            signals.visible = !signals.visible;
            changes.visibility = true;
        }
        Key::A => {
            signals.ambient = !signals.ambient;
            changes.ambient = true;
        }
        Key::M => {
            signals.muted = !signals.muted;
            changes.mute = true;
        }
        Key::L => {
            signals.low_bit_ambient = !signals.low_bit_ambient;
            changes.capabilities = true;
        }
        Key::B => {
            signals.burn_in_protection = !signals.burn_in_protection;
            changes.capabilities = true;
        }
        _ => {}
    }
    model.apply_signal_changes(changes);
}

/// Build a tap event at the mouse position, in surface coordinates
fn tap_event(app: &App, kind: TapKind) -> TapEvent {
    let rect = app.window_rect();
    let mut event = TapEvent::tap(
        app.mouse.x - rect.left(),
        rect.top() - app.mouse.y,
        SystemClock.now_millis(),
    );
    event.kind = kind;
    event
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.egui.ctx().wants_pointer_input() {
        return;
    }
    let requests = model.engine.on_tap(tap_event(app, TapKind::Down));
    model.forward(requests);
}

fn mouse_released(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.egui.ctx().wants_pointer_input() {
        return;
    }
    let requests = model.engine.on_tap(tap_event(app, TapKind::Tap));
    model.forward(requests);
}

fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    // Let egui handle raw events for keyboard and mouse input
    model.egui.handle_raw_event(event);
}

fn exit(_app: &App, mut model: Model) {
    let requests = model.engine.shutdown();
    model.forward(requests);
    debug_assert!(model.timers.deadlines.is_empty());
    info!("face engine shut down");
}
