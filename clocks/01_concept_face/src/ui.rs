//! UI module - egui stand-ins for the platform
//!
//! A desktop window has no ambient mode, interruption filter or display
//! capabilities, so this panel plays the platform and reports them.

use chrono_tz::Tz;
use face_engine::time_source::parse_timezone;
use face_engine::{CalendarSnapshot, DisplayMode, SchedulerState};
use nannou_egui::egui;

/// Signals the platform would normally deliver
pub struct HostSignals {
    pub visible: bool,
    pub ambient: bool,
    pub low_bit_ambient: bool,
    pub burn_in_protection: bool,
    pub muted: bool,
    /// Text in the timezone field
    pub timezone_query: String,
    /// Last timezone parse error, shown under the field
    pub timezone_error: Option<String>,
}

impl HostSignals {
    pub fn new(timezone: Tz) -> Self {
        Self {
            visible: true,
            ambient: false,
            low_bit_ambient: false,
            burn_in_protection: false,
            muted: false,
            timezone_query: timezone.name().to_string(),
            timezone_error: None,
        }
    }
}

/// Which signals the user changed this frame
#[derive(Default)]
pub struct SignalChanges {
    pub visibility: bool,
    pub ambient: bool,
    pub capabilities: bool,
    pub mute: bool,
    pub timezone: Option<Tz>,
}

/// Draw the host signals panel
pub fn draw_host_panel(ctx: &egui::Context, signals: &mut HostSignals) -> SignalChanges {
    let mut changes = SignalChanges::default();

    egui::Window::new("Host Signals")
        .collapsible(true)
        .resizable(false)
        .default_width(220.0)
        .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -40.0])
        .show(ctx, |ui| {
            changes.visibility = ui.checkbox(&mut signals.visible, "Visible (V)").changed();
            changes.ambient = ui.checkbox(&mut signals.ambient, "Ambient (A)").changed();
            changes.mute = ui.checkbox(&mut signals.muted, "Mute (M)").changed();

            ui.separator();
            ui.label("Display capabilities");
            let low_bit = ui
                .checkbox(&mut signals.low_bit_ambient, "Low-bit ambient (L)")
                .changed();
            let burn_in = ui
                .checkbox(&mut signals.burn_in_protection, "Burn-in protection (B)")
                .changed();
            changes.capabilities = low_bit || burn_in;

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Zone:");
                ui.text_edit_singleline(&mut signals.timezone_query);
                if ui.button("Apply").clicked() {
                    match parse_timezone(signals.timezone_query.trim()) {
                        Ok(tz) => {
                            signals.timezone_error = None;
                            changes.timezone = Some(tz);
                        }
                        Err(e) => signals.timezone_error = Some(e.to_string()),
                    }
                }
            });
            if let Some(ref error) = signals.timezone_error {
                ui.colored_label(egui::Color32::from_rgb(255, 120, 120), error.as_str());
            }
        });

    changes
}

/// Draw the status bar (top)
pub fn draw_status_bar(
    ctx: &egui::Context,
    snapshot: &CalendarSnapshot,
    mode: DisplayMode,
    scheduler: SchedulerState,
    tap_count: u32,
) {
    egui::TopBottomPanel::top("status_bar")
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} · {}",
                    snapshot.format_time(),
                    snapshot.timezone.name()
                ));
                ui.separator();
                ui.label(format!(
                    "{:?}{}",
                    mode.power,
                    if mode.muted { " · muted" } else { "" }
                ));
                ui.separator();
                ui.label(format!("Scheduler: {:?}", scheduler));
                ui.separator();
                ui.label(format!("Taps: {}", tap_count));
            });
        });
}

/// The secondary screen opened by the tap trigger
pub fn draw_secondary_screen(ctx: &egui::Context, open: &mut bool) {
    if !*open {
        return;
    }

    let mut close_clicked = false;
    egui::Window::new("\u{221e}")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("You found it.");
            ui.label("Twelve taps in three seconds.");
            ui.separator();
            if ui.button("Close").clicked() {
                close_clicked = true;
            }
        });

    if close_clicked {
        *open = false;
    }
}
