//! Colors and per-mode paint settings

use serde::Deserialize;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with its alpha replaced
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// How the background layer is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundStyle {
    /// Scaled full-color bitmap
    FullColor,
    /// Scaled desaturated bitmap
    Desaturated,
    /// A single flat color, no bitmap
    Flat(Color),
}

/// Resolved paint settings for one display mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleTable {
    /// Stroke color of the hour hand and coarse ticks
    pub hand_color: Color,
    /// Fill color of the minute hand, second hand and hub
    pub accent_color: Color,
    /// Numeral badge stroke color
    pub numeral_color: Color,
    pub anti_alias: bool,
    /// Blur radius of the drop shadow under hands and ticks; 0 disables it
    pub shadow_radius: f32,
    pub shadow_color: Color,
    /// Alpha of the fine tick layer
    pub tick_alpha: u8,
    /// Alpha of the numeral badge and logo overlay
    pub overlay_alpha: u8,
    /// Alpha applied to the hour and minute hands
    pub hand_alpha: u8,
    pub background: BackgroundStyle,
    pub show_second_hand: bool,
}
