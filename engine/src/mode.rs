//! Display mode state
//!
//! Tracks the four host-driven flags and maps each combination onto a
//! [`StyleTable`]. Every combination resolves to a style; there are no
//! illegal transitions.

use crate::config::{FaceConfig, MUTED_ALPHA_RANGE};
use crate::style::{BackgroundStyle, Color, StyleTable};

/// Shadow radius used while interactive
pub const SHADOW_RADIUS: f32 = 6.0;

/// Base power mode of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerMode {
    Interactive,
    Ambient,
    AmbientLowBit,
    AmbientBurnIn,
}

impl PowerMode {
    pub fn is_ambient(self) -> bool {
        !matches!(self, PowerMode::Interactive)
    }

    pub fn all() -> &'static [PowerMode] {
        &[
            PowerMode::Interactive,
            PowerMode::Ambient,
            PowerMode::AmbientLowBit,
            PowerMode::AmbientBurnIn,
        ]
    }
}

/// Power mode plus the independent mute axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    pub power: PowerMode,
    pub muted: bool,
}

impl DisplayMode {
    pub const INTERACTIVE: DisplayMode = DisplayMode {
        power: PowerMode::Interactive,
        muted: false,
    };

    /// Every mode combination
    pub fn all() -> impl Iterator<Item = DisplayMode> {
        PowerMode::all().iter().flat_map(|&power| {
            [false, true]
                .into_iter()
                .map(move |muted| DisplayMode { power, muted })
        })
    }
}

/// Colors that do not depend on the mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub hand: Color,
    pub accent: Color,
    pub muted_hand_alpha: u8,
    pub second_hand_enabled: bool,
}

impl Palette {
    pub fn from_config(config: &FaceConfig) -> Self {
        Self {
            hand: config.hand_color,
            accent: config.accent_color,
            muted_hand_alpha: config
                .muted_hand_alpha
                .clamp(*MUTED_ALPHA_RANGE.start(), *MUTED_ALPHA_RANGE.end()),
            second_hand_enabled: config.show_second_hand,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&FaceConfig::default())
    }
}

/// The mode flags as last reported by the host
#[derive(Debug, Clone, Default)]
pub struct DisplayModeState {
    ambient: bool,
    low_bit_ambient: bool,
    burn_in_protection: bool,
    muted: bool,
    palette: Palette,
}

impl DisplayModeState {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            ..Self::default()
        }
    }

    /// Returns true if the flag changed
    pub fn set_ambient(&mut self, ambient: bool) -> bool {
        replace_flag(&mut self.ambient, ambient)
    }

    /// Returns true if either capability changed
    pub fn set_capabilities(&mut self, low_bit: bool, burn_in: bool) -> bool {
        let low_bit_changed = replace_flag(&mut self.low_bit_ambient, low_bit);
        let burn_in_changed = replace_flag(&mut self.burn_in_protection, burn_in);
        low_bit_changed || burn_in_changed
    }

    /// Returns true if the flag changed
    pub fn set_muted(&mut self, muted: bool) -> bool {
        replace_flag(&mut self.muted, muted)
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn low_bit_ambient(&self) -> bool {
        self.low_bit_ambient
    }

    pub fn burn_in_protection(&self) -> bool {
        self.burn_in_protection
    }

    pub fn mode(&self) -> DisplayMode {
        // Low-bit wins when both capabilities are present; both flatten the
        // background the same way.
        let power = match (self.ambient, self.low_bit_ambient, self.burn_in_protection) {
            (false, _, _) => PowerMode::Interactive,
            (true, true, _) => PowerMode::AmbientLowBit,
            (true, false, true) => PowerMode::AmbientBurnIn,
            (true, false, false) => PowerMode::Ambient,
        };
        DisplayMode {
            power,
            muted: self.muted,
        }
    }

    /// Style for the current flags
    pub fn style(&self) -> StyleTable {
        style_for(self.mode(), &self.palette)
    }
}

fn replace_flag(slot: &mut bool, value: bool) -> bool {
    std::mem::replace(slot, value) != value
}

/// Map a mode onto its paint settings
pub fn style_for(mode: DisplayMode, palette: &Palette) -> StyleTable {
    let ambient = mode.power.is_ambient();

    // Fine ticks and the numeral/logo overlay take turns being visible
    let (tick_alpha, overlay_alpha) = if ambient { (0, 255) } else { (255, 0) };

    let background = match mode.power {
        PowerMode::Interactive => BackgroundStyle::FullColor,
        PowerMode::Ambient => BackgroundStyle::Desaturated,
        PowerMode::AmbientLowBit | PowerMode::AmbientBurnIn => BackgroundStyle::Flat(Color::BLACK),
    };

    StyleTable {
        hand_color: if ambient { Color::WHITE } else { palette.hand },
        accent_color: palette.accent,
        numeral_color: Color::WHITE,
        anti_alias: !ambient,
        shadow_radius: if ambient { 0.0 } else { SHADOW_RADIUS },
        shadow_color: Color::BLACK,
        tick_alpha,
        overlay_alpha,
        hand_alpha: if mode.muted {
            palette.muted_hand_alpha
        } else {
            255
        },
        background,
        show_second_hand: palette.second_hand_enabled && !ambient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_mode_is_interactive() {
        let state = DisplayModeState::default();
        assert_eq!(state.mode(), DisplayMode::INTERACTIVE);
        let style = state.style();
        assert!(style.anti_alias);
        assert_eq!(style.shadow_radius, SHADOW_RADIUS);
        assert_eq!(style.background, BackgroundStyle::FullColor);
    }

    #[test]
    fn test_set_ambient_idempotent() {
        let mut once = DisplayModeState::default();
        assert!(once.set_ambient(true));

        let mut many = DisplayModeState::default();
        assert!(many.set_ambient(true));
        for _ in 0..5 {
            assert!(!many.set_ambient(true));
        }

        assert_eq!(once.style(), many.style());
    }

    #[test]
    fn test_capabilities_only_matter_in_ambient() {
        let mut state = DisplayModeState::default();
        state.set_capabilities(true, true);
        assert_eq!(state.mode().power, PowerMode::Interactive);

        state.set_ambient(true);
        assert_eq!(state.mode().power, PowerMode::AmbientLowBit);

        state.set_capabilities(false, true);
        assert_eq!(state.mode().power, PowerMode::AmbientBurnIn);
        assert_eq!(state.style().background, BackgroundStyle::Flat(Color::BLACK));

        state.set_capabilities(false, false);
        assert_eq!(state.mode().power, PowerMode::Ambient);
        assert_eq!(state.style().background, BackgroundStyle::Desaturated);
    }

    #[test]
    fn test_ambient_suppresses_detail() {
        for mode in DisplayMode::all().filter(|m| m.power.is_ambient()) {
            let style = style_for(mode, &Palette::default());
            assert!(!style.anti_alias, "{:?}", mode);
            assert_eq!(style.shadow_radius, 0.0);
            assert_eq!(style.tick_alpha, 0);
            assert!(!style.show_second_hand);
            assert_eq!(style.hand_color, Color::WHITE);
        }
    }

    #[test]
    fn test_mute_dims_hands_without_hiding_them() {
        let mut state = DisplayModeState::default();
        assert!(state.set_muted(true));
        assert_eq!(state.style().hand_alpha, 100);

        state.set_ambient(true);
        assert_eq!(state.style().hand_alpha, 100);

        state.set_muted(false);
        assert_eq!(state.style().hand_alpha, 255);
    }

    #[test]
    fn test_out_of_range_muted_alpha_is_clamped() {
        let muted = DisplayMode {
            power: PowerMode::Interactive,
            muted: true,
        };
        let hidden = FaceConfig {
            muted_hand_alpha: 0,
            ..FaceConfig::default()
        };
        assert_eq!(style_for(muted, &Palette::from_config(&hidden)).hand_alpha, 1);

        let opaque = FaceConfig {
            muted_hand_alpha: 255,
            ..FaceConfig::default()
        };
        assert_eq!(style_for(muted, &Palette::from_config(&opaque)).hand_alpha, 254);
    }

    #[test]
    fn test_tick_and_overlay_never_both_visible() {
        for mode in DisplayMode::all() {
            let style = style_for(mode, &Palette::default());
            assert!(!(style.tick_alpha == 255 && style.overlay_alpha == 255));
            assert_eq!(u16::from(style.tick_alpha) + u16::from(style.overlay_alpha), 255);
        }
    }

    proptest! {
        #[test]
        fn prop_every_flag_combination_resolves(
            ambient in any::<bool>(),
            low_bit in any::<bool>(),
            burn_in in any::<bool>(),
            muted in any::<bool>(),
            repeats in 1usize..4,
        ) {
            let mut state = DisplayModeState::default();
            for _ in 0..repeats {
                state.set_capabilities(low_bit, burn_in);
                state.set_ambient(ambient);
                state.set_muted(muted);
            }
            let style = state.style();
            prop_assert_eq!(state.mode().power.is_ambient(), ambient);
            prop_assert_eq!(style.hand_alpha == 255, !muted);
            prop_assert!(!(style.tick_alpha == 255 && style.overlay_alpha == 255));
            if ambient && (low_bit || burn_in) {
                prop_assert_eq!(style.background, BackgroundStyle::Flat(Color::BLACK));
            }
        }
    }
}
