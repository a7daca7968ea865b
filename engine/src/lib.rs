//! Face engine
//!
//! The state engine behind an analog watch face: dial geometry, display
//! modes, redraw scheduling, a repeated-tap trigger and the display list a
//! host turns into pixels.

pub mod background;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod mode;
pub mod render;
pub mod scheduler;
pub mod style;
pub mod time_source;
pub mod timer;

pub use background::{AssetError, FaceAssets, RasterId, ScaledBackground};
pub use config::{load_config, ConfigError, FaceConfig};
pub use engine::{FaceEngine, HostRequest};
pub use geometry::{hand_angles, FaceLayout, HandAngles, Point};
pub use gesture::{TapEvent, TapKind, TriggerAction};
pub use mode::{style_for, DisplayMode, DisplayModeState, PowerMode};
pub use render::{DisplayList, DrawCommand, DrawOp, Layer, Paint, PaintStyle};
pub use scheduler::{delay_to_next_boundary, RedrawScheduler, SchedulerState};
pub use style::{BackgroundStyle, Color, StyleTable};
pub use time_source::{CalendarSnapshot, ManualClock, SystemClock, TimeSource};
pub use timer::{TimerId, TimerPurpose, TimerRequest};
