//! Geometry module - hand angles and dial layout
//!
//! All coordinates are surface pixels with the origin at the top-left corner
//! and y growing downward. Angles are degrees clockwise from 12 o'clock.

use crate::time_source::CalendarSnapshot;

/// A point on the surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

pub const fn pt(x: f32, y: f32) -> Point {
    Point { x, y }
}

/// Rotation of each hand for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub hour_degrees: f32,
    pub minute_degrees: f32,
    pub second_degrees: f32,
}

/// Hour and minute hand angles for dial fields
///
/// The hour hand creeps half a degree per minute between hour marks.
pub fn hand_angles(hour: u32, minute: u32) -> HandAngles {
    let hour_degrees = (hour as f32 * 30.0 + minute as f32 * 0.5).rem_euclid(360.0);
    let minute_degrees = (minute as f32 * 6.0).rem_euclid(360.0);
    HandAngles {
        hour_degrees,
        minute_degrees,
        second_degrees: 0.0,
    }
}

impl HandAngles {
    pub fn for_snapshot(snapshot: &CalendarSnapshot) -> Self {
        HandAngles {
            second_degrees: (snapshot.second as f32 * 6.0).rem_euclid(360.0),
            ..hand_angles(snapshot.hour, snapshot.minute)
        }
    }
}

/// Rotate `point` clockwise by `degrees` about `pivot`
pub fn rotate_about(point: Point, pivot: Point, degrees: f32) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    // With y pointing down, the usual counter-clockwise matrix turns clockwise
    pt(pivot.x + dx * cos - dy * sin, pivot.y + dx * sin + dy * cos)
}

/// A straight tick segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMark {
    pub index: usize,
    pub inner: Point,
    pub outer: Point,
}

/// Dial dimensions derived from the surface size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceLayout {
    pub width: u32,
    pub height: u32,
    pub center: Point,
    pub minute_hand_length: f32,
    pub hour_hand_length: f32,
    pub second_hand_length: f32,
    pub inner_tick_radius: f32,
    pub outer_tick_radius: f32,
}

impl FaceLayout {
    /// Hub radius, also the gap the second hand leaves around the center
    pub const HUB_RADIUS: f32 = 6.0;
    pub const BADGE_RADIUS: f32 = 24.0;

    /// Calculate layout from surface dimensions
    ///
    /// Hands are sized from the horizontal center so round faces with a flat
    /// "chin" stay centered on the full surface.
    pub fn calculate(width: u32, height: u32) -> Self {
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        Self {
            width,
            height,
            center: pt(cx, cy),
            minute_hand_length: cx * 0.75,
            hour_hand_length: cx * 0.5,
            second_hand_length: cx * 0.85,
            inner_tick_radius: cx - 22.0,
            outer_tick_radius: cx - 4.0,
        }
    }

    /// 11 coarse ticks; the 12 o'clock position is left open
    pub fn hour_ticks(&self) -> Vec<TickMark> {
        (1..12)
            .map(|i| self.tick(i, 12, self.inner_tick_radius))
            .collect()
    }

    /// 46 fine ticks: every minute that is not a coarse position and not next
    /// to 12 o'clock
    pub fn minute_ticks(&self) -> Vec<TickMark> {
        (0..60)
            .filter(|i| i % 5 != 0 && !matches!(i, 59 | 0 | 1))
            .map(|i| self.tick(i, 60, self.inner_tick_radius + 6.0))
            .collect()
    }

    fn tick(&self, index: usize, divisions: usize, inner_radius: f32) -> TickMark {
        let rot = index as f32 * std::f32::consts::TAU / divisions as f32;
        let (sin, cos) = rot.sin_cos();
        let c = self.center;
        TickMark {
            index,
            inner: pt(c.x + sin * inner_radius, c.y - cos * inner_radius),
            outer: pt(c.x + sin * self.outer_tick_radius, c.y - cos * self.outer_tick_radius),
        }
    }

    /// Tip of a hand of `length` pointing at 12 o'clock
    pub fn hand_tip(&self, length: f32) -> Point {
        pt(self.center.x, self.center.y - length)
    }

    /// Tapered hexagonal blade of the minute hand, pointing at 12 o'clock
    pub fn minute_blade(&self) -> Vec<Point> {
        let Point { x: cx, y: cy } = self.center;
        let len = self.minute_hand_length;
        vec![
            pt(cx, cy),
            pt(cx - 2.0, cy),
            pt(cx - 2.0, cy - len * 0.05),
            pt(cx - 4.0, cy - len * 0.15),
            pt(cx - 1.0, cy - len),
            pt(cx, cy - len - 1.0),
            pt(cx + 1.0, cy - len),
            pt(cx + 4.0, cy - len * 0.15),
            pt(cx + 2.0, cy - len * 0.05),
            pt(cx + 2.0, cy),
        ]
    }

    /// Center of the numeral badge circle
    pub fn badge_center(&self) -> Point {
        pt(self.center.x, self.center.x + 82.0)
    }

    /// Baseline anchor of the badge numeral
    pub fn badge_text_anchor(&self) -> Point {
        pt(self.center.x, self.center.x + 96.0)
    }

    /// Baseline anchor of the logo glyph
    pub fn logo_anchor(&self) -> Point {
        pt(self.center.x, self.center.y - 120.0)
    }
}
