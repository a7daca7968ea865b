//! Renderer - turns one frame's inputs into an ordered display list
//!
//! Layers are emitted in a fixed z-order. Fully transparent primitives are
//! left out, so the tick layer and the numeral/logo overlay never both show
//! up in the same list.

use crate::background::{RasterId, ScaledBackground};
use crate::geometry::{pt, rotate_about, FaceLayout, HandAngles, Point};
use crate::style::{BackgroundStyle, Color, StyleTable};
use crate::time_source::CalendarSnapshot;

const HOUR_STROKE_WIDTH: f32 = 5.0;
const MINUTE_STROKE_WIDTH: f32 = 0.75;
const TICK_STROKE_WIDTH: f32 = 2.0;
const SECOND_STROKE_WIDTH: f32 = 2.0;
const NUMERAL_TEXT_SIZE: f32 = 36.0;
const LOGO_TEXT_SIZE: f32 = 56.0;
const LOGO_GLYPH: &str = "\u{221e}";

/// Z-order of the face, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    HourHand,
    NumeralBadge,
    Ticks,
    MinuteHand,
    SecondHand,
    Hub,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStyle {
    Fill,
    Stroke,
    FillAndStroke,
}

/// How a primitive is painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Color with the final alpha already applied
    pub color: Color,
    pub stroke_width: f32,
    pub style: PaintStyle,
    pub round_cap: bool,
    pub anti_alias: bool,
    /// 0 means no shadow
    pub shadow_radius: f32,
    pub shadow_color: Color,
}

impl Paint {
    fn stroke(color: Color, width: f32, style: &StyleTable) -> Self {
        Self {
            color,
            stroke_width: width,
            style: PaintStyle::Stroke,
            round_cap: true,
            anti_alias: style.anti_alias,
            shadow_radius: style.shadow_radius,
            shadow_color: style.shadow_color,
        }
    }

    fn with_style(self, style: PaintStyle) -> Self {
        Self { style, ..self }
    }

    fn without_shadow(self) -> Self {
        Self {
            shadow_radius: 0.0,
            ..self
        }
    }
}

/// One drawing primitive in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Flood the whole surface
    Fill { color: Color },
    /// Blit a cached raster with its top-left at `origin`, rotated clockwise
    /// by `rotation_degrees` about `pivot`
    Raster {
        raster: RasterId,
        origin: Point,
        size: (u32, u32),
        rotation_degrees: f32,
        pivot: Point,
        alpha: u8,
    },
    Line { from: Point, to: Point, paint: Paint },
    Polygon { points: Vec<Point>, paint: Paint },
    Circle { center: Point, radius: f32, paint: Paint },
    /// Text centered horizontally on `anchor`, with `anchor.y` as baseline
    Text {
        text: String,
        anchor: Point,
        size: f32,
        bold: bool,
        paint: Paint,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    pub layer: Layer,
    pub command: DrawCommand,
}

/// Ordered primitives for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
}

impl DisplayList {
    fn push(&mut self, layer: Layer, command: DrawCommand) {
        let visible = match &command {
            DrawCommand::Fill { .. } => true,
            DrawCommand::Raster { alpha, .. } => *alpha > 0,
            DrawCommand::Line { paint, .. }
            | DrawCommand::Polygon { paint, .. }
            | DrawCommand::Circle { paint, .. }
            | DrawCommand::Text { paint, .. } => paint.color.a > 0,
        };
        if visible {
            self.ops.push(DrawOp { layer, command });
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Layers in the order they first appear
    pub fn layers(&self) -> Vec<Layer> {
        let mut layers: Vec<Layer> = Vec::new();
        for op in &self.ops {
            if layers.last() != Some(&op.layer) {
                layers.push(op.layer);
            }
        }
        layers
    }

    pub fn in_layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.ops
            .iter()
            .filter(move |op| op.layer == layer)
            .map(|op| &op.command)
    }
}

/// Frame inputs bundled for [`render`]
pub struct FrameInputs<'a> {
    pub snapshot: &'a CalendarSnapshot,
    pub angles: HandAngles,
    pub style: &'a StyleTable,
    pub layout: &'a FaceLayout,
    pub background: &'a ScaledBackground,
}

/// Build the display list for one frame
pub fn render(inputs: &FrameInputs<'_>) -> DisplayList {
    let mut list = DisplayList::default();
    draw_background(&mut list, inputs);
    draw_hour_hand(&mut list, inputs);
    draw_numeral_badge(&mut list, inputs);
    draw_ticks(&mut list, inputs);
    draw_minute_hand(&mut list, inputs);
    draw_second_hand(&mut list, inputs);
    draw_hub(&mut list, inputs);
    draw_logo(&mut list, inputs);
    list
}

fn draw_background(list: &mut DisplayList, inputs: &FrameInputs<'_>) {
    let raster = match inputs.style.background {
        BackgroundStyle::Flat(color) => {
            list.push(Layer::Background, DrawCommand::Fill { color });
            return;
        }
        BackgroundStyle::FullColor => RasterId::Background,
        BackgroundStyle::Desaturated => RasterId::BackgroundDesaturated,
    };

    match inputs.background.raster(raster) {
        Some(image) => list.push(
            Layer::Background,
            DrawCommand::Raster {
                raster,
                origin: pt(0.0, 0.0),
                size: image.dimensions(),
                rotation_degrees: 0.0,
                pivot: pt(0.0, 0.0),
                alpha: 255,
            },
        ),
        // Not sized yet
        None => list.push(Layer::Background, DrawCommand::Fill { color: Color::BLACK }),
    }
}

fn draw_hour_hand(list: &mut DisplayList, inputs: &FrameInputs<'_>) {
    let FrameInputs { style, layout, .. } = inputs;
    let degrees = inputs.angles.hour_degrees;
    let tip = rotate_about(layout.hand_tip(layout.hour_hand_length), layout.center, degrees);
    let paint = Paint::stroke(
        style.hand_color.with_alpha(style.hand_alpha),
        HOUR_STROKE_WIDTH,
        style,
    );
    list.push(
        Layer::HourHand,
        DrawCommand::Line {
            from: layout.center,
            to: tip,
            paint,
        },
    );

    if let Some(image) = inputs.background.raster(RasterId::HourHand) {
        list.push(
            Layer::HourHand,
            DrawCommand::Raster {
                raster: RasterId::HourHand,
                origin: pt(0.0, 0.0),
                size: image.dimensions(),
                rotation_degrees: degrees,
                pivot: layout.center,
                alpha: style.hand_alpha,
            },
        );
    }
}

fn draw_numeral_badge(list: &mut DisplayList, inputs: &FrameInputs<'_>) {
    let FrameInputs { style, layout, .. } = inputs;
    let paint = Paint::stroke(
        style.numeral_color.with_alpha(style.overlay_alpha),
        TICK_STROKE_WIDTH,
        style,
    )
    .without_shadow();

    list.push(
        Layer::NumeralBadge,
        DrawCommand::Text {
            text: inputs.snapshot.display_hour().to_string(),
            anchor: layout.badge_text_anchor(),
            size: NUMERAL_TEXT_SIZE,
            bold: true,
            paint,
        },
    );
    list.push(
        Layer::NumeralBadge,
        DrawCommand::Circle {
            center: layout.badge_center(),
            radius: FaceLayout::BADGE_RADIUS,
            paint,
        },
    );
}

fn draw_ticks(list: &mut DisplayList, inputs: &FrameInputs<'_>) {
    let FrameInputs { style, layout, .. } = inputs;

    let coarse = Paint::stroke(style.hand_color, TICK_STROKE_WIDTH, style);
    for tick in layout.hour_ticks() {
        list.push(
            Layer::Ticks,
            DrawCommand::Line {
                from: tick.inner,
                to: tick.outer,
                paint: coarse,
            },
        );
    }

    let fine = Paint::stroke(
        style.hand_color.with_alpha(style.tick_alpha),
        TICK_STROKE_WIDTH,
        style,
    );
    for tick in layout.minute_ticks() {
        list.push(
            Layer::Ticks,
            DrawCommand::Line {
                from: tick.inner,
                to: tick.outer,
                paint: fine,
            },
        );
    }
}

fn draw_minute_hand(list: &mut DisplayList, inputs: &FrameInputs<'_>) {
    let FrameInputs { style, layout, .. } = inputs;
    let degrees = inputs.angles.minute_degrees;
    let points = layout
        .minute_blade()
        .into_iter()
        .map(|p| rotate_about(p, layout.center, degrees))
        .collect();
    let paint = Paint::stroke(
        style.accent_color.with_alpha(style.hand_alpha),
        MINUTE_STROKE_WIDTH,
        style,
    )
    .with_style(PaintStyle::FillAndStroke);

    list.push(Layer::MinuteHand, DrawCommand::Polygon { points, paint });
}

fn draw_second_hand(list: &mut DisplayList, inputs: &FrameInputs<'_>) {
    let FrameInputs { style, layout, .. } = inputs;
    if !style.show_second_hand {
        return;
    }
    let degrees = inputs.angles.second_degrees;
    let from = rotate_about(layout.hand_tip(FaceLayout::HUB_RADIUS), layout.center, degrees);
    let to = rotate_about(layout.hand_tip(layout.second_hand_length), layout.center, degrees);
    let paint = Paint::stroke(
        style.accent_color.with_alpha(style.hand_alpha),
        SECOND_STROKE_WIDTH,
        style,
    );
    list.push(Layer::SecondHand, DrawCommand::Line { from, to, paint });
}

fn draw_hub(list: &mut DisplayList, inputs: &FrameInputs<'_>) {
    let FrameInputs { style, layout, .. } = inputs;
    let paint = Paint::stroke(style.accent_color, TICK_STROKE_WIDTH, style)
        .with_style(PaintStyle::Fill)
        .without_shadow();
    list.push(
        Layer::Hub,
        DrawCommand::Circle {
            center: layout.center,
            radius: FaceLayout::HUB_RADIUS,
            paint,
        },
    );
}

fn draw_logo(list: &mut DisplayList, inputs: &FrameInputs<'_>) {
    let FrameInputs { style, layout, .. } = inputs;
    let paint = Paint::stroke(
        style.accent_color.with_alpha(style.overlay_alpha),
        0.0,
        style,
    )
    .with_style(PaintStyle::Fill)
    .without_shadow();
    list.push(
        Layer::Overlay,
        DrawCommand::Text {
            text: LOGO_GLYPH.to_string(),
            anchor: layout.logo_anchor(),
            size: LOGO_TEXT_SIZE,
            bold: true,
            paint,
        },
    );
}
