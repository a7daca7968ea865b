//! Drawing module - realises the engine's display list with nannou
//!
//! The engine speaks surface pixels (origin top-left, y down, clockwise
//! degrees). nannou draws around the window center with y up, so every point
//! and rotation is converted here.

use std::collections::HashMap;

use face_engine::geometry::rotate_about;
use face_engine::{Color, DisplayList, DrawCommand, FaceEngine, Paint, PaintStyle, RasterId, TimeSource};
use nannou::image::{DynamicImage, RgbaImage};
use nannou::prelude::*;

/// Alpha of the soft halo drawn under shadowed strokes
const SHADOW_ALPHA: u8 = 60;
const RING_SEGMENTS: usize = 120;

/// GPU copies of the engine's cached rasters
#[derive(Default)]
pub struct RasterTextures {
    generation: Option<u64>,
    /// Alpha baked into the hour-hand texture
    hand_alpha: Option<u8>,
    textures: HashMap<RasterId, wgpu::Texture>,
}

impl RasterTextures {
    /// Re-upload when the engine has rebuilt its rasters or the hand alpha
    /// moved
    pub fn sync<C: TimeSource>(&mut self, app: &App, engine: &FaceEngine<C>) {
        let generation = engine.background_generation();
        let hand_alpha = engine.mode_state().style().hand_alpha;
        if self.generation == Some(generation) && self.hand_alpha == Some(hand_alpha) {
            return;
        }

        self.textures.clear();
        for id in [
            RasterId::Background,
            RasterId::BackgroundDesaturated,
            RasterId::HourHand,
        ] {
            let Some(raster) = engine.raster(id) else {
                continue;
            };
            let (w, h) = raster.dimensions();
            let mut bytes = raster.as_raw().clone();
            if id == RasterId::HourHand {
                scale_alpha(&mut bytes, hand_alpha);
            }
            match RgbaImage::from_raw(w, h, bytes) {
                Some(buffer) => {
                    let image = DynamicImage::ImageRgba8(buffer);
                    self.textures.insert(id, wgpu::Texture::from_image(app, &image));
                }
                None => tracing::warn!(?id, w, h, "raster buffer size mismatch"),
            }
        }
        self.generation = Some(generation);
        self.hand_alpha = Some(hand_alpha);
        tracing::debug!(generation, hand_alpha, "raster textures uploaded");
    }

    fn get(&self, id: RasterId) -> Option<&wgpu::Texture> {
        self.textures.get(&id)
    }
}

/// Multiply every pixel's alpha by `alpha / 255`
///
/// nannou's texture primitive has no tint, so raster alpha is baked in here.
fn scale_alpha(rgba: &mut [u8], alpha: u8) {
    if alpha == u8::MAX {
        return;
    }
    for pixel in rgba.chunks_exact_mut(4) {
        pixel[3] = ((pixel[3] as u16 * alpha as u16 + 127) / 255) as u8;
    }
}

fn to_srgba(color: Color) -> Srgba<u8> {
    srgba(color.r, color.g, color.b, color.a)
}

/// Surface point to nannou world point
fn to_world(p: face_engine::Point, surface: Rect) -> Point2 {
    pt2(surface.left() + p.x, surface.top() - p.y)
}

/// Draw every op in order
pub fn draw_display_list(draw: &Draw, list: &DisplayList, surface: Rect, textures: &RasterTextures) {
    for op in list.ops() {
        draw_command(draw, &op.command, surface, textures);
    }
}

fn draw_command(draw: &Draw, command: &DrawCommand, surface: Rect, textures: &RasterTextures) {
    match command {
        DrawCommand::Fill { color } => {
            draw.rect()
                .xy(surface.xy())
                .wh(surface.wh())
                .color(to_srgba(*color));
        }
        DrawCommand::Raster {
            raster,
            origin,
            size,
            rotation_degrees,
            pivot,
            ..
        } => {
            let Some(texture) = textures.get(*raster) else {
                return;
            };
            let (w, h) = (size.0 as f32, size.1 as f32);
            let center = face_engine::Point {
                x: origin.x + w / 2.0,
                y: origin.y + h / 2.0,
            };
            // Rotating the image center about the pivot, then the image about
            // its own center, equals rotating the whole image about the pivot
            let center = rotate_about(center, *pivot, *rotation_degrees);
            // Raster alpha is already baked in by `RasterTextures::sync`
            draw.texture(texture)
                .xy(to_world(center, surface))
                .w_h(w, h)
                .rotate(-rotation_degrees.to_radians());
        }
        DrawCommand::Line { from, to, paint } => {
            let start = to_world(*from, surface);
            let end = to_world(*to, surface);
            if paint.shadow_radius > 0.0 {
                draw.line()
                    .start(start)
                    .end(end)
                    .weight(paint.stroke_width + paint.shadow_radius)
                    .caps_round()
                    .color(shadow_color(paint));
            }
            let line = draw.line()
                .start(start)
                .end(end)
                .weight(paint.stroke_width)
                .color(to_srgba(paint.color));
            if paint.round_cap {
                line.caps_round();
            }
        }
        DrawCommand::Polygon { points, paint } => {
            let points: Vec<Point2> = points.iter().map(|p| to_world(*p, surface)).collect();
            if paint.shadow_radius > 0.0 {
                draw_closed_outline(draw, &points, paint.shadow_radius, shadow_color(paint));
            }
            if matches!(paint.style, PaintStyle::Fill | PaintStyle::FillAndStroke) {
                draw.polygon()
                    .color(to_srgba(paint.color))
                    .points(points.iter().copied());
            }
            if matches!(paint.style, PaintStyle::Stroke | PaintStyle::FillAndStroke) {
                draw_closed_outline(draw, &points, paint.stroke_width, to_srgba(paint.color));
            }
        }
        DrawCommand::Circle { center, radius, paint } => {
            let center = to_world(*center, surface);
            match paint.style {
                PaintStyle::Fill | PaintStyle::FillAndStroke => {
                    draw.ellipse()
                        .xy(center)
                        .radius(*radius)
                        .color(to_srgba(paint.color));
                }
                PaintStyle::Stroke => {
                    draw_ring(draw, center, *radius, paint.stroke_width, to_srgba(paint.color));
                }
            }
        }
        DrawCommand::Text {
            text,
            anchor,
            size,
            paint,
            ..
        } => {
            // nannou positions text by its box center; lift the baseline
            // anchor by roughly a third of the glyph height
            let baseline = to_world(*anchor, surface);
            let center = baseline + vec2(0.0, size * 0.35);
            draw.text(text)
                .xy(center)
                .color(to_srgba(paint.color))
                .font_size(size.round() as u32)
                .w(surface.w());
        }
    }
}

fn shadow_color(paint: &Paint) -> Srgba<u8> {
    let c = paint.shadow_color;
    srgba(c.r, c.g, c.b, SHADOW_ALPHA)
}

fn draw_closed_outline(draw: &Draw, points: &[Point2], weight: f32, color: Srgba<u8>) {
    let Some(first) = points.first().copied() else {
        return;
    };
    draw.polyline()
        .weight(weight)
        .color(color)
        .points(points.iter().copied().chain(std::iter::once(first)));
}

/// Draw a ring (circle outline) using line segments
fn draw_ring(draw: &Draw, center: Point2, radius: f32, weight: f32, color: Srgba<u8>) {
    let points: Vec<Point2> = (0..=RING_SEGMENTS)
        .map(|i| {
            let angle = (i as f32 / RING_SEGMENTS as f32) * TAU;
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect();

    draw.polyline().weight(weight).color(color).points(points);
}
