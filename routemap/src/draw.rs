//! Drawing primitives for the map overlay.

use std::ops::Range;

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_text_mut, text_size,
};
use imageproc::rect::Rect;

use crate::color::Color;
use crate::font::LabelFont;

/// Radius of the marker dot.
pub const MARKER_RADIUS: i32 = 4;
/// Width of the white ring around the marker dot.
pub const MARKER_OUTLINE: i32 = 1;
/// Color of the marker dot.
pub const MARKER_COLOR: Color = Color::RED;
/// Font size of marker labels in pixels.
pub const LABEL_SIZE: f32 = 12.0;
/// Horizontal distance between the marker center and its label.
pub const LABEL_OFFSET: i32 = 10;
/// Minimal distance between a label box and the image border.
pub const LABEL_MARGIN: i32 = 4;
const LABEL_PADDING: i32 = 2;

/// Draws a polyline of the given width onto a new transparent layer of the
/// canvas size and blends it over the canvas, so translucent colors do not
/// darken where segments overlap.
pub fn draw_polyline(canvas: &mut RgbaImage, points: &[(f32, f32)], color: Color, width: u32) {
    let mut layer = RgbaImage::new(canvas.width(), canvas.height());
    let pixel = color.to_rgba();
    let radius = width as f32 / 2.0;
    let clip = (
        -radius - 1.0,
        -radius - 1.0,
        canvas.width() as f32 + radius + 1.0,
        canvas.height() as f32 + radius + 1.0,
    );

    match points {
        [] => return,
        [single] => draw_thick_segment(&mut layer, *single, *single, pixel, width),
        _ => {
            for segment in points.windows(2) {
                if let Some((start, end)) = clip_segment(segment[0], segment[1], clip) {
                    draw_thick_segment(&mut layer, start, end, pixel, width);
                }
            }
        }
    }

    blend_layer(canvas, &layer);
}

/// Alpha-blends a same-sized layer over an opaque canvas.
fn blend_layer(canvas: &mut RgbaImage, layer: &RgbaImage) {
    for (bottom, top) in canvas.pixels_mut().zip(layer.pixels()) {
        let alpha = top[3] as u32;
        match alpha {
            0 => {}
            255 => *bottom = *top,
            _ => {
                let mix = |fg: u8, bg: u8| {
                    ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
                };
                *bottom = Rgba([
                    mix(top[0], bottom[0]),
                    mix(top[1], bottom[1]),
                    mix(top[2], bottom[2]),
                    (alpha + bottom[3] as u32 * (255 - alpha) / 255) as u8,
                ]);
            }
        }
    }
}

/// Fills every pixel whose center lies within `width / 2` of the segment, which
/// gives round caps and joins. Only pixels inside the image are visited.
fn draw_thick_segment(
    image: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    color: Rgba<u8>,
    width: u32,
) {
    if width <= 1 {
        draw_line_segment_mut(image, start, end, color);
        return;
    }

    let half = width as f32 / 2.0;
    // Even widths are centered between pixel rows so they cover exactly `width` pixels.
    let offset = if width % 2 == 0 { 0.5 } else { 0.0 };
    let Some((xs, ys)) = pixel_span(image, start, end, half) else {
        return;
    };

    for y in ys {
        for x in xs.clone() {
            let center = (x as f32 + offset, y as f32 + offset);
            if squared_distance_to_segment(center, start, end) <= half * half {
                image.put_pixel(x, y, color);
            }
        }
    }
}

/// Pixel ranges of the image covered by the segment's bounding box grown by `reach`.
fn pixel_span(
    image: &RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    reach: f32,
) -> Option<(Range<u32>, Range<u32>)> {
    let span = |a: f32, b: f32, size: u32| {
        let low = (a.min(b) - reach - 1.0).floor().max(0.0);
        let high = (a.max(b) + reach + 1.0).ceil().min(size as f32);
        (low < high).then(|| low as u32..high as u32)
    };

    Some((
        span(start.0, end.0, image.width())?,
        span(start.1, end.1, image.height())?,
    ))
}

fn squared_distance_to_segment(point: (f32, f32), start: (f32, f32), end: (f32, f32)) -> f32 {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let length_squared = dx * dx + dy * dy;
    let t = if length_squared > 0.0 {
        (((point.0 - start.0) * dx + (point.1 - start.1) * dy) / length_squared).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let x = start.0 + t * dx - point.0;
    let y = start.1 + t * dy - point.1;
    x * x + y * y
}

/// Cuts the segment to the part inside `(x_min, y_min, x_max, y_max)`
/// (Liang-Barsky). `None` if the segment is entirely outside.
fn clip_segment(
    start: (f32, f32),
    end: (f32, f32),
    (x_min, y_min, x_max, y_max): (f32, f32, f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-dx, start.0 - x_min),
        (dx, x_max - start.0),
        (-dy, start.1 - y_min),
        (dy, y_max - start.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }

        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (start.0 + t0 * dx, start.1 + t0 * dy),
        (start.0 + t1 * dx, start.1 + t1 * dy),
    ))
}

/// Returns true if a marker at `center` would be at least partly visible.
pub fn marker_visible(canvas: &RgbaImage, center: (f32, f32)) -> bool {
    let reach = (MARKER_RADIUS + MARKER_OUTLINE) as f32;
    center.0 >= -reach
        && center.1 >= -reach
        && center.0 <= canvas.width() as f32 + reach
        && center.1 <= canvas.height() as f32 + reach
}

/// Draws a marker dot with a white ring.
pub fn draw_marker(canvas: &mut RgbaImage, center: (f32, f32)) {
    let center = to_i32(center);
    draw_filled_circle_mut(
        canvas,
        center,
        MARKER_RADIUS + MARKER_OUTLINE,
        Color::WHITE.to_rgba(),
    );
    draw_filled_circle_mut(canvas, center, MARKER_RADIUS, MARKER_COLOR.to_rgba());
}

/// Draws `text` on a white box to the right of the marker at `anchor`, kept
/// inside the canvas.
pub fn draw_label(canvas: &mut RgbaImage, anchor: (f32, f32), text: &str, font: &LabelFont) {
    let scale = PxScale::from(LABEL_SIZE);
    let (text_width, _) = text_size(scale, font.font(), text);
    // Glyphs hang from the ascent line, so the box spans the full line height.
    let text_height = font.font().as_scaled(scale).height().ceil() as i32;
    let text_width = text_width as i32;
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    let (anchor_x, anchor_y) = to_i32(anchor);

    let box_width = text_width + 2 * LABEL_PADDING + 1;
    let box_height = text_height + 2 * LABEL_PADDING + 1;
    let box_x = (anchor_x + LABEL_OFFSET - LABEL_PADDING)
        .min(width - box_width - LABEL_MARGIN)
        .max(LABEL_MARGIN);
    let box_y = (anchor_y - box_height / 2)
        .min(height - box_height - LABEL_MARGIN)
        .max(LABEL_MARGIN);

    let rect = Rect::at(box_x, box_y).of_size(box_width as u32, box_height as u32);
    draw_filled_rect_mut(canvas, rect, Color::WHITE.to_rgba());
    draw_hollow_rect_mut(canvas, rect, Color::GRAY.to_rgba());
    let (x, y) = (box_x + LABEL_PADDING, box_y + LABEL_PADDING);
    draw_text_mut(canvas, Color::BLACK.to_rgba(), x, y, scale, font.font(), text);
}

fn to_i32(point: (f32, f32)) -> (i32, i32) {
    (point.0.round() as i32, point.1.round() as i32)
}
