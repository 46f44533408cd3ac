//! Stroke rasterization.
//!
//! Polylines are rasterized with a round pen: a disc stamped at every step
//! along each segment. The eraser is the same pen writing fully transparent
//! pixels, so erased regions let lower layers show through.

use image::{Rgba, RgbaImage};
use waymark_core::PixelPoint;

/// Route polyline color (green).
pub const ROUTE_COLOR: Rgba<u8> = Rgba([0, 170, 0, 255]);

/// Route polyline width in pixels.
pub const ROUTE_WIDTH: f64 = 3.0;

/// A stroke instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeTool {
    /// Paints an opaque round stroke.
    Pen { width: f64, color: Rgba<u8> },
    /// Clears a round stroke to transparent.
    Eraser { width: f64 },
}

impl StrokeTool {
    pub fn width(&self) -> f64 {
        match self {
            StrokeTool::Pen { width, .. } | StrokeTool::Eraser { width } => *width,
        }
    }
}

/// Rasterizes a polyline onto a buffer with the given tool.
///
/// Pixels are written directly, not alpha-blended; translucency between
/// layers comes from compositing, not from stroke overlap.
pub fn rasterize(buffer: &mut RgbaImage, points: &[PixelPoint], tool: &StrokeTool) {
    let (radius, color) = match tool {
        StrokeTool::Pen { width, color } => (width / 2.0, *color),
        StrokeTool::Eraser { width } => (width / 2.0, Rgba([0, 0, 0, 0])),
    };
    let radius = radius.max(0.5);
    match points {
        [] => {}
        [single] => stamp(buffer, *single, radius, color),
        _ => {
            for pair in points.windows(2) {
                segment(buffer, pair[0], pair[1], radius, color);
            }
        }
    }
}

fn segment(buffer: &mut RgbaImage, a: PixelPoint, b: PixelPoint, radius: f64, color: Rgba<u8>) {
    let length = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    // Stamp spacing under one pixel keeps round caps gap-free.
    let steps = length.ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let p = PixelPoint::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
        stamp(buffer, p, radius, color);
    }
}

fn stamp(buffer: &mut RgbaImage, center: PixelPoint, radius: f64, color: Rgba<u8>) {
    let (w, h) = (buffer.width() as i64, buffer.height() as i64);
    let x0 = (center.x - radius).floor() as i64;
    let x1 = (center.x + radius).ceil() as i64;
    let y0 = (center.y - radius).floor() as i64;
    let y1 = (center.y + radius).ceil() as i64;
    let r2 = radius * radius;
    for y in y0.max(0)..=y1.min(h - 1) {
        for x in x0.max(0)..=x1.min(w - 1) {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            if dx * dx + dy * dy <= r2 {
                buffer.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
