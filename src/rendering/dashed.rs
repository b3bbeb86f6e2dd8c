//! Integer rasterization helpers for pixel-art overlays.
//!
//! Dashes are stepped with Bresenham on whole pixels instead of a stroked
//! path, so the pattern stays exactly `dash`/`gap` screen pixels wide at any
//! zoom level.

use crate::{
    core::geo::Point,
    rendering::{blend::BlendMode, surface::Raster},
};
use image::Rgba;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashPattern {
    pub dash: u32,
    pub gap: u32,
}

impl DashPattern {
    pub fn new(dash: u32, gap: u32) -> Self {
        Self { dash, gap }
    }

    pub fn solid() -> Self {
        Self { dash: 1, gap: 0 }
    }

    fn is_on(&self, phase: u32) -> bool {
        let period = self.dash + self.gap;
        period == 0 || phase % period < self.dash
    }
}

/// Pixels of the line from `from` to `to`, endpoints included
pub fn bresenham(from: Point, to: Point) -> Vec<(i64, i64)> {
    let mut x0 = from.x.round() as i64;
    let mut y0 = from.y.round() as i64;
    let x1 = to.x.round() as i64;
    let y1 = to.y.round() as i64;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut pixels = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        pixels.push((x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    pixels
}

/// Draws a dashed segment, advancing `phase` by one per stepped pixel so that
/// consecutive segments continue the same pattern.
pub fn draw_dashed_line(
    raster: &mut Raster,
    from: Point,
    to: Point,
    pattern: DashPattern,
    phase: &mut u32,
    color: Rgba<u8>,
) {
    for (x, y) in bresenham(from, to) {
        if pattern.is_on(*phase) {
            raster.blend_pixel(x, y, color, BlendMode::SourceOver);
        }
        *phase = phase.wrapping_add(1);
    }
}

/// Draws the closed outline of `points`. Shared corners are stepped once.
pub fn draw_dashed_polygon(
    raster: &mut Raster,
    points: &[Point],
    pattern: DashPattern,
    color: Rgba<u8>,
) {
    if points.len() < 2 {
        return;
    }
    let mut phase = 0;
    for i in 0..points.len() {
        let from = points[i];
        let to = points[(i + 1) % points.len()];
        let pixels = bresenham(from, to);
        // The last pixel is the next segment's first pixel.
        for &(x, y) in &pixels[..pixels.len() - 1] {
            if pattern.is_on(phase) {
                raster.blend_pixel(x, y, color, BlendMode::SourceOver);
            }
            phase = phase.wrapping_add(1);
        }
    }
}

/// Even-odd scanline fill sampling pixel centres
pub fn fill_polygon(raster: &mut Raster, points: &[Point], color: Rgba<u8>, mode: BlendMode) {
    if points.len() < 3 {
        return;
    }
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    let y_start = min_y.floor().max(0.0) as i64;
    let y_end = (max_y.ceil() as i64).min(raster.height() as i64);

    let mut crossings = Vec::with_capacity(points.len());
    for y in y_start..y_end {
        let yc = y as f64 + 0.5;
        crossings.clear();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            let (top, bottom) = if a.y <= b.y { (a, b) } else { (b, a) };
            if yc >= top.y && yc < bottom.y {
                let t = (yc - top.y) / (bottom.y - top.y);
                crossings.push(top.x + t * (bottom.x - top.x));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let x_start = (span[0] - 0.5).ceil().max(0.0) as i64;
            let x_end = ((span[1] - 0.5).ceil() as i64).min(raster.width() as i64);
            for x in x_start..x_end {
                raster.blend_pixel(x, y, color, mode);
            }
        }
    }
}
