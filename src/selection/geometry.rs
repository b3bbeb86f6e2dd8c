//! Square, area-capped selections and their skewed on-screen quads.
//!
//! A selection is always a square in world space. It is drawn and exported
//! as a parallelogram whose bottom edge is shifted by `side * tan(skew)`.

use crate::core::{
    config::SelectionConfig,
    geo::{Point, Rect},
};
use serde::{Deserialize, Serialize};

/// Selection corners in world (sprite-pixel) coordinates.
///
/// `start` is where the drag began; `end` is already constrained, so the
/// bounds are always square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionBounds {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

fn direction(delta: f64) -> f64 {
    if delta < 0.0 {
        -1.0
    } else {
        1.0
    }
}

impl SelectionBounds {
    /// A zero-sized selection at `start`
    pub fn at(start: Point) -> Self {
        Self {
            start_x: start.x,
            start_y: start.y,
            end_x: start.x,
            end_y: start.y,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    pub fn width(&self) -> f64 {
        (self.end_x - self.start_x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.end_y - self.start_y).abs()
    }

    /// Side length of the square
    pub fn side(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.side() <= 0.0
    }

    /// Moves the end toward `candidate`, squared off and capped at
    /// `max_side`, keeping the drag direction on each axis
    pub fn drag_to(&mut self, candidate: Point, max_side: f64) {
        let end = constrain_end(self.start(), candidate, max_side);
        self.end_x = end.x;
        self.end_y = end.y;
    }

    /// Axis-aligned square with a top-left origin
    pub fn normalized(&self) -> Rect {
        Rect::from_corners(self.start(), self.end())
    }

    pub fn skew_quad(&self, skew_tan: f64) -> SkewQuad {
        SkewQuad::from_square(self.normalized(), skew_tan)
    }
}

/// Squares the vector `start -> candidate` by taking the longer axis and
/// keeping each axis' sign (zero counts as positive)
pub fn constrain_square(start: Point, candidate: Point) -> Point {
    let dx = candidate.x - start.x;
    let dy = candidate.y - start.y;
    let size = dx.abs().max(dy.abs());
    Point::new(start.x + direction(dx) * size, start.y + direction(dy) * size)
}

/// [`constrain_square`] with the side capped at `max_side`
pub fn constrain_end(start: Point, candidate: Point, max_side: f64) -> Point {
    let dx = candidate.x - start.x;
    let dy = candidate.y - start.y;
    let size = dx.abs().max(dy.abs()).min(max_side.max(0.0));
    Point::new(start.x + direction(dx) * size, start.y + direction(dy) * size)
}

/// Real-world kilometres covered by one sprite pixel, assuming the sprite
/// spans the equator horizontally
pub fn km_per_pixel(sprite_width: u32, config: &SelectionConfig) -> f64 {
    if sprite_width == 0 {
        return 0.0;
    }
    config.equator_km / sprite_width as f64
}

/// Largest side, in sprite pixels, whose square stays within the area cap
pub fn max_side_pixels(sprite_width: u32, config: &SelectionConfig) -> f64 {
    let km_per_px = km_per_pixel(sprite_width, config);
    if km_per_px <= 0.0 {
        return f64::INFINITY;
    }
    config.max_area_km2.sqrt() / km_per_px
}

/// Area of a selection in square kilometres
pub fn area_km2(bounds: &SelectionBounds, sprite_width: u32, config: &SelectionConfig) -> f64 {
    let side_km = bounds.side() * km_per_pixel(sprite_width, config);
    side_km * side_km
}

/// The sheared parallelogram drawn for a square selection.
///
/// Corner order: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewQuad {
    pub corners: [Point; 4],
}

impl SkewQuad {
    pub fn from_square(square: Rect, skew_tan: f64) -> Self {
        let shift = square.height * skew_tan;
        let (x0, y0) = (square.x, square.y);
        let (x1, y1) = (square.x + square.width, square.y + square.height);
        Self {
            corners: [
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1 + shift, y1),
                Point::new(x0 + shift, y1),
            ],
        }
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    /// Applies `f` to every corner, e.g. a world-to-screen mapping
    pub fn map(&self, f: impl Fn(Point) -> Point) -> SkewQuad {
        SkewQuad {
            corners: self.corners.map(f),
        }
    }

    pub fn bounding_box(&self) -> Rect {
        let min_x = self.corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = self.corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = self.corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = self.corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}
