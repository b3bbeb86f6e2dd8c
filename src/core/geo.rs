use serde::{Deserialize, Serialize};

/// Represents a point in screen, world or image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn floor(&self) -> Point {
        Point::new(self.x.floor(), self.y.floor())
    }

    pub fn round(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Axis-aligned rectangle in game-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two arbitrary corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(min_x, min_y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Inclusive containment test, edges count as inside
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Integer pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_point(&self) -> Point {
        Point::new(self.width as f64, self.height as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_math() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(1.0, 1.0);
        assert_eq!(a.add(&b), Point::new(4.0, 5.0));
        assert_eq!(a.subtract(&b), Point::new(2.0, 3.0));
        assert_eq!(a.multiply(2.0), Point::new(6.0, 8.0));
        assert_eq!(a.distance_to(&Point::default()), 5.0);
        assert_eq!(a.midpoint(&b), Point::new(2.0, 2.5));
    }

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(rect.contains(&Point::new(10.0, 10.0)));
        assert!(rect.contains(&Point::new(30.0, 15.0)));
        assert!(!rect.contains(&Point::new(30.1, 15.0)));
        assert!(!rect.contains(&Point::new(9.9, 12.0)));
    }

    #[test]
    fn test_rect_from_corners() {
        let rect = Rect::from_corners(Point::new(5.0, 8.0), Point::new(1.0, 2.0));
        assert_eq!(rect, Rect::new(1.0, 2.0, 4.0, 6.0));
        assert_eq!(rect.center(), Point::new(3.0, 5.0));
    }
}
