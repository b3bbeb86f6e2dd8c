use crate::{core::geo::Point, input::area::PointerArea, input::events::TouchPoint};

/// An in-progress press on a drag-capable area.
///
/// The press starts armed (`is_dragging == false`) and only becomes a drag
/// once the pointer leaves the threshold box around `start`. Releasing while
/// still armed is a click.
#[derive(Debug, Clone)]
pub struct DragState {
    pub area: PointerArea,
    pub start: Point,
    pub last: Point,
    pub is_dragging: bool,
}

impl DragState {
    pub fn armed(area: PointerArea, start: Point) -> Self {
        Self {
            area,
            start,
            last: start,
            is_dragging: false,
        }
    }

    /// Whether `position` is more than `threshold` pixels from the start on
    /// either axis
    pub fn exceeds_threshold(&self, position: Point, threshold: f64) -> bool {
        (position.x - self.start.x).abs() > threshold || (position.y - self.start.y).abs() > threshold
    }

    /// Delta since the previous move; advances `last`
    pub fn advance(&mut self, position: Point) -> (f64, f64) {
        let delta = (position.x - self.last.x, position.y - self.last.y);
        self.last = position;
        delta
    }
}

/// Two-finger pinch baseline, refreshed on every move so the gesture is
/// continuous rather than relative to where it began
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    pub distance: f64,
    pub midpoint: Point,
}

impl PinchState {
    pub fn from_touches(a: &TouchPoint, b: &TouchPoint) -> Self {
        Self {
            distance: a.position.distance_to(&b.position),
            midpoint: a.position.midpoint(&b.position),
        }
    }

    /// Synthetic wheel delta for a move to `next`: `(baseline / next - 1) * scale`.
    /// Fingers moving apart give a negative delta (zoom in).
    pub fn scroll_delta(&self, next: &PinchState, delta_scale: f64) -> f64 {
        if self.distance <= 0.0 || next.distance <= 0.0 {
            return 0.0;
        }
        let scale = self.distance / next.distance;
        (scale - 1.0) * delta_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Rect;

    #[test]
    fn test_threshold_is_per_axis() {
        let area = PointerArea::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        let drag = DragState::armed(area, Point::new(5.0, 5.0));
        assert!(!drag.exceeds_threshold(Point::new(7.0, 7.0), 2.0));
        assert!(drag.exceeds_threshold(Point::new(7.5, 5.0), 2.0));
        assert!(drag.exceeds_threshold(Point::new(5.0, 2.0), 2.0));
    }

    #[test]
    fn test_advance_reports_incremental_delta() {
        let area = PointerArea::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        let mut drag = DragState::armed(area, Point::new(0.0, 0.0));
        assert_eq!(drag.advance(Point::new(3.0, 1.0)), (3.0, 1.0));
        assert_eq!(drag.advance(Point::new(4.0, 4.0)), (1.0, 3.0));
        assert_eq!(drag.last, Point::new(4.0, 4.0));
    }

    #[test]
    fn test_pinch_delta_sign() {
        let start = PinchState::from_touches(&TouchPoint::new(0, 0.0, 0.0), &TouchPoint::new(1, 100.0, 0.0));
        assert_eq!(start.midpoint, Point::new(50.0, 0.0));

        let apart = PinchState::from_touches(&TouchPoint::new(0, 0.0, 0.0), &TouchPoint::new(1, 200.0, 0.0));
        assert!((start.scroll_delta(&apart, 100.0) - (-50.0)).abs() < 1e-9);

        let together = PinchState::from_touches(&TouchPoint::new(0, 0.0, 0.0), &TouchPoint::new(1, 50.0, 0.0));
        assert!((start.scroll_delta(&together, 100.0) - 100.0).abs() < 1e-9);
    }
}
