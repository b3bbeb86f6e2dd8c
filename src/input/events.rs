use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Raw pointer input as delivered by the platform, in canvas pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Primary mouse button pressed
    Down { position: Point },
    /// Mouse moved, with or without a button held
    Move { position: Point },
    /// Primary mouse button released
    Up { position: Point },
    /// Pointer left the canvas while the primary button was held; ends any
    /// gesture without a click
    Leave { position: Point },
    /// Scroll wheel; positive `delta_y` scrolls down
    Wheel { position: Point, delta_y: f64 },
    /// Touch events; `touches` lists every finger still on the surface
    /// after the event
    Touch {
        phase: TouchPhase,
        touches: Vec<TouchPoint>,
    },
}

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Whether an event was consumed. `Handled` wheel events must have their
/// default browser action prevented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventHandled::Handled)
    }
}

/// Cursor affordance shown over the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
    Crosshair,
}

impl Cursor {
    /// CSS `cursor` keyword
    pub fn css_name(&self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::Crosshair => "crosshair",
        }
    }
}

impl PointerEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position }
            | PointerEvent::Leave { position }
            | PointerEvent::Wheel { position, .. } => Some(*position),
            PointerEvent::Touch { touches, .. } => touches.first().map(|t| t.position),
        }
    }

    /// Checks if this is a touch event
    pub fn is_touch_event(&self) -> bool {
        matches!(self, PointerEvent::Touch { .. })
    }
}
