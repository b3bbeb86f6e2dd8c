pub mod area;
pub mod dispatcher;
pub mod events;
pub mod gestures;

// Re-export the essential types
pub use area::{PointerArea, PointerAreas, ScrollEvent};
pub use dispatcher::PointerDispatcher;
pub use events::{Cursor, EventHandled, PointerEvent, TouchPhase, TouchPoint};
pub use gestures::{DragState, PinchState};
