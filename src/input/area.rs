//! Per-frame pointer hit areas.
//!
//! Areas hold no identity across frames: every interactive component
//! re-declares its rectangles each frame and the previous set is dropped
//! wholesale. Callbacks are reference-counted so an in-progress drag can keep
//! the area it started on after the list has been rebuilt.

use crate::{
    core::geo::{Point, Rect},
    input::events::Cursor,
};
use std::fmt;
use std::rc::Rc;

/// Wheel or pinch scroll delivered to an area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// Positive scrolls down (zoom out)
    pub delta_y: f64,
    pub position: Point,
}

pub type PointHandler = Rc<dyn Fn(Point)>;
pub type DragHandler = Rc<dyn Fn(f64, f64)>;
pub type EndHandler = Rc<dyn Fn()>;
pub type ScrollHandler = Rc<dyn Fn(ScrollEvent)>;

#[derive(Clone)]
pub struct PointerArea {
    pub rect: Rect,
    /// Z-order used to resolve overlapping areas; highest wins
    pub layer: i32,
    pub cursor: Option<Cursor>,
    on_click: Option<PointHandler>,
    on_drag_start: Option<PointHandler>,
    on_drag: Option<DragHandler>,
    on_drag_end: Option<EndHandler>,
    on_scroll: Option<ScrollHandler>,
    on_hover: Option<PointHandler>,
    on_press: Option<PointHandler>,
    on_release: Option<PointHandler>,
}

impl PointerArea {
    pub fn new(rect: Rect, layer: i32) -> Self {
        Self {
            rect,
            layer,
            cursor: None,
            on_click: None,
            on_drag_start: None,
            on_drag: None,
            on_drag_end: None,
            on_scroll: None,
            on_hover: None,
            on_press: None,
            on_release: None,
        }
    }

    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn on_click(mut self, handler: impl Fn(Point) + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    pub fn on_drag_start(mut self, handler: impl Fn(Point) + 'static) -> Self {
        self.on_drag_start = Some(Rc::new(handler));
        self
    }

    /// Receives the incremental `(dx, dy)` since the previous drag event
    pub fn on_drag(mut self, handler: impl Fn(f64, f64) + 'static) -> Self {
        self.on_drag = Some(Rc::new(handler));
        self
    }

    pub fn on_drag_end(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_drag_end = Some(Rc::new(handler));
        self
    }

    pub fn on_scroll(mut self, handler: impl Fn(ScrollEvent) + 'static) -> Self {
        self.on_scroll = Some(Rc::new(handler));
        self
    }

    pub fn on_hover(mut self, handler: impl Fn(Point) + 'static) -> Self {
        self.on_hover = Some(Rc::new(handler));
        self
    }

    pub fn on_press(mut self, handler: impl Fn(Point) + 'static) -> Self {
        self.on_press = Some(Rc::new(handler));
        self
    }

    pub fn on_release(mut self, handler: impl Fn(Point) + 'static) -> Self {
        self.on_release = Some(Rc::new(handler));
        self
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.rect.contains(point)
    }

    /// Only areas with a drag handler arm for dragging on press
    pub fn is_draggable(&self) -> bool {
        self.on_drag.is_some()
    }

    pub fn is_clickable(&self) -> bool {
        self.on_click.is_some()
    }

    pub fn is_scrollable(&self) -> bool {
        self.on_scroll.is_some()
    }

    /// Cursor shown while hovering: the explicit hint, else one derived from
    /// the handlers present
    pub fn hover_cursor(&self) -> Cursor {
        self.cursor.unwrap_or(if self.is_draggable() {
            Cursor::Grab
        } else if self.is_clickable() {
            Cursor::Pointer
        } else {
            Cursor::Default
        })
    }

    pub(crate) fn click(&self, position: Point) {
        if let Some(handler) = &self.on_click {
            handler(position);
        }
    }

    pub(crate) fn drag_start(&self, position: Point) {
        if let Some(handler) = &self.on_drag_start {
            handler(position);
        }
    }

    pub(crate) fn drag(&self, dx: f64, dy: f64) {
        if let Some(handler) = &self.on_drag {
            handler(dx, dy);
        }
    }

    pub(crate) fn drag_end(&self) {
        if let Some(handler) = &self.on_drag_end {
            handler();
        }
    }

    pub(crate) fn scroll(&self, event: ScrollEvent) {
        if let Some(handler) = &self.on_scroll {
            handler(event);
        }
    }

    pub(crate) fn hover(&self, position: Point) {
        if let Some(handler) = &self.on_hover {
            handler(position);
        }
    }

    pub(crate) fn press(&self, position: Point) {
        if let Some(handler) = &self.on_press {
            handler(position);
        }
    }

    pub(crate) fn release(&self, position: Point) {
        if let Some(handler) = &self.on_release {
            handler(position);
        }
    }
}

impl fmt::Debug for PointerArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerArea")
            .field("rect", &self.rect)
            .field("layer", &self.layer)
            .field("cursor", &self.cursor)
            .field("click", &self.on_click.is_some())
            .field("drag", &self.on_drag.is_some())
            .field("scroll", &self.on_scroll.is_some())
            .finish()
    }
}

/// The areas declared for the current frame
#[derive(Debug, Clone, Default)]
pub struct PointerAreas {
    areas: Vec<PointerArea>,
}

impl PointerAreas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, area: PointerArea) {
        self.areas.push(area);
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointerArea> {
        self.areas.iter()
    }

    /// The single area under `point` with the highest `layer`.
    ///
    /// Among overlapping areas on the same layer the most recently registered
    /// one wins, matching paint order.
    pub fn find_top_hit_area(&self, point: Point) -> Option<&PointerArea> {
        self.areas
            .iter()
            .filter(|area| area.contains(&point))
            .fold(None, |best: Option<&PointerArea>, area| match best {
                Some(current) if current.layer > area.layer => Some(current),
                _ => Some(area),
            })
    }
}
