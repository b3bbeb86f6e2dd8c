//! Converts raw mouse and touch input into area-relative gestures.
//!
//! Mouse states: idle, armed (pressed on a drag-capable area, still inside
//! the threshold), dragging. Touch reuses the same model for one finger and
//! switches to a pinch when a second finger lands; pinches are reported
//! through the same `on_scroll` contract as the wheel.

use crate::{
    core::{config::InputConfig, geo::Point},
    input::{
        area::{PointerArea, PointerAreas, ScrollEvent},
        events::{Cursor, EventHandled, PointerEvent, TouchPhase, TouchPoint},
        gestures::{DragState, PinchState},
    },
};

pub struct PointerDispatcher {
    config: InputConfig,
    attached: bool,
    areas: PointerAreas,
    drag: Option<DragState>,
    pinch: Option<PinchState>,
    pressed: Option<PointerArea>,
    cursor: Cursor,
    last_touch: Option<Point>,
    /// Set when a pinch drops to one finger; the leftover finger must not
    /// produce a tap when it lifts
    suppress_tap: bool,
}

impl PointerDispatcher {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            attached: false,
            areas: PointerAreas::new(),
            drag: None,
            pinch: None,
            pressed: None,
            cursor: Cursor::Default,
            last_touch: None,
            suppress_tap: false,
        }
    }

    /// Starts accepting events
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stops accepting events and drops any gesture in progress
    pub fn detach(&mut self) {
        self.attached = false;
        self.reset();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn areas(&self) -> &PointerAreas {
        &self.areas
    }

    pub fn areas_mut(&mut self) -> &mut PointerAreas {
        &mut self.areas
    }

    /// Discards the previous frame's areas; gestures in progress keep the
    /// area they started on
    pub fn clear_areas(&mut self) {
        self.areas.clear();
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().map_or(false, |drag| drag.is_dragging)
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn handle_event(&mut self, event: PointerEvent) -> EventHandled {
        if !self.attached {
            return EventHandled::NotHandled;
        }

        match event {
            PointerEvent::Down { position } => self.press(position),
            PointerEvent::Move { position } => self.move_to(position, true),
            PointerEvent::Up { position } => self.release(position),
            PointerEvent::Leave { position } => self.leave(position),
            PointerEvent::Wheel { position, delta_y } => self.scroll(ScrollEvent { delta_y, position }),
            PointerEvent::Touch { phase, touches } => self.touch(phase, &touches),
        }
    }

    fn press(&mut self, position: Point) -> EventHandled {
        let Some(hit) = self.areas.find_top_hit_area(position).cloned() else {
            return EventHandled::NotHandled;
        };

        hit.press(position);
        if hit.is_draggable() {
            log::debug!("armed drag at ({:.1}, {:.1}) on layer {}", position.x, position.y, hit.layer);
            self.drag = Some(DragState::armed(hit.clone(), position));
        }
        self.pressed = Some(hit);
        EventHandled::Handled
    }

    fn move_to(&mut self, position: Point, hover: bool) -> EventHandled {
        let threshold = self.config.drag_threshold;

        if let Some(drag) = self.drag.as_mut() {
            if !drag.is_dragging {
                if !drag.exceeds_threshold(position, threshold) {
                    return EventHandled::Handled;
                }
                drag.is_dragging = true;
                log::debug!("drag started at ({:.1}, {:.1})", drag.start.x, drag.start.y);
                drag.area.drag_start(drag.start);
            }
            let (dx, dy) = drag.advance(position);
            drag.area.drag(dx, dy);
            self.cursor = Cursor::Grabbing;
            return EventHandled::Handled;
        }

        if !hover {
            return EventHandled::NotHandled;
        }

        match self.areas.find_top_hit_area(position) {
            Some(hit) => {
                hit.hover(position);
                self.cursor = hit.hover_cursor();
                EventHandled::Handled
            }
            None => {
                self.cursor = Cursor::Default;
                EventHandled::NotHandled
            }
        }
    }

    fn release(&mut self, position: Point) -> EventHandled {
        if let Some(pressed) = self.pressed.take() {
            pressed.release(position);
        }

        if let Some(drag) = self.drag.take() {
            if drag.is_dragging {
                log::debug!("drag ended at ({:.1}, {:.1})", position.x, position.y);
                drag.area.drag_end();
            } else {
                drag.area.click(position);
            }
            self.cursor = drag.area.hover_cursor();
            return EventHandled::Handled;
        }

        match self.areas.find_top_hit_area(position) {
            Some(hit) => {
                hit.click(position);
                EventHandled::Handled
            }
            None => EventHandled::NotHandled,
        }
    }

    /// Ends the current gesture without a click. A drag in progress still
    /// gets `on_drag_end`.
    fn leave(&mut self, position: Point) -> EventHandled {
        let active = self.pressed.is_some() || self.drag.is_some();
        if let Some(pressed) = self.pressed.take() {
            pressed.release(position);
        }
        self.cancel_drag();
        self.cursor = Cursor::Default;
        if active {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }

    fn scroll(&mut self, event: ScrollEvent) -> EventHandled {
        match self.areas.find_top_hit_area(event.position) {
            Some(hit) if hit.is_scrollable() => {
                hit.scroll(event);
                EventHandled::Handled
            }
            _ => EventHandled::NotHandled,
        }
    }

    fn touch(&mut self, phase: TouchPhase, touches: &[TouchPoint]) -> EventHandled {
        match phase {
            TouchPhase::Start => self.touch_start(touches),
            TouchPhase::Move => self.touch_move(touches),
            TouchPhase::End => self.touch_end(touches),
            TouchPhase::Cancel => {
                self.cancel_drag();
                self.pinch = None;
                self.pressed = None;
                self.suppress_tap = false;
                EventHandled::Handled
            }
        }
    }

    fn touch_start(&mut self, touches: &[TouchPoint]) -> EventHandled {
        match touches {
            [first, second, ..] => {
                if self.pinch.is_none() {
                    self.cancel_drag();
                    self.pressed = None;
                    let pinch = PinchState::from_touches(first, second);
                    log::debug!("pinch started, distance {:.1}", pinch.distance);
                    self.pinch = Some(pinch);
                }
                EventHandled::Handled
            }
            [only] => {
                if self.pinch.is_some() || self.suppress_tap {
                    return EventHandled::Handled;
                }
                self.last_touch = Some(only.position);
                self.press(only.position)
            }
            [] => EventHandled::NotHandled,
        }
    }

    fn touch_move(&mut self, touches: &[TouchPoint]) -> EventHandled {
        match touches {
            [first, second, ..] => {
                let Some(baseline) = self.pinch else {
                    return EventHandled::NotHandled;
                };
                let next = PinchState::from_touches(first, second);
                let delta_y = baseline.scroll_delta(&next, self.config.pinch_delta_scale);
                self.pinch = Some(next);
                if delta_y == 0.0 {
                    return EventHandled::Handled;
                }
                self.scroll(ScrollEvent {
                    delta_y,
                    position: next.midpoint,
                });
                EventHandled::Handled
            }
            [only] => {
                if self.pinch.is_some() || self.suppress_tap {
                    return EventHandled::Handled;
                }
                self.last_touch = Some(only.position);
                self.move_to(only.position, false)
            }
            [] => EventHandled::NotHandled,
        }
    }

    fn touch_end(&mut self, remaining: &[TouchPoint]) -> EventHandled {
        if self.pinch.is_some() {
            match remaining {
                [first, second, ..] => {
                    // A finger of the old pair may be the one that lifted
                    self.pinch = Some(PinchState::from_touches(first, second));
                }
                _ => {
                    log::debug!("pinch ended with {} finger(s) down", remaining.len());
                    self.pinch = None;
                    self.suppress_tap = !remaining.is_empty();
                }
            }
            return EventHandled::Handled;
        }

        if !remaining.is_empty() {
            return EventHandled::Handled;
        }

        if std::mem::take(&mut self.suppress_tap) {
            self.drag = None;
            self.pressed = None;
            return EventHandled::Handled;
        }

        let position = self.last_touch.take().unwrap_or_default();
        self.release(position)
    }

    /// Ends a drag without a click: a real drag gets `on_drag_end`, an armed
    /// press is dropped silently
    fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            if drag.is_dragging {
                drag.area.drag_end();
            }
        }
    }

    /// Resets all gesture state
    pub fn reset(&mut self) {
        self.cancel_drag();
        self.pinch = None;
        self.pressed = None;
        self.last_touch = None;
        self.suppress_tap = false;
        self.cursor = Cursor::Default;
    }
}

impl Default for PointerDispatcher {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Calls {
        clicks: usize,
        drag_starts: usize,
        drags: Vec<(f64, f64)>,
        drag_ends: usize,
        scrolls: Vec<f64>,
    }

    fn recording_area(layer: i32, calls: &Rc<RefCell<Calls>>) -> PointerArea {
        let (c1, c2, c3, c4, c5) = (calls.clone(), calls.clone(), calls.clone(), calls.clone(), calls.clone());
        PointerArea::new(Rect::new(0.0, 0.0, 500.0, 500.0), layer)
            .on_click(move |_| c1.borrow_mut().clicks += 1)
            .on_drag_start(move |_| c2.borrow_mut().drag_starts += 1)
            .on_drag(move |dx, dy| c3.borrow_mut().drags.push((dx, dy)))
            .on_drag_end(move || c4.borrow_mut().drag_ends += 1)
            .on_scroll(move |event| c5.borrow_mut().scrolls.push(event.delta_y))
    }

    fn dispatcher_with(area: PointerArea) -> PointerDispatcher {
        let mut dispatcher = PointerDispatcher::default();
        dispatcher.attach();
        dispatcher.areas_mut().register(area);
        dispatcher
    }

    fn touch(phase: TouchPhase, points: &[(f64, f64)]) -> PointerEvent {
        PointerEvent::Touch {
            phase,
            touches: points
                .iter()
                .enumerate()
                .map(|(i, (x, y))| TouchPoint::new(i as u64, *x, *y))
                .collect(),
        }
    }

    #[test]
    fn test_detached_dispatcher_ignores_events() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));
        dispatcher.detach();
        let handled = dispatcher.handle_event(PointerEvent::Up {
            position: Point::new(10.0, 10.0),
        });
        assert_eq!(handled, EventHandled::NotHandled);
        assert_eq!(calls.borrow().clicks, 0);
    }

    #[test]
    fn test_press_release_within_threshold_is_click() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        dispatcher.handle_event(PointerEvent::Down { position: Point::new(10.0, 10.0) });
        dispatcher.handle_event(PointerEvent::Move { position: Point::new(11.0, 10.0) });
        dispatcher.handle_event(PointerEvent::Up { position: Point::new(11.0, 10.0) });

        let calls = calls.borrow();
        assert_eq!(calls.clicks, 1);
        assert_eq!(calls.drag_starts, 0);
        assert!(calls.drags.is_empty());
        assert_eq!(calls.drag_ends, 0);
    }

    #[test]
    fn test_movement_past_threshold_is_drag() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        dispatcher.handle_event(PointerEvent::Down { position: Point::new(10.0, 10.0) });
        dispatcher.handle_event(PointerEvent::Move { position: Point::new(13.0, 10.0) });
        assert!(dispatcher.is_dragging());
        assert_eq!(dispatcher.cursor(), Cursor::Grabbing);
        dispatcher.handle_event(PointerEvent::Move { position: Point::new(20.0, 15.0) });
        dispatcher.handle_event(PointerEvent::Up { position: Point::new(20.0, 15.0) });

        let calls = calls.borrow();
        assert_eq!(calls.clicks, 0);
        assert_eq!(calls.drag_starts, 1);
        assert_eq!(calls.drags, vec![(3.0, 0.0), (7.0, 5.0)]);
        assert_eq!(calls.drag_ends, 1);
        assert!(!dispatcher.is_dragging());
    }

    #[test]
    fn test_click_only_area_resolves_on_release() {
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = clicks.clone();
        let area = PointerArea::new(Rect::new(0.0, 0.0, 50.0, 50.0), 3)
            .on_click(move |p| sink.borrow_mut().push(p));
        let mut dispatcher = dispatcher_with(area);

        dispatcher.handle_event(PointerEvent::Down { position: Point::new(5.0, 5.0) });
        dispatcher.handle_event(PointerEvent::Move { position: Point::new(30.0, 30.0) });
        dispatcher.handle_event(PointerEvent::Up { position: Point::new(30.0, 30.0) });

        assert_eq!(*clicks.borrow(), vec![Point::new(30.0, 30.0)]);
    }

    #[test]
    fn test_drag_survives_area_clear() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        dispatcher.handle_event(PointerEvent::Down { position: Point::new(10.0, 10.0) });
        dispatcher.clear_areas();
        dispatcher.handle_event(PointerEvent::Move { position: Point::new(20.0, 10.0) });
        dispatcher.handle_event(PointerEvent::Up { position: Point::new(20.0, 10.0) });

        assert_eq!(calls.borrow().drag_ends, 1);
    }

    #[test]
    fn test_wheel_requires_scroll_handler() {
        let mut dispatcher = dispatcher_with(
            PointerArea::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0).on_click(|_| {}),
        );
        let handled = dispatcher.handle_event(PointerEvent::Wheel {
            position: Point::new(5.0, 5.0),
            delta_y: -3.0,
        });
        assert_eq!(handled, EventHandled::NotHandled);

        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));
        let handled = dispatcher.handle_event(PointerEvent::Wheel {
            position: Point::new(5.0, 5.0),
            delta_y: -3.0,
        });
        assert!(handled.is_handled());
        assert_eq!(calls.borrow().scrolls, vec![-3.0]);
    }

    #[test]
    fn test_hover_sets_cursor() {
        let mut dispatcher = dispatcher_with(
            PointerArea::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0).on_click(|_| {}),
        );
        dispatcher.handle_event(PointerEvent::Move { position: Point::new(5.0, 5.0) });
        assert_eq!(dispatcher.cursor(), Cursor::Pointer);
        dispatcher.handle_event(PointerEvent::Move { position: Point::new(50.0, 5.0) });
        assert_eq!(dispatcher.cursor(), Cursor::Default);
    }

    #[test]
    fn test_single_finger_tap_and_drag() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        dispatcher.handle_event(touch(TouchPhase::Start, &[(10.0, 10.0)]));
        dispatcher.handle_event(touch(TouchPhase::End, &[]));
        assert_eq!(calls.borrow().clicks, 1);

        dispatcher.handle_event(touch(TouchPhase::Start, &[(10.0, 10.0)]));
        dispatcher.handle_event(touch(TouchPhase::Move, &[(10.0, 30.0)]));
        dispatcher.handle_event(touch(TouchPhase::End, &[]));
        let calls = calls.borrow();
        assert_eq!(calls.clicks, 1);
        assert_eq!(calls.drag_starts, 1);
        assert_eq!(calls.drags, vec![(0.0, 20.0)]);
        assert_eq!(calls.drag_ends, 1);
    }

    #[test]
    fn test_second_finger_cancels_drag_and_pinches() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        dispatcher.handle_event(touch(TouchPhase::Start, &[(100.0, 100.0)]));
        dispatcher.handle_event(touch(TouchPhase::Move, &[(110.0, 100.0)]));
        dispatcher.handle_event(touch(TouchPhase::Start, &[(110.0, 100.0), (210.0, 100.0)]));
        assert!(dispatcher.is_pinching());
        assert_eq!(calls.borrow().drag_ends, 1);

        // Fingers move apart: 100 -> 200 gives scale 0.5, delta -50 (zoom in)
        dispatcher.handle_event(touch(TouchPhase::Move, &[(60.0, 100.0), (260.0, 100.0)]));
        // Baseline is now 200; 200 -> 100 gives scale 2, delta +100
        dispatcher.handle_event(touch(TouchPhase::Move, &[(110.0, 100.0), (210.0, 100.0)]));

        let scrolls = calls.borrow().scrolls.clone();
        assert_eq!(scrolls.len(), 2);
        assert!((scrolls[0] + 50.0).abs() < 1e-9);
        assert!((scrolls[1] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_leave_without_press_never_clicks() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        let handled = dispatcher.handle_event(PointerEvent::Leave {
            position: Point::new(499.0, 250.0),
        });
        assert_eq!(handled, EventHandled::NotHandled);

        dispatcher.handle_event(PointerEvent::Down { position: Point::new(10.0, 10.0) });
        dispatcher.handle_event(PointerEvent::Leave { position: Point::new(11.0, 10.0) });
        assert_eq!(calls.borrow().clicks, 0);
        assert_eq!(calls.borrow().drag_ends, 0);
    }

    #[test]
    fn test_leave_mid_drag_ends_drag() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        dispatcher.handle_event(PointerEvent::Down { position: Point::new(10.0, 10.0) });
        dispatcher.handle_event(PointerEvent::Move { position: Point::new(40.0, 10.0) });
        let handled = dispatcher.handle_event(PointerEvent::Leave {
            position: Point::new(40.0, 10.0),
        });
        assert!(handled.is_handled());
        assert!(!dispatcher.is_dragging());
        assert_eq!(dispatcher.cursor(), Cursor::Default);

        let calls = calls.borrow();
        assert_eq!(calls.drag_starts, 1);
        assert_eq!(calls.drag_ends, 1);
        assert_eq!(calls.clicks, 0);
    }

    #[test]
    fn test_third_finger_lifting_rebases_pinch() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        // Pinch pair is 200 px apart; the third finger sits 50 px from the second
        dispatcher.handle_event(touch(TouchPhase::Start, &[(100.0, 100.0), (300.0, 100.0), (350.0, 100.0)]));
        dispatcher.handle_event(PointerEvent::Touch {
            phase: TouchPhase::End,
            touches: vec![TouchPoint::new(1, 300.0, 100.0), TouchPoint::new(2, 350.0, 100.0)],
        });
        assert!(dispatcher.is_pinching());

        // Same spread as the remaining pair: no zoom
        dispatcher.handle_event(PointerEvent::Touch {
            phase: TouchPhase::Move,
            touches: vec![TouchPoint::new(1, 310.0, 100.0), TouchPoint::new(2, 360.0, 100.0)],
        });
        assert!(calls.borrow().scrolls.is_empty());
    }

    #[test]
    fn test_pinch_to_one_finger_does_not_start_drag_or_tap() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut dispatcher = dispatcher_with(recording_area(0, &calls));

        dispatcher.handle_event(touch(TouchPhase::Start, &[(100.0, 100.0), (200.0, 100.0)]));
        dispatcher.handle_event(touch(TouchPhase::End, &[(100.0, 100.0)]));
        assert!(!dispatcher.is_pinching());

        dispatcher.handle_event(touch(TouchPhase::Move, &[(150.0, 150.0)]));
        dispatcher.handle_event(touch(TouchPhase::End, &[]));

        let calls = calls.borrow();
        assert_eq!(calls.clicks, 0);
        assert_eq!(calls.drag_starts, 0);
        assert_eq!(calls.drag_ends, 0);
    }
}
