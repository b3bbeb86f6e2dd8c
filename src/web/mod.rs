//! Browser bindings: canvas target, DOM pointer listeners, the
//! `requestAnimationFrame` loop and PNG downloads.

use crate::{
    core::{canvas::RenderTarget, engine::Engine, geo::Point, geo::Size},
    input::events::{Cursor, PointerEvent, TouchPhase, TouchPoint},
    rendering::surface::Raster,
    selection::heightmap::HeightmapPng,
    MapError, Result,
};
use instant::Instant;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{prelude::*, Clamped, JsCast};
use web_sys::{
    AddEventListenerOptions, Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlAnchorElement,
    HtmlCanvasElement, ImageData, MouseEvent, TouchEvent, Url, WheelEvent,
};

pub type SharedEngine = Rc<RefCell<Engine<WebCanvasTarget>>>;

fn js_error(err: JsValue) -> MapError {
    MapError::Render(format!("{:?}", err))
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| MapError::Render("no window".to_string()))
}

/// Routes panics to the browser console
pub fn install_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Render target backed by an `HtmlCanvasElement` and its 2D context
pub struct WebCanvasTarget {
    canvas: HtmlCanvasElement,
    context: Option<CanvasRenderingContext2d>,
}

impl WebCanvasTarget {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            context: None,
        }
    }

    /// Looks the canvas up by element id
    pub fn from_element_id(id: &str) -> Result<Self> {
        let document = window()?
            .document()
            .ok_or_else(|| MapError::Render("no document".to_string()))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| MapError::Render(format!("missing canvas #{}", id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| MapError::Render(format!("#{} is not a canvas", id)))?;
        Ok(Self::new(canvas))
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl RenderTarget for WebCanvasTarget {
    fn acquire_context(&mut self) -> bool {
        self.context = self
            .canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok());
        self.context.is_some()
    }

    fn window_size(&self) -> Size {
        let Some(window) = web_sys::window() else {
            return Size::new(self.canvas.width(), self.canvas.height());
        };
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Size::new(width.max(0.0) as u32, height.max(0.0) as u32)
    }

    fn present(&mut self, frame: &Raster) -> Result<()> {
        let context = self.context.as_ref().ok_or(MapError::ContextUnavailable)?;
        if self.canvas.width() != frame.width() || self.canvas.height() != frame.height() {
            self.canvas.set_width(frame.width());
            self.canvas.set_height(frame.height());
        }

        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(frame.as_raw()), frame.width(), frame.height())
            .map_err(js_error)?;
        context.put_image_data(&data, 0.0, 0.0).map_err(js_error)
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if let Err(err) = self.canvas.style().set_property("cursor", cursor.css_name()) {
            log::warn!("failed to set cursor: {:?}", err);
        }
    }
}

/// Keeps DOM listeners alive; dropping it removes them
pub struct DomListeners {
    canvas: HtmlCanvasElement,
    mouse: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
    wheel: Option<Closure<dyn FnMut(WheelEvent)>>,
    touch: Vec<(&'static str, Closure<dyn FnMut(TouchEvent)>)>,
}

impl Drop for DomListeners {
    fn drop(&mut self) {
        for (name, closure) in &self.mouse {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
        if let Some(closure) = &self.wheel {
            let _ = self
                .canvas
                .remove_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
        }
        for (name, closure) in &self.touch {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

fn mouse_position(event: &MouseEvent) -> Point {
    Point::new(event.offset_x() as f64, event.offset_y() as f64)
}

fn touch_points(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Vec<TouchPoint> {
    let rect = canvas.get_bounding_client_rect();
    let list = event.touches();
    (0..list.length())
        .filter_map(|index| list.get(index))
        .map(|touch| {
            TouchPoint::new(
                touch.identifier() as u64,
                touch.client_x() as f64 - rect.left(),
                touch.client_y() as f64 - rect.top(),
            )
        })
        .collect()
}

/// Converts DOM mouse, wheel and touch events into [`PointerEvent`]s and
/// routes panics to the console.
///
/// Only the primary button presses and releases. Wheel and touch listeners are
/// registered non-passive so a handled event can suppress page scrolling.
pub fn bind_pointer_events(engine: &SharedEngine) -> Result<DomListeners> {
    install_panic_hook();
    let canvas = engine.borrow().target().canvas().clone();
    let mut listeners = DomListeners {
        canvas: canvas.clone(),
        mouse: Vec::new(),
        wheel: None,
        touch: Vec::new(),
    };

    let mouse_events: [(&'static str, fn(&MouseEvent) -> Option<PointerEvent>); 4] = [
        ("mousedown", |event| {
            (event.button() == 0).then(|| PointerEvent::Down {
                position: mouse_position(event),
            })
        }),
        ("mousemove", |event| {
            Some(PointerEvent::Move {
                position: mouse_position(event),
            })
        }),
        ("mouseup", |event| {
            (event.button() == 0).then(|| PointerEvent::Up {
                position: mouse_position(event),
            })
        }),
        // Only an exit with the primary button held can end a gesture
        ("mouseleave", |event| {
            (event.buttons() & 1 != 0).then(|| PointerEvent::Leave {
                position: mouse_position(event),
            })
        }),
    ];
    for (name, convert) in mouse_events {
        let engine = engine.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            if let Some(pointer_event) = convert(&event) {
                engine.borrow_mut().handle_event(pointer_event);
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        listeners.mouse.push((name, closure));
    }

    let options = AddEventListenerOptions::new();
    options.set_passive(false);

    let wheel_engine = engine.clone();
    let wheel = Closure::wrap(Box::new(move |event: WheelEvent| {
        let handled = wheel_engine.borrow_mut().handle_event(PointerEvent::Wheel {
            position: Point::new(event.offset_x() as f64, event.offset_y() as f64),
            delta_y: event.delta_y(),
        });
        if handled.is_handled() {
            event.prevent_default();
        }
    }) as Box<dyn FnMut(WheelEvent)>);
    canvas
        .add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            wheel.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(js_error)?;
    listeners.wheel = Some(wheel);

    let touch_events = [
        ("touchstart", TouchPhase::Start),
        ("touchmove", TouchPhase::Move),
        ("touchend", TouchPhase::End),
        ("touchcancel", TouchPhase::Cancel),
    ];
    for (name, phase) in touch_events {
        let engine = engine.clone();
        let target = canvas.clone();
        let closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            let touches = touch_points(&target, &event);
            let handled = engine.borrow_mut().handle_event(PointerEvent::Touch { phase, touches });
            if handled.is_handled() {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(TouchEvent)>);
        canvas
            .add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(js_error)?;
        listeners.touch.push((name, closure));
    }

    Ok(listeners)
}

/// Handle to a running `requestAnimationFrame` loop
pub struct RenderLoop {
    frame_id: Rc<RefCell<Option<i32>>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl RenderLoop {
    /// Schedules `engine.render_frame` on every animation frame
    pub fn start(engine: SharedEngine) -> Result<Self> {
        let window = window()?;
        let frame_id = Rc::new(RefCell::new(None));
        let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

        let loop_id = frame_id.clone();
        let loop_callback = callback.clone();
        let loop_window = window.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Err(err) = engine.borrow_mut().render_frame(Instant::now()) {
                log::error!("frame failed: {}", err);
            }
            if let Some(next) = loop_callback.borrow().as_ref() {
                if let Ok(id) = loop_window.request_animation_frame(next.as_ref().unchecked_ref()) {
                    *loop_id.borrow_mut() = Some(id);
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(first) = callback.borrow().as_ref() {
            let id = window
                .request_animation_frame(first.as_ref().unchecked_ref())
                .map_err(js_error)?;
            *frame_id.borrow_mut() = Some(id);
        }

        Ok(Self { frame_id, callback })
    }

    pub fn stop(&self) {
        if let (Some(id), Some(window)) = (self.frame_id.borrow_mut().take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Offers an encoded height map to the user as a file download
pub fn download_png(png: &HeightmapPng) -> Result<()> {
    let bytes = js_sys::Uint8Array::from(png.bytes.as_slice());
    let parts = js_sys::Array::new();
    parts.push(&bytes);

    let properties = BlobPropertyBag::new();
    properties.set_type("image/png");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &properties).map_err(js_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let document = window()?
        .document()
        .ok_or_else(|| MapError::Render("no document".to_string()))?;
    let anchor = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| MapError::Render("anchor element".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(&png.file_name);
    anchor.click();

    Url::revoke_object_url(&url).map_err(js_error)?;
    log::info!("downloaded {} ({} bytes)", png.file_name, png.bytes.len());
    Ok(())
}
