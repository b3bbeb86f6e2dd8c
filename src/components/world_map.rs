//! The pannable, zoomable map sprite.
//!
//! The sprite is rendered once into a layer of its own size; pan and zoom
//! only change that layer's position and scale. Pointer handling depends on
//! the interaction mode: in pan mode drags pan and clicks re-center, in
//! select mode drags draw the selection square.

use crate::{
    components::{Component, InteractionMode},
    core::{
        config::{FrameTimingConfig, SelectionConfig},
        geo::{Point, Rect, Size},
        store::Store,
        viewport::WorldViewport,
    },
    input::{
        area::{PointerArea, PointerAreas},
        events::Cursor,
    },
    layers::{
        animation::{AnimationSlot, CenteringAnimation},
        manager::LayerRegistry,
    },
    rendering::{
        context::{FrameInfo, RenderContext},
        surface::Raster,
    },
    selection::geometry::{max_side_pixels, SelectionBounds},
    Result,
};
use instant::Duration;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared state the map reads and writes
#[derive(Debug, Clone)]
pub struct WorldMapStores {
    pub viewport: Store<WorldViewport>,
    pub selection: Store<Option<SelectionBounds>>,
    pub mode: Store<InteractionMode>,
    /// World point under the cursor, `None` when off the map
    pub hover: Store<Option<Point>>,
}

impl WorldMapStores {
    pub fn new(viewport: WorldViewport) -> Self {
        Self {
            viewport: Store::provide(viewport),
            selection: Store::provide(None),
            mode: Store::provide(InteractionMode::Pan),
            hover: Store::provide(None),
        }
    }
}

pub struct WorldMap {
    layer: i32,
    sprite: Raster,
    stores: WorldMapStores,
    max_selection_side: f64,
    centering_duration: Duration,
    animation: Rc<RefCell<AnimationSlot>>,
    /// World point a pan-mode click asked to center on
    center_request: Rc<Cell<Option<Point>>>,
    /// Screen position of the pointer during a drag
    drag_cursor: Rc<Cell<Point>>,
    layer_size: Option<Size>,
}

impl WorldMap {
    pub fn new(
        layer: i32,
        sprite: Raster,
        stores: WorldMapStores,
        selection: &SelectionConfig,
        timing: &FrameTimingConfig,
    ) -> Self {
        let max_selection_side = max_side_pixels(sprite.width(), selection);
        Self {
            layer,
            sprite,
            stores,
            max_selection_side,
            centering_duration: Duration::from_millis(timing.centering_duration_ms),
            animation: Rc::new(RefCell::new(AnimationSlot::new())),
            center_request: Rc::new(Cell::new(None)),
            drag_cursor: Rc::new(Cell::new(Point::default())),
            layer_size: None,
        }
    }

    pub fn stores(&self) -> &WorldMapStores {
        &self.stores
    }

    pub fn is_animating(&self) -> bool {
        self.animation.borrow().is_running()
    }

    fn sprite_world(viewport: &WorldViewport, screen: Point) -> Option<Point> {
        let world = viewport.screen_to_world(screen);
        let sprite = viewport.sprite_size();
        let inside = world.x >= 0.0
            && world.y >= 0.0
            && world.x < sprite.width as f64
            && world.y < sprite.height as f64;
        inside.then_some(world)
    }

    fn apply_animation(&mut self, frame: &FrameInfo) {
        if let Some(world) = self.center_request.take() {
            let (from, to) = self
                .stores
                .viewport
                .with(|viewport| (viewport.offset(), viewport.centering_offset(world)));
            log::debug!("centering on world ({:.1}, {:.1})", world.x, world.y);
            self.animation
                .borrow_mut()
                .start(CenteringAnimation::new(from, to, frame.now, self.centering_duration));
        }

        let next = self.animation.borrow_mut().tick(frame.now);
        if let Some(offset) = next {
            self.stores.viewport.update(|viewport| viewport.set_offset(offset));
        }
    }
}

impl Component for WorldMap {
    fn name(&self) -> &str {
        "world-map"
    }

    fn layer(&self) -> i32 {
        self.layer
    }

    fn update(&mut self, layers: &mut LayerRegistry, frame: &FrameInfo) -> Result<()> {
        if self.stores.viewport.with(|v| v.viewport_size()) != frame.resolution {
            let resolution = frame.resolution;
            self.stores
                .viewport
                .update(|viewport| viewport.set_viewport_size(resolution));
        }

        self.apply_animation(frame);

        let sprite_size = self.sprite.size();
        if self.layer_size != Some(sprite_size) {
            layers.set_layer_size(self.layer, sprite_size)?;
            self.layer_size = Some(sprite_size);
        }

        let (zoom, offset) = self.stores.viewport.with(|v| (v.zoom(), v.offset()));
        layers.set_layer_scale(self.layer, zoom)?;
        layers.set_layer_position(self.layer, offset.x, offset.y)
    }

    fn pointer_areas(&mut self, areas: &mut PointerAreas, frame: &FrameInfo) {
        let mode = self.stores.mode.get();
        let bounds = Rect::new(0.0, 0.0, frame.resolution.width as f64, frame.resolution.height as f64);
        let cursor = match mode {
            InteractionMode::Pan => Cursor::Grab,
            InteractionMode::Select => Cursor::Crosshair,
        };

        let (start_stores, start_cursor, start_animation) =
            (self.stores.clone(), self.drag_cursor.clone(), self.animation.clone());
        let (drag_stores, drag_cursor) = (self.stores.clone(), self.drag_cursor.clone());
        let max_side = self.max_selection_side;
        let (click_stores, center_request) = (self.stores.clone(), self.center_request.clone());
        let (scroll_stores, scroll_animation) = (self.stores.clone(), self.animation.clone());
        let hover_stores = self.stores.clone();

        areas.register(
            PointerArea::new(bounds, self.layer)
                .cursor(cursor)
                .on_drag_start(move |position| {
                    start_cursor.set(position);
                    match mode {
                        InteractionMode::Pan => start_animation.borrow_mut().cancel_any(),
                        InteractionMode::Select => {
                            let start = start_stores.viewport.with(|viewport| {
                                let world = viewport.screen_to_world(position);
                                let sprite = viewport.sprite_size();
                                Point::new(
                                    world.x.clamp(0.0, sprite.width as f64),
                                    world.y.clamp(0.0, sprite.height as f64),
                                )
                            });
                            start_stores.selection.set(Some(SelectionBounds::at(start)));
                        }
                    }
                })
                .on_drag(move |dx, dy| {
                    let position = drag_cursor.get().add(&Point::new(dx, dy));
                    drag_cursor.set(position);
                    match mode {
                        InteractionMode::Pan => {
                            drag_stores.viewport.update(|viewport| {
                                viewport.pan_by(dx, dy);
                            });
                        }
                        InteractionMode::Select => {
                            let world = drag_stores.viewport.with(|viewport| viewport.screen_to_world(position));
                            drag_stores.selection.update(|selection| {
                                if let Some(bounds) = selection {
                                    bounds.drag_to(world, max_side);
                                }
                            });
                        }
                    }
                })
                .on_drag_end(move || log::debug!("world map drag ended ({:?})", mode))
                .on_click(move |position| match mode {
                    InteractionMode::Pan => {
                        let world = click_stores
                            .viewport
                            .with(|viewport| Self::sprite_world(viewport, position));
                        center_request.set(world);
                    }
                    InteractionMode::Select => click_stores.selection.set(None),
                })
                .on_scroll(move |event| {
                    scroll_animation.borrow_mut().cancel_any();
                    scroll_stores.viewport.update(|viewport| {
                        viewport.zoom_at(event.position, event.delta_y);
                    });
                })
                .on_hover(move |position| {
                    let world = hover_stores
                        .viewport
                        .with(|viewport| Self::sprite_world(viewport, position));
                    if hover_stores.hover.get() != world {
                        hover_stores.hover.set(world);
                    }
                }),
        );
    }

    fn render(&mut self, context: &mut RenderContext<'_>) -> Result<()> {
        if self.sprite.width() == 0 || self.sprite.height() == 0 {
            return Ok(());
        }
        context.draw_image(&self.sprite, Point::new(0.0, 0.0));
        Ok(())
    }
}
