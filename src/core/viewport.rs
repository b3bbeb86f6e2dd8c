//! Pan and zoom state of the world map, and the screen/world mapping.
//!
//! The map's on-screen placement comes from [`centered_origin`], the same
//! function the compositor uses to place the map layer, so a world point
//! computed here always lands on the pixel that is actually drawn there.

use crate::{
    core::{
        config::ZoomConfig,
        geo::{Point, Size},
    },
    layers::layer::centered_origin,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldViewport {
    zoom: f64,
    offset: Point,
    sprite: Size,
    viewport: Size,
    config: ZoomConfig,
}

impl WorldViewport {
    /// Starts at the minimum zoom, centered
    pub fn new(sprite: Size, viewport: Size, config: ZoomConfig) -> Self {
        let mut state = Self {
            zoom: 1.0,
            offset: Point::default(),
            sprite,
            viewport,
            config,
        };
        state.zoom = state.min_zoom();
        state
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn sprite_size(&self) -> Size {
        self.sprite
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    pub fn max_zoom(&self) -> f64 {
        self.config.max_zoom
    }

    /// The larger of the breakpoint minimum and the zoom at which the map
    /// covers the viewport on both axes, capped at the maximum
    pub fn min_zoom(&self) -> f64 {
        let breakpoint = self.config.breakpoint_zoom(self.viewport.width);
        let cover = if self.sprite.is_empty() {
            0.0
        } else {
            (self.viewport.width as f64 / self.sprite.width as f64)
                .max(self.viewport.height as f64 / self.sprite.height as f64)
        };
        breakpoint.max(cover).min(self.config.max_zoom)
    }

    /// Largest `|offset|` per axis that keeps the scaled map over the viewport
    pub fn offset_limit(&self) -> Point {
        let limit = |sprite: u32, viewport: u32| {
            let excess = sprite as f64 * self.zoom - viewport as f64;
            (excess / 2.0).max(0.0)
        };
        Point::new(
            limit(self.sprite.width, self.viewport.width),
            limit(self.sprite.height, self.viewport.height),
        )
    }

    fn clamp(&mut self) {
        self.zoom = self.zoom.clamp(self.min_zoom(), self.config.max_zoom);
        let limit = self.offset_limit();
        self.offset = Point::new(
            self.offset.x.clamp(-limit.x, limit.x),
            self.offset.y.clamp(-limit.y, limit.y),
        );
    }

    /// Screen position of the sprite's top-left corner
    pub fn map_top_left(&self) -> Point {
        centered_origin(self.viewport, self.sprite, self.zoom, self.offset)
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        screen.subtract(&self.map_top_left()).multiply(1.0 / self.zoom)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.map_top_left().add(&world.multiply(self.zoom))
    }

    /// Offset that puts the sprite's top-left corner at `top_left` for a
    /// given zoom
    fn offset_for(&self, top_left: Point, zoom: f64) -> Point {
        let centered = centered_origin(self.viewport, self.sprite, zoom, Point::default());
        top_left.subtract(&centered)
    }

    /// Zooms one step around `cursor`, keeping the world point under it
    /// fixed. Negative `delta_y` zooms in. Returns whether anything changed.
    pub fn zoom_at(&mut self, cursor: Point, delta_y: f64) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let step = self.config.zoom_step;
        let target = if delta_y < 0.0 { self.zoom * step } else { self.zoom / step };
        self.zoom_to(cursor, target)
    }

    /// Sets the zoom to `target` (clamped), anchored at `cursor`
    pub fn zoom_to(&mut self, cursor: Point, target: f64) -> bool {
        let before = (self.zoom, self.offset);
        let world = self.screen_to_world(cursor);
        let zoom = target.clamp(self.min_zoom(), self.config.max_zoom);

        self.offset = self.offset_for(cursor.subtract(&world.multiply(zoom)), zoom);
        self.zoom = zoom;
        self.clamp();
        (self.zoom, self.offset) != before
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        let before = self.offset;
        self.offset = self.offset.add(&Point::new(dx, dy));
        self.clamp();
        self.offset != before
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
        self.clamp();
    }

    /// Offset that centers `world` in the viewport, after clamping
    pub fn centering_offset(&self, world: Point) -> Point {
        let center = self.viewport.as_point().multiply(0.5);
        let target = self.offset_for(center.subtract(&world.multiply(self.zoom)), self.zoom);
        let limit = self.offset_limit();
        Point::new(
            target.x.clamp(-limit.x, limit.x),
            target.y.clamp(-limit.y, limit.y),
        )
    }

    /// Applies a new viewport size; zoom and offset are re-clamped
    pub fn set_viewport_size(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.clamp();
    }

    pub fn set_sprite_size(&mut self, sprite: Size) {
        self.sprite = sprite;
        self.clamp();
    }
}
