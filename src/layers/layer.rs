use crate::{
    core::geo::{Point, Size},
    rendering::{blend::BlendMode, surface::Raster},
};

/// Screen position of a raster's top-left corner when it is drawn at
/// `scale`, pivoting on the center of `main` and shifted by `offset`.
///
/// The compositor places layers with this and the world viewport maps
/// pointer positions back with it, so the two can never disagree.
pub fn centered_origin(main: Size, raster: Size, scale: f64, offset: Point) -> Point {
    let scaled_width = raster.width as f64 * scale;
    let scaled_height = raster.height as f64 * scale;
    Point::new(
        ((main.width as f64 - scaled_width) / 2.0).round() + offset.x,
        ((main.height as f64 - scaled_height) / 2.0).round() + offset.y,
    )
}

/// An offscreen raster with its own compositing transform
#[derive(Debug, Clone)]
pub struct Layer {
    id: i32,
    raster: Raster,
    /// Content must be re-rendered before the next composite
    pub(crate) dirty: bool,
    /// Transform changed since the last composite
    pub(crate) moved: bool,
    opacity: f32,
    blend_mode: BlendMode,
    scale: f64,
    x: f64,
    y: f64,
    /// Still sized to the viewport; cleared once a size is set explicitly
    pub(crate) follows_viewport: bool,
}

impl Layer {
    pub fn new(id: i32, size: Size) -> Self {
        Self {
            id,
            raster: Raster::new(size.width, size.height),
            dirty: true,
            moved: false,
            opacity: 1.0,
            blend_mode: BlendMode::default(),
            scale: 1.0,
            x: 0.0,
            y: 0.0,
            follows_viewport: true,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub(crate) fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    pub fn size(&self) -> Size {
        self.raster.size()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_moved(&self) -> bool {
        self.moved
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn follows_viewport(&self) -> bool {
        self.follows_viewport
    }

    pub(crate) fn set_scale(&mut self, scale: f64) {
        if self.scale != scale {
            self.scale = scale;
            self.moved = true;
        }
    }

    pub(crate) fn set_position(&mut self, x: f64, y: f64) {
        if self.x != x || self.y != y {
            self.x = x;
            self.y = y;
            self.moved = true;
        }
    }

    /// Reallocates the raster; previous contents are lost
    pub(crate) fn set_size(&mut self, size: Size) {
        self.raster.resize(size.width, size.height);
        self.dirty = true;
    }

    pub(crate) fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.moved = true;
    }

    pub(crate) fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
        self.moved = true;
    }

    /// Top-left corner and drawn size of this layer on a `main` surface
    pub fn placement(&self, main: Size) -> (Point, Size) {
        let origin = centered_origin(main, self.size(), self.scale, self.position()).round();
        let drawn = Size::new(
            (self.raster.width() as f64 * self.scale).round().max(0.0) as u32,
            (self.raster.height() as f64 * self.scale).round().max(0.0) as u32,
        );
        (origin, drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layer_defaults() {
        let layer = Layer::new(3, Size::new(64, 32));
        assert_eq!(layer.id(), 3);
        assert_eq!(layer.size(), Size::new(64, 32));
        assert!(layer.is_dirty());
        assert_eq!(layer.scale(), 1.0);
        assert_eq!(layer.opacity(), 1.0);
        assert_eq!(layer.blend_mode(), BlendMode::SourceOver);
    }

    #[test]
    fn test_viewport_sized_layer_sits_at_offset() {
        let mut layer = Layer::new(0, Size::new(100, 80));
        layer.set_position(7.0, -3.0);
        let (origin, drawn) = layer.placement(Size::new(100, 80));
        assert_eq!(origin, Point::new(7.0, -3.0));
        assert_eq!(drawn, Size::new(100, 80));
    }

    #[test]
    fn test_scaled_layer_pivots_on_center() {
        let mut layer = Layer::new(0, Size::new(100, 50));
        layer.set_scale(2.0);
        assert!(layer.is_moved());
        let (origin, drawn) = layer.placement(Size::new(100, 100));
        assert_eq!(drawn, Size::new(200, 100));
        assert_eq!(origin, Point::new(-50.0, 0.0));
    }

    #[test]
    fn test_centered_origin_rounds_before_offset() {
        let origin = centered_origin(Size::new(1280, 800), Size::new(2176, 1152), 2.75, Point::new(0.5, 0.0));
        assert_eq!(origin.x, ((1280.0 - 2176.0 * 2.75) / 2.0_f64).round() + 0.5);
        assert_eq!(origin.y, ((800.0 - 1152.0 * 2.75) / 2.0_f64).round());
    }

    #[test]
    fn test_set_size_clears_and_dirties() {
        let mut layer = Layer::new(0, Size::new(4, 4));
        layer.dirty = false;
        layer.raster_mut().fill(image::Rgba([255, 0, 0, 255]));
        layer.set_size(Size::new(8, 2));
        assert!(layer.is_dirty());
        assert_eq!(layer.raster().get_pixel(0, 0), Some(image::Rgba([0, 0, 0, 0])));
    }
}
