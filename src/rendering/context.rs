use crate::{
    core::{
        canvas::Resolution,
        geo::{Point, Rect},
    },
    rendering::{
        blend::BlendMode,
        dashed::{self, DashPattern},
        surface::Raster,
    },
};
use image::Rgba;
use instant::Instant;

/// Per-frame information shared by every phase of a frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    /// Monotonic frame counter, starting at 1 for the first frame
    pub frame: u64,
    pub now: Instant,
    pub resolution: Resolution,
}

/// Drawing context handed to a component while it renders into its layer.
///
/// Components never touch a layer raster outside of this context.
pub struct RenderContext<'a> {
    raster: &'a mut Raster,
    layer_id: i32,
    frame: FrameInfo,
}

impl<'a> RenderContext<'a> {
    pub fn new(raster: &'a mut Raster, layer_id: i32, frame: FrameInfo) -> Self {
        Self {
            raster,
            layer_id,
            frame,
        }
    }

    pub fn layer_id(&self) -> i32 {
        self.layer_id
    }

    pub fn frame(&self) -> &FrameInfo {
        &self.frame
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &Raster {
        &*self.raster
    }

    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut *self.raster
    }

    pub fn clear(&mut self) {
        self.raster.clear();
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        self.raster.fill(color);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>, mode: BlendMode) {
        self.raster.fill_rect(rect, color, mode);
    }

    /// Draws an image unscaled with its top-left corner at `position`
    pub fn draw_image(&mut self, image: &Raster, position: Point) {
        let position = position.round();
        self.raster.draw_raster(
            image,
            position.x as i64,
            position.y as i64,
            image.width(),
            image.height(),
            1.0,
            BlendMode::SourceOver,
        );
    }

    pub fn fill_polygon(&mut self, points: &[Point], color: Rgba<u8>, mode: BlendMode) {
        dashed::fill_polygon(self.raster, points, color, mode);
    }

    pub fn stroke_dashed_polygon(&mut self, points: &[Point], pattern: DashPattern, color: Rgba<u8>) {
        dashed::draw_dashed_polygon(self.raster, points, pattern, color);
    }
}
