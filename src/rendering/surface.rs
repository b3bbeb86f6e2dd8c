use crate::{
    core::geo::{Rect, Size},
    rendering::blend::BlendMode,
};
use image::{Rgba, RgbaImage};

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An RGBA raster surface.
///
/// Used for the visible main surface, every layer's offscreen target and the
/// loaded sprites. All drawing coordinates are integer pixels; callers round
/// before drawing so pixel-art edges stay crisp.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Creates a fully transparent raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn new_filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Reallocates the raster; previous contents are discarded
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    pub fn clear(&mut self) {
        self.fill(TRANSPARENT);
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    pub fn get_pixel(&self, x: i64, y: i64) -> Option<Rgba<u8>> {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return None;
        }
        Some(*self.image.get_pixel(x as u32, y as u32))
    }

    pub fn put_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, color);
    }

    /// Composites one pixel; out-of-bounds writes are dropped
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>, mode: BlendMode) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        mode.apply(dst, color, 1.0);
    }

    /// Fills a rectangle; edges are rounded to whole pixels
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>, mode: BlendMode) {
        let x0 = rect.x.round().max(0.0) as i64;
        let y0 = rect.y.round().max(0.0) as i64;
        let x1 = ((rect.x + rect.width).round() as i64).min(self.width() as i64);
        let y1 = ((rect.y + rect.height).round() as i64).min(self.height() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color, mode);
            }
        }
    }

    /// Draws `src` into the destination rectangle `(dx, dy, dw, dh)`.
    ///
    /// Scaling is nearest-neighbour so sprite pixels stay square at any zoom.
    /// When the destination size equals the source size this is a plain blit.
    pub fn draw_raster(
        &mut self,
        src: &Raster,
        dx: i64,
        dy: i64,
        dw: u32,
        dh: u32,
        opacity: f32,
        mode: BlendMode,
    ) {
        if dw == 0 || dh == 0 || src.width() == 0 || src.height() == 0 || opacity <= 0.0 {
            return;
        }

        let x_start = dx.max(0);
        let y_start = dy.max(0);
        let x_end = (dx + dw as i64).min(self.width() as i64);
        let y_end = (dy + dh as i64).min(self.height() as i64);
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        let unscaled = dw == src.width() && dh == src.height();
        let x_ratio = src.width() as f64 / dw as f64;
        let y_ratio = src.height() as f64 / dh as f64;

        for y in y_start..y_end {
            let local_y = (y - dy) as u32;
            let sy = if unscaled {
                local_y
            } else {
                (((local_y as f64 + 0.5) * y_ratio) as u32).min(src.height() - 1)
            };
            for x in x_start..x_end {
                let local_x = (x - dx) as u32;
                let sx = if unscaled {
                    local_x
                } else {
                    (((local_x as f64 + 0.5) * x_ratio) as u32).min(src.width() - 1)
                };
                let color = *src.image.get_pixel(sx, sy);
                let dst = self.image.get_pixel_mut(x as u32, y as u32);
                mode.apply(dst, color, opacity);
            }
        }
    }
}
