//! Unskewed height-map export.
//!
//! The skewed selection quad is mapped onto a square output image with one
//! affine transform: translate the quad's top-left to the origin, shear the
//! skew away, then scale to the output resolution. Every output pixel is
//! sampled through the inverse of that transform.

use crate::{
    core::{config::ExportSampling, geo::Size},
    selection::geometry::SelectionBounds,
    MapError, Result,
};
use image::{codecs::png::PngEncoder, ColorType, GrayImage, ImageEncoder, Luma};
use nalgebra::{Matrix3, Point2, Vector2};
use std::collections::BTreeSet;

/// `heightmap-{n}x{n}.png`
pub fn export_file_name(resolution: u32) -> String {
    format!("heightmap-{resolution}x{resolution}.png")
}

/// A finished export ready to be written or downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct HeightmapPng {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(image.as_raw(), image.width(), image.height(), ColorType::L8)?;
    Ok(bytes)
}

/// Samples a grayscale height map under a skewed selection
pub struct HeightmapExporter<'a> {
    heightmap: &'a GrayImage,
    sprite: Size,
    skew_tan: f64,
}

impl<'a> HeightmapExporter<'a> {
    /// `sprite` is the display map's size; selections are in its pixel space
    /// and are rescaled to the height map's resolution
    pub fn new(heightmap: &'a GrayImage, sprite: Size, skew_tan: f64) -> Self {
        Self {
            heightmap,
            sprite,
            skew_tan,
        }
    }

    /// Height-map pixels per sprite pixel
    pub fn heightmap_scale(&self) -> f64 {
        if self.sprite.width == 0 {
            return 1.0;
        }
        self.heightmap.width() as f64 / self.sprite.width as f64
    }

    /// Forward transform from height-map pixels to output pixels
    pub fn transform(&self, bounds: &SelectionBounds, resolution: u32) -> Result<Matrix3<f64>> {
        if bounds.is_empty() {
            return Err(MapError::InvalidSelection("selection has zero size".to_string()));
        }
        if resolution == 0 {
            return Err(MapError::InvalidSelection("output resolution is zero".to_string()));
        }

        let scale = self.heightmap_scale();
        let square = bounds.normalized();
        let side = square.width * scale;
        let origin = Vector2::new(square.x * scale, square.y * scale);

        let translate = Matrix3::new_translation(&-origin);
        #[rustfmt::skip]
        let unshear = Matrix3::new(
            1.0, -self.skew_tan, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        );
        let fit_scale = resolution as f64 / side;
        let fit = Matrix3::new_nonuniform_scaling(&Vector2::new(fit_scale, fit_scale));

        Ok(fit * unshear * translate)
    }

    pub fn export(&self, bounds: &SelectionBounds, resolution: u32, sampling: ExportSampling) -> Result<GrayImage> {
        let forward = self.transform(bounds, resolution)?;
        let inverse = forward
            .try_inverse()
            .ok_or_else(|| MapError::InvalidSelection("selection transform is singular".to_string()))?;

        log::info!(
            "exporting {}x{} heightmap ({:?}) from selection side {:.1}",
            resolution,
            resolution,
            sampling,
            bounds.side()
        );

        let image = match sampling {
            ExportSampling::Nearest => self.render(&inverse, resolution, |x, y| self.nearest(x, y)),
            ExportSampling::Bilinear => self.render(&inverse, resolution, |x, y| self.bilinear(x, y).round() as u8),
            ExportSampling::Quantized => {
                let levels: BTreeSet<u8> = self
                    .render(&inverse, resolution, |x, y| self.nearest(x, y))
                    .pixels()
                    .map(|pixel| pixel.0[0])
                    .collect();
                self.render(&inverse, resolution, |x, y| snap_to_level(&levels, self.bilinear(x, y)))
            }
        };
        Ok(image)
    }

    pub fn export_png(&self, bounds: &SelectionBounds, resolution: u32, sampling: ExportSampling) -> Result<HeightmapPng> {
        let image = self.export(bounds, resolution, sampling)?;
        Ok(HeightmapPng {
            file_name: export_file_name(resolution),
            bytes: encode_png(&image)?,
        })
    }

    fn render(&self, inverse: &Matrix3<f64>, resolution: u32, sample: impl Fn(f64, f64) -> u8) -> GrayImage {
        GrayImage::from_fn(resolution, resolution, |x, y| {
            let source = inverse.transform_point(&Point2::new(x as f64 + 0.5, y as f64 + 0.5));
            Luma([sample(source.x, source.y)])
        })
    }

    /// Elevation at integer pixel; outside the map reads as 0
    fn value(&self, x: i64, y: i64) -> f64 {
        if x < 0 || y < 0 || x >= self.heightmap.width() as i64 || y >= self.heightmap.height() as i64 {
            return 0.0;
        }
        self.heightmap.get_pixel(x as u32, y as u32).0[0] as f64
    }

    fn nearest(&self, x: f64, y: f64) -> u8 {
        self.value(x.floor() as i64, y.floor() as i64) as u8
    }

    fn bilinear(&self, x: f64, y: f64) -> f64 {
        // Pixel centres sit at half-integers
        let x = x - 0.5;
        let y = y - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self.value(x0, y0) * (1.0 - fx) + self.value(x0 + 1, y0) * fx;
        let bottom = self.value(x0, y0 + 1) * (1.0 - fx) + self.value(x0 + 1, y0 + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Closest discrete level to `value`; ties go to the lower level
fn snap_to_level(levels: &BTreeSet<u8>, value: f64) -> u8 {
    let clamped = value.round().clamp(0.0, 255.0) as u8;
    let below = levels.range(..=clamped).next_back();
    let above = levels.range(clamped..).next();
    match (below, above) {
        (Some(b), Some(a)) => {
            if (value - *b as f64).abs() <= (*a as f64 - value).abs() {
                *b
            } else {
                *a
            }
        }
        (Some(level), None) | (None, Some(level)) => *level,
        (None, None) => clamped,
    }
}
