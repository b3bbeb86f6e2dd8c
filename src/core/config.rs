//! Configuration system for viewer behavior tuning
//!
//! Options are grouped per subsystem. Every group deserializes with
//! `#[serde(default)]`, so a JSON file only needs the fields it overrides.
//! Presets are available through [`ViewerProfile`].

use crate::{core::constants, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerProfile {
    Desktop,
    LowPower,
    Custom(ViewerOptions),
}

impl ViewerProfile {
    pub fn resolve(&self) -> ViewerOptions {
        match self {
            Self::Desktop => ViewerOptions::default(),
            Self::LowPower => ViewerOptions {
                canvas: CanvasConfig {
                    max_width: Some(1280),
                    max_height: Some(800),
                    ..CanvasConfig::default()
                },
                framerate: FrameTimingConfig {
                    always_redraw: false,
                    ..FrameTimingConfig::default()
                },
                export: ExportConfig {
                    sampling: ExportSampling::Nearest,
                    ..ExportConfig::default()
                },
                ..ViewerOptions::default()
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for ViewerProfile {
    fn default() -> Self {
        Self::Desktop
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    pub canvas: CanvasConfig,
    pub zoom: ZoomConfig,
    pub input: InputConfig,
    pub selection: SelectionConfig,
    pub export: ExportConfig,
    pub framerate: FrameTimingConfig,
}

impl ViewerOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Clamp for the device resolution; `None` means follow the window exactly
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub background: [u8; 4],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_width: None,
            max_height: None,
            background: constants::BACKGROUND_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// `(min_viewport_width, min_zoom)` pairs, ascending by width
    pub breakpoints: Vec<(u32, f64)>,
}

impl ZoomConfig {
    /// Minimum zoom the breakpoint table allows for a viewport width
    pub fn breakpoint_zoom(&self, viewport_width: u32) -> f64 {
        self.breakpoints
            .iter()
            .filter(|(width, _)| *width <= viewport_width)
            .map(|(_, zoom)| *zoom)
            .fold(0.0, f64::max)
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            max_zoom: constants::MAX_ZOOM,
            zoom_step: constants::ZOOM_STEP,
            breakpoints: constants::ZOOM_BREAKPOINTS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub drag_threshold: f64,
    pub pinch_delta_scale: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_threshold: constants::DRAG_THRESHOLD,
            pinch_delta_scale: constants::PINCH_DELTA_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub skew_degrees: f64,
    pub max_area_km2: f64,
    pub equator_km: f64,
    pub dash_length: u32,
    pub gap_length: u32,
    pub dim_alpha: u8,
}

impl SelectionConfig {
    pub fn skew_tan(&self) -> f64 {
        self.skew_degrees.to_radians().tan()
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            skew_degrees: constants::SELECTION_SKEW_DEGREES,
            max_area_km2: constants::MAX_SELECTION_AREA_KM2,
            equator_km: constants::EQUATORIAL_CIRCUMFERENCE_KM,
            dash_length: constants::DASH_LENGTH,
            gap_length: constants::GAP_LENGTH,
            dim_alpha: constants::SELECTION_DIM_ALPHA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportSampling {
    Nearest,
    Bilinear,
    /// Bilinear geometry snapped to the elevation levels found by a nearest pass
    Quantized,
}

impl Default for ExportSampling {
    fn default() -> Self {
        Self::Quantized
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub resolution: u32,
    pub resolution_steps: Vec<u32>,
    pub sampling: ExportSampling,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            resolution: constants::DEFAULT_EXPORT_RESOLUTION,
            resolution_steps: constants::EXPORT_RESOLUTION_STEPS.to_vec(),
            sampling: ExportSampling::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTimingConfig {
    /// Re-render every layer each frame instead of only dirty ones
    pub always_redraw: bool,
    pub zone_debounce_ms: u64,
    pub centering_duration_ms: u64,
}

impl Default for FrameTimingConfig {
    fn default() -> Self {
        Self {
            always_redraw: true,
            zone_debounce_ms: constants::ZONE_DEBOUNCE_MS,
            centering_duration_ms: constants::CENTERING_DURATION_MS,
        }
    }
}
