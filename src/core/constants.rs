//! Core constants for the pixel map viewer.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.
//! Most of them are only defaults; `ViewerOptions` can override them at runtime.

/// Pointer displacement (in pixels, per axis) before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 2.0;

/// Multiplicative zoom change for one wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

/// Upper zoom bound, independent of viewport size.
pub const MAX_ZOOM: f64 = 8.0;

/// Minimum zoom per viewport width: `(min_width, min_zoom)`, ascending by width.
/// The last entry whose width does not exceed the viewport wins.
pub const ZOOM_BREAKPOINTS: [(u32, f64); 5] = [
    (0, 1.0),
    (640, 1.5),
    (1024, 2.0),
    (1600, 2.5),
    (2560, 3.0),
];

/// Synthetic wheel delta produced per unit of pinch scale change.
pub const PINCH_DELTA_SCALE: f64 = 100.0;

/// Horizontal shear applied to the on-screen selection, in degrees.
pub const SELECTION_SKEW_DEGREES: f64 = -30.0;

/// Earth's equatorial circumference; the map sprite spans it horizontally.
pub const EQUATORIAL_CIRCUMFERENCE_KM: f64 = 40_075.0;

/// Largest real-world area a selection may cover.
pub const MAX_SELECTION_AREA_KM2: f64 = 1_000_000.0;

/// Dashed outline pattern, in screen pixels.
pub const DASH_LENGTH: u32 = 4;
pub const GAP_LENGTH: u32 = 3;

/// Alpha of the darkened region outside an active selection.
pub const SELECTION_DIM_ALPHA: u8 = 140;

/// Default square output size of a height-map export.
pub const DEFAULT_EXPORT_RESOLUTION: u32 = 512;

/// Output sizes offered by the resolution stepper.
pub const EXPORT_RESOLUTION_STEPS: [u32; 5] = [128, 256, 512, 1024, 2048];

/// Delay before a hovered zone name is published.
pub const ZONE_DEBOUNCE_MS: u64 = 120;

/// Duration of the click-to-center pan animation.
pub const CENTERING_DURATION_MS: u64 = 300;

/// Main surface clear colour (RGBA).
pub const BACKGROUND_COLOR: [u8; 4] = [16, 20, 28, 255];
