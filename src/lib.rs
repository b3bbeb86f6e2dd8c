//! # Pixelmap
//!
//! Core of a pixel-art world map viewer: a layered raster compositor, a
//! pointer dispatcher that tells clicks from drags, a zoomable world
//! viewport, and skewed-square selection with height-map export.
//!
//! Rendering is software-only and single-threaded. The browser target lives
//! behind the `wasm` feature; everything else runs headless.

pub mod components;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod selection;
#[cfg(feature = "wasm")]
pub mod web;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    canvas::{HeadlessTarget, RenderTarget},
    config::{ViewerOptions, ViewerProfile},
    engine::{Engine, EngineState},
    geo::{Point, Rect, Size},
    store::Store,
    viewport::WorldViewport,
};

pub use crate::components::{Component, InteractionMode, SelectionOverlay, WorldMap, WorldMapStores, ZoneReadout};

pub use crate::input::{dispatcher::PointerDispatcher, events::PointerEvent};

pub use crate::layers::{compositor::Compositor, manager::LayerRegistry};

pub use crate::rendering::{context::RenderContext, surface::Raster};

pub use crate::selection::{ExportSettings, HeightmapExporter, SelectionBounds};

pub use crate::data::{load_bundle, AssetManifest, AssetSource, MapAssets, ZoneIndex};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("2D rendering context unavailable")]
    ContextUnavailable,

    #[error("{0} used before initialization")]
    NotInitialized(&'static str),

    #[error("cannot {op} while {from}")]
    InvalidState { from: &'static str, op: &'static str },

    #[error("failed to load asset {path}: {reason}")]
    Asset { path: String, reason: String },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` for native debugging sessions. Safe to call more than
/// once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("pixelmap=debug"))
        .is_test(cfg!(test))
        .try_init();
}
