//! Prelude module for common pixelmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use pixelmap::prelude::*;`

pub use crate::core::{
    canvas::{HeadlessTarget, RenderTarget, Resolution},
    config::{
        CanvasConfig, ExportConfig, ExportSampling, FrameTimingConfig, InputConfig, SelectionConfig,
        ViewerOptions, ViewerProfile, ZoomConfig,
    },
    engine::{Engine, EngineState},
    geo::{Point, Rect, Size},
    store::{Store, SubscriptionId},
    viewport::WorldViewport,
};

pub use crate::components::{
    Component, ComponentRegistry, InteractionMode, SelectionOverlay, WorldMap, WorldMapStores,
    ZoneReadout,
};

pub use crate::layers::{
    animation::{AnimationSlot, CenteringAnimation},
    compositor::{Compositor, FrameStats},
    layer::Layer,
    manager::{DirtyHandle, LayerRegistry},
};

pub use crate::input::{
    area::{PointerArea, PointerAreas, ScrollEvent},
    dispatcher::PointerDispatcher,
    events::{Cursor, EventHandled, PointerEvent, TouchPhase, TouchPoint},
};

pub use crate::rendering::{
    blend::BlendMode,
    context::{FrameInfo, RenderContext},
    dashed::DashPattern,
    surface::Raster,
};

pub use crate::selection::{
    geometry::{SelectionBounds, SkewQuad},
    heightmap::{HeightmapExporter, HeightmapPng},
    settings::ExportSettings,
};

#[cfg(feature = "tokio-runtime")]
pub use crate::data::assets::FileSource;
pub use crate::data::{
    assets::{load_bundle, AssetManifest, AssetSource, HttpSource, MapAssets, MemorySource},
    zones::{ZoneDebouncer, ZoneIndex},
};

pub use crate::{Error as MapError, Result};

pub use instant::{Duration, Instant};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
