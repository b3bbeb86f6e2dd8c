use image::{GrayImage, Luma, Rgba, RgbaImage};
use instant::{Duration, Instant};
use pixelmap::{
    components::{Component, InteractionMode, SelectionOverlay, WorldMap, WorldMapStores, ZoneReadout},
    core::{
        canvas::HeadlessTarget,
        config::{ExportSampling, ViewerOptions, ZoomConfig},
        engine::{Engine, EngineState},
        geo::{Point, Rect, Size},
        viewport::WorldViewport,
    },
    data::{load_bundle, AssetManifest, MemorySource, ZoneIndex},
    input::{
        area::{PointerArea, PointerAreas},
        events::{Cursor, EventHandled, PointerEvent},
    },
    rendering::{
        blend::BlendMode,
        context::{FrameInfo, RenderContext},
        surface::Raster,
    },
    selection::{heightmap::HeightmapExporter, settings::ExportSettings},
    MapError,
};
use std::{cell::Cell, io::Cursor as IoCursor, rc::Rc};

// Integration tests driving the engine the way the browser loop does:
// start, render a frame so pointer areas exist, feed events, render again.

const SPRITE: Size = Size {
    width: 2176,
    height: 1152,
};
const SCREEN: Size = Size {
    width: 1280,
    height: 800,
};
const LAND: Rgba<u8> = Rgba([90, 140, 60, 255]);

fn headless_engine() -> Engine<HeadlessTarget> {
    let mut engine = Engine::new(HeadlessTarget::new(SCREEN.width, SCREEN.height), ViewerOptions::default());
    engine.setup().unwrap();
    engine.start().unwrap();
    engine
}

fn stores() -> WorldMapStores {
    WorldMapStores::new(WorldViewport::new(SPRITE, SCREEN, ZoomConfig::default()))
}

fn world_map(engine: &Engine<HeadlessTarget>, stores: &WorldMapStores) -> WorldMap {
    let options = engine.options();
    WorldMap::new(
        1,
        Raster::new_filled(SPRITE.width, SPRITE.height, LAND),
        stores.clone(),
        &options.selection,
        &options.framerate,
    )
}

fn drag(engine: &mut Engine<HeadlessTarget>, from: Point, to: Point) {
    engine.handle_event(PointerEvent::Down { position: from });
    engine.handle_event(PointerEvent::Move { position: to });
    engine.handle_event(PointerEvent::Up { position: to });
}

/// Opaque rectangle with a pointer area over the same pixels
struct Tile {
    layer: i32,
    rect: Rect,
    color: Rgba<u8>,
    clicks: Rc<Cell<u32>>,
    drags: Rc<Cell<u32>>,
}

impl Tile {
    fn new(layer: i32, rect: Rect, color: Rgba<u8>) -> Self {
        Self {
            layer,
            rect,
            color,
            clicks: Rc::new(Cell::new(0)),
            drags: Rc::new(Cell::new(0)),
        }
    }
}

impl Component for Tile {
    fn name(&self) -> &str {
        "tile"
    }

    fn layer(&self) -> i32 {
        self.layer
    }

    fn pointer_areas(&mut self, areas: &mut PointerAreas, _frame: &FrameInfo) {
        let clicks = self.clicks.clone();
        let drags = self.drags.clone();
        areas.register(
            PointerArea::new(self.rect, self.layer)
                .cursor(Cursor::Pointer)
                .on_click(move |_| clicks.set(clicks.get() + 1))
                .on_drag_start(move |_| drags.set(drags.get() + 1)),
        );
    }

    fn render(&mut self, context: &mut RenderContext<'_>) -> pixelmap::Result<()> {
        context.fill_rect(self.rect, self.color, BlendMode::SourceOver);
        Ok(())
    }
}

#[test]
fn test_missing_context_blocks_startup() {
    let mut engine = Engine::new(HeadlessTarget::without_context(640, 480), ViewerOptions::default());
    assert!(matches!(engine.setup(), Err(MapError::ContextUnavailable)));
    assert!(matches!(engine.start(), Err(MapError::NotInitialized(_))));
}

#[test]
fn test_stopped_engine_ignores_input_and_frames() {
    let mut engine = headless_engine();
    let tile = Tile::new(0, Rect::new(0.0, 0.0, 100.0, 100.0), LAND);
    let clicks = tile.clicks.clone();
    engine.register_component(Box::new(tile));
    engine.render_frame(Instant::now()).unwrap();

    assert!(engine.stop().unwrap());
    assert_eq!(engine.state(), EngineState::Stopped);
    let handled = engine.handle_event(PointerEvent::Down {
        position: Point::new(10.0, 10.0),
    });
    assert_eq!(handled, EventHandled::NotHandled);
    assert!(engine.render_frame(Instant::now()).unwrap().is_none());

    assert!(engine.start().unwrap());
    engine.handle_event(PointerEvent::Down {
        position: Point::new(10.0, 10.0),
    });
    engine.handle_event(PointerEvent::Up {
        position: Point::new(10.0, 10.0),
    });
    assert_eq!(clicks.get(), 1);
}

#[test]
fn test_layers_composite_in_ascending_order() {
    let mut engine = headless_engine();
    let red = Rgba([200, 30, 30, 255]);
    let blue = Rgba([30, 30, 200, 255]);
    // Registered top layer first; paint order must still follow layer ids
    engine.register_component(Box::new(Tile::new(5, Rect::new(50.0, 50.0, 100.0, 100.0), red)));
    engine.register_component(Box::new(Tile::new(2, Rect::new(0.0, 0.0, 100.0, 100.0), blue)));

    let stats = engine.render_frame(Instant::now()).unwrap().unwrap();
    assert_eq!(stats.layers_composited, 2);
    assert_eq!(engine.layers().ids(), &[2, 5]);

    let frame = engine.target().last_frame().unwrap();
    assert_eq!(frame.get_pixel(75, 75), Some(red));
    assert_eq!(frame.get_pixel(25, 25), Some(blue));
}

#[test]
fn test_topmost_area_receives_click_and_drag_suppresses_click() {
    let mut engine = headless_engine();
    let low = Tile::new(0, Rect::new(0.0, 0.0, 200.0, 200.0), LAND);
    let high = Tile::new(5, Rect::new(100.0, 100.0, 200.0, 200.0), LAND);
    let (low_clicks, high_clicks, high_drags) = (low.clicks.clone(), high.clicks.clone(), high.drags.clone());
    engine.register_component(Box::new(high));
    engine.register_component(Box::new(low));
    engine.render_frame(Instant::now()).unwrap();

    let overlap = Point::new(150.0, 150.0);
    engine.handle_event(PointerEvent::Down { position: overlap });
    engine.handle_event(PointerEvent::Up { position: overlap });
    assert_eq!((low_clicks.get(), high_clicks.get()), (0, 1));
    assert_eq!(engine.target().cursor(), Cursor::Pointer);

    drag(&mut engine, overlap, Point::new(170.0, 150.0));
    assert_eq!(high_drags.get(), 1);
    assert_eq!(high_clicks.get(), 1);
}

#[test]
fn test_wheel_at_center_zooms_without_shifting() {
    let mut engine = headless_engine();
    let stores = stores();
    let center = Point::new(640.0, 400.0);
    stores.viewport.update(|viewport| {
        viewport.zoom_to(center, 2.5);
    });
    engine.register_component(Box::new(world_map(&engine, &stores)));
    engine.render_frame(Instant::now()).unwrap();

    let handled = engine.handle_event(PointerEvent::Wheel {
        position: center,
        delta_y: -10.0,
    });
    assert!(handled.is_handled());

    let viewport = stores.viewport.get();
    assert!((viewport.zoom() - 2.75).abs() < 1e-9);
    assert!(viewport.offset().x.abs() < 1e-6);
    assert!(viewport.offset().y.abs() < 1e-6);

    engine.render_frame(Instant::now()).unwrap();
    let layer = engine.layers().get_layer(1).unwrap();
    assert!((layer.scale() - 2.75).abs() < 1e-9);
    assert_eq!(engine.target().last_frame().unwrap().get_pixel(640, 400), Some(LAND));
}

#[test]
fn test_pan_drag_is_clamped_to_map_edges() {
    let mut engine = headless_engine();
    let stores = stores();
    engine.register_component(Box::new(world_map(&engine, &stores)));
    engine.render_frame(Instant::now()).unwrap();

    drag(&mut engine, Point::new(100.0, 100.0), Point::new(1200.0, 700.0));
    drag(&mut engine, Point::new(100.0, 100.0), Point::new(1200.0, 700.0));

    let viewport = stores.viewport.get();
    let limit = viewport.offset_limit();
    assert_eq!(viewport.offset(), Point::new(limit.x, limit.y));
}

#[test]
fn test_selection_drag_overlay_and_export() {
    let mut engine = headless_engine();
    let stores = stores();
    stores.mode.set(InteractionMode::Select);
    engine.register_component(Box::new(world_map(&engine, &stores)));
    let overlay = SelectionOverlay::new(2, stores.clone(), &engine.options().selection, engine.dirty_handle());
    engine.register_component(Box::new(overlay));
    engine.render_frame(Instant::now()).unwrap();
    assert_eq!(engine.target().cursor(), Cursor::Default);

    drag(&mut engine, Point::new(600.0, 400.0), Point::new(700.0, 420.0));
    let bounds = stores.selection.get().unwrap();
    assert!((bounds.side() - 50.0).abs() < 1e-9);
    assert_eq!(bounds.start(), Point::new(1068.0, 576.0));

    engine.render_frame(Instant::now()).unwrap();
    let dim_alpha = engine.options().selection.dim_alpha;
    let overlay_layer = engine.layers().get_layer(2).unwrap();
    assert_eq!(overlay_layer.size(), SCREEN);
    assert_eq!(overlay_layer.raster().get_pixel(0, 0).unwrap().0[3], dim_alpha);

    let heightmap = GrayImage::from_pixel(SPRITE.width / 2, SPRITE.height / 2, Luma([77]));
    let exporter = HeightmapExporter::new(&heightmap, SPRITE, engine.options().selection.skew_tan());
    let mut settings = ExportSettings::from_config(&engine.options().export);
    settings.step_down();
    settings.step_down();
    settings.sampling = ExportSampling::Nearest;

    let png = exporter
        .export_png(&bounds, settings.resolution(), settings.sampling)
        .unwrap();
    assert_eq!(png.file_name, "heightmap-128x128.png");
    let decoded = image::load_from_memory(&png.bytes).unwrap().to_luma8();
    assert_eq!(decoded.dimensions(), (128, 128));
    assert!(decoded.pixels().all(|p| p.0[0] == 77));
}

#[test]
fn test_hover_publishes_zone_after_debounce() {
    let mut engine = headless_engine();
    let stores = stores();
    engine.register_component(Box::new(world_map(&engine, &stores)));

    let mut zone_image = Raster::new(4, 2);
    zone_image.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Rgba([255, 0, 0, 255]), BlendMode::SourceOver);
    zone_image.fill_rect(Rect::new(2.0, 0.0, 2.0, 2.0), Rgba([0, 0, 255, 255]), BlendMode::SourceOver);
    let zones = ZoneIndex::from_json_str(r##"{"#FF0000": "Emberfield", "#0000ff": "Tidemark"}"##).unwrap();
    let readout = ZoneReadout::new(
        4,
        zone_image,
        SPRITE,
        zones,
        stores.hover.clone(),
        engine.options().framerate.zone_debounce_ms,
    );
    let zone_name = readout.zone_name();
    engine.register_component(Box::new(readout));

    let start = Instant::now();
    engine.render_frame(start).unwrap();
    engine.handle_event(PointerEvent::Move {
        position: Point::new(640.0, 400.0),
    });
    assert_eq!(stores.hover.get(), Some(Point::new(1088.0, 576.0)));

    engine.render_frame(start + Duration::from_millis(10)).unwrap();
    assert_eq!(zone_name.get(), None);
    engine.render_frame(start + Duration::from_millis(500)).unwrap();
    assert_eq!(zone_name.get().as_deref(), Some("Tidemark"));
}

fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut IoCursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn memory_bundle() -> MemorySource {
    let sprite = RgbaImage::from_pixel(64, 32, LAND);
    let zones = RgbaImage::from_pixel(32, 16, Rgba([0, 0, 255, 255]));
    let heightmap = GrayImage::from_pixel(64, 32, Luma([40]));
    MemorySource::new()
        .with_file("map.png", png_bytes(&sprite))
        .with_file("zones.png", png_bytes(&zones))
        .with_file("zones.json", br##"{"#0000ff": "Tidemark"}"##.to_vec())
        .with_file("heightmap.png", pixelmap::selection::encode_png(&heightmap).unwrap())
}

#[tokio::test]
async fn test_bundle_loads_into_viewer() {
    let assets = load_bundle(&memory_bundle(), &AssetManifest::default()).await.unwrap();
    assert_eq!(assets.sprite_size(), Size::new(64, 32));
    assert_eq!(assets.zones.len(), 1);

    let mut engine = Engine::new(HeadlessTarget::new(64, 32), ViewerOptions::default());
    engine.setup().unwrap();
    engine.start().unwrap();
    let stores = WorldMapStores::new(WorldViewport::new(
        assets.sprite_size(),
        Size::new(64, 32),
        engine.options().zoom.clone(),
    ));
    let options = engine.options().clone();
    engine.register_component(Box::new(WorldMap::new(
        1,
        assets.sprite.clone(),
        stores.clone(),
        &options.selection,
        &options.framerate,
    )));
    engine.render_frame(Instant::now()).unwrap();

    assert_eq!(engine.target().last_frame().unwrap().get_pixel(32, 16), Some(LAND));
}

#[tokio::test]
async fn test_missing_asset_fails_bundle() {
    let mut source = memory_bundle();
    source.insert("zones.json", b"not json".to_vec());
    let err = load_bundle(&source, &AssetManifest::default()).await.unwrap_err();
    assert!(matches!(err, MapError::Asset { ref path, .. } if path == "zones.json"));

    let manifest = AssetManifest {
        heightmap: "missing.png".to_string(),
        ..AssetManifest::default()
    };
    assert!(load_bundle(&memory_bundle(), &manifest).await.is_err());
}
