use crate::{
    components::Component,
    core::{
        geo::{Point, Size},
        store::Store,
    },
    data::zones::{ZoneDebouncer, ZoneIndex},
    layers::manager::LayerRegistry,
    rendering::{
        context::{FrameInfo, RenderContext},
        surface::Raster,
    },
    Result,
};
use instant::Duration;

/// Publishes the name of the zone under the cursor.
///
/// Samples the zone image at the hovered world point and pushes the debounced
/// name into `zone_name`. Drawing the name belongs to the UI layer, so the
/// component's own layer stays empty.
pub struct ZoneReadout {
    layer: i32,
    zone_image: Raster,
    sprite_width: u32,
    sprite_height: u32,
    zones: ZoneIndex,
    hover: Store<Option<Point>>,
    zone_name: Store<Option<String>>,
    debouncer: ZoneDebouncer,
}

impl ZoneReadout {
    pub fn new(
        layer: i32,
        zone_image: Raster,
        sprite: Size,
        zones: ZoneIndex,
        hover: Store<Option<Point>>,
        debounce_ms: u64,
    ) -> Self {
        Self {
            layer,
            zone_image,
            sprite_width: sprite.width,
            sprite_height: sprite.height,
            zones,
            hover,
            zone_name: Store::provide(None),
            debouncer: ZoneDebouncer::new(Duration::from_millis(debounce_ms)),
        }
    }

    /// Store receiving the debounced zone name
    pub fn zone_name(&self) -> Store<Option<String>> {
        self.zone_name.clone()
    }

    /// Zone under a world point; the zone image may be a different size than
    /// the sprite
    pub fn zone_at(&self, world: Point) -> Option<&str> {
        if self.sprite_width == 0 || self.sprite_height == 0 {
            return None;
        }
        let x = world.x * self.zone_image.width() as f64 / self.sprite_width as f64;
        let y = world.y * self.zone_image.height() as f64 / self.sprite_height as f64;
        let color = self.zone_image.get_pixel(x.floor() as i64, y.floor() as i64)?;
        self.zones.lookup(color)
    }
}

impl Component for ZoneReadout {
    fn name(&self) -> &str {
        "zone-readout"
    }

    fn layer(&self) -> i32 {
        self.layer
    }

    fn update(&mut self, _layers: &mut LayerRegistry, frame: &FrameInfo) -> Result<()> {
        let zone = self
            .hover
            .get()
            .and_then(|world| self.zone_at(world))
            .map(str::to_string);
        self.debouncer.observe(zone, frame.now);

        if let Some(settled) = self.debouncer.poll(frame.now) {
            log::debug!("zone changed to {:?}", settled);
            self.zone_name.set(settled);
        }
        Ok(())
    }

    fn render(&mut self, _context: &mut RenderContext<'_>) -> Result<()> {
        Ok(())
    }
}
