use crate::{
    components::{Component, InteractionMode, WorldMapStores},
    core::{config::SelectionConfig, geo::Point},
    layers::manager::DirtyHandle,
    rendering::{blend::BlendMode, context::RenderContext, dashed::DashPattern},
    Result,
};
use image::Rgba;

const BORDER_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PUNCH_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Draws the skewed selection on a viewport-sized layer.
///
/// In select mode everything outside the quad is dimmed and the quad is cut
/// out of the dim fill; in pan mode only the dashed border is drawn.
pub struct SelectionOverlay {
    layer: i32,
    stores: WorldMapStores,
    skew_tan: f64,
    pattern: DashPattern,
    dim: Rgba<u8>,
}

impl SelectionOverlay {
    /// Subscribes to the stores that change the overlay's pixels so the layer
    /// is re-rendered whenever one of them notifies
    pub fn new(layer: i32, stores: WorldMapStores, config: &SelectionConfig, dirty: DirtyHandle) -> Self {
        let on_selection = dirty.clone();
        stores.selection.subscribe(move |_| on_selection.mark(layer));
        let on_mode = dirty.clone();
        stores.mode.subscribe(move |_| on_mode.mark(layer));
        stores.viewport.subscribe(move |_| dirty.mark(layer));

        Self {
            layer,
            stores,
            skew_tan: config.skew_tan(),
            pattern: DashPattern::new(config.dash_length, config.gap_length),
            dim: Rgba([0, 0, 0, config.dim_alpha]),
        }
    }

    /// Screen-space corners of the current selection, rounded to whole pixels
    pub fn screen_quad(&self) -> Option<[Point; 4]> {
        let bounds = self.stores.selection.get()?;
        if bounds.is_empty() {
            return None;
        }
        let quad = bounds.skew_quad(self.skew_tan);
        let corners = self
            .stores
            .viewport
            .with(|viewport| quad.map(|corner| viewport.world_to_screen(corner).round()).corners);
        Some(corners)
    }
}

impl Component for SelectionOverlay {
    fn name(&self) -> &str {
        "selection-overlay"
    }

    fn layer(&self) -> i32 {
        self.layer
    }

    fn render(&mut self, context: &mut RenderContext<'_>) -> Result<()> {
        let quad = self.screen_quad();

        match self.stores.mode.get() {
            InteractionMode::Select => {
                context.fill(self.dim);
                if let Some(corners) = quad {
                    context.fill_polygon(&corners, PUNCH_COLOR, BlendMode::DestinationOut);
                    context.stroke_dashed_polygon(&corners, self.pattern, BORDER_COLOR);
                }
            }
            InteractionMode::Pan => {
                if let Some(corners) = quad {
                    context.stroke_dashed_polygon(&corners, self.pattern, BORDER_COLOR);
                }
            }
        }
        Ok(())
    }
}
