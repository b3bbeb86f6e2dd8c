//! Per-frame flattening of every layer onto the visible surface.
//!
//! Content rendering (each component drawing into its layer's raster) is
//! separate from compositing (placing each raster with its scale, offset,
//! opacity and blend mode), so zooming a layer never re-renders it.

use crate::{
    components::ComponentRegistry,
    core::{
        canvas::Resolution,
        config::{CanvasConfig, FrameTimingConfig},
    },
    input::dispatcher::PointerDispatcher,
    layers::manager::LayerRegistry,
    rendering::{
        context::{FrameInfo, RenderContext},
        surface::Raster,
    },
    MapError, Result,
};
use image::Rgba;

/// What happened during one composited frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    /// Layers whose content was re-rendered
    pub layers_rendered: usize,
    /// Layers drawn onto the main surface
    pub layers_composited: usize,
    /// Layers skipped for zero opacity
    pub layers_hidden: usize,
    pub pointer_areas: usize,
}

pub struct Compositor {
    main: Raster,
    background: Rgba<u8>,
    always_redraw: bool,
    attached: bool,
}

impl Compositor {
    pub fn new(resolution: Resolution, canvas: &CanvasConfig, timing: &FrameTimingConfig) -> Self {
        Self {
            main: Raster::new(resolution.width, resolution.height),
            background: Rgba(canvas.background),
            always_redraw: timing.always_redraw,
            attached: false,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn resize(&mut self, resolution: Resolution) {
        self.main.resize(resolution.width, resolution.height);
    }

    /// The visible surface as of the last frame
    pub fn surface(&self) -> &Raster {
        &self.main
    }

    pub fn set_always_redraw(&mut self, always_redraw: bool) {
        self.always_redraw = always_redraw;
    }

    pub fn render_frame(
        &mut self,
        layers: &mut LayerRegistry,
        components: &mut ComponentRegistry,
        pointer: &mut PointerDispatcher,
        frame: &FrameInfo,
    ) -> Result<FrameStats> {
        if !self.attached {
            return Err(MapError::InvalidState {
                from: "detached",
                op: "render a frame",
            });
        }

        let mut stats = FrameStats {
            frame: frame.frame,
            ..FrameStats::default()
        };

        // Areas are redeclared from scratch every frame
        pointer.clear_areas();
        components.declare_pointer_areas(pointer.areas_mut(), frame);
        stats.pointer_areas = pointer.areas().len();

        self.main.fill(self.background);

        layers.apply_pending_dirty()?;
        for (layer_id, indices) in components.layer_groups() {
            let layer = layers.get_or_create(layer_id)?;
            let redraw = self.always_redraw || layer.is_dirty() || components.needs_redraw(&indices);
            if !redraw {
                continue;
            }

            let mut context = RenderContext::new(layer.raster_mut(), layer_id, *frame);
            context.clear();
            for index in indices {
                if let Some(component) = components.get_mut(index) {
                    component.render(&mut context)?;
                }
            }
            // Only a fully successful render clears the flag
            layer.dirty = false;
            stats.layers_rendered += 1;
        }

        let main_size = self.main.size();
        for layer in layers.layers() {
            if layer.opacity() <= 0.0 {
                stats.layers_hidden += 1;
                continue;
            }
            let (origin, drawn) = layer.placement(main_size);
            self.main.draw_raster(
                layer.raster(),
                origin.x as i64,
                origin.y as i64,
                drawn.width,
                drawn.height,
                layer.opacity(),
                layer.blend_mode(),
            );
            stats.layers_composited += 1;
        }

        for id in layers.ids().to_vec() {
            if let Some(layer) = layers.get_layer_mut(id) {
                layer.moved = false;
            }
        }

        log::trace!(
            "frame {}: rendered {} composited {} hidden {}",
            stats.frame,
            stats.layers_rendered,
            stats.layers_composited,
            stats.layers_hidden
        );
        Ok(stats)
    }
}
