use crate::{
    core::{canvas::Resolution, geo::Size},
    layers::layer::Layer,
    rendering::blend::BlendMode,
    MapError, Result,
};
use fxhash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;

/// Cloneable handle for marking layers dirty from outside the frame loop.
///
/// Store subscriptions hold one of these instead of the registry itself;
/// pending ids are folded into the registry at the start of every frame.
#[derive(Debug, Clone, Default)]
pub struct DirtyHandle {
    pending: Rc<RefCell<FxHashSet<i32>>>,
}

impl DirtyHandle {
    pub fn mark(&self, id: i32) {
        self.pending.borrow_mut().insert(id);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    fn drain(&self) -> Vec<i32> {
        self.pending.borrow_mut().drain().collect()
    }
}

/// Owns every layer, keyed by id and ordered ascending for compositing
pub struct LayerRegistry {
    resolution: Option<Resolution>,
    layers: FxHashMap<i32, Layer>,
    /// Layer ids sorted ascending (render order)
    render_order: Vec<i32>,
    dirty_handle: DirtyHandle,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self {
            resolution: None,
            layers: FxHashMap::default(),
            render_order: Vec::new(),
            dirty_handle: DirtyHandle::default(),
        }
    }

    /// Sets the resolution new layers are allocated at. Must run before any
    /// layer is created.
    pub fn initialize(&mut self, resolution: Resolution) {
        log::debug!("layer registry initialized at {}x{}", resolution.width, resolution.height);
        self.resolution = Some(resolution);
    }

    pub fn is_initialized(&self) -> bool {
        self.resolution.is_some()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Returns the layer with `id`, allocating it at viewport size on first
    /// access
    pub fn get_or_create(&mut self, id: i32) -> Result<&mut Layer> {
        let resolution = self
            .resolution
            .ok_or(MapError::NotInitialized("layer registry"))?;

        if !self.layers.contains_key(&id) {
            log::debug!("creating layer {} at {}x{}", id, resolution.width, resolution.height);
            self.layers.insert(id, Layer::new(id, resolution));
            // Insert in sorted order by id
            let insert_pos = self
                .render_order
                .iter()
                .position(|existing| *existing > id)
                .unwrap_or(self.render_order.len());
            self.render_order.insert(insert_pos, id);
        }

        self.layers
            .get_mut(&id)
            .ok_or_else(|| MapError::Layer(format!("layer {} vanished after creation", id)))
    }

    pub fn get_layer(&self, id: i32) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub(crate) fn get_layer_mut(&mut self, id: i32) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn set_layer_scale(&mut self, id: i32, scale: f64) -> Result<()> {
        self.get_or_create(id)?.set_scale(scale);
        Ok(())
    }

    pub fn set_layer_position(&mut self, id: i32, x: f64, y: f64) -> Result<()> {
        self.get_or_create(id)?.set_position(x, y);
        Ok(())
    }

    /// Reallocates the layer's raster and pins it to `size`; it stops
    /// following viewport resizes
    pub fn set_layer_size(&mut self, id: i32, size: Size) -> Result<()> {
        let layer = self.get_or_create(id)?;
        layer.follows_viewport = false;
        layer.set_size(size);
        Ok(())
    }

    pub fn set_layer_opacity(&mut self, id: i32, opacity: f32) -> Result<()> {
        self.get_or_create(id)?.set_opacity(opacity);
        Ok(())
    }

    pub fn set_layer_blend_mode(&mut self, id: i32, mode: BlendMode) -> Result<()> {
        self.get_or_create(id)?.set_blend_mode(mode);
        Ok(())
    }

    pub fn dirty_layer(&mut self, id: i32) -> Result<()> {
        self.get_or_create(id)?.dirty = true;
        Ok(())
    }

    pub fn dirty_all(&mut self) {
        for layer in self.layers.values_mut() {
            layer.dirty = true;
        }
    }

    pub fn dirty_handle(&self) -> DirtyHandle {
        self.dirty_handle.clone()
    }

    /// Folds ids marked through [`DirtyHandle`]s into the layer flags
    pub fn apply_pending_dirty(&mut self) -> Result<()> {
        for id in self.dirty_handle.drain() {
            self.dirty_layer(id)?;
        }
        Ok(())
    }

    /// Applies a new viewport resolution. Layers still following the
    /// viewport are reallocated; every layer is marked dirty.
    pub fn resize(&mut self, resolution: Resolution) {
        log::info!("resizing layers to {}x{}", resolution.width, resolution.height);
        self.resolution = Some(resolution);
        for layer in self.layers.values_mut() {
            if layer.follows_viewport && layer.size() != resolution {
                layer.set_size(resolution);
            }
            layer.dirty = true;
        }
    }

    /// Layer ids in ascending order
    pub fn ids(&self) -> &[i32] {
        &self.render_order
    }

    /// Layers in ascending id order
    pub fn layers(&self) -> Vec<&Layer> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
