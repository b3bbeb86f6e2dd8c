//! Interactive pieces of the viewer.
//!
//! A component draws into exactly one layer. Each frame the engine runs every
//! component's `update`, then the compositor runs the pointer-area phase and
//! the render phase. Capabilities other than `render` default to no-ops.

pub mod selection_overlay;
pub mod world_map;
pub mod zone_readout;

pub use selection_overlay::SelectionOverlay;
pub use world_map::{WorldMap, WorldMapStores};
pub use zone_readout::ZoneReadout;

use crate::{
    input::area::PointerAreas,
    layers::manager::LayerRegistry,
    rendering::context::{FrameInfo, RenderContext},
    Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a drag on the world map does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Pan,
    Select,
}

pub trait Component {
    fn name(&self) -> &str;

    /// Layer id this component renders into
    fn layer(&self) -> i32;

    /// Per-frame state advance; the place to push layer transforms
    fn update(&mut self, _layers: &mut LayerRegistry, _frame: &FrameInfo) -> Result<()> {
        Ok(())
    }

    /// Declares this frame's interactive rectangles
    fn pointer_areas(&mut self, _areas: &mut PointerAreas, _frame: &FrameInfo) {}

    fn render(&mut self, context: &mut RenderContext<'_>) -> Result<()>;

    /// Forces a re-render of this component's layer even when it is not dirty
    fn needs_redraw(&self) -> bool {
        false
    }
}

/// Components in registration order
#[derive(Default)]
pub struct ComponentRegistry {
    components: Vec<Box<dyn Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, component: Box<dyn Component>) {
        log::debug!("registered component '{}' on layer {}", component.name(), component.layer());
        self.components.push(component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Component + 'static)> {
        self.components.get_mut(index).map(|c| c.as_mut())
    }

    pub fn update_all(&mut self, layers: &mut LayerRegistry, frame: &FrameInfo) -> Result<()> {
        for component in &mut self.components {
            component.update(layers, frame)?;
        }
        Ok(())
    }

    pub fn declare_pointer_areas(&mut self, areas: &mut PointerAreas, frame: &FrameInfo) {
        for component in &mut self.components {
            component.pointer_areas(areas, frame);
        }
    }

    /// Component indices grouped by layer id, ascending, registration order
    /// preserved within a layer
    pub fn layer_groups(&self) -> BTreeMap<i32, Vec<usize>> {
        let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (index, component) in self.components.iter().enumerate() {
            groups.entry(component.layer()).or_default().push(index);
        }
        groups
    }

    pub fn needs_redraw(&self, indices: &[usize]) -> bool {
        indices
            .iter()
            .filter_map(|index| self.components.get(*index))
            .any(|component| component.needs_redraw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub(&'static str, i32);

    impl Component for Stub {
        fn name(&self) -> &str {
            self.0
        }

        fn layer(&self) -> i32 {
            self.1
        }

        fn render(&mut self, _context: &mut RenderContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_layer_groups_are_ascending() {
        let mut registry = ComponentRegistry::new();
        registry.register(Box::new(Stub("b", 2)));
        registry.register(Box::new(Stub("a", 0)));
        registry.register(Box::new(Stub("c", 2)));

        let groups = registry.layer_groups();
        let keys: Vec<i32> = groups.keys().copied().collect();
        assert_eq!(keys, vec![0, 2]);
        assert_eq!(groups[&2], vec![0, 2]);
        assert_eq!(registry.names(), vec!["b", "a", "c"]);
        assert!(!registry.needs_redraw(&[0, 1, 2]));
    }
}
