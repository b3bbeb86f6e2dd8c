pub mod animation;
pub mod compositor;
pub mod layer;
pub mod manager;

pub use animation::{AnimationHandle, AnimationSlot, CenteringAnimation};
pub use compositor::{Compositor, FrameStats};
pub use layer::{centered_origin, Layer};
pub use manager::{DirtyHandle, LayerRegistry};
