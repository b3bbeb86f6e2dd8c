pub mod blend;
pub mod context;
pub mod dashed;
pub mod surface;

// Re-export main types
pub use blend::BlendMode;
pub use context::{FrameInfo, RenderContext};
pub use dashed::DashPattern;
pub use surface::Raster;
