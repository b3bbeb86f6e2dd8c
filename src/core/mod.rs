pub mod canvas;
pub mod config;
pub mod constants;
pub mod engine;
pub mod geo;
pub mod store;
pub mod viewport;

pub use canvas::{resolve_resolution, HeadlessTarget, RenderTarget, Resolution};
pub use config::{ViewerOptions, ViewerProfile};
pub use engine::{Engine, EngineState};
pub use geo::{Point, Rect, Size};
pub use store::{Store, SubscriptionId};
pub use viewport::WorldViewport;
