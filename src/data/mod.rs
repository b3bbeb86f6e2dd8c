pub mod assets;
pub mod zones;

#[cfg(feature = "tokio-runtime")]
pub use assets::FileSource;
pub use assets::{load_bundle, AssetManifest, AssetSource, HttpSource, MapAssets, MemorySource};
pub use zones::{hex_key, ZoneDebouncer, ZoneIndex};
