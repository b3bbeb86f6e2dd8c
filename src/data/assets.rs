//! Asynchronous asset loading.
//!
//! Every asset in a bundle is fetched concurrently and the bundle fails as a
//! whole if any one of them fails; the viewer never starts with a partial
//! bundle.

use crate::{core::geo::Size, data::zones::ZoneIndex, rendering::surface::Raster, MapError, Result};
use async_trait::async_trait;
use fxhash::FxHashMap;
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Where asset bytes come from
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// Reads assets relative to a directory
#[cfg(feature = "tokio-runtime")]
#[derive(Debug, Clone)]
pub struct FileSource {
    root: std::path::PathBuf,
}

#[cfg(feature = "tokio-runtime")]
impl FileSource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(feature = "tokio-runtime")]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AssetSource for FileSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        tokio::fs::read(&full).await.map_err(|e| MapError::Asset {
            path: full.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Fetches assets over HTTP relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AssetSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path);
        let failed = |err: reqwest::Error| MapError::Asset {
            path: url.clone(),
            reason: err.to_string(),
        };
        let response = self.client.get(&url).send().await.map_err(failed)?;

        if !response.status().is_success() {
            return Err(MapError::Asset {
                path: url.clone(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        Ok(response.bytes().await.map_err(failed)?.to_vec())
    }

    fn describe(&self) -> String {
        format!("url {}", self.base_url)
    }
}

/// In-memory assets, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.files.insert(path.into(), bytes);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl AssetSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| MapError::Asset {
            path: path.to_string(),
            reason: "not found".to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("memory ({} files)", self.files.len())
    }
}

/// Paths of the assets that make up one map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub sprite: String,
    pub zone_image: String,
    pub zone_index: String,
    pub heightmap: String,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            sprite: "map.png".to_string(),
            zone_image: "zones.png".to_string(),
            zone_index: "zones.json".to_string(),
            heightmap: "heightmap.png".to_string(),
        }
    }
}

/// Everything the viewer needs before it can start
#[derive(Debug, Clone)]
pub struct MapAssets {
    pub sprite: Raster,
    pub zone_image: Raster,
    pub zones: ZoneIndex,
    pub heightmap: GrayImage,
}

impl MapAssets {
    pub fn sprite_size(&self) -> Size {
        self.sprite.size()
    }
}

fn decode_error(path: &str, error: impl std::fmt::Display) -> MapError {
    MapError::Asset {
        path: path.to_string(),
        reason: error.to_string(),
    }
}

async fn load_raster(source: &dyn AssetSource, path: &str) -> Result<Raster> {
    let bytes = source.fetch(path).await?;
    let image = image::load_from_memory(&bytes).map_err(|e| decode_error(path, e))?;
    Ok(Raster::from_image(image.to_rgba8()))
}

async fn load_gray(source: &dyn AssetSource, path: &str) -> Result<GrayImage> {
    let bytes = source.fetch(path).await?;
    let image = image::load_from_memory(&bytes).map_err(|e| decode_error(path, e))?;
    Ok(image.to_luma8())
}

async fn load_zones(source: &dyn AssetSource, path: &str) -> Result<ZoneIndex> {
    let bytes = source.fetch(path).await?;
    ZoneIndex::from_json_slice(&bytes).map_err(|e| decode_error(path, e))
}

/// Loads all four assets concurrently
pub async fn load_bundle(source: &dyn AssetSource, manifest: &AssetManifest) -> Result<MapAssets> {
    log::info!("loading map assets from {}", source.describe());

    let (sprite, zone_image, zones, heightmap) = futures::try_join!(
        load_raster(source, &manifest.sprite),
        load_raster(source, &manifest.zone_image),
        load_zones(source, &manifest.zone_index),
        load_gray(source, &manifest.heightmap),
    )?;

    if zone_image.size() != sprite.size() {
        log::warn!(
            "zone image is {}x{} but the map sprite is {}x{}; zone lookups are rescaled",
            zone_image.width(),
            zone_image.height(),
            sprite.width(),
            sprite.height()
        );
    }

    log::info!(
        "loaded {}x{} map with {} zones and a {}x{} heightmap",
        sprite.width(),
        sprite.height(),
        zones.len(),
        heightmap.width(),
        heightmap.height()
    );

    Ok(MapAssets {
        sprite,
        zone_image,
        zones,
        heightmap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::heightmap::encode_png;
    use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, Luma, RgbaImage};

    fn rgba_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(image.as_raw(), width, height, ColorType::Rgba8)
            .unwrap();
        bytes
    }

    fn memory_bundle() -> MemorySource {
        MemorySource::new()
            .with_file("map.png", rgba_png(8, 4))
            .with_file("zones.png", rgba_png(8, 4))
            .with_file("zones.json", br##"{"#0a141e": "Slate"}"##.to_vec())
            .with_file("heightmap.png", encode_png(&GrayImage::from_pixel(16, 8, Luma([50]))).unwrap())
    }

    #[tokio::test]
    async fn test_load_bundle_from_memory() {
        let assets = load_bundle(&memory_bundle(), &AssetManifest::default()).await.unwrap();
        assert_eq!(assets.sprite_size(), Size::new(8, 4));
        assert_eq!(assets.heightmap.dimensions(), (16, 8));
        assert_eq!(assets.zones.lookup(image::Rgba([10, 20, 30, 255])), Some("Slate"));
    }

    #[tokio::test]
    async fn test_missing_asset_fails_bundle() {
        let mut source = memory_bundle();
        source.files.remove("heightmap.png");
        let result = load_bundle(&source, &AssetManifest::default()).await;
        assert!(matches!(result, Err(MapError::Asset { ref path, .. }) if path == "heightmap.png"));
    }

    #[tokio::test]
    async fn test_corrupt_image_names_path() {
        let source = memory_bundle().with_file("map.png", b"not a png".to_vec());
        let result = load_bundle(&source, &AssetManifest::default()).await;
        assert!(matches!(result, Err(MapError::Asset { ref path, .. }) if path == "map.png"));
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_file_source_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zones.json"), br#"{}"#).unwrap();
        let source = FileSource::new(dir.path());

        assert_eq!(source.fetch("zones.json").await.unwrap(), b"{}".to_vec());
        assert!(matches!(
            source.fetch("missing.png").await,
            Err(MapError::Asset { .. })
        ));
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_http_transport_failure_names_the_asset() {
        // Nothing listens on the discard port
        let source = HttpSource::new("http://127.0.0.1:9/assets");
        let result = source.fetch("zones.json").await;
        assert!(matches!(
            result,
            Err(MapError::Asset { ref path, .. }) if path == "http://127.0.0.1:9/assets/zones.json"
        ));
    }

    #[test]
    fn test_http_url_joining() {
        let source = HttpSource::new("https://example.com/assets/");
        assert_eq!(source.url_for("/map.png"), "https://example.com/assets/map.png");
    }
}
