//! Zone-name lookup by map color.
//!
//! A zone image, pixel-aligned with the map sprite, paints every zone in a
//! flat color. The JSON index maps `#rrggbb` keys to display names.

use crate::Result;
use fxhash::FxHashMap;
use image::Rgba;
use instant::{Duration, Instant};

/// `#rrggbb` key for a color, lowercase
pub fn hex_key(color: Rgba<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0[0], color.0[1], color.0[2])
}

fn normalize_key(key: &str) -> String {
    let trimmed = key.trim().trim_start_matches('#').to_ascii_lowercase();
    format!("#{trimmed}")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneIndex {
    names: FxHashMap<String, String>,
}

impl ZoneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{"#rrggbb": "Zone name", ...}`; keys may omit `#` or use
    /// uppercase digits
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: FxHashMap<String, String> = serde_json::from_str(json)?;
        Ok(raw.into_iter().collect())
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw: FxHashMap<String, String> = serde_json::from_slice(bytes)?;
        Ok(raw.into_iter().collect())
    }

    pub fn insert(&mut self, key: &str, name: impl Into<String>) {
        self.names.insert(normalize_key(key), name.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.names.get(&normalize_key(key)).map(String::as_str)
    }

    /// Name for a sampled zone color. Fully transparent pixels are outside
    /// every zone.
    pub fn lookup(&self, color: Rgba<u8>) -> Option<&str> {
        if color.0[3] == 0 {
            return None;
        }
        let key = hex_key(color);
        let name = self.names.get(&key).map(String::as_str);
        if name.is_none() {
            log::warn!("no zone registered for color {}", key);
        }
        name
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for ZoneIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut index = ZoneIndex::new();
        for (key, name) in iter {
            index.insert(&key, name);
        }
        index
    }
}

/// Holds back zone-name changes until the hovered zone has been stable for
/// the debounce delay, so sweeping the cursor across zones publishes once
#[derive(Debug, Clone)]
pub struct ZoneDebouncer {
    delay: Duration,
    pending: Option<(Option<String>, Instant)>,
    published: Option<String>,
}

impl ZoneDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            published: None,
        }
    }

    /// Records the zone under the cursor at `now`
    pub fn observe(&mut self, zone: Option<String>, now: Instant) {
        match &self.pending {
            Some((pending, _)) if *pending == zone => {}
            _ if self.pending.is_none() && zone == self.published => {}
            _ => self.pending = Some((zone, now)),
        }
    }

    /// Returns a value to publish once the pending zone has settled and
    /// differs from the last published one
    pub fn poll(&mut self, now: Instant) -> Option<Option<String>> {
        let (_, since) = self.pending.as_ref()?;
        if now < *since + self.delay {
            return None;
        }
        let (zone, _) = self.pending.take()?;
        if zone == self.published {
            return None;
        }
        self.published = zone.clone();
        Some(zone)
    }

    pub fn published(&self) -> Option<&str> {
        self.published.as_deref()
    }
}
