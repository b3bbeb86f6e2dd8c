//! Canvas ownership and device resolution.

use crate::{
    core::{config::CanvasConfig, geo::Size},
    input::events::Cursor,
    rendering::surface::Raster,
    Result,
};

/// Device-pixel resolution of the visible surface, 1:1 with the screen
pub type Resolution = Size;

/// Computes the resolution for a window size, clamped to the configured maximum
pub fn resolve_resolution(window: Size, config: &CanvasConfig) -> Resolution {
    let width = config
        .max_width
        .map_or(window.width, |max| window.width.min(max));
    let height = config
        .max_height
        .map_or(window.height, |max| window.height.min(max));
    Resolution::new(width, height)
}

/// The platform surface the engine renders into.
///
/// The browser implementation lives in `crate::web`; [`HeadlessTarget`] backs
/// tests and the export tool.
pub trait RenderTarget {
    /// Acquires the 2D drawing context. `false` means no context is available,
    /// which is fatal: there is no software fallback.
    fn acquire_context(&mut self) -> bool;

    /// Current inner window size in device pixels
    fn window_size(&self) -> Size;

    /// Copies a finished frame to the screen
    fn present(&mut self, frame: &Raster) -> Result<()>;

    /// Applies a cursor affordance
    fn set_cursor(&mut self, _cursor: Cursor) {}
}

/// In-memory render target that keeps the last presented frame
#[derive(Debug, Clone)]
pub struct HeadlessTarget {
    size: Size,
    context_available: bool,
    last_frame: Option<Raster>,
    cursor: Cursor,
    presented: u64,
}

impl HeadlessTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            context_available: true,
            last_frame: None,
            cursor: Cursor::Default,
            presented: 0,
        }
    }

    /// A target whose context acquisition always fails
    pub fn without_context(width: u32, height: u32) -> Self {
        Self {
            context_available: false,
            ..Self::new(width, height)
        }
    }

    /// Simulates a window resize; the engine picks it up on its next resize call
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.size = Size::new(width, height);
    }

    pub fn last_frame(&self) -> Option<&Raster> {
        self.last_frame.as_ref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }
}

impl RenderTarget for HeadlessTarget {
    fn acquire_context(&mut self) -> bool {
        self.context_available
    }

    fn window_size(&self) -> Size {
        self.size
    }

    fn present(&mut self, frame: &Raster) -> Result<()> {
        self.last_frame = Some(frame.clone());
        self.presented += 1;
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_follows_window() {
        let config = CanvasConfig::default();
        let resolution = resolve_resolution(Size::new(1280, 800), &config);
        assert_eq!(resolution, Size::new(1280, 800));
    }

    #[test]
    fn test_resolution_is_clamped() {
        let config = CanvasConfig {
            max_width: Some(1024),
            max_height: Some(900),
            ..CanvasConfig::default()
        };
        let resolution = resolve_resolution(Size::new(1920, 800), &config);
        assert_eq!(resolution, Size::new(1024, 800));
    }

    #[test]
    fn test_headless_present_records_frame() {
        let mut target = HeadlessTarget::new(4, 4);
        assert!(target.acquire_context());
        target.present(&Raster::new(4, 4)).unwrap();
        assert_eq!(target.presented_frames(), 1);
        assert_eq!(target.last_frame().map(|f| f.width()), Some(4));

        assert!(!HeadlessTarget::without_context(4, 4).acquire_context());
    }
}
