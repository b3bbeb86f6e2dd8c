//! Engine lifecycle and the per-frame driver.
//!
//! `Uninitialized -> Initialized -> Running <-> Stopped`. The engine owns the
//! render target, the layer registry, the compositor and the pointer
//! dispatcher, and attaches or detaches the latter two directly on start and
//! stop.

use crate::{
    components::{Component, ComponentRegistry},
    core::{
        canvas::{resolve_resolution, RenderTarget, Resolution},
        config::ViewerOptions,
    },
    input::{
        dispatcher::PointerDispatcher,
        events::{EventHandled, PointerEvent},
    },
    layers::{
        compositor::{Compositor, FrameStats},
        manager::{DirtyHandle, LayerRegistry},
    },
    rendering::context::FrameInfo,
    MapError, Result,
};
use instant::Instant;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initialized,
    Running,
    Stopped,
}

impl EngineState {
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initialized => "initialized",
            EngineState::Running => "running",
            EngineState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Engine<T: RenderTarget> {
    state: EngineState,
    options: ViewerOptions,
    target: T,
    resolution: Option<Resolution>,
    layers: LayerRegistry,
    compositor: Option<Compositor>,
    pointer: PointerDispatcher,
    components: ComponentRegistry,
    frame: u64,
    last_stats: Option<FrameStats>,
}

impl<T: RenderTarget> Engine<T> {
    pub fn new(target: T, options: ViewerOptions) -> Self {
        let pointer = PointerDispatcher::new(options.input.clone());
        Self {
            state: EngineState::Uninitialized,
            options,
            target,
            resolution: None,
            layers: LayerRegistry::new(),
            compositor: None,
            pointer,
            components: ComponentRegistry::new(),
            frame: 0,
            last_stats: None,
        }
    }

    /// Acquires the drawing context, computes the resolution and prepares the
    /// layer registry. A missing context is fatal.
    pub fn setup(&mut self) -> Result<()> {
        if self.state != EngineState::Uninitialized {
            return Err(MapError::InvalidState {
                from: self.state.name(),
                op: "setup",
            });
        }

        if !self.target.acquire_context() {
            log::error!("no 2D rendering context available");
            return Err(MapError::ContextUnavailable);
        }

        let resolution = resolve_resolution(self.target.window_size(), &self.options.canvas);
        self.layers.initialize(resolution);
        self.compositor = Some(Compositor::new(
            resolution,
            &self.options.canvas,
            &self.options.framerate,
        ));
        self.resolution = Some(resolution);
        self.state = EngineState::Initialized;
        log::info!("engine initialized at {}x{}", resolution.width, resolution.height);
        Ok(())
    }

    /// Starts accepting input and frames. Returns `false` when already running.
    pub fn start(&mut self) -> Result<bool> {
        match self.state {
            EngineState::Uninitialized => Err(MapError::NotInitialized("engine")),
            EngineState::Running => Ok(false),
            EngineState::Initialized | EngineState::Stopped => {
                self.pointer.attach();
                if let Some(compositor) = self.compositor.as_mut() {
                    compositor.attach();
                }
                log::info!("engine started (was {})", self.state);
                self.state = EngineState::Running;
                Ok(true)
            }
        }
    }

    /// Stops input and frames. Returns `false` when not running.
    pub fn stop(&mut self) -> Result<bool> {
        match self.state {
            EngineState::Uninitialized => Err(MapError::NotInitialized("engine")),
            EngineState::Initialized | EngineState::Stopped => Ok(false),
            EngineState::Running => {
                self.pointer.detach();
                if let Some(compositor) = self.compositor.as_mut() {
                    compositor.detach();
                }
                log::info!("engine stopped");
                self.state = EngineState::Stopped;
                Ok(true)
            }
        }
    }

    /// Re-reads the window size. On change every viewport-sized layer is
    /// reallocated and all layers are marked dirty.
    pub fn resize(&mut self) -> Result<bool> {
        let current = self.resolution.ok_or(MapError::NotInitialized("engine"))?;
        let resolution = resolve_resolution(self.target.window_size(), &self.options.canvas);
        if resolution == current {
            return Ok(false);
        }

        self.layers.resize(resolution);
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.resize(resolution);
        }
        self.resolution = Some(resolution);
        Ok(true)
    }

    pub fn register_component(&mut self, component: Box<dyn Component>) {
        self.components.register(component);
    }

    pub fn handle_event(&mut self, event: PointerEvent) -> EventHandled {
        let handled = self.pointer.handle_event(event);
        self.target.set_cursor(self.pointer.cursor());
        handled
    }

    /// Runs one frame: resize check, component updates, compositing and
    /// presentation. Frames are only produced while running.
    pub fn render_frame(&mut self, now: Instant) -> Result<Option<FrameStats>> {
        if self.state != EngineState::Running {
            return Ok(None);
        }
        self.resize()?;

        let resolution = self.resolution.ok_or(MapError::NotInitialized("engine"))?;
        let compositor = self
            .compositor
            .as_mut()
            .ok_or(MapError::NotInitialized("compositor"))?;

        self.frame += 1;
        let frame = FrameInfo {
            frame: self.frame,
            now,
            resolution,
        };

        self.components.update_all(&mut self.layers, &frame)?;
        let stats = compositor.render_frame(&mut self.layers, &mut self.components, &mut self.pointer, &frame)?;
        self.target.present(compositor.surface())?;
        self.target.set_cursor(self.pointer.cursor());

        self.last_stats = Some(stats);
        Ok(Some(stats))
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// Layer access for setup code; fails before `setup`
    pub fn layers_mut(&mut self) -> Result<&mut LayerRegistry> {
        if !self.layers.is_initialized() {
            return Err(MapError::NotInitialized("layer registry"));
        }
        Ok(&mut self.layers)
    }

    pub fn dirty_handle(&self) -> DirtyHandle {
        self.layers.dirty_handle()
    }

    pub fn pointer(&self) -> &PointerDispatcher {
        &self.pointer
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn last_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }
}
