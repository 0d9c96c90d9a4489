//! Standalone visualization window backed by winit.
//!
//! ```no_run
//! # use driftview::Viewer;
//! Viewer::builder()
//!     .with_mesh_path("assets/models/cube.stl")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::Config;
use crate::engine::DriftEngine;
use crate::error::DriftError;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    config: Config,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Override the mesh file path.
    #[must_use]
    pub fn with_mesh_path(mut self, path: impl Into<String>) -> Self {
        self.config.scene.mesh_path = path.into();
        self
    }

    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.window.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            config: self.config,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window animating the particle cloud and the spinning mesh.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to enter
/// the event loop.
pub struct Viewer {
    config: Config,
}

impl Viewer {
    /// Start a new builder with the default configuration.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed or Escape is pressed.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError`] when the event loop cannot start or engine
    /// initialization fails (no adapter, missing mesh file).
    pub fn run(self) -> Result<(), DriftError> {
        let event_loop =
            EventLoop::new().map_err(|e| DriftError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            config: self.config,
            init_error: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| DriftError::Viewer(e.to_string()))?;

        // Engine construction happens inside the loop; surface its failure
        // to the caller instead of swallowing it with the exit.
        match app.init_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler.
///
/// Two states: RUNNING while the window and engine exist, TERMINATED once
/// `event_loop.exit()` has been called. Redraws are continuous; each
/// `RedrawRequested` runs one update/render frame and immediately asks for
/// the next.
struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<DriftEngine>,
    config: Config,
    init_error: Option<DriftError>,
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.init_error = Some(DriftError::Viewer(e.to_string()));
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let engine = pollster::block_on(DriftEngine::new(
            window.clone(),
            (size.width, size.height),
            &self.config,
        ));
        let engine = match engine {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("failed to initialize engine: {e}");
                self.init_error = Some(e);
                event_loop.exit();
                return;
            }
        };

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key
                        == PhysicalKey::Code(KeyCode::Escape)
                {
                    event_loop.exit();
                }
            }

            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    if let Err(e) = engine.resize(size.width, size.height) {
                        log::error!("resize failed: {e}");
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(engine) = &mut self.engine {
                    if let Err(e) = engine.update() {
                        log::error!("frame update failed: {e}");
                    }
                    match engine.render() {
                        Ok(()) => {}
                        Err(
                            wgpu::SurfaceError::Outdated
                            | wgpu::SurfaceError::Lost,
                        ) => {
                            // Reconfigure to the current size and let the
                            // next frame recover.
                            if let Some(window) = &self.window {
                                let size = window.inner_size();
                                if let Err(e) =
                                    engine.resize(size.width, size.height)
                                {
                                    log::error!("resize failed: {e}");
                                }
                            }
                        }
                        Err(e) => {
                            // A failed frame is not retried; the next
                            // iteration happens naturally.
                            log::error!("render error: {e:?}");
                        }
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}
