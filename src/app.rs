use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::config::Config;
use crate::controller::{AppState, InputEvent, VirtualCursor};
use crate::error::{InitError, RenderError};
use crate::ui::Hud;
use crate::view::{CubemapFaces, GpuContext, ModelData, Renderer};

/// Window plus every GPU resource. Exists only between `resumed` and `exiting`.
struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    hud: Hud,
    cursor: VirtualCursor,
    cursor_grabbed: bool,
}

pub struct SkyviewApp {
    config: Config,
    state: AppState,
    running: Option<Running>,
    error: Option<InitError>,
}

impl SkyviewApp {
    pub fn new(config: Config) -> Self {
        let state = AppState::new(&config);
        Self { config, state, running: None, error: None }
    }

    /// Startup failure recorded before the event loop exited.
    pub fn take_error(&mut self) -> Option<InitError> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<Running, InitError> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();

        let gpu = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height, self.config.vsync))?;

        let model = ModelData::load(&self.config.model_file())?;
        let faces = CubemapFaces::load(&self.config.skybox_faces());
        let renderer = Renderer::new(&gpu, &self.state.scene, &model, &faces, self.config.clear_color)?;
        let hud = Hud::new(&window, &gpu.device, gpu.format);

        let cursor_grabbed = grab_cursor(&window);
        // the projection follows the real surface, which may differ from the request on HiDPI
        self.state.push_event(InputEvent::Resized { width: size.width, height: size.height });

        tracing::info!(width = size.width, height = size.height, "window ready");
        Ok(Running {
            cursor: VirtualCursor::new(f64::from(size.width) / 2.0, f64::from(size.height) / 2.0),
            window,
            gpu,
            renderer,
            hud,
            cursor_grabbed,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(rt) = self.running.as_mut() else {
            return;
        };
        let Some(outcome) = self.state.step() else {
            event_loop.exit();
            return;
        };

        if self.state.show_hud {
            rt.hud.build(&rt.window, &mut self.state);
        }
        let hud = self.state.show_hud.then_some(&mut rt.hud);

        match rt.renderer.render(&rt.gpu, &outcome.submission, hud) {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                tracing::debug!("surface lost, reconfiguring");
                rt.gpu.reconfigure();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                tracing::error!("out of GPU memory");
                self.state.terminate();
                event_loop.exit();
            }
            Err(RenderError::Surface(e)) => tracing::warn!("frame skipped: {e}"),
            Err(e @ RenderError::Uniform(_)) => {
                tracing::error!("{e}");
                self.state.terminate();
                event_loop.exit();
            }
        }
    }
}

fn key_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput {
            event: KeyEvent { physical_key: PhysicalKey::Code(code), state, .. },
            ..
        } => Some(InputEvent::Key { code: *code, pressed: state.is_pressed() }),
        _ => None,
    }
}

fn grab_cursor(window: &Window) -> bool {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    match grabbed {
        Ok(()) => {
            window.set_cursor_visible(false);
            true
        }
        Err(e) => {
            tracing::warn!("cursor grab unavailable, using absolute cursor: {e}");
            false
        }
    }
}

impl ApplicationHandler for SkyviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                tracing::error!("initialization failed: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(rt) = self.running.as_mut() else {
            return;
        };
        if rt.hud.on_window_event(&rt.window, &event) {
            // key releases still count while the overlay has focus
            if let Some(event) = key_event(&event).filter(InputEvent::survives_overlay) {
                self.state.push_event(event);
            }
            return;
        }

        if let Some(event) = key_event(&event) {
            self.state.push_event(event);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.state.push_event(InputEvent::CloseRequested),
            WindowEvent::Resized(size) => {
                if rt.gpu.resize(size.width, size.height) {
                    rt.renderer.resize(&rt.gpu.device, size.width, size.height);
                }
                self.state.push_event(InputEvent::Resized { width: size.width, height: size.height });
            }
            WindowEvent::CursorMoved { position, .. } if !rt.cursor_grabbed => {
                self.state.push_event(InputEvent::PointerMoved { x: position.x as f32, y: position.y as f32 });
            }
            WindowEvent::Focused(focused) => {
                rt.cursor_grabbed = focused && grab_cursor(&rt.window);
                self.state.push_event(InputEvent::FocusChanged(focused));
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(rt) = self.running.as_mut() else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if rt.cursor_grabbed {
                self.state.push_event(rt.cursor.moved_by(dx, dy));
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.state.is_running() {
            event_loop.exit();
            return;
        }
        if let Some(rt) = &self.running {
            rt.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // release GPU resources before the window goes away
        self.running = None;
        tracing::info!("event loop exiting");
    }
}
