use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use xylo_viewer::cli::Cli;
use xylo_viewer::config::ViewerConfig;
use xylo_viewer::core::{Clock, FpsCounter, OrbitInput, WinitInputAdapter};
use xylo_viewer::loaders::AssetCache;
use xylo_viewer::renderer::SceneRenderer;
use xylo_viewer::scene::{ViewportEvent, ViewportHost};

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    viewport: ViewportHost,
    input: WinitInputAdapter,
    clock: Clock,
    fps: FpsCounter,
    show_ui: bool,
}

impl App {
    fn new(config: ViewerConfig, show_ui: bool) -> Self {
        Self {
            window: None,
            renderer: None,
            viewport: ViewportHost::new(config),
            input: WinitInputAdapter::new(),
            clock: Clock::new(),
            fps: FpsCounter::new(),
            show_ui,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let frame = self.clock.tick();
        if let Some(fps) = self.fps.tick(frame.delta) {
            log::trace!("FPS: {:.1}", fps);
        }

        let events = self.viewport.frame(&frame);

        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };

        for event in events {
            match event {
                ViewportEvent::PlaceholderRemoved => log::debug!("Loading placeholder removed"),
                ViewportEvent::ModelReady(asset) => renderer.upload_model(&asset),
                ViewportEvent::ModelFailed(_) => renderer.clear_model(),
            }
        }

        let snapshot = self.viewport.snapshot();
        match renderer.render(window, &snapshot, self.viewport.overlay(), self.fps.fps()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = window.inner_size();
                renderer.resize(size.width, size.height);
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, shutting down");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_config = self.viewport.config().window.clone();
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(window_config.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    window_config.width,
                    window_config.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(SceneRenderer::new(
            window.clone(),
            self.viewport.config(),
            self.show_ui,
        )) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = renderer.size();
        self.viewport.handle_input(OrbitInput::Resize { width, height });
        self.viewport.mount(AssetCache::global());

        let mut renderer = renderer;
        if let Some(particles) = self.viewport.particles() {
            renderer.upload_particles(particles.positions());
        }

        self.clock.reset();
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // egui sees every event first; it can only hold back orbit input
        let consumed_by_ui = match (&mut self.renderer, &self.window) {
            (Some(renderer), Some(window)) => renderer.handle_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            event => {
                if let WindowEvent::Resized(size) = &event {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(size.width, size.height);
                    }
                }
                if let Some(input) = self.input.route(&event, consumed_by_ui) {
                    self.viewport.handle_input(input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.viewport.unmount();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // Start streaming the model before the window exists
    AssetCache::global().preload(&config.model.path);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, !cli.no_ui);

    log::info!("Xylo viewer - drag to orbit, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
