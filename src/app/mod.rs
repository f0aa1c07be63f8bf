//! Application shell: window, event loop, frame pacing.
//!
//! # Overview
//!
//! [`App`] is a builder over winit's `ApplicationHandler`. `run` hands a
//! configured scene to the internal runner, which creates the window and
//! the graphics device on `resumed`, then drives one `update`/`render`
//! pair per `RedrawRequested` until the window closes or the scene raises
//! its exit flag. Teardown goes through `Scene::unload` in `exiting`, so
//! every GPU resource is released before the device drops.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ixion::app::App;
//! use ixion::scene::SceneConfig;
//!
//! App::new(SceneConfig::textured("assets/crate.png"))
//!     .with_title("spinning cube")
//!     .run()?;
//! ```

pub mod input;
pub mod input_adapter;

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use self::input::Input;
use crate::device::{RenderSettings, WgpuDevice};
use crate::errors::Result;
use crate::scene::{Scene, SceneConfig};
use crate::utils::{FpsCounter, Timer};

/// Application builder. Configure, then [`run`](Self::run).
pub struct App {
    title: String,
    settings: RenderSettings,
    scene_config: SceneConfig,
}

impl App {
    #[must_use]
    pub fn new(scene_config: SceneConfig) -> Self {
        Self {
            title: "ixion".into(),
            settings: RenderSettings::default(),
            scene_config,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Runs the event loop to completion. Blocks the calling thread.
    ///
    /// # Errors
    ///
    /// Event loop creation or execution failures.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::new(self.title, self.settings, Scene::new(self.scene_config));
        event_loop.run_app(&mut runner).map_err(Into::into)
    }
}

/// Internal event-loop handler owning the window, device and scene.
struct AppRunner {
    title: String,
    settings: RenderSettings,

    window: Option<Arc<Window>>,
    device: Option<WgpuDevice>,
    scene: Scene,
    input: Input,
    timer: Timer,
    fps: FpsCounter,
}

impl AppRunner {
    fn new(title: String, settings: RenderSettings, scene: Scene) -> Self {
        Self {
            title,
            settings,
            window: None,
            device: None,
            scene,
            input: Input::new(),
            timer: Timer::new(),
            fps: FpsCounter::new(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(device)) = (&self.window, &mut self.device) else {
            return;
        };

        self.timer.tick();
        self.scene.update(self.timer.dt_seconds(), &self.input);
        self.input.end_frame();

        if self.scene.exit_requested() {
            event_loop.exit();
            return;
        }

        self.scene.render(device);

        if let Some(fps) = self.fps.update() {
            window.set_title(&format!("{} - {fps:.0} fps", self.title));
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(800.0, 600.0));

        let window = event_loop
            .create_window(window_attributes)
            .expect("Failed to create window");
        let window = Arc::new(window);
        self.window = Some(window.clone());

        log::info!("initializing graphics device");

        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let mut device =
            match pollster::block_on(WgpuDevice::new(window.clone(), &self.settings, width, height))
            {
                Ok(device) => device,
                Err(e) => {
                    log::error!("fatal device init error: {e}");
                    event_loop.exit();
                    return;
                }
            };

        if let Err(e) = self.scene.load(&mut device, width, height) {
            log::error!("fatal scene load error: {e}");
            event_loop.exit();
            return;
        }

        self.device = Some(device);
        self.input.inject_resize(width, height);

        // Fresh timers so the first frame's delta excludes init time.
        self.timer = Timer::new();
        self.fps = FpsCounter::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Inject first so the update tick sees this event burst.
        input_adapter::process_window_event(&mut self.input, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(device) = &mut self.device {
                    self.scene.resize(device, size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(device) = &mut self.device {
            self.scene.unload(device);
        }
    }
}
