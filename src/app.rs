use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::AssetLoader,
    config::AppConfig,
    error::{Result, SceneError},
    gfx::{camera::CameraManager, rendering::RenderEngine, scene::Scene},
    render_loop::{RenderLoop, RenderSurface},
    room::{Room, RoomObjects},
};

/// Owns everything the running room needs: scene, texture loads, camera,
/// renderer and the event loop driving them
pub struct SceneHandle {
    event_loop: EventLoop<()>,
    host: AppHost,
}

struct AppHost {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    objects: RoomObjects,
    loader: AssetLoader,
    render_loop: RenderLoop,
    fatal: Option<SceneError>,
}

/// Builds the room and queues every texture load
///
/// Construction errors abort here; no window is opened for a half-built
/// scene.
pub fn initialize(config: AppConfig) -> Result<SceneHandle> {
    let event_loop =
        EventLoop::new().map_err(|e| SceneError::SurfaceUnavailable(e.to_string()))?;

    let camera_manager = CameraManager::from_config(&config.camera, config.window.aspect());
    let room = Room::default().assemble(camera_manager, &config.assets)?;

    let mut loader = AssetLoader::new(&config.assets.root, config.assets.chunk_size);
    for request in room.textures {
        loader.request(request)?;
    }
    info!(
        "Queued {} texture loads from {}",
        loader.in_flight(),
        loader.root().display()
    );

    Ok(SceneHandle {
        event_loop,
        host: AppHost {
            config,
            window: None,
            render_engine: None,
            scene: room.scene,
            objects: room.objects,
            loader,
            render_loop: RenderLoop::new(),
            fatal: None,
        },
    })
}

impl SceneHandle {
    pub fn scene(&self) -> &Scene {
        &self.host.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.host.scene
    }

    /// Node ids of everything the room placed
    pub fn objects(&self) -> &RoomObjects {
        &self.host.objects
    }

    /// Opens the window and renders until it is closed
    pub fn run(self) -> Result<()> {
        let SceneHandle {
            event_loop,
            mut host,
        } = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut host)
            .map_err(|e| SceneError::SurfaceUnavailable(e.to_string()))?;

        match host.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppHost {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SceneError) {
        error!("{}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for AppHost {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, SceneError::SurfaceUnavailable(e.to_string()));
                return;
            }
        };

        let PhysicalSize { width, height } = window.inner_size();
        let render = self.config.render.clone();
        let target = window.clone();
        let engine = pollster::block_on(async move {
            RenderEngine::new(target, width, height, &render).await
        });
        match engine {
            Ok(engine) => {
                self.scene.camera_manager.resize(width, height);
                self.render_engine = Some(engine);
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.scene.camera_manager.process_keyboard_event(&event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width > 0 && height > 0 {
                    self.scene.camera_manager.resize(width, height);
                }
                render_engine.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self
                    .render_loop
                    .step(&mut self.scene, &mut self.loader, render_engine)
                {
                    self.fail(event_loop, e);
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        self.scene.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
