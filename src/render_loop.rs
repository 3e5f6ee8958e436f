//! Frame-driven redraw of the scene
//!
//! [`RenderLoop::step`] runs once per display refresh. It never waits on
//! texture loads: whatever finished since the last frame is applied, the
//! camera advances, and the scene is drawn in its current state.

use log::{debug, info};

use crate::{
    assets::{AssetLoader, PumpReport},
    error::Result,
    gfx::scene::{Scene, ShadowSettings},
};

/// What the loop needs from a rasterizer
pub trait RenderSurface {
    /// Sets up the shadow map for a shadow-casting light
    fn configure_shadows(&mut self, settings: &ShadowSettings);

    fn resize(&mut self, width: u32, height: u32);

    /// Draws the whole scene graph from the current camera
    fn draw(&mut self, scene: &Scene) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Before the first frame
    #[default]
    Idle,
    Running { frames: u64 },
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    state: LoopState,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        match self.state {
            LoopState::Idle => 0,
            LoopState::Running { frames } => frames,
        }
    }

    /// Draws one frame
    ///
    /// Texture failures are reported in the returned [`PumpReport`] and never
    /// stop the loop; only surface errors propagate.
    pub fn step(
        &mut self,
        scene: &mut Scene,
        loader: &mut AssetLoader,
        surface: &mut impl RenderSurface,
    ) -> Result<PumpReport> {
        if self.state == LoopState::Idle {
            for placed in scene.lights()? {
                if placed.light.cast_shadow {
                    surface.configure_shadows(&placed.light.shadow);
                }
            }
            info!("Render loop running");
            self.state = LoopState::Running { frames: 0 };
        }

        let report = loader.pump(scene);
        if report.applied > 0 || report.failed > 0 {
            debug!(
                "Frame {}: {} textures applied, {} failed, {} in flight",
                self.frames(),
                report.applied,
                report.failed,
                report.in_flight
            );
        }

        scene.update();
        surface.draw(scene)?;

        if let LoopState::Running { frames } = &mut self.state {
            *frames += 1;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::{test_support::TempDir, TextureRequest},
        config::{AssetConfig, CameraConfig},
        error::SceneError,
        gfx::camera::CameraManager,
        room::Room,
    };

    #[derive(Default)]
    struct RecordingSurface {
        shadow_configs: Vec<ShadowSettings>,
        /// Number of textured materials seen by each draw
        frames: Vec<usize>,
        fail_on_frame: Option<usize>,
    }

    impl RenderSurface for RecordingSurface {
        fn configure_shadows(&mut self, settings: &ShadowSettings) {
            self.shadow_configs.push(*settings);
        }

        fn resize(&mut self, _width: u32, _height: u32) {}

        fn draw(&mut self, scene: &Scene) -> Result<()> {
            if self.fail_on_frame == Some(self.frames.len()) {
                return Err(SceneError::SurfaceUnavailable("device lost".into()));
            }
            scene.draw_order()?;
            let textured = scene
                .material_manager
                .iter()
                .filter(|(_, m)| m.map().is_some())
                .count();
            self.frames.push(textured);
            Ok(())
        }
    }

    fn camera() -> CameraManager {
        CameraManager::from_config(&CameraConfig::default(), 1.5)
    }

    #[test]
    fn first_step_leaves_idle_and_configures_the_sun() {
        let mut scene = Room::default()
            .assemble(camera(), &AssetConfig::default())
            .unwrap()
            .scene;
        let mut loader = AssetLoader::new("unused", 64);
        let mut surface = RecordingSurface::default();
        let mut render_loop = RenderLoop::new();
        assert_eq!(render_loop.state(), LoopState::Idle);

        render_loop.step(&mut scene, &mut loader, &mut surface).unwrap();
        render_loop.step(&mut scene, &mut loader, &mut surface).unwrap();
        assert_eq!(render_loop.state(), LoopState::Running { frames: 2 });
        assert_eq!(surface.shadow_configs.len(), 1);
        assert_eq!(surface.shadow_configs[0].map_size, 1024);
    }

    #[test]
    fn draws_untextured_scene_while_loads_are_pending() {
        let dir = TempDir::new("loop-pending");
        let assets = AssetConfig {
            root: dir.0.clone(),
            carpet: "img/carpet.png".into(),
            ..Default::default()
        };
        dir.write_png("img/carpet.png", 8, [20, 120, 20, 255]);

        let mut room = Room::default().assemble(camera(), &assets).unwrap();
        let mut loader = AssetLoader::new(&assets.root, 16);
        for request in room.textures.drain(..) {
            loader.request(request).unwrap();
        }

        let mut surface = RecordingSurface::default();
        let mut render_loop = RenderLoop::new();
        let first = render_loop
            .step(&mut room.scene, &mut loader, &mut surface)
            .unwrap();
        assert_eq!(surface.frames[0], 0);
        assert!(first.in_flight > 0);

        let mut failed = first.failed;
        while !loader.is_idle() {
            failed += render_loop
                .step(&mut room.scene, &mut loader, &mut surface)
                .unwrap()
                .failed;
        }
        // only the carpet exists on disk; every other load fails quietly
        assert_eq!(failed, 4);
        assert_eq!(surface.frames.last(), Some(&1));
        assert!(surface.frames.windows(2).all(|w| w[0] <= w[1]));

        render_loop
            .step(&mut room.scene, &mut loader, &mut surface)
            .unwrap();
        assert_eq!(render_loop.frames(), surface.frames.len() as u64);
    }

    #[test]
    fn failed_load_keeps_the_loop_running() {
        let mut room = Room::default()
            .assemble(camera(), &AssetConfig::default())
            .unwrap();
        let mut loader = AssetLoader::new("/nonexistent/parlour", 64);
        loader
            .request(TextureRequest::map("missing.png", "tv_screen"))
            .unwrap();

        let mut surface = RecordingSurface::default();
        let mut render_loop = RenderLoop::new();
        let report = render_loop
            .step(&mut room.scene, &mut loader, &mut surface)
            .unwrap();
        assert_eq!(report.failed, 1);
        render_loop
            .step(&mut room.scene, &mut loader, &mut surface)
            .unwrap();
        assert_eq!(render_loop.frames(), 2);
        assert!(room
            .scene
            .material_manager
            .get_material("tv_screen")
            .is_some_and(|m| m.map().is_none()));
    }

    #[test]
    fn surface_errors_propagate() {
        let mut scene = Scene::new(camera());
        let mut loader = AssetLoader::new("unused", 64);
        let mut surface = RecordingSurface {
            fail_on_frame: Some(1),
            ..Default::default()
        };
        let mut render_loop = RenderLoop::new();
        render_loop.step(&mut scene, &mut loader, &mut surface).unwrap();
        let err = render_loop
            .step(&mut scene, &mut loader, &mut surface)
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(render_loop.frames(), 1);
    }
}
