//! Application configuration
//!
//! Plain structs with defaults for the living room, overridable through a few
//! environment variables.

use std::path::PathBuf;

use cgmath::Point3;

use crate::assets::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    /// Defaults with `PARLOUR_ASSET_DIR` and `PARLOUR_VSYNC` applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `var`
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = var("PARLOUR_ASSET_DIR").filter(|s| !s.is_empty()) {
            self.assets.root = PathBuf::from(root);
        }
        if let Some(vsync) = var("PARLOUR_VSYNC") {
            self.render.vsync = !matches!(vsync.trim(), "0" | "false" | "off");
        }
        self
    }

    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_assets(mut self, assets: AssetConfig) -> Self {
        self.assets = assets;
        self
    }
}

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Parlour".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

impl WindowConfig {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Perspective camera and orbit controls
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub enable_damping: bool,
    /// Fraction of the remaining motion applied per frame
    pub damping_factor: f32,
    pub enable_zoom: bool,
    pub screen_space_panning: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Point3::new(0.0, 5.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            enable_damping: true,
            damping_factor: 0.25,
            enable_zoom: true,
            screen_space_panning: false,
            rotate_speed: 0.005,
            zoom_speed: 0.5,
            pan_speed: 0.01,
            min_distance: 0.5,
            max_distance: 50.0,
        }
    }
}

/// Texture files, relative to `root`
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub carpet: PathBuf,
    pub floor: PathBuf,
    pub wall: PathBuf,
    pub wall_picture: PathBuf,
    pub tv_screen: PathBuf,
    /// Bytes read per frame for each in-flight texture
    pub chunk_size: usize,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            carpet: PathBuf::from("img/green_carpet.jpg"),
            floor: PathBuf::from("img/blue_floor.jpg"),
            wall: PathBuf::from("img/green_wall.jpg"),
            wall_picture: PathBuf::from("img/MCpic_skull.png"),
            tv_screen: PathBuf::from("img/tv_screen.png"),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub clear_color: wgpu::Color,
    pub vsync: bool,
    /// Point lights beyond this count are ignored by the shader
    pub max_point_lights: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            vsync: true,
            max_point_lights: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_room() {
        let config = AppConfig::default();
        assert_eq!(config.window.aspect(), 1.5);
        assert_eq!(config.camera.fov_y_degrees, 75.0);
        assert_eq!(config.camera.position, Point3::new(0.0, 5.0, 5.0));
        assert!(config.render.vsync);
    }

    #[test]
    fn overrides_apply_only_when_set() {
        let config = AppConfig::default().with_overrides(env(&[]));
        assert_eq!(config.assets.root, PathBuf::from("assets"));

        let config = AppConfig::default()
            .with_overrides(env(&[("PARLOUR_ASSET_DIR", "/srv/room"), ("PARLOUR_VSYNC", "0")]));
        assert_eq!(config.assets.root, PathBuf::from("/srv/room"));
        assert!(!config.render.vsync);
    }
}
