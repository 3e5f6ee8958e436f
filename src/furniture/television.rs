use std::path::PathBuf;

use super::Archetype;
use crate::{
    error::Result,
    gfx::{
        resources::material::MaterialDesc,
        scene::{Light, NodeId, Scene, Shape, Transform},
    },
};

/// Flat-screen set: a dark body, a faintly glowing screen on its back face
/// and a point light above
#[derive(Debug, Clone, PartialEq)]
pub struct Television {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub color: u32,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Screen offset from the body centre along local Z
    pub screen_z: f32,
    pub screen_glow: f32,
    pub light_color: u32,
    pub light_intensity: f32,
    pub light_range: f32,
    pub light_height: f32,
    /// Image shown on the screen once it loads
    pub screen_map: Option<PathBuf>,
}

impl Default for Television {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 1.25,
            depth: 0.10,
            color: 0x242124,
            screen_width: 1.85,
            screen_height: 1.05,
            screen_z: -0.051,
            screen_glow: 0.05,
            light_color: 0xffffff,
            light_intensity: 1.0,
            light_range: 10.0,
            light_height: 1.0,
            screen_map: None,
        }
    }
}

impl Television {
    /// Material the screen texture is loaded into
    pub const SCREEN_MATERIAL: &'static str = "tv_screen";
}

impl Archetype for Television {
    const NAME: &'static str = "television";

    fn build_parts(&self, scene: &mut Scene, root: NodeId) -> Result<()> {
        let body_mat = scene.add_material("tv_body", &MaterialDesc::phong(self.color));
        let mut screen_desc = MaterialDesc::phong(0xffffff)
            .double_sided()
            .with_emissive(0xffffff, self.screen_glow);
        if let Some(map) = &self.screen_map {
            screen_desc = screen_desc.with_map(map);
        }
        let screen_mat = scene.add_material(Self::SCREEN_MATERIAL, &screen_desc);

        let body = scene.add_primitive(
            Some(root),
            "body",
            Shape::cuboid(self.width, self.height, self.depth),
            &body_mat,
            Transform::identity(),
        )?;
        scene.add_primitive(
            Some(body),
            "screen",
            Shape::plane(self.screen_width, self.screen_height),
            &screen_mat,
            Transform::from_translation(0.0, 0.0, self.screen_z),
        )?;
        scene.add_light(
            Some(body),
            "screen_light",
            Light::point(self.light_color, self.light_intensity, self.light_range),
            Transform::from_translation(0.0, self.light_height, 0.0),
        )?;
        Ok(())
    }
}
