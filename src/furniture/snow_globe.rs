use super::{Archetype, CURVE_SEGMENTS};
use crate::{
    error::Result,
    gfx::{
        resources::material::MaterialDesc,
        scene::{Light, NodeId, Scene, Shape, Transform},
    },
};

/// Glass globe on a stand with a glowing core and a small point light
#[derive(Debug, Clone, PartialEq)]
pub struct SnowGlobe {
    pub globe_radius: f32,
    pub globe_color: u32,
    pub globe_opacity: f32,
    pub base_radius_top: f32,
    pub base_radius_bottom: f32,
    pub base_height: f32,
    pub base_y: f32,
    pub base_color: u32,
    pub core_radius: f32,
    pub core_glow: f32,
    pub light_color: u32,
    pub light_intensity: f32,
    pub light_range: f32,
}

impl Default for SnowGlobe {
    fn default() -> Self {
        Self {
            globe_radius: 0.15,
            globe_color: 0xb0c4de,
            globe_opacity: 0.5,
            base_radius_top: 0.10,
            base_radius_bottom: 0.15,
            base_height: 0.10,
            base_y: -0.15,
            base_color: 0x000039,
            core_radius: 0.10,
            core_glow: 1.0,
            light_color: 0xe7feff,
            light_intensity: 1.0,
            light_range: 5.0,
        }
    }
}

impl Archetype for SnowGlobe {
    const NAME: &'static str = "snow_globe";

    fn build_parts(&self, scene: &mut Scene, root: NodeId) -> Result<()> {
        let glass = scene.add_material(
            "snow_globe_glass",
            &MaterialDesc::phong(self.globe_color).with_opacity(self.globe_opacity),
        );
        let base_mat = scene.add_material("snow_globe_base", &MaterialDesc::phong(self.base_color));
        let core_mat = scene.add_material(
            "snow_globe_core",
            &MaterialDesc::phong(self.globe_color)
                .double_sided()
                .with_emissive(self.globe_color, self.core_glow),
        );

        let globe = scene.add_primitive(
            Some(root),
            "globe",
            Shape::sphere(self.globe_radius, CURVE_SEGMENTS, CURVE_SEGMENTS),
            &glass,
            Transform::identity(),
        )?;
        scene.add_primitive(
            Some(root),
            "base",
            Shape::cylinder(
                self.base_radius_top,
                self.base_radius_bottom,
                self.base_height,
                CURVE_SEGMENTS,
            ),
            &base_mat,
            Transform::from_translation(0.0, self.base_y, 0.0),
        )?;

        scene.add_primitive(
            Some(globe),
            "core",
            Shape::sphere(self.core_radius, CURVE_SEGMENTS, CURVE_SEGMENTS),
            &core_mat,
            Transform::identity(),
        )?;
        scene.add_light(
            Some(globe),
            "core_light",
            Light::point(self.light_color, self.light_intensity, self.light_range),
            Transform::identity(),
        )?;
        Ok(())
    }
}
