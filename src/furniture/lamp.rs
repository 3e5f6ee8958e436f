use super::{Archetype, CURVE_SEGMENTS};
use crate::{
    error::Result,
    gfx::{
        resources::material::MaterialDesc,
        scene::{Light, NodeId, Scene, Shape, Transform},
    },
};

/// Floor lamp: a tall stand, a glowing shade, and a bulb with a point light inside the shade
#[derive(Debug, Clone, PartialEq)]
pub struct Lamp {
    pub stand_radius_top: f32,
    pub stand_radius_bottom: f32,
    pub stand_height: f32,
    pub stand_y: f32,
    pub stand_color: u32,
    pub shade_radius_top: f32,
    pub shade_radius_bottom: f32,
    pub shade_height: f32,
    pub shade_y: f32,
    pub shade_color: u32,
    pub shade_glow: f32,
    pub bulb_radius: f32,
    pub light_color: u32,
    pub light_intensity: f32,
    pub light_range: f32,
}

impl Default for Lamp {
    fn default() -> Self {
        Self {
            stand_radius_top: 0.05,
            stand_radius_bottom: 0.10,
            stand_height: 3.0,
            stand_y: 0.65,
            stand_color: 0x000039,
            shade_radius_top: 0.15,
            shade_radius_bottom: 0.35,
            shade_height: 0.5,
            shade_y: 1.85,
            shade_color: 0xb0c4de,
            shade_glow: 0.75,
            bulb_radius: 0.025,
            light_color: 0xe7feff,
            light_intensity: 1.0,
            light_range: 15.0,
        }
    }
}

impl Archetype for Lamp {
    const NAME: &'static str = "lamp";

    fn build_parts(&self, scene: &mut Scene, root: NodeId) -> Result<()> {
        let stand_mat = scene.add_material("lamp_stand", &MaterialDesc::phong(self.stand_color));
        let shade_mat = scene.add_material(
            "lamp_shade",
            &MaterialDesc::phong(self.shade_color)
                .double_sided()
                .with_emissive(self.shade_color, self.shade_glow),
        );
        let bulb_mat = scene.add_material("lamp_bulb", &MaterialDesc::phong(self.shade_color));

        scene.add_primitive(
            Some(root),
            "stand",
            Shape::cylinder(
                self.stand_radius_top,
                self.stand_radius_bottom,
                self.stand_height,
                CURVE_SEGMENTS,
            ),
            &stand_mat,
            Transform::from_translation(0.0, self.stand_y, 0.0),
        )?;

        let shade = scene.add_primitive(
            Some(root),
            "shade",
            Shape::cylinder(
                self.shade_radius_top,
                self.shade_radius_bottom,
                self.shade_height,
                CURVE_SEGMENTS,
            ),
            &shade_mat,
            Transform::from_translation(0.0, self.shade_y, 0.0),
        )?;

        scene.add_primitive(
            Some(shade),
            "bulb",
            Shape::sphere(self.bulb_radius, CURVE_SEGMENTS, CURVE_SEGMENTS),
            &bulb_mat,
            Transform::identity(),
        )?;
        scene.add_light(
            Some(shade),
            "bulb_light",
            Light::point(self.light_color, self.light_intensity, self.light_range),
            Transform::identity(),
        )?;
        Ok(())
    }
}
