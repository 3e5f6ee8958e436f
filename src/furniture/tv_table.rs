use super::{corner_footprint, Archetype, CornerInsets};
use crate::{
    error::Result,
    gfx::{
        resources::material::MaterialDesc,
        scene::{NodeId, Scene, Shape, Transform},
    },
};

/// Low wooden bench the television stands on
#[derive(Debug, Clone, PartialEq)]
pub struct TvTable {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub top_y: f32,
    pub leg_width: f32,
    pub leg_height: f32,
    pub leg_depth: f32,
    pub color: u32,
}

impl Default for TvTable {
    fn default() -> Self {
        Self {
            width: 2.5,
            height: 0.10,
            depth: 0.75,
            top_y: 0.05,
            leg_width: 0.1,
            leg_height: 0.15,
            leg_depth: 0.1,
            color: 0x987654,
        }
    }
}

impl TvTable {
    /// Legs are inset by half a leg width so they end flush with the top
    pub fn leg_footprint(&self) -> [[f32; 2]; 4] {
        corner_footprint(
            self.width,
            self.depth,
            CornerInsets::uniform(self.leg_width / 2.0),
        )
    }
}

impl Archetype for TvTable {
    const NAME: &'static str = "tv_table";

    fn build_parts(&self, scene: &mut Scene, root: NodeId) -> Result<()> {
        let wood = scene.add_material("tv_table_wood", &MaterialDesc::phong(self.color));

        scene.add_primitive(
            Some(root),
            "top",
            Shape::cuboid(self.width, self.height, self.depth),
            &wood,
            Transform::from_translation(0.0, self.top_y, 0.0),
        )?;

        let legs = scene.add_group(Some(root), "legs", Transform::identity())?;
        let leg = Shape::cuboid(self.leg_width, self.leg_height, self.leg_depth);
        for (i, [x, z]) in self.leg_footprint().into_iter().enumerate() {
            scene.add_primitive(
                Some(legs),
                &format!("leg_{i}"),
                leg,
                &wood,
                Transform::from_translation(x, -self.leg_height / 2.0, z),
            )?;
        }
        Ok(())
    }
}
