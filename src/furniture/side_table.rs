use super::{ring_footprint, Archetype, CURVE_SEGMENTS};
use crate::{
    error::Result,
    gfx::{
        resources::material::MaterialDesc,
        scene::{NodeId, Scene, Shape, Transform},
    },
};

/// Round glass-topped table on a ring of legs
#[derive(Debug, Clone, PartialEq)]
pub struct SideTable {
    pub top_radius: f32,
    pub top_height: f32,
    pub top_y: f32,
    pub top_color: u32,
    pub top_opacity: f32,
    pub leg_count: usize,
    pub leg_radius: f32,
    pub leg_height: f32,
    /// Leg ring radius as a fraction of the top radius
    pub leg_spread: f32,
    /// Height the legs hang from
    pub leg_top_y: f32,
    pub leg_color: u32,
}

impl Default for SideTable {
    fn default() -> Self {
        Self {
            top_radius: 0.75,
            top_height: 0.05,
            top_y: -0.33,
            top_color: 0x18453b,
            top_opacity: 0.75,
            leg_count: 4,
            leg_radius: 0.04,
            leg_height: 0.5,
            leg_spread: 0.8,
            leg_top_y: -0.35,
            leg_color: 0x987654,
        }
    }
}

impl Archetype for SideTable {
    const NAME: &'static str = "side_table";

    fn build_parts(&self, scene: &mut Scene, root: NodeId) -> Result<()> {
        let top_mat = scene.add_material(
            "side_table_top",
            &MaterialDesc::unlit(self.top_color)
                .with_opacity(self.top_opacity)
                .double_sided(),
        );
        let leg_mat = scene.add_material("side_table_leg", &MaterialDesc::phong(self.leg_color));

        scene.add_primitive(
            Some(root),
            "top",
            Shape::cylinder(self.top_radius, self.top_radius, self.top_height, CURVE_SEGMENTS),
            &top_mat,
            Transform::from_translation(0.0, self.top_y, 0.0),
        )?;

        let legs = scene.add_group(Some(root), "legs", Transform::identity())?;
        let leg_y = self.leg_top_y - self.leg_height / 2.0;
        let leg = Shape::cylinder(
            self.leg_radius,
            self.leg_radius,
            self.leg_height,
            CURVE_SEGMENTS,
        );
        for (i, [x, z]) in ring_footprint(self.leg_count, self.top_radius * self.leg_spread)
            .into_iter()
            .enumerate()
        {
            scene.add_primitive(
                Some(legs),
                &format!("leg_{i}"),
                leg,
                &leg_mat,
                Transform::from_translation(x, leg_y, z),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::furniture::test_support::{assert_at, child, scene};

    #[test]
    fn legs_sit_on_the_ring_below_the_top() {
        let mut scene = scene();
        let table = SideTable::default().build(&mut scene).unwrap();
        let legs = child(&scene, table, "legs");
        let ids = scene.graph.get(legs).unwrap().children().to_vec();
        assert_eq!(ids.len(), 4);

        let expected = [[0.6, 0.0], [0.0, 0.6], [-0.6, 0.0], [0.0, -0.6]];
        for (id, [x, z]) in ids.into_iter().zip(expected) {
            assert_at(&scene, id, [x, -0.6, z]);
        }
    }

    #[test]
    fn top_is_translucent_and_unlit() {
        let mut scene = scene();
        let table = SideTable::default().build(&mut scene).unwrap();
        let top = scene.get_material_for_node(child(&scene, table, "top"));
        assert!(top.is_transparent());
        assert_eq!(top.alpha(), 0.75);
        assert_eq!(
            top.shading,
            crate::gfx::resources::material::Shading::Unlit
        );
    }

    #[test]
    fn legs_fit_under_the_top() {
        let table = SideTable::default();
        let reach = table.top_radius * table.leg_spread + table.leg_radius;
        assert!(reach < table.top_radius);
    }
}
