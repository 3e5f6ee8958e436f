use super::{corner_footprint, Archetype, CornerInsets, CURVE_SEGMENTS};
use crate::{
    error::Result,
    gfx::{
        resources::material::MaterialDesc,
        scene::{NodeId, Scene, Shape, Transform},
    },
};

/// Seat, backrest along the rear edge, and four round legs
#[derive(Debug, Clone, PartialEq)]
pub struct Couch {
    pub seat_width: f32,
    pub seat_height: f32,
    pub seat_depth: f32,
    pub seat_y: f32,
    pub back_height: f32,
    pub back_depth: f32,
    pub back_y: f32,
    pub leg_radius: f32,
    pub leg_height: f32,
    /// Back legs reach `seat_depth / back_leg_divisor` behind the centre
    pub back_leg_divisor: f32,
    pub color: u32,
    pub leg_color: u32,
}

impl Default for Couch {
    fn default() -> Self {
        Self {
            seat_width: 2.25,
            seat_height: 0.25,
            seat_depth: 0.75,
            seat_y: 0.12,
            back_height: 0.75,
            back_depth: 0.25,
            back_y: 0.37,
            leg_radius: 0.09,
            leg_height: 0.15,
            back_leg_divisor: 1.55,
            color: 0x08457e,
            leg_color: 0x987654,
        }
    }
}

impl Couch {
    /// Leg positions in the couch frame
    pub fn leg_footprint(&self) -> [[f32; 2]; 4] {
        corner_footprint(
            self.seat_width,
            self.seat_depth,
            CornerInsets {
                back_reach: Some(self.seat_depth / self.back_leg_divisor),
                ..CornerInsets::uniform(self.leg_radius)
            },
        )
    }
}

impl Archetype for Couch {
    const NAME: &'static str = "couch";

    fn build_parts(&self, scene: &mut Scene, root: NodeId) -> Result<()> {
        let fabric = scene.add_material("couch_fabric", &MaterialDesc::phong(self.color));
        let wood = scene.add_material("couch_leg", &MaterialDesc::phong(self.leg_color));

        scene.add_primitive(
            Some(root),
            "seat",
            Shape::cuboid(self.seat_width, self.seat_height, self.seat_depth),
            &fabric,
            Transform::from_translation(0.0, self.seat_y, 0.0),
        )?;
        scene.add_primitive(
            Some(root),
            "back",
            Shape::cuboid(self.seat_width, self.back_height, self.back_depth),
            &fabric,
            Transform::from_translation(0.0, self.back_y, -self.seat_depth / 2.0),
        )?;

        let legs = scene.add_group(Some(root), "legs", Transform::identity())?;
        let leg = Shape::cylinder(
            self.leg_radius,
            self.leg_radius,
            self.leg_height,
            CURVE_SEGMENTS,
        );
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

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::furniture::test_support::{assert_at, child, scene};

    #[test]
    fn back_legs_sit_under_the_backrest() {
        let couch = Couch::default();
        let back_front_edge = -couch.seat_depth / 2.0 + couch.back_depth / 2.0;
        let back_rear_edge = -couch.seat_depth / 2.0 - couch.back_depth / 2.0;
        for [_, z] in &couch.leg_footprint()[2..] {
            assert!(*z < back_front_edge && *z > back_rear_edge, "{z}");
        }
    }

    #[test]
    fn legs_do_not_touch_each_other() {
        let couch = Couch::default();
        let legs = couch.leg_footprint();
        for i in 0..4 {
            for j in i + 1..4 {
                let dx = legs[i][0] - legs[j][0];
                let dz = legs[i][1] - legs[j][1];
                assert!((dx * dx + dz * dz).sqrt() > 2.0 * couch.leg_radius);
            }
        }
    }

    #[test]
    fn rotated_couch_faces_along_x() {
        let mut scene = scene();
        let couch = Couch::default().build(&mut scene).unwrap();
        scene
            .graph
            .set_local_transform(
                couch,
                Transform::from_translation(-1.4, -0.7, 0.0).with_rotation_y(FRAC_PI_2),
            )
            .unwrap();
        // backrest ends up against the -X wall side
        assert_at(&scene, child(&scene, couch, "back"), [-1.775, -0.33, 0.0]);
        assert_at(&scene, child(&scene, couch, "seat"), [-1.4, -0.58, 0.0]);
    }
}
