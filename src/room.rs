//! # Living room assembly
//!
//! Places every piece of furniture, the carpet, floor, two walls and the
//! sun light, and lists the textures that should be streamed in afterwards.

use std::f32::consts::FRAC_PI_2;

use cgmath::Point3;
use log::info;

use crate::{
    assets::TextureRequest,
    config::AssetConfig,
    error::{Result, SceneError},
    furniture::{Archetype, Couch, Lamp, SideTable, SnowGlobe, Television, TvTable},
    gfx::{
        camera::CameraManager,
        resources::material::MaterialDesc,
        scene::{Light, NodeId, Scene, ShadowSettings, Shape, Transform},
    },
};

/// Where each piece goes
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    pub lamp: Transform,
    pub side_table: Transform,
    pub couch: Transform,
    pub tv_table: Transform,
    pub snow_globe: Transform,
    pub television: Transform,
    pub carpet_radius: f32,
    pub carpet_segments: u32,
    pub carpet_y: f32,
}

impl Default for RoomLayout {
    fn default() -> Self {
        Self {
            lamp: Transform::from_translation(-1.5, 0.0, -1.5),
            side_table: Transform::identity(),
            couch: Transform::from_translation(-1.4, -0.70, 0.0).with_rotation_y(FRAC_PI_2),
            tv_table: Transform::from_translation(1.4, -0.70, 0.0).with_rotation_y(FRAC_PI_2),
            snow_globe: Transform::from_translation(0.0, -0.10, 0.0),
            television: Transform::from_translation(1.35, 0.0, 0.0).with_rotation_y(FRAC_PI_2),
            carpet_radius: 1.65,
            carpet_segments: 32,
            carpet_y: -0.84,
        }
    }
}

/// Floor slab and the two walls behind the furniture
#[derive(Debug, Clone, PartialEq)]
pub struct RoomShell {
    /// Edge length of the floor and of each wall
    pub size: f32,
    pub thickness: f32,
    pub floor_level: f32,
    /// Height of the wall centres
    pub wall_height_center: f32,
    pub color: u32,
}

impl Default for RoomShell {
    fn default() -> Self {
        Self {
            size: 4.0,
            thickness: 0.15,
            floor_level: -0.92,
            wall_height_center: 1.0,
            color: 0xffffcc,
        }
    }
}

impl RoomShell {
    pub fn validate(&self) -> Result<()> {
        for (parameter, value) in [("size", self.size), ("thickness", self.thickness)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SceneError::invalid("room shell", parameter, value));
            }
        }
        Ok(())
    }

    /// Distance from the room centre to each wall's centre plane
    ///
    /// Keeps the inner wall faces flush with the floor edges.
    pub fn wall_offset(&self) -> f32 {
        self.size / 2.0 + self.thickness / 2.0
    }

    fn floor_transform(&self) -> Transform {
        Transform::from_translation(0.0, self.floor_level, 0.0).with_rotation_x(-FRAC_PI_2)
    }

    fn back_wall_transform(&self) -> Transform {
        Transform::from_translation(0.0, self.wall_height_center, -self.wall_offset())
    }

    fn side_wall_transform(&self) -> Transform {
        Transform::from_translation(-self.wall_offset(), self.wall_height_center, 0.0)
            .with_rotation_y(FRAC_PI_2)
    }
}

/// Dim shadow-casting directional light
#[derive(Debug, Clone, PartialEq)]
pub struct SunLight {
    pub color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
    pub target: Point3<f32>,
    pub shadow: ShadowSettings,
}

impl Default for SunLight {
    fn default() -> Self {
        Self {
            color: 0xabcdef,
            intensity: 0.25,
            position: [-2.5, -1.0, -2.5],
            target: Point3::new(0.0, 0.0, 0.0),
            shadow: ShadowSettings {
                map_size: 1024,
                near: 0.5,
                far: 10.0,
                half_extent: 5.0,
            },
        }
    }
}

/// Everything that makes up the living room
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Room {
    pub layout: RoomLayout,
    pub shell: RoomShell,
    pub sun: SunLight,
    pub lamp: Lamp,
    pub side_table: SideTable,
    pub couch: Couch,
    pub tv_table: TvTable,
    pub snow_globe: SnowGlobe,
    pub television: Television,
}

/// Root nodes of everything the room placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomObjects {
    pub lamp: NodeId,
    pub side_table: NodeId,
    pub couch: NodeId,
    pub tv_table: NodeId,
    pub snow_globe: NodeId,
    pub television: NodeId,
    pub carpet: NodeId,
    pub floor: NodeId,
    pub back_wall: NodeId,
    pub side_wall: NodeId,
    pub sun: NodeId,
}

impl RoomObjects {
    /// The six furniture roots
    pub fn furniture(&self) -> [NodeId; 6] {
        [
            self.lamp,
            self.side_table,
            self.couch,
            self.tv_table,
            self.snow_globe,
            self.television,
        ]
    }
}

pub struct AssembledRoom {
    pub scene: Scene,
    pub objects: RoomObjects,
    /// Textures to stream in once the first frame is up
    pub textures: Vec<TextureRequest>,
}

pub const CARPET_MATERIAL: &str = "carpet";
pub const SHELL_MATERIAL: &str = "room_shell";
pub const FLOOR_TEXTURE_MATERIAL: &str = "floor_texture";
pub const WALL_TEXTURE_MATERIAL: &str = "wall_texture";
pub const WALL_PICTURE: &str = "wall_picture";

impl Room {
    /// Builds the complete scene
    ///
    /// Any invalid dimension aborts the build.
    pub fn assemble(
        &self,
        camera_manager: CameraManager,
        assets: &AssetConfig,
    ) -> Result<AssembledRoom> {
        self.shell.validate()?;
        let mut scene = Scene::new(camera_manager);

        let lamp = place(&mut scene, &self.lamp, self.layout.lamp)?;
        let side_table = place(&mut scene, &self.side_table, self.layout.side_table)?;
        let couch = place(&mut scene, &self.couch, self.layout.couch)?;
        let tv_table = place(&mut scene, &self.tv_table, self.layout.tv_table)?;
        let snow_globe = place(&mut scene, &self.snow_globe, self.layout.snow_globe)?;
        let tv = Television {
            screen_map: Some(
                self.television
                    .screen_map
                    .clone()
                    .unwrap_or_else(|| assets.tv_screen.clone()),
            ),
            ..self.television.clone()
        };
        let television = place(&mut scene, &tv, self.layout.television)?;

        let carpet_mat = scene.add_material(
            CARPET_MATERIAL,
            &MaterialDesc::phong(0xffffff)
                .double_sided()
                .with_map(&assets.carpet),
        );
        let carpet = scene.add_primitive(
            None,
            "carpet",
            Shape::disc(self.layout.carpet_radius, self.layout.carpet_segments),
            &carpet_mat,
            Transform::from_translation(0.0, self.layout.carpet_y, 0.0).with_rotation_x(-FRAC_PI_2),
        )?;

        let shell_mat = scene.add_material(SHELL_MATERIAL, &MaterialDesc::phong(self.shell.color));
        let slab = Shape::cuboid(self.shell.size, self.shell.size, self.shell.thickness);
        let shell = &self.shell;
        let floor = scene.add_primitive(None, "floor", slab, &shell_mat, shell.floor_transform())?;
        let back_wall =
            scene.add_primitive(None, "back_wall", slab, &shell_mat, shell.back_wall_transform())?;
        let side_wall =
            scene.add_primitive(None, "side_wall", slab, &shell_mat, shell.side_wall_transform())?;
        for surface in [floor, back_wall, side_wall] {
            scene.graph.set_shadow_flags(surface, false, true)?;
        }

        let [x, y, z] = self.sun.position;
        let sun = scene.add_light(
            None,
            "sun",
            Light::directional(self.sun.color, self.sun.intensity, self.sun.target)
                .with_shadows(self.sun.shadow),
            Transform::from_translation(x, y, z),
        )?;

        // materials that name their own map load straight into it
        let mut textures: Vec<_> = scene
            .material_manager
            .unresolved_maps()
            .into_iter()
            .map(|(material, path)| TextureRequest::map(path, material))
            .collect();

        let textured = MaterialDesc::phong(0xffffff).with_opacity_hint(0.5);
        textures.extend([
            TextureRequest::rebind(
                &assets.floor,
                vec![floor],
                FLOOR_TEXTURE_MATERIAL,
                textured.clone(),
            ),
            TextureRequest::rebind(
                &assets.wall,
                vec![back_wall, side_wall],
                WALL_TEXTURE_MATERIAL,
                textured,
            ),
            TextureRequest::decoration(
                &assets.wall_picture,
                back_wall,
                WALL_PICTURE,
                Shape::plane(2.0, 2.0),
                Transform::from_translation(0.0, 0.0, 0.08),
                MaterialDesc::phong(0xffffff).double_sided(),
            ),
        ]);

        let stats = scene.get_statistics();
        info!(
            "Assembled room: {} nodes, {} meshes, {} lights, {} materials, {} triangles",
            stats.node_count,
            stats.mesh_count,
            stats.light_count,
            stats.material_count,
            stats.total_triangles
        );

        Ok(AssembledRoom {
            scene,
            objects: RoomObjects {
                lamp,
                side_table,
                couch,
                tv_table,
                snow_globe,
                television,
                carpet,
                floor,
                back_wall,
                side_wall,
                sun,
            },
            textures,
        })
    }
}

fn place<A: Archetype>(scene: &mut Scene, piece: &A, at: Transform) -> Result<NodeId> {
    let root = piece.build(scene)?;
    scene.graph.set_local_transform(root, at)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use cgmath::{Matrix4, Point3, Transform as _};

    use super::*;
    use crate::{
        assets::TextureTarget,
        config::CameraConfig,
        gfx::scene::{LightKind, NodeKind},
    };

    fn assemble(room: &Room) -> Result<AssembledRoom> {
        room.assemble(
            CameraManager::from_config(&CameraConfig::default(), 1.5),
            &AssetConfig::default(),
        )
    }

    /// World-space XZ bounds over every mesh vertex below `root`
    fn footprint(scene: &Scene, root: NodeId) -> ([f32; 2], [f32; 2]) {
        let mut lo = [f32::MAX; 2];
        let mut hi = [f32::MIN; 2];
        for id in scene.graph.descendants(root).unwrap() {
            let node = scene.graph.get(id).unwrap();
            let NodeKind::Mesh(primitive) = &node.kind else {
                continue;
            };
            let world: Matrix4<f32> = scene.graph.world_transform(id).unwrap();
            for v in &primitive.geometry().vertices {
                let p = world.transform_point(Point3::from(*v));
                lo = [lo[0].min(p.x), lo[1].min(p.z)];
                hi = [hi[0].max(p.x), hi[1].max(p.z)];
            }
        }
        (lo, hi)
    }

    #[test]
    fn default_room_assembles() {
        let room = assemble(&Room::default()).unwrap();
        let stats = room.scene.get_statistics();
        // sun, lamp bulb, globe core and tv
        assert_eq!(stats.light_count, 4);
        assert_eq!(room.textures.len(), 5);
        for id in room.objects.furniture() {
            assert!(room.scene.graph.casts_shadow(id));
            assert!(room.scene.graph.receives_shadow(id));
        }
        assert!(!room.scene.graph.casts_shadow(room.objects.floor));
        assert!(room.scene.graph.receives_shadow(room.objects.back_wall));
    }

    #[test]
    fn couch_and_tv_table_do_not_overlap() {
        let room = assemble(&Room::default()).unwrap();
        let (couch_lo, couch_hi) = footprint(&room.scene, room.objects.couch);
        let (tv_lo, tv_hi) = footprint(&room.scene, room.objects.tv_table);
        assert!(couch_hi[0] < tv_lo[0] || tv_hi[0] < couch_lo[0]);
    }

    #[test]
    fn furniture_stays_inside_the_walls() {
        let room = assemble(&Room::default()).unwrap();
        let half = room_half_size(&Room::default());
        for id in room.objects.furniture() {
            let (lo, hi) = footprint(&room.scene, id);
            assert!(lo[0] >= -half && lo[1] >= -half, "{lo:?}");
            assert!(hi[0] <= half && hi[1] <= half, "{hi:?}");
        }
    }

    fn room_half_size(room: &Room) -> f32 {
        room.shell.size / 2.0
    }

    #[test]
    fn walls_are_flush_with_the_floor() {
        let room = assemble(&Room::default()).unwrap();
        let shell = RoomShell::default();
        let (lo, hi) = footprint(&room.scene, room.objects.floor);
        assert!((lo[0] + 2.0).abs() < 1e-4 && (hi[1] - 2.0).abs() < 1e-4);

        let (wall_lo, wall_hi) = footprint(&room.scene, room.objects.back_wall);
        assert!((wall_hi[1] + shell.size / 2.0).abs() < 1e-4, "{wall_hi:?}");
        assert!((wall_lo[1] + shell.size / 2.0 + shell.thickness).abs() < 1e-4);

        let (side_lo, side_hi) = footprint(&room.scene, room.objects.side_wall);
        assert!((side_hi[0] + shell.size / 2.0).abs() < 1e-4);
        assert!((side_lo[1] + 2.0).abs() < 1e-4 && (side_hi[1] - 2.0).abs() < 1e-4);
    }

    #[test]
    fn carpet_lies_just_above_the_floor() {
        let room = assemble(&Room::default()).unwrap();
        let carpet_y = room.scene.graph.world_position(room.objects.carpet).unwrap().y;
        let floor_top = RoomShell::default().floor_level + RoomShell::default().thickness / 2.0;
        assert!(carpet_y > floor_top);
        assert!(carpet_y - floor_top < 0.01);
    }

    #[test]
    fn sun_casts_shadows_towards_the_origin() {
        let room = assemble(&Room::default()).unwrap();
        let sun = room.scene.graph.get(room.objects.sun).unwrap().light().copied().unwrap();
        assert!(sun.cast_shadow);
        assert_eq!(sun.shadow.map_size, 1024);
        assert!(matches!(sun.kind, LightKind::Directional { .. }));
    }

    #[test]
    fn texture_targets_cover_every_surface() {
        let room = assemble(&Room::default()).unwrap();
        let objects = room.objects;
        let targets: Vec<_> = room.textures.iter().map(|t| &t.target).collect();
        let maps: Vec<_> = targets[..2].iter().map(|t| t.material()).collect();
        assert_eq!(maps, [CARPET_MATERIAL, Television::SCREEN_MATERIAL]);
        assert!(targets[..2]
            .iter()
            .all(|t| matches!(t, TextureTarget::Map { .. })));
        assert!(matches!(
            targets[2],
            TextureTarget::Rebind { nodes, .. } if nodes == &vec![objects.floor]
        ));
        assert!(matches!(
            targets[3],
            TextureTarget::Rebind { nodes, material, .. }
                if nodes == &vec![objects.back_wall, objects.side_wall]
                    && material == WALL_TEXTURE_MATERIAL
        ));
        assert!(matches!(
            targets[4],
            TextureTarget::Decoration { parent, .. } if *parent == objects.back_wall
        ));
    }

    #[test]
    fn map_requests_come_from_material_maps() {
        let assets = AssetConfig {
            carpet: "rugs/red.png".into(),
            tv_screen: "screens/static.png".into(),
            ..AssetConfig::default()
        };
        let room = Room::default()
            .assemble(CameraManager::from_config(&CameraConfig::default(), 1.5), &assets)
            .unwrap();
        let maps: Vec<_> = room
            .textures
            .iter()
            .filter(|t| matches!(t.target, TextureTarget::Map { .. }))
            .map(|t| (t.target.material().to_string(), t.path.clone()))
            .collect();
        assert_eq!(
            maps,
            vec![
                (CARPET_MATERIAL.to_string(), "rugs/red.png".into()),
                (Television::SCREEN_MATERIAL.to_string(), "screens/static.png".into()),
            ]
        );

        let screen = room
            .scene
            .material_manager
            .get_material(Television::SCREEN_MATERIAL)
            .unwrap();
        assert_eq!(screen.map_source(), Some(std::path::Path::new("screens/static.png")));
    }

    #[test]
    fn bad_dimensions_abort_the_build() {
        let room = Room {
            shell: RoomShell {
                thickness: -0.1,
                ..RoomShell::default()
            },
            ..Room::default()
        };
        assert!(matches!(
            assemble(&room),
            Err(SceneError::InvalidGeometryParameter { parameter: "thickness", .. })
        ));

        let room = Room {
            couch: Couch {
                seat_width: 0.0,
                ..Couch::default()
            },
            ..Room::default()
        };
        assert!(assemble(&room).is_err());
    }
}
