use std::sync::Arc;

use cgmath::{InnerSpace, Matrix4, MetricSpace, Point3, Transform as _, Vector3};

use crate::{
    assets::{TextureImage, TextureTarget},
    error::{Result, SceneError},
    gfx::{
        camera::camera_utils::CameraManager,
        resources::material::{Material, MaterialDesc, MaterialId, MaterialManager},
        scene::{
            graph::{NodeId, NodeKind, SceneGraph, Transform},
            light::{Light, LightKind},
            primitive::{Primitive, Shape},
        },
    },
};

/// Main scene containing the node hierarchy, materials and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub graph: SceneGraph,
    pub material_manager: MaterialManager, // Centralized material storage
}

/// A mesh ready to be drawn this frame
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub node: NodeId,
    pub primitive: &'a Primitive,
    pub material: &'a Material,
    pub world: Matrix4<f32>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// A light resolved to world space
#[derive(Debug, Clone, Copy)]
pub struct PlacedLight {
    pub node: NodeId,
    pub light: Light,
    pub position: Point3<f32>,
}

impl PlacedLight {
    /// Normalised direction the light travels, for directional lights
    pub fn direction(&self) -> Option<Vector3<f32>> {
        match self.light.kind {
            LightKind::Directional { target } => {
                let dir = target - self.position;
                (dir.magnitude2() > 0.0).then(|| dir.normalize())
            }
            LightKind::Point { .. } => None,
        }
    }
}

impl Scene {
    /// Creates a new scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            graph: SceneGraph::new(),
            material_manager: MaterialManager::new(),
        }
    }

    /// Advances the camera by one frame; true while it is still moving
    pub fn update(&mut self) -> bool {
        self.camera_manager.advance()
    }

    /// Registers a material under `name`
    pub fn add_material(&mut self, name: &str, desc: &MaterialDesc) -> MaterialId {
        self.material_manager.add_material(name, desc)
    }

    pub fn add_group(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        local: Transform,
    ) -> Result<NodeId> {
        self.graph.add_node(parent, name, local, NodeKind::Group)
    }

    /// Validates `shape` and adds it as a mesh node drawn with `material`
    pub fn add_primitive(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        shape: Shape,
        material: &str,
        local: Transform,
    ) -> Result<NodeId> {
        let primitive = Primitive::new(shape, material)?;
        self.graph
            .add_node(parent, name, local, NodeKind::Mesh(primitive))
    }

    pub fn add_light(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        light: Light,
        local: Transform,
    ) -> Result<NodeId> {
        self.graph.add_node(parent, name, local, NodeKind::Light(light))
    }

    /// Gets material for rendering a node
    ///
    /// Returns the default material if the node has no mesh or its material
    /// doesn't exist.
    pub fn get_material_for_node(&self, node: NodeId) -> &Material {
        let id = self
            .graph
            .get(node)
            .ok()
            .and_then(|n| n.primitive())
            .map(|p| p.material());
        self.material_manager.get_material_for_object(id)
    }

    /// Points a mesh node at another material
    pub fn rebind_material(&mut self, node: NodeId, material: &str) -> Result<()> {
        self.graph.primitive_mut(node)?.bind_material(material.to_string());
        Ok(())
    }

    /// Hands a loaded texture to its target
    ///
    /// Returns false when the target already showed this exact texture.
    pub fn apply_texture(
        &mut self,
        target: &TextureTarget,
        image: Arc<TextureImage>,
    ) -> Result<bool> {
        match target {
            TextureTarget::Map { material } => {
                let source = image.source.clone();
                let material = self
                    .material_manager
                    .get_material_mut(material)
                    .ok_or_else(|| {
                        SceneError::asset(source, format!("no material named '{material}'"))
                    })?;
                Ok(material.set_map(image))
            }
            TextureTarget::Rebind {
                nodes,
                material,
                desc,
            } => {
                for &node in nodes {
                    if self.graph.get(node)?.primitive().is_none() {
                        return Err(SceneError::UnknownNode(node));
                    }
                }
                let mut changed = self.set_map_creating(material, desc, image);
                for &node in nodes {
                    let primitive = self.graph.primitive_mut(node)?;
                    if primitive.material() != material.as_str() {
                        primitive.bind_material(material.clone());
                        changed = true;
                    }
                }
                Ok(changed)
            }
            TextureTarget::Decoration {
                parent,
                name,
                shape,
                offset,
                material,
                desc,
            } => {
                let exists = self
                    .graph
                    .get(*parent)?
                    .children()
                    .iter()
                    .any(|&child| self.graph.get(child).is_ok_and(|c| &c.name == name));
                let changed = self.set_map_creating(material, desc, image);
                if exists {
                    return Ok(changed);
                }
                self.add_primitive(Some(*parent), name, *shape, material, *offset)?;
                Ok(true)
            }
        }
    }

    fn set_map_creating(
        &mut self,
        material: &str,
        desc: &MaterialDesc,
        image: Arc<TextureImage>,
    ) -> bool {
        if self.material_manager.get_material(material).is_none() {
            self.material_manager.add_material(material, desc);
        }
        self.material_manager
            .get_material_mut(material)
            .is_some_and(|m| m.set_map(image))
    }

    /// Every mesh in draw order
    ///
    /// Opaque meshes come first in insertion order, then transparent meshes
    /// sorted back to front from the camera eye.
    pub fn draw_order(&self) -> Result<Vec<DrawItem<'_>>> {
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        for (node, primitive) in self.graph.meshes() {
            let material = self
                .material_manager
                .get_material_for_object(Some(primitive.material()));
            let item = DrawItem {
                node,
                primitive,
                material,
                world: self.graph.world_transform(node)?,
                cast_shadow: self.graph.casts_shadow(node),
                receive_shadow: self.graph.receives_shadow(node),
            };
            if material.is_transparent() {
                transparent.push(item);
            } else {
                opaque.push(item);
            }
        }

        let c = &self.camera_manager.camera.eye;
        let eye = Point3::new(c.x, c.y, c.z);
        let depth = |item: &DrawItem| {
            item.world
                .transform_point(Point3::new(0.0, 0.0, 0.0))
                .distance2(eye)
        };
        transparent.sort_by(|a, b| depth(b).total_cmp(&depth(a)));

        opaque.extend(transparent);
        Ok(opaque)
    }

    /// Every light with its world position
    pub fn lights(&self) -> Result<Vec<PlacedLight>> {
        self.graph
            .lights()
            .map(|(node, light)| {
                Ok(PlacedLight {
                    node,
                    light: *light,
                    position: self.graph.world_position(node)?,
                })
            })
            .collect()
    }

    /// Lists all available materials
    pub fn list_materials(&self) -> Vec<&String> {
        self.material_manager.list_materials()
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let (total_triangles, total_vertices) = self
            .graph
            .meshes()
            .map(|(_, p)| (p.geometry().triangle_count(), p.geometry().vertex_count()))
            .fold((0, 0), |(t, v), (dt, dv)| (t + dt, v + dv));

        SceneStatistics {
            node_count: self.graph.len(),
            mesh_count: self.graph.meshes().count(),
            light_count: self.graph.lights().count(),
            material_count: self.material_manager.len(),
            total_triangles,
            total_vertices,
        }
    }
}

/// Scene statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub mesh_count: usize,
    pub light_count: usize,
    pub material_count: usize,
    pub total_triangles: usize,
    pub total_vertices: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn scene() -> Scene {
        Scene::new(CameraManager::from_config(&CameraConfig::default(), 1.5))
    }

    fn image(rgba: [u8; 4]) -> Arc<TextureImage> {
        Arc::new(TextureImage::new("img/test.png", 1, 1, rgba.to_vec()))
    }

    #[test]
    fn transparent_meshes_draw_last_back_to_front() {
        let mut scene = scene();
        scene.add_material("glass", &MaterialDesc::phong(0xffffff).with_opacity(0.5));
        scene.add_material("wood", &MaterialDesc::phong(0x987654));

        let sphere = Shape::sphere(0.1, 8, 6);
        // camera sits at (0, 5, 5)
        let near = scene
            .add_primitive(
                None,
                "near",
                sphere,
                "glass",
                Transform::from_translation(0.0, 2.0, 2.0),
            )
            .unwrap();
        let solid = scene
            .add_primitive(None, "solid", sphere, "wood", Transform::identity())
            .unwrap();
        let far = scene
            .add_primitive(
                None,
                "far",
                sphere,
                "glass",
                Transform::from_translation(0.0, 0.0, -3.0),
            )
            .unwrap();

        let order: Vec<_> = scene.draw_order().unwrap().iter().map(|d| d.node).collect();
        assert_eq!(order, vec![solid, far, near]);
    }

    #[test]
    fn map_target_requires_material() {
        let mut scene = scene();
        let err = scene
            .apply_texture(&TextureTarget::Map { material: "missing".into() }, image([0; 4]))
            .unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn rebind_rejects_non_mesh_nodes_without_side_effects() {
        let mut scene = scene();
        let group = scene.add_group(None, "walls", Transform::identity()).unwrap();
        let target = TextureTarget::Rebind {
            nodes: vec![group],
            material: "wall".into(),
            desc: MaterialDesc::phong(0xffffff),
        };
        assert_eq!(
            scene.apply_texture(&target, image([1; 4])),
            Err(SceneError::UnknownNode(group))
        );
        assert!(scene.material_manager.get_material("wall").is_none());
    }

    #[test]
    fn decoration_is_attached_once() {
        let mut scene = scene();
        let wall = scene
            .add_primitive(
                None,
                "wall",
                Shape::cuboid(4.0, 4.0, 0.15),
                "default",
                Transform::identity(),
            )
            .unwrap();
        let target = TextureTarget::Decoration {
            parent: wall,
            name: "picture".into(),
            shape: Shape::plane(2.0, 2.0),
            offset: Transform::from_translation(0.0, 0.0, 0.08),
            material: "picture".into(),
            desc: MaterialDesc::phong(0xffffff).double_sided(),
        };
        assert_eq!(scene.apply_texture(&target, image([3; 4])), Ok(true));
        assert_eq!(scene.apply_texture(&target, image([3; 4])), Ok(false));
        assert_eq!(scene.graph.get(wall).unwrap().children().len(), 1);
    }

    #[test]
    fn directional_light_points_at_target() {
        let mut scene = scene();
        scene
            .add_light(
                None,
                "sun",
                Light::directional(0xabcdef, 0.25, Point3::new(0.0, 0.0, 0.0)),
                Transform::from_translation(-2.5, -1.0, -2.5),
            )
            .unwrap();
        let lights = scene.lights().unwrap();
        let dir = lights[0].direction().unwrap();
        assert!((dir.magnitude() - 1.0).abs() < 1e-5);
        assert!(dir.x > 0.0 && dir.y > 0.0 && dir.z > 0.0);
        assert_eq!(scene.get_statistics().light_count, 1);
    }
}
