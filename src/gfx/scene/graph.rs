//! Arena-backed scene graph
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]. A node's
//! parent always precedes it in the arena, so the hierarchy is acyclic by
//! construction. World transforms are the product of local transforms along
//! the ancestor chain and are cached until a local transform in the chain
//! changes.

use std::cell::Cell;

use cgmath::{Euler, Matrix4, Point3, Rad, SquareMatrix, Transform as _, Vector3};

use crate::{
    error::{Result, SceneError},
    gfx::scene::{light::Light, primitive::Primitive},
};

/// Index of a node inside a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Local placement of a node relative to its parent
///
/// Rotation is applied X, then Y, then Z in the parent frame
/// (`R = Rx * Ry * Rz`), followed by the translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
        }
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Euler::new(Rad(x), Rad(y), Rad(z));
        self
    }

    pub fn with_rotation_x(mut self, angle: f32) -> Self {
        self.rotation.x = Rad(angle);
        self
    }

    pub fn with_rotation_y(mut self, angle: f32) -> Self {
        self.rotation.y = Rad(angle);
        self
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_angle_x(self.rotation.x)
            * Matrix4::from_angle_y(self.rotation.y)
            * Matrix4::from_angle_z(self.rotation.z)
    }
}

/// What a node contributes to the scene
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure grouping node
    Group,
    Mesh(Primitive),
    Light(Light),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Transform,
    cast_shadow: bool,
    receive_shadow: bool,
    world: Cell<Option<Matrix4<f32>>>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_transform(&self) -> &Transform {
        &self.local
    }

    pub fn primitive(&self) -> Option<&Primitive> {
        match &self.kind {
            NodeKind::Mesh(primitive) => Some(primitive),
            _ => None,
        }
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node under `parent`, or as a new root when `parent` is `None`
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        local: Transform,
        kind: NodeKind,
    ) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.get(parent)?;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            kind,
            parent,
            children: Vec::new(),
            local,
            cast_shadow: false,
            receive_shadow: false,
            world: Cell::new(None),
        });

        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// First node with the given name, in insertion order
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, node)| node.name == name).map(|(id, _)| id)
    }

    /// `id` followed by its parent, grandparent and so on up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(
            self.nodes.get(id.0).map(|_| id),
            move |current| self.nodes[current.0].parent,
        )
    }

    /// `id` and every node below it, depth first
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.get(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev());
        }
        Ok(out)
    }

    pub fn set_local_transform(&mut self, id: NodeId, local: Transform) -> Result<()> {
        self.get_mut(id)?.local = local;
        for node in self.descendants(id)? {
            self.nodes[node.0].world.set(None);
        }
        Ok(())
    }

    /// Composes local transforms from the root down to `id`
    pub fn world_transform(&self, id: NodeId) -> Result<Matrix4<f32>> {
        let node = self.get(id)?;
        if let Some(world) = node.world.get() {
            return Ok(world);
        }
        let parent_world = match node.parent {
            Some(parent) => self.world_transform(parent)?,
            None => Matrix4::identity(),
        };
        let world = parent_world * node.local.matrix();
        node.world.set(Some(world));
        Ok(world)
    }

    pub fn world_position(&self, id: NodeId) -> Result<Point3<f32>> {
        Ok(self
            .world_transform(id)?
            .transform_point(Point3::new(0.0, 0.0, 0.0)))
    }

    /// Sets the node's own shadow flags; descendants inherit them
    pub fn set_shadow_flags(&mut self, id: NodeId, cast: bool, receive: bool) -> Result<()> {
        let node = self.get_mut(id)?;
        node.cast_shadow = cast;
        node.receive_shadow = receive;
        Ok(())
    }

    /// True when the node or any ancestor casts shadows
    pub fn casts_shadow(&self, id: NodeId) -> bool {
        self.ancestors(id).any(|n| self.nodes[n.0].cast_shadow)
    }

    /// True when the node or any ancestor receives shadows
    pub fn receives_shadow(&self, id: NodeId) -> bool {
        self.ancestors(id).any(|n| self.nodes[n.0].receive_shadow)
    }

    pub(crate) fn primitive_mut(&mut self, id: NodeId) -> Result<&mut Primitive> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Mesh(primitive) => Ok(primitive),
            _ => Err(SceneError::UnknownNode(id)),
        }
    }

    /// Every mesh node with its primitive
    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &Primitive)> {
        self.iter()
            .filter_map(|(id, node)| node.primitive().map(|primitive| (id, primitive)))
    }

    pub fn lights(&self) -> impl Iterator<Item = (NodeId, &Light)> {
        self.iter()
            .filter_map(|(id, node)| node.light().map(|light| (id, light)))
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use cgmath::{InnerSpace, Matrix, MetricSpace, Transform as _};
    use rand::Rng;

    use super::*;
    use crate::gfx::scene::primitive::Shape;

    fn approx_point(a: Point3<f32>, b: Point3<f32>) -> bool {
        a.distance(b) < 1e-4
    }

    fn random_transform(rng: &mut impl Rng) -> Transform {
        let mut r = || rng.random_range(-3.0f32..3.0);
        Transform::from_translation(r(), r(), r()).with_rotation(r(), r(), r())
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut graph = SceneGraph::new();
        let foreign = NodeId(7);
        assert_eq!(
            graph
                .add_node(Some(foreign), "orphan", Transform::identity(), NodeKind::Group)
                .unwrap_err(),
            SceneError::UnknownNode(foreign)
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn world_transform_composes_parent_then_child() {
        let mut graph = SceneGraph::new();
        let couch = graph
            .add_node(
                None,
                "couch",
                Transform::from_translation(-1.4, -0.7, 0.0).with_rotation_y(FRAC_PI_2),
                NodeKind::Group,
            )
            .unwrap();
        let back = graph
            .add_node(
                Some(couch),
                "back",
                Transform::from_translation(0.0, 0.37, -0.375),
                NodeKind::Group,
            )
            .unwrap();

        // rotating +90 degrees about Y maps local -Z onto world -X
        let world = graph.world_position(back).unwrap();
        assert!(approx_point(world, Point3::new(-1.775, -0.33, 0.0)), "{world:?}");
    }

    #[test]
    fn moving_a_root_moves_the_subtree_rigidly() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let mut graph = SceneGraph::new();
            let root = graph
                .add_node(None, "root", random_transform(&mut rng), NodeKind::Group)
                .unwrap();
            let mut ids = vec![root];
            for i in 0..6 {
                let parent = ids[rng.random_range(0..ids.len())];
                let id = graph
                    .add_node(
                        Some(parent),
                        format!("n{i}"),
                        random_transform(&mut rng),
                        NodeKind::Group,
                    )
                    .unwrap();
                ids.push(id);
            }

            let before: Vec<_> = ids.iter().map(|&id| graph.world_position(id).unwrap()).collect();
            let old_root = graph.world_transform(root).unwrap();
            graph.set_local_transform(root, random_transform(&mut rng)).unwrap();
            let new_root = graph.world_transform(root).unwrap();

            // every node moves by the same rigid motion
            let delta = new_root * old_root.invert().unwrap();
            for (&id, old) in ids.iter().zip(&before) {
                let expected = delta.transform_point(*old);
                assert!(approx_point(graph.world_position(id).unwrap(), expected));
            }

            // pairwise distances inside the subtree are preserved
            let after: Vec<_> = ids.iter().map(|&id| graph.world_position(id).unwrap()).collect();
            for i in 0..ids.len() {
                for j in 0..ids.len() {
                    let d0 = before[i].distance(before[j]);
                    let d1 = after[i].distance(after[j]);
                    assert!((d0 - d1).abs() < 1e-3);
                }
            }
        }
    }

    #[test]
    fn world_rotation_stays_orthonormal() {
        let mut rng = rand::rng();
        let mut graph = SceneGraph::new();
        let mut parent = None;
        for i in 0..5 {
            parent = Some(
                graph
                    .add_node(parent, format!("n{i}"), random_transform(&mut rng), NodeKind::Group)
                    .unwrap(),
            );
        }
        let m = graph.world_transform(parent.unwrap()).unwrap();
        for c in 0..3 {
            let col = m[c].truncate();
            assert!((col.magnitude() - 1.0).abs() < 1e-4);
        }
        assert!((m.row(3).w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn shadow_flags_apply_to_descendants() {
        let mut graph = SceneGraph::new();
        let table = graph
            .add_node(None, "table", Transform::identity(), NodeKind::Group)
            .unwrap();
        let legs = graph
            .add_node(Some(table), "legs", Transform::identity(), NodeKind::Group)
            .unwrap();
        let leg = graph
            .add_node(
                Some(legs),
                "leg",
                Transform::identity(),
                NodeKind::Mesh(
                    Primitive::new(Shape::cylinder(0.04, 0.04, 0.5, 32), "wood").unwrap(),
                ),
            )
            .unwrap();
        assert!(!graph.casts_shadow(leg));

        graph.set_shadow_flags(table, true, true).unwrap();
        assert!(graph.casts_shadow(leg));
        assert!(graph.receives_shadow(legs));
        assert_eq!(graph.meshes().count(), 1);
    }

    #[test]
    fn descendants_are_depth_first() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(None, "a", Transform::identity(), NodeKind::Group).unwrap();
        let b = graph.add_node(Some(a), "b", Transform::identity(), NodeKind::Group).unwrap();
        let c = graph.add_node(Some(b), "c", Transform::identity(), NodeKind::Group).unwrap();
        let d = graph.add_node(Some(a), "d", Transform::identity(), NodeKind::Group).unwrap();
        assert_eq!(graph.descendants(a).unwrap(), vec![a, b, c, d]);
        assert_eq!(graph.ancestors(c).collect::<Vec<_>>(), vec![c, b, a]);
        assert_eq!(graph.find("d"), Some(d));
    }
}
