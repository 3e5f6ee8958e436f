//! # Furniture
//!
//! Each piece of furniture is a struct of dimensions, defaulting to the
//! living-room values, that builds an un-placed group of primitives. The
//! caller positions the returned root node; every part follows rigidly.
//!
//! ```no_run
//! use parlour::config::CameraConfig;
//! use parlour::furniture::{Archetype, SideTable};
//! use parlour::gfx::camera::CameraManager;
//! use parlour::gfx::scene::{Scene, Transform};
//!
//! let mut scene = Scene::new(CameraManager::from_config(&CameraConfig::default(), 1.5));
//! let table = SideTable::default().build(&mut scene)?;
//! scene.graph.set_local_transform(table, Transform::from_translation(0.0, 0.0, 1.0))?;
//! # Ok::<(), parlour::SceneError>(())
//! ```

pub mod couch;
pub mod footprint;
pub mod lamp;
pub mod side_table;
pub mod snow_globe;
pub mod television;
pub mod tv_table;

pub use couch::Couch;
pub use footprint::{corner_footprint, ring_footprint, CornerInsets};
pub use lamp::Lamp;
pub use side_table::SideTable;
pub use snow_globe::SnowGlobe;
pub use television::Television;
pub use tv_table::TvTable;

use log::debug;

use crate::{
    error::Result,
    gfx::scene::{NodeId, Scene, Transform},
};

/// Segment count used for every curved furniture part
pub const CURVE_SEGMENTS: u32 = 32;

/// A composite object assembled from primitives under one group
pub trait Archetype {
    /// Name of the root group
    const NAME: &'static str;

    /// Adds the parts below `root`, in the root's local frame
    fn build_parts(&self, scene: &mut Scene, root: NodeId) -> Result<()>;

    /// Builds the piece at the origin and flags it as a shadow caster and receiver
    fn build(&self, scene: &mut Scene) -> Result<NodeId> {
        let root = scene.add_group(None, Self::NAME, Transform::identity())?;
        self.build_parts(scene, root)?;
        scene.graph.set_shadow_flags(root, true, true)?;
        debug!(
            "Built {} with {} nodes",
            Self::NAME,
            scene.graph.descendants(root)?.len()
        );
        Ok(root)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use cgmath::{MetricSpace, Point3};

    use crate::{
        config::CameraConfig,
        gfx::{camera::CameraManager, scene::NodeId, scene::Scene},
    };

    pub fn scene() -> Scene {
        Scene::new(CameraManager::from_config(&CameraConfig::default(), 1.5))
    }

    pub fn child(scene: &Scene, parent: NodeId, name: &str) -> NodeId {
        scene
            .graph
            .get(parent)
            .unwrap()
            .children()
            .iter()
            .copied()
            .find(|&c| scene.graph.get(c).unwrap().name == name)
            .unwrap_or_else(|| panic!("no child '{name}'"))
    }

    pub fn assert_at(scene: &Scene, node: NodeId, expected: [f32; 3]) {
        let got = scene.graph.world_position(node).unwrap();
        let want = Point3::from(expected);
        assert!(got.distance(want) < 1e-4, "{got:?} != {want:?}");
    }
}
