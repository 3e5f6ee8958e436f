//! # Scene Management Module
//!
//! This module holds the scene graph and everything that lives in it.
//!
//! ## Key Components
//!
//! - [`Scene`] - The scene container owning the graph, materials and camera
//! - [`SceneGraph`] - Arena of nodes with parent links and cached world transforms
//! - [`Primitive`] / [`Shape`] - Validated parametric shapes bound to a material
//! - [`Light`] - Point and directional lights attached to nodes
//! - [`Vertex3D`] - 3D vertex data structure with position, normal, and texture coordinates
//!
//! ## Usage
//!
//! ```no_run
//! use parlour::config::CameraConfig;
//! use parlour::gfx::camera::CameraManager;
//! use parlour::gfx::resources::material::MaterialDesc;
//! use parlour::gfx::scene::{Scene, Shape, Transform};
//!
//! let mut scene = Scene::new(CameraManager::from_config(&CameraConfig::default(), 1.5));
//! let wood = scene.add_material("wood", &MaterialDesc::phong(0x987654));
//! let table = scene.add_group(None, "table", Transform::identity())?;
//! let top = Shape::cuboid(2.5, 0.1, 0.75);
//! scene.add_primitive(Some(table), "top", top, &wood, Transform::identity())?;
//! # Ok::<(), parlour::SceneError>(())
//! ```

pub mod graph;
pub mod light;
pub mod primitive;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use graph::{Node, NodeId, NodeKind, SceneGraph, Transform};
pub use light::{Light, LightKind, ShadowSettings};
pub use primitive::{Primitive, Shape};
pub use scene::{DrawItem, PlacedLight, Scene, SceneStatistics};
pub use vertex::Vertex3D;
