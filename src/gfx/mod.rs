//! # Graphics Module
//!
//! Camera, geometry, scene graph, GPU resources and the renderer.
//!
//! - **Camera System** ([`camera`]) - Damped orbit camera and its mouse controller
//! - **Geometry** ([`geometry`]) - Vertex and index generation for parametric shapes
//! - **Scene Management** ([`scene`]) - Node arena, primitives, lights
//! - **Resource Management** ([`resources`]) - Materials, textures and global uniforms
//! - **Rendering Pipeline** ([`rendering`]) - Blinn-Phong shading with a cached shadow map

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
