//! # Procedural Geometry Generation
//!
//! This module provides functions to generate the primitive shapes the room
//! is built from, so no model files are needed.
//!
//! ## Supported Primitives
//!
//! - **Disc**: flat circle in the XY plane (normal +Z)
//! - **Cylinder**: Y-axis frustum with independent top and bottom radii
//! - **Box**: axis-aligned cuboid with width/height/depth
//! - **Sphere**: UV sphere with configurable resolution
//! - **Plane**: flat rectangle in the XY plane (normal +Z)
//!
//! All generators are Y-up, centred at the origin, and wind triangles
//! counter-clockwise when seen from outside.
//!
//! ## Usage
//!
//! ```rust
//! use parlour::gfx::geometry::{generate_box, generate_cylinder};
//!
//! let slab = generate_box(4.0, 4.0, 0.15);
//! let leg = generate_cylinder(0.04, 0.04, 0.5, 32);
//! assert_eq!(slab.triangle_count(), 12);
//! assert!(leg.vertex_count() > 0);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v), v = 0 at the top of the image
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds of the vertex positions as `(min, max)`
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(mut lo, mut hi), v| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v[axis]);
                hi[axis] = hi[axis].max(v[axis]);
            }
            (lo, hi)
        }))
    }

    /// Interleave into the vertex layout used by the renderer
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_empty_geometry() {
        assert_eq!(GeometryData::new().bounds(), None);
    }

    #[test]
    fn interleaved_vertices_keep_attributes() {
        let plane = generate_plane(2.0, 1.0, 1, 1);
        let vertices = plane.to_vertices();
        assert_eq!(vertices.len(), plane.vertex_count());
        for (vertex, uv) in vertices.iter().zip(&plane.tex_coords) {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
            assert_eq!(&vertex.tex_coords, uv);
        }
    }
}
