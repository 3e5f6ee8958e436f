//! # Primitive Shape Generation
//!
//! This module contains functions to generate the room's primitive shapes.
//! All shapes are generated with proper normals and texture coordinates.
//! Callers are expected to validate dimensions first; see
//! [`crate::gfx::scene::primitive::Shape`].

use super::GeometryData;
use std::f32::consts::{PI, TAU};

/// Upper bound on any tessellation count; keeps every index inside `u32`
pub const MAX_SEGMENTS: u32 = 1024;

/// Generate a box centred at the origin
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `depth` - Extent along Z
///
/// Every face maps the full texture, with the image top towards +Y on the
/// side faces.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    // Unit cube corners, scaled below
    let positions: [[f32; 3]; 24] = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    // Seen from outside, the faces list bottom-left, bottom-right,
    // top-right, top-left; the back face starts at bottom-right.
    let face_uv = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let back_uv = [[1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0]];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    for (face, normal) in face_normals.iter().enumerate() {
        let uvs = if face == 1 { &back_uv } else { &face_uv };
        for corner in 0..4 {
            let p = positions[face * 4 + corner];
            data.vertices.push([p[0] * width, p[1] * height, p[2] * depth]);
            data.normals.push(*normal);
            data.tex_coords.push(uvs[corner]);
        }
        let base = (face * 4) as u32;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of longitude segments
/// * `height_segments` - Number of latitude segments
///
/// Poles get a single triangle per segment so no degenerate faces are emitted.
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let width_segs = width_segments.clamp(3, MAX_SEGMENTS);
    let height_segs = height_segments.clamp(2, MAX_SEGMENTS);
    let row = width_segs + 1;

    for lat in 0..=height_segs {
        let v = lat as f32 / height_segs as f32;
        let theta = v * PI;

        for long in 0..=width_segs {
            let u = long as f32 / width_segs as f32;
            let phi = u * TAU;

            let x = -phi.cos() * theta.sin();
            let y = theta.cos();
            let z = phi.sin() * theta.sin();

            data.vertices.push([x * radius, y * radius, z * radius]);
            data.normals.push([x, y, z]);
            data.tex_coords.push([u, v]);
        }
    }

    for lat in 0..height_segs {
        for long in 0..width_segs {
            let a = lat * row + long + 1;
            let b = lat * row + long;
            let c = (lat + 1) * row + long;
            let d = (lat + 1) * row + long + 1;

            if lat != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if lat != height_segs - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    data
}

/// Generate a plane in the XY plane
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
///
/// Returns a plane centered at the origin with its normal along +Z.
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.clamp(1, MAX_SEGMENTS);
    let h_segs = height_segments.clamp(1, MAX_SEGMENTS);

    for y in 0..=h_segs {
        let v = y as f32 / h_segs as f32;
        let pos_y = (v - 0.5) * height;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            data.tex_coords.push([u, 1.0 - v]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[i + 1, next_row + 1, next_row]);
        }
    }

    data
}

/// Generate a flat disc in the XY plane
///
/// # Arguments
/// * `radius` - Disc radius
/// * `segments` - Number of rim segments
///
/// The normal points along +Z; rotate the owning node to lay it flat.
pub fn generate_disc(radius: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.clamp(3, MAX_SEGMENTS);

    data.vertices.push([0.0, 0.0, 0.0]);
    data.normals.push([0.0, 0.0, 1.0]);
    data.tex_coords.push([0.5, 0.5]);

    for i in 0..=segs {
        let angle = i as f32 / segs as f32 * TAU;
        let (sin_a, cos_a) = angle.sin_cos();
        data.vertices.push([radius * cos_a, radius * sin_a, 0.0]);
        data.normals.push([0.0, 0.0, 1.0]);
        data.tex_coords.push([(cos_a + 1.0) * 0.5, 1.0 - (sin_a + 1.0) * 0.5]);
    }

    for i in 1..=segs {
        data.indices.extend_from_slice(&[0, i, i + 1]);
    }

    data
}

/// Generate a capped cylinder (or frustum) along the Y axis
///
/// # Arguments
/// * `radius_top` - Radius of the cap at +height/2
/// * `radius_bottom` - Radius of the cap at -height/2
/// * `height` - Height of the cylinder
/// * `segments` - Number of circular segments
///
/// Returns a cylinder centered at the origin extending from -height/2 to height/2 in Y.
pub fn generate_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.clamp(3, MAX_SEGMENTS);
    let half_height = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;

    // Side wall: row 0 is the top rim, row 1 the bottom rim
    for (row, (radius, y)) in [(radius_top, half_height), (radius_bottom, -half_height)]
        .into_iter()
        .enumerate()
    {
        for i in 0..=segs {
            let u = i as f32 / segs as f32;
            let (sin_t, cos_t) = (u * TAU).sin_cos();
            let len = (1.0 + slope * slope).sqrt();

            data.vertices.push([radius * sin_t, y, radius * cos_t]);
            data.normals.push([sin_t / len, slope / len, cos_t / len]);
            data.tex_coords.push([u, row as f32]);
        }
    }

    let row = segs + 1;
    for i in 0..segs {
        let a = i;
        let b = row + i;
        let c = row + i + 1;
        let d = i + 1;

        data.indices.extend_from_slice(&[a, b, d]);
        data.indices.extend_from_slice(&[b, c, d]);
    }

    generate_cylinder_cap(&mut data, radius_top, half_height, segs, true);
    generate_cylinder_cap(&mut data, radius_bottom, -half_height, segs, false);

    data
}

fn generate_cylinder_cap(data: &mut GeometryData, radius: f32, y: f32, segs: u32, top: bool) {
    let sign = if top { 1.0 } else { -1.0 };
    let center = data.vertices.len() as u32;

    data.vertices.push([0.0, y, 0.0]);
    data.normals.push([0.0, sign, 0.0]);
    data.tex_coords.push([0.5, 0.5]);

    for i in 0..=segs {
        let (sin_t, cos_t) = (i as f32 / segs as f32 * TAU).sin_cos();
        data.vertices.push([radius * sin_t, y, radius * cos_t]);
        data.normals.push([0.0, sign, 0.0]);
        data.tex_coords.push([(sin_t + 1.0) * 0.5, (cos_t * sign + 1.0) * 0.5]);
    }

    for i in 0..segs {
        let current = center + 1 + i;
        let next = current + 1;
        if top {
            data.indices.extend_from_slice(&[center, current, next]);
        } else {
            data.indices.extend_from_slice(&[center, next, current]);
        }
    }
}
