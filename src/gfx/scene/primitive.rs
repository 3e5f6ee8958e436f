//! Parameterised primitive shapes
//!
//! A [`Primitive`] pairs a validated [`Shape`] with its generated geometry and
//! the id of the material it is drawn with.

use cgmath::Vector3;

use crate::{
    error::{Result, SceneError},
    gfx::{
        geometry::{
            generate_box, generate_cylinder, generate_disc, generate_plane, generate_sphere,
            GeometryData, MAX_SEGMENTS,
        },
        resources::material::MaterialId,
    },
};

/// Minimum segment count for curved surfaces
pub const MIN_SEGMENTS: u32 = 3;

/// Flat disc in the local XY plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscParams {
    pub radius: f32,
    pub segments: u32,
}

/// Capped cylinder or frustum along local Y
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderParams {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

/// Rectangle in the local XY plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneParams {
    pub width: f32,
    pub height: f32,
}

/// Geometry kind plus its shape parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Disc(DiscParams),
    Cylinder(CylinderParams),
    Box(BoxParams),
    Sphere(SphereParams),
    Plane(PlaneParams),
}

impl Shape {
    pub fn disc(radius: f32, segments: u32) -> Self {
        Self::Disc(DiscParams { radius, segments })
    }

    pub fn cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    ) -> Self {
        Self::Cylinder(CylinderParams {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
        })
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Box(BoxParams {
            width,
            height,
            depth,
        })
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self::Sphere(SphereParams {
            radius,
            width_segments,
            height_segments,
        })
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane(PlaneParams { width, height })
    }

    /// Short name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Disc(_) => "disc",
            Self::Cylinder(_) => "cylinder",
            Self::Box(_) => "box",
            Self::Sphere(_) => "sphere",
            Self::Plane(_) => "plane",
        }
    }

    /// Rejects non-positive or non-finite dimensions and segment counts
    /// outside `MIN_SEGMENTS..=MAX_SEGMENTS`
    pub fn validate(&self) -> Result<()> {
        let shape = self.kind_name();
        match *self {
            Self::Disc(p) => {
                dimension(shape, "radius", p.radius)?;
                segments(shape, "segments", p.segments)
            }
            Self::Cylinder(p) => {
                dimension(shape, "radius_top", p.radius_top)?;
                dimension(shape, "radius_bottom", p.radius_bottom)?;
                dimension(shape, "height", p.height)?;
                segments(shape, "radial_segments", p.radial_segments)
            }
            Self::Box(p) => {
                dimension(shape, "width", p.width)?;
                dimension(shape, "height", p.height)?;
                dimension(shape, "depth", p.depth)
            }
            Self::Sphere(p) => {
                dimension(shape, "radius", p.radius)?;
                segments(shape, "width_segments", p.width_segments)?;
                segments(shape, "height_segments", p.height_segments)
            }
            Self::Plane(p) => {
                dimension(shape, "width", p.width)?;
                dimension(shape, "height", p.height)
            }
        }
    }

    /// Exact local bounding size along X, Y and Z
    pub fn extent(&self) -> Vector3<f32> {
        match *self {
            Self::Disc(p) => Vector3::new(2.0 * p.radius, 2.0 * p.radius, 0.0),
            Self::Cylinder(p) => {
                let widest = 2.0 * p.radius_top.max(p.radius_bottom);
                Vector3::new(widest, p.height, widest)
            }
            Self::Box(p) => Vector3::new(p.width, p.height, p.depth),
            Self::Sphere(p) => Vector3::new(2.0 * p.radius, 2.0 * p.radius, 2.0 * p.radius),
            Self::Plane(p) => Vector3::new(p.width, p.height, 0.0),
        }
    }

    fn generate(&self) -> GeometryData {
        match *self {
            Self::Disc(p) => generate_disc(p.radius, p.segments),
            Self::Cylinder(p) => {
                generate_cylinder(p.radius_top, p.radius_bottom, p.height, p.radial_segments)
            }
            Self::Box(p) => generate_box(p.width, p.height, p.depth),
            Self::Sphere(p) => generate_sphere(p.radius, p.width_segments, p.height_segments),
            Self::Plane(p) => generate_plane(p.width, p.height, 1, 1),
        }
    }
}

fn dimension(shape: &'static str, parameter: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::invalid(shape, parameter, value))
    }
}

fn segments(shape: &'static str, parameter: &'static str, count: u32) -> Result<()> {
    if (MIN_SEGMENTS..=MAX_SEGMENTS).contains(&count) {
        Ok(())
    } else {
        Err(SceneError::invalid(shape, parameter, count as f32))
    }
}

/// A renderable shape bound to a material
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    shape: Shape,
    geometry: GeometryData,
    material: MaterialId,
}

impl Primitive {
    /// Validates `shape` and generates its geometry
    pub fn new(shape: Shape, material: impl Into<MaterialId>) -> Result<Self> {
        shape.validate()?;
        Ok(Self {
            geometry: shape.generate(),
            shape,
            material: material.into(),
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn geometry(&self) -> &GeometryData {
        &self.geometry
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.shape.extent()
    }

    /// Material this primitive is currently bound to
    pub fn material(&self) -> &str {
        &self.material
    }

    pub(crate) fn bind_material(&mut self, material: MaterialId) {
        self.material = material;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_valid_shape(rng: &mut impl Rng) -> Shape {
        let mut dim = || rng.random_range(0.01f32..10.0);
        let (a, b, c) = (dim(), dim(), dim());
        let segs = rng.random_range(MIN_SEGMENTS..64);
        match rng.random_range(0..5) {
            0 => Shape::disc(a, segs),
            1 => Shape::cylinder(a, b, c, segs),
            2 => Shape::cuboid(a, b, c),
            3 => Shape::sphere(a, segs, segs),
            _ => Shape::plane(a, b),
        }
    }

    #[test]
    fn valid_parameters_always_build() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let shape = random_valid_shape(&mut rng);
            let primitive = Primitive::new(shape, "default").expect("valid shape");
            assert!(primitive.geometry().triangle_count() > 0);
        }
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let bad = -rng.random_range(0.0f32..5.0);
            let cases = [
                (Shape::disc(bad, 32), "radius"),
                (Shape::cylinder(0.1, bad, 1.0, 32), "radius_bottom"),
                (Shape::cuboid(1.0, 1.0, bad), "depth"),
                (Shape::sphere(bad, 32, 32), "radius"),
                (Shape::plane(bad, 1.0), "width"),
            ];
            for (shape, parameter) in cases {
                match Primitive::new(shape, "default") {
                    Err(SceneError::InvalidGeometryParameter { parameter: p, .. }) => {
                        assert_eq!(p, parameter)
                    }
                    other => panic!("expected InvalidGeometryParameter, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn degenerate_segment_counts_are_rejected() {
        for segs in 0..MIN_SEGMENTS {
            assert!(Primitive::new(Shape::disc(1.0, segs), "m").is_err());
            assert!(Primitive::new(Shape::cylinder(1.0, 1.0, 1.0, segs), "m").is_err());
            assert!(Primitive::new(Shape::sphere(1.0, 32, segs), "m").is_err());
        }
    }

    #[test]
    fn oversized_segment_counts_are_rejected() {
        for segs in [MAX_SEGMENTS + 1, u32::MAX] {
            let cases = [
                (Shape::disc(1.0, segs), "segments"),
                (Shape::cylinder(1.0, 1.0, 1.0, segs), "radial_segments"),
                (Shape::sphere(1.0, segs, 3), "width_segments"),
                (Shape::sphere(1.0, 3, segs), "height_segments"),
            ];
            for (shape, parameter) in cases {
                match Primitive::new(shape, "m") {
                    Err(SceneError::InvalidGeometryParameter { parameter: p, .. }) => {
                        assert_eq!(p, parameter)
                    }
                    other => panic!("expected InvalidGeometryParameter, got {other:?}"),
                }
            }
        }

        let finest = Primitive::new(Shape::sphere(1.0, MAX_SEGMENTS, MAX_SEGMENTS), "m").unwrap();
        let last = finest.geometry().vertex_count() as u32 - 1;
        assert!(finest.geometry().indices.iter().all(|&i| i <= last));
    }

    #[test]
    fn nan_is_not_a_dimension() {
        assert!(Shape::cuboid(f32::NAN, 1.0, 1.0).validate().is_err());
        assert!(Shape::plane(1.0, f32::INFINITY).validate().is_err());
    }

    #[test]
    fn extent_matches_supplied_dimensions() {
        let slab = Primitive::new(Shape::cuboid(2.25, 0.25, 0.75), "m").unwrap();
        assert_eq!(slab.extent(), Vector3::new(2.25, 0.25, 0.75));

        let shade = Primitive::new(Shape::cylinder(0.15, 0.35, 0.5, 32), "m").unwrap();
        assert_eq!(shade.extent(), Vector3::new(0.7, 0.5, 0.7));

        let globe = Primitive::new(Shape::sphere(0.15, 32, 32), "m").unwrap();
        assert_eq!(globe.extent(), Vector3::new(0.3, 0.3, 0.3));

        let carpet = Primitive::new(Shape::disc(1.65, 32), "m").unwrap();
        assert_eq!(carpet.extent(), Vector3::new(3.3, 3.3, 0.0));

        let screen = Primitive::new(Shape::plane(1.85, 1.05), "m").unwrap();
        assert_eq!(screen.extent(), Vector3::new(1.85, 1.05, 0.0));
    }

    #[test]
    fn generated_bounds_agree_with_extent() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let shape = random_valid_shape(&mut rng);
            let primitive = Primitive::new(shape, "m").unwrap();
            let (lo, hi) = primitive.geometry().bounds().unwrap();
            let extent = primitive.extent();
            for (axis, want) in [extent.x, extent.y, extent.z].into_iter().enumerate() {
                let got = hi[axis] - lo[axis];
                // coarse tessellations may fall short of the analytic extent
                assert!(got <= want + 1e-4, "{shape:?} axis {axis}: {got} vs {want}");
                if matches!(shape, Shape::Box(_) | Shape::Plane(_)) {
                    assert!((got - want).abs() < 1e-4);
                }
            }
        }
    }
}
