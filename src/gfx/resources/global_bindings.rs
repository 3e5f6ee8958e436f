//! Global uniform bindings for camera and scene lighting
//!
//! Everything shared by every draw call in a frame: the camera, the
//! shadow-casting sun and the point lights. Bound to slot 0 in all
//! render pipelines.

use cgmath::{InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};
use log::warn;

use crate::{
    gfx::{
        camera::{camera_utils::CameraUniform, orbit_camera::OPENGL_TO_WGPU_MATRIX},
        scene::{LightKind, PlacedLight},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Point lights the shader loops over; extra lights are dropped
pub const MAX_POINT_LIGHTS: usize = 4;

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in the shaders exactly. Every member is
/// 16-byte aligned so the layout has no implicit padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    sun_view_proj: [[f32; 4]; 4],
    /// xyz: direction the sun shines towards, w: 1 when it casts shadows
    sun_direction: [f32; 4],
    /// rgb: radiance, w: 1 when a sun is present
    sun_color: [f32; 4],
    /// xyz: position, w: range (0 = unlimited)
    point_positions: [[f32; 4]; MAX_POINT_LIGHTS],
    /// rgb: radiance, w: decay exponent
    point_colors: [[f32; 4]; MAX_POINT_LIGHTS],
    /// x: point light count, y: shadow map texel size
    counts: [f32; 4],
}

impl Default for GlobalUBOContent {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        Self {
            view_position: [0.0; 4],
            view_proj: identity,
            sun_view_proj: identity,
            sun_direction: [0.0, -1.0, 0.0, 0.0],
            sun_color: [0.0; 4],
            point_positions: [[0.0; 4]; MAX_POINT_LIGHTS],
            point_colors: [[0.0; 4]; MAX_POINT_LIGHTS],
            counts: [0.0; 4],
        }
    }
}

impl GlobalUBOContent {
    /// Packs the camera and up to `max_point_lights` point lights
    ///
    /// The first directional light becomes the sun; further directional
    /// lights are ignored.
    pub fn new(camera: &CameraUniform, lights: &[PlacedLight], max_point_lights: usize) -> Self {
        let mut content = Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ..Default::default()
        };

        if let Some(sun) = lights.iter().find(|l| !l.light.is_point()) {
            if let Some(direction) = sun.direction() {
                let radiance = sun.light.radiance();
                content.sun_view_proj = sun_view_proj(sun).into();
                content.sun_direction = [
                    direction.x,
                    direction.y,
                    direction.z,
                    if sun.light.cast_shadow { 1.0 } else { 0.0 },
                ];
                content.sun_color = [radiance[0], radiance[1], radiance[2], 1.0];
                content.counts[1] = 1.0 / sun.light.shadow.map_size.max(1) as f32;
            }
        }

        let limit = max_point_lights.min(MAX_POINT_LIGHTS);
        let points: Vec<_> = lights.iter().filter(|l| l.light.is_point()).collect();
        if points.len() > limit {
            warn!(
                "{} point lights in scene, only the first {} are shaded",
                points.len(),
                limit
            );
        }
        for (slot, placed) in points.iter().take(limit).enumerate() {
            let LightKind::Point { range, decay } = placed.light.kind else {
                continue;
            };
            let p = placed.position;
            let c = placed.light.radiance();
            content.point_positions[slot] = [p.x, p.y, p.z, range];
            content.point_colors[slot] = [c[0], c[1], c[2], decay];
        }
        content.counts[0] = points.len().min(limit) as f32;
        content
    }

    pub fn point_light_count(&self) -> usize {
        self.counts[0] as usize
    }

    pub fn has_sun(&self) -> bool {
        self.sun_color[3] > 0.0
    }
}

/// Orthographic view-projection of a directional light, wgpu depth range
pub fn sun_view_proj(sun: &PlacedLight) -> Matrix4<f32> {
    let target = match sun.light.kind {
        LightKind::Directional { target } => target,
        LightKind::Point { .. } => sun.position + Vector3::unit_y() * -1.0,
    };
    let forward = (target - sun.position).normalize();
    let up = if forward.y.abs() > 0.99 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    let view = Matrix4::look_at_rh(sun.position, target, up);

    let s = &sun.light.shadow;
    let proj = cgmath::ortho(
        -s.half_extent,
        s.half_extent,
        -s.half_extent,
        s.half_extent,
        s.near,
        s.far,
    );
    OPENGL_TO_WGPU_MATRIX * proj * view
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Manages the bind group layout and bind group for global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Transform as _;

    use super::*;
    use crate::gfx::scene::{Light, NodeId, ShadowSettings};

    fn placed(light: Light, position: [f32; 3], index: usize) -> PlacedLight {
        PlacedLight {
            node: NodeId::from_index(index),
            light,
            position: Point3::new(position[0], position[1], position[2]),
        }
    }

    fn sun() -> PlacedLight {
        placed(
            Light::directional(0xabcdef, 0.25, Point3::new(0.0, 0.0, 0.0))
                .with_shadows(ShadowSettings::default()),
            [-2.5, -1.0, -2.5],
            0,
        )
    }

    #[test]
    fn layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 16 * (1 + 4 + 4 + 2 + 8 + 1));
    }

    #[test]
    fn packs_sun_and_point_lights() {
        let lights = [
            sun(),
            placed(Light::point(0xffffff, 1.0, 10.0), [1.35, 1.0, 0.0], 1),
            placed(Light::point(0xe7feff, 1.0, 5.0), [0.0, -0.1, 0.0], 2),
        ];
        let content = GlobalUBOContent::new(&CameraUniform::default(), &lights, 4);

        assert!(content.has_sun());
        assert_eq!(content.sun_direction[3], 1.0);
        assert_eq!(content.point_light_count(), 2);
        assert_eq!(content.point_positions[0], [1.35, 1.0, 0.0, 10.0]);
        assert_eq!(content.point_positions[1][3], 5.0);
        assert_eq!(content.point_colors[0][3], 2.0);
        assert!((content.counts[1] - 1.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn extra_point_lights_are_dropped() {
        let lights: Vec<_> = (0..6)
            .map(|i| placed(Light::point(0xffffff, 1.0, 0.0), [i as f32, 0.0, 0.0], i))
            .collect();
        let content = GlobalUBOContent::new(&CameraUniform::default(), &lights, 4);
        assert_eq!(content.point_light_count(), 4);
        assert!(!content.has_sun());

        let capped = GlobalUBOContent::new(&CameraUniform::default(), &lights, 2);
        assert_eq!(capped.point_light_count(), 2);
        assert_eq!(capped.point_positions[2], [0.0; 4]);
    }

    #[test]
    fn sun_projection_maps_target_inside_depth_range() {
        let view_proj = sun_view_proj(&sun());
        let clip = view_proj.transform_point(Point3::new(0.0, 0.0, 0.0));
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0, "{}", clip.z);
    }
}
