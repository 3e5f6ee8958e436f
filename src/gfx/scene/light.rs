//! Light sources placed in the scene graph
//!
//! Point lights take their position from the node they are attached to.
//! Directional lights shine from their node position towards `target`.

use cgmath::Point3;

use crate::gfx::resources::material::hex_to_linear;

/// Shadow map parameters for a shadow-casting light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Width and height of the square depth map
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half size of the orthographic shadow frustum
    pub half_extent: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 1024,
            near: 0.5,
            far: 10.0,
            half_extent: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Omnidirectional light; `range` 0 means unlimited
    Point { range: f32, decay: f32 },
    Directional { target: Point3<f32> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// Linear RGB
    pub color: [f32; 3],
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}

impl Light {
    pub fn point(color: u32, intensity: f32, range: f32) -> Self {
        Self {
            kind: LightKind::Point { range, decay: 2.0 },
            color: hex_to_linear(color),
            intensity,
            cast_shadow: false,
            shadow: ShadowSettings::default(),
        }
    }

    pub fn directional(color: u32, intensity: f32, target: Point3<f32>) -> Self {
        Self {
            kind: LightKind::Directional { target },
            color: hex_to_linear(color),
            intensity,
            cast_shadow: false,
            shadow: ShadowSettings::default(),
        }
    }

    /// Enables shadow casting with the given map settings
    pub fn with_shadows(mut self, shadow: ShadowSettings) -> Self {
        self.cast_shadow = true;
        self.shadow = shadow;
        self
    }

    pub fn is_point(&self) -> bool {
        matches!(self.kind, LightKind::Point { .. })
    }

    /// Colour scaled by intensity, as uploaded to the shader
    pub fn radiance(&self) -> [f32; 3] {
        self.color.map(|c| c * self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_lights_do_not_cast_shadows_by_default() {
        let bulb = Light::point(0xe7feff, 1.0, 15.0);
        assert!(bulb.is_point());
        assert!(!bulb.cast_shadow);
        assert_eq!(
            bulb.kind,
            LightKind::Point {
                range: 15.0,
                decay: 2.0
            }
        );
    }

    #[test]
    fn directional_shadow_settings() {
        let sun = Light::directional(0xabcdef, 0.25, Point3::new(0.0, 0.0, 0.0))
            .with_shadows(ShadowSettings::default());
        assert!(sun.cast_shadow);
        assert_eq!(sun.shadow.map_size, 1024);
        assert_eq!(sun.shadow.far, 10.0);
        let r = sun.radiance();
        assert!((r[0] - sun.color[0] * 0.25).abs() < 1e-6);
    }
}
