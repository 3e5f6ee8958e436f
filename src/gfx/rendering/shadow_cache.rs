//! Shadow map caching
//!
//! The shadow map is only re-rendered when:
//! - the sun moves, changes colour or changes its shadow settings
//! - a shadow caster moves, appears or disappears
//! - manual invalidation is requested (resize, new pipeline)
//!
//! The room is static apart from texture swaps, so after the first frame
//! the shadow pass is normally skipped.

use std::collections::HashMap;

use cgmath::Matrix4;

use crate::gfx::scene::{NodeId, PlacedLight, ShadowSettings};

const EPSILON: f32 = 0.001;

fn matrices_differ(a: &Matrix4<f32>, b: &Matrix4<f32>) -> bool {
    let a: &[f32; 16] = a.as_ref();
    let b: &[f32; 16] = b.as_ref();
    a.iter().zip(b).any(|(x, y)| (x - y).abs() > EPSILON)
}

/// Tracks the state of the shadow-casting light
#[derive(Debug, Clone, PartialEq)]
pub struct LightState {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    pub shadow: ShadowSettings,
    pub view_proj_matrix: Matrix4<f32>,
}

impl LightState {
    pub fn new(light: &PlacedLight, view_proj_matrix: Matrix4<f32>) -> Self {
        Self {
            position: light.position.into(),
            color: light.light.color,
            intensity: light.light.intensity,
            shadow: light.light.shadow,
            view_proj_matrix,
        }
    }

    /// Checks if this light state differs significantly from another
    pub fn differs_from(&self, other: &LightState) -> bool {
        let close = |a: &[f32; 3], b: &[f32; 3]| {
            a.iter().zip(b).all(|(x, y)| (x - y).abs() <= EPSILON)
        };

        !close(&self.position, &other.position)
            || !close(&self.color, &other.color)
            || (self.intensity - other.intensity).abs() > EPSILON
            || self.shadow != other.shadow
            || matrices_differ(&self.view_proj_matrix, &other.view_proj_matrix)
    }
}

/// Shadow map cache manager
#[derive(Default)]
pub struct ShadowCache {
    is_valid: bool,
    last_light_state: Option<LightState>,
    last_caster_states: HashMap<NodeId, Matrix4<f32>>,
    force_invalidate: bool,
}

impl ShadowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the shadow map needs to be regenerated
    pub fn needs_update(
        &mut self,
        light: Option<&LightState>,
        casters: &[(NodeId, Matrix4<f32>)],
    ) -> bool {
        if self.force_invalidate {
            self.force_invalidate = false;
            self.is_valid = false;
            return true;
        }

        if !self.is_valid {
            return true;
        }

        let light_changed = match (light, &self.last_light_state) {
            (Some(current), Some(last)) => current.differs_from(last),
            (None, None) => false,
            _ => true,
        };
        if light_changed {
            self.is_valid = false;
            return true;
        }

        if casters.len() != self.last_caster_states.len() {
            self.is_valid = false;
            return true;
        }
        let moved = casters.iter().any(|(node, world)| {
            self.last_caster_states
                .get(node)
                .is_none_or(|last| matrices_differ(last, world))
        });
        if moved {
            self.is_valid = false;
        }
        moved
    }

    /// Marks the shadow map as valid and records the state it was rendered from
    pub fn mark_valid(&mut self, light: Option<LightState>, casters: &[(NodeId, Matrix4<f32>)]) {
        self.is_valid = true;
        self.last_light_state = light;
        self.last_caster_states = casters.iter().copied().collect();
    }

    /// Forces regeneration on the next check
    pub fn invalidate(&mut self) {
        self.force_invalidate = true;
        self.is_valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid && !self.force_invalidate
    }

    pub fn get_stats(&self) -> ShadowCacheStats {
        ShadowCacheStats {
            is_valid: self.is_valid,
            tracked_casters: self.last_caster_states.len(),
            has_light_state: self.last_light_state.is_some(),
        }
    }
}

/// Statistics about the shadow cache for debugging
#[derive(Debug, PartialEq, Eq)]
pub struct ShadowCacheStats {
    pub is_valid: bool,
    pub tracked_casters: usize,
    pub has_light_state: bool,
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, SquareMatrix, Vector3};

    use super::*;
    use crate::gfx::scene::Light;

    fn sun_state(x: f32) -> LightState {
        let light = PlacedLight {
            node: NodeId::from_index(0),
            light: Light::directional(0xabcdef, 0.25, Point3::new(0.0, 0.0, 0.0)),
            position: Point3::new(x, -1.0, -2.5),
        };
        LightState::new(&light, Matrix4::identity())
    }

    fn casters() -> Vec<(NodeId, Matrix4<f32>)> {
        (1..4)
            .map(|i| {
                let world = Matrix4::from_translation(Vector3::new(i as f32, 0.0, 0.0));
                (NodeId::from_index(i), world)
            })
            .collect()
    }

    #[test]
    fn static_scene_hits_after_first_render() {
        let mut cache = ShadowCache::new();
        let sun = sun_state(-2.5);
        assert!(cache.needs_update(Some(&sun), &casters()));
        cache.mark_valid(Some(sun.clone()), &casters());
        assert!(!cache.needs_update(Some(&sun), &casters()));
        assert_eq!(
            cache.get_stats(),
            ShadowCacheStats {
                is_valid: true,
                tracked_casters: 3,
                has_light_state: true
            }
        );
    }

    #[test]
    fn moving_light_or_caster_misses() {
        let mut cache = ShadowCache::new();
        cache.mark_valid(Some(sun_state(-2.5)), &casters());
        assert!(cache.needs_update(Some(&sun_state(-2.0)), &casters()));

        cache.mark_valid(Some(sun_state(-2.5)), &casters());
        let mut moved = casters();
        moved[1].1 = Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0));
        assert!(cache.needs_update(Some(&sun_state(-2.5)), &moved));

        cache.mark_valid(Some(sun_state(-2.5)), &casters());
        assert!(cache.needs_update(Some(&sun_state(-2.5)), &casters()[..2]));
    }

    #[test]
    fn tiny_jitter_is_ignored() {
        let mut cache = ShadowCache::new();
        cache.mark_valid(Some(sun_state(-2.5)), &casters());
        assert!(!cache.needs_update(Some(&sun_state(-2.5 + EPSILON / 10.0)), &casters()));
    }

    #[test]
    fn invalidate_forces_one_regeneration() {
        let mut cache = ShadowCache::new();
        cache.mark_valid(None, &casters());
        cache.invalidate();
        assert!(!cache.is_valid());
        assert!(cache.needs_update(None, &casters()));
        cache.mark_valid(None, &casters());
        assert!(!cache.needs_update(None, &casters()));
    }
}
