//! Leg layouts
//!
//! Positions are `[x, z]` pairs in the furniture's local frame.

use std::f32::consts::TAU;

/// `count` points evenly spaced on a circle, starting on +X and turning towards +Z
pub fn ring_footprint(count: usize, radius: f32) -> Vec<[f32; 2]> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            [angle.cos() * radius, angle.sin() * radius]
        })
        .collect()
}

/// How far corner legs sit from the edges of a rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerInsets {
    /// From the left and right edges
    pub side: f32,
    /// From the front edge (+Z)
    pub front: f32,
    /// From the back edge (-Z)
    pub back: f32,
    /// Distance from the centre to the back edge; `None` means `depth / 2`
    pub back_reach: Option<f32>,
}

impl CornerInsets {
    pub fn uniform(inset: f32) -> Self {
        Self {
            side: inset,
            front: inset,
            back: inset,
            back_reach: None,
        }
    }
}

/// Four legs in order front right, front left, back left, back right
pub fn corner_footprint(width: f32, depth: f32, insets: CornerInsets) -> [[f32; 2]; 4] {
    let x = width / 2.0 - insets.side;
    let front = depth / 2.0 - insets.front;
    let back = -insets.back_reach.unwrap_or(depth / 2.0) + insets.back;
    [[x, front], [-x, front], [-x, back], [x, back]]
}
