//! Collision geometry shared by the flyer and the gates
//!
//! Screen space: x grows to the right, y grows downward. The flyer is an
//! elliptical body described by its half extents; gates are vertical columns
//! with an open gap.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Why the flyer died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Touched the kill-floor
    Floor,
    /// Hit a gate column, a fake ceiling or a phantom hitbox
    Gate,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathCause::Floor => f.write_str("floor"),
            DeathCause::Gate => f.write_str("gate collision"),
        }
    }
}

/// Gap geometry a gate reports to the collision test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapBounds {
    /// Top edge of the open gap
    pub top: f32,
    /// Bottom edge of the open gap
    pub bottom: f32,
    /// The whole column is solid (fake gap)
    pub is_solid: bool,
    /// An invisible ceiling hangs inside the gap
    pub has_ceiling: bool,
    pub ceiling_y: f32,
}

impl GapBounds {
    /// Does a body centered at `y` with half-height `half_h` touch the column?
    pub fn hits(&self, y: f32, half_h: f32) -> bool {
        if self.is_solid {
            return true;
        }
        if outside_gap(y, half_h, self.top, self.bottom) {
            return true;
        }
        self.has_ceiling && y - half_h < self.ceiling_y
    }
}

/// Axis-aligned half extents of an elliptical body rotated by `rotation_deg`
pub fn rotated_half_extents(half: Vec2, rotation_deg: f32) -> Vec2 {
    let (s, c) = rotation_deg.to_radians().sin_cos();
    Vec2::new(
        ((half.x * c).powi(2) + (half.y * s).powi(2)).sqrt(),
        ((half.x * s).powi(2) + (half.y * c).powi(2)).sqrt(),
    )
}

/// Horizontal collision reach of a body with the given rotated half extents.
///
/// Trimmed by half the vertical extent so grazing a column edge with the
/// tail or beak does not count.
#[inline]
pub fn horizontal_reach(extent: Vec2) -> f32 {
    (extent.x - extent.y / 2.0).max(0.0)
}

/// Does a column spanning `[left, right]` overlap a body at `x` with `reach`?
#[inline]
pub fn column_overlap(left: f32, right: f32, x: f32, reach: f32) -> bool {
    left <= x + reach && right >= x - reach
}

/// Is a body at `y` with `half_h` poking out of the gap `[top, bottom]`?
#[inline]
pub fn outside_gap(y: f32, half_h: f32, top: f32, bottom: f32) -> bool {
    y - half_h < top || y + half_h > bottom
}
