// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Quat, Vec3};
use crate::types::shape::Shape;

/// Rigid placement of a shape: world position plus orientation.
///
/// Conventions:
/// - `position` in metres (world space).
/// - `rotation` as a unit quaternion; rotation helpers normalise internally.
/// - No scale. Shapes carry their own dimensions.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    position: Vec3,
    rotation: Quat,
}

impl Pose {
    /// Identity pose (origin, no rotation).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::identity(),
        }
    }

    /// Creates a pose from components.
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with no rotation.
    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::identity())
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Orientation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Maps a world-space point into this pose's local frame.
    #[must_use]
    pub fn to_local_point(&self, point: &Vec3) -> Vec3 {
        self.rotation.inverse_rotate(&(*point - self.position))
    }

    /// Maps a local-space point into world space.
    #[must_use]
    pub fn to_world_point(&self, point: &Vec3) -> Vec3 {
        self.rotation.rotate(point) + self.position
    }

    /// Rotates a local-space direction into world space (no translation).
    #[must_use]
    pub fn to_world_direction(&self, direction: &Vec3) -> Vec3 {
        self.rotation.rotate(direction)
    }

    /// World-space support point of `shape` placed at this pose.
    #[must_use]
    pub fn support_point(&self, shape: &Shape, direction: &Vec3) -> Vec3 {
        let local_dir = self.rotation.inverse_rotate(direction);
        self.to_world_point(&shape.support_point(&local_dir))
    }
}
