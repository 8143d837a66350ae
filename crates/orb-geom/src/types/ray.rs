// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::Vec3;

/// Half-line with a unit-length direction.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Creates a ray; `direction` is normalised (a degenerate direction
    /// becomes zero and only hits bounds that contain the origin).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray origin.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point at `distance` along the ray.
    pub fn point_at(&self, distance: f64) -> Vec3 {
        self.origin + self.direction.scale(distance)
    }
}

/// Ray cast request: the ray plus the farthest distance of interest.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayCastInput {
    /// Ray to cast.
    pub ray: Ray,
    /// Hits beyond this distance are ignored. Negative values cast nothing.
    pub max_distance: f64,
}

impl RayCastInput {
    /// Unbounded cast along `ray`.
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            max_distance: f64::MAX,
        }
    }

    /// Cast along `ray` up to `max_distance`.
    pub fn with_max_distance(ray: Ray, max_distance: f64) -> Self {
        Self { ray, max_distance }
    }
}
