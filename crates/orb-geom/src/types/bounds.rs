// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::Vec3;
use crate::types::ray::Ray;

/// Bounding sphere in world coordinates.
///
/// Invariants:
/// - `radius >= 0`; negative or NaN radii are clamped to zero on construction.
/// - [`Bounds::union`] and [`Bounds::contains`] form the merge used to build
///   internal tree bounds: the union of `a` and `b` contains both, and a
///   bound that already contains the other is returned unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    center: Vec3,
    radius: f64,
}

impl Bounds {
    /// Constructs a bound from its center and radius.
    pub fn new(center: Vec3, radius: f64) -> Self {
        debug_assert!(!(radius < 0.0), "negative bounding radius: {radius}");
        Self {
            center,
            radius: if radius > 0.0 { radius } else { 0.0 },
        }
    }

    /// Smallest sphere whose diameter is the segment `p0..p1`.
    pub fn from_diameter(p0: Vec3, p1: Vec3) -> Self {
        Self::new((p0 + p1).scale(0.5), p0.distance(&p1) * 0.5)
    }

    /// Center of the sphere.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Radius of the sphere.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns `true` if `other` lies entirely inside this bound.
    pub fn contains(&self, other: &Self) -> bool {
        self.radius >= self.center.distance(&other.center) + other.radius
    }

    /// Returns `true` if the spheres overlap (touching counts as overlap).
    pub fn intersects(&self, other: &Self) -> bool {
        let sum = self.radius + other.radius;
        sum * sum >= self.center.distance_squared(&other.center)
    }

    /// Smallest sphere enclosing both bounds.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let offset = self.center - other.center;
        let dist = offset.length();
        if self.radius >= dist + other.radius {
            return *self;
        }
        if other.radius >= dist + self.radius {
            return *other;
        }
        // Neither contains the other, so `dist > 0`. The enclosing sphere spans
        // the two far points along the line of centers.
        let far_self = self.center + offset.scale(self.radius / dist);
        let far_other = other.center - offset.scale(other.radius / dist);
        let radius = (dist + self.radius + other.radius) * 0.5;
        Self::new((far_self + far_other).scale(0.5), radius)
    }

    /// Radius of [`Bounds::union`] without building the merged center.
    ///
    /// Used as the insertion cost when descending the tree.
    pub fn union_radius(&self, other: &Self) -> f64 {
        let dist = self.center.distance(&other.center);
        if self.radius >= dist + other.radius {
            return self.radius;
        }
        if other.radius >= dist + self.radius {
            return other.radius;
        }
        (dist + self.radius + other.radius) * 0.5
    }

    /// Grows the radius by `margin`.
    #[must_use]
    pub fn inflate(&self, margin: f64) -> Self {
        Self::new(self.center, self.radius + margin)
    }

    /// Distance along `ray` to the first point of this sphere.
    ///
    /// Returns `None` when the ray misses or the sphere lies entirely behind
    /// the origin. A ray starting inside the sphere reports distance `0`.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        // |O + D t - C|^2 = r^2 with |D| = 1:
        //   t^2 - 2 (OC·D) t + (|OC|^2 - r^2) = 0
        let dir = ray.direction();
        let to_center = self.center - ray.origin();
        let half_b = to_center.dot(&dir);
        let c = to_center.length_squared() - self.radius * self.radius;
        let disc = half_b * half_b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        if half_b + root < 0.0 {
            return None;
        }
        Some((half_b - root).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_disjoint_spheres_spans_far_points() {
        let a = Bounds::new(Vec3::new(-2.0, 0.0, 0.0), 1.0);
        let b = Bounds::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let u = a.union(&b);
        assert!((u.radius() - 3.0).abs() < 1e-12);
        assert!(u.center().length() < 1e-12);
        assert!((a.union_radius(&b) - u.radius()).abs() < 1e-12);
    }

    #[test]
    fn union_returns_container_unchanged() {
        let big = Bounds::new(Vec3::ZERO, 5.0);
        let small = Bounds::new(Vec3::new(1.0, 1.0, 0.0), 1.0);
        assert_eq!(big.union(&small), big);
        assert_eq!(small.union(&big), big);
    }

    #[test]
    fn coincident_equal_spheres_union_to_themselves() {
        let a = Bounds::new(Vec3::new(3.0, 3.0, 3.0), 2.0);
        assert_eq!(a.union(&a), a);
        assert!(a.contains(&a));
    }

    #[test]
    fn zero_radius_bounds_touch_at_a_point() {
        let b = Bounds::new(Vec3::ZERO, 0.0);
        assert_eq!(b.radius(), 0.0);
        assert!(b.intersects(&Bounds::new(Vec3::ZERO, 0.0)));
    }

    #[test]
    fn diameter_bounds_enclose_both_endpoints() {
        let p0 = Vec3::new(1.0, 2.0, 3.0);
        let p1 = Vec3::new(1.0, 2.0, -1.0);
        let b = Bounds::from_diameter(p0, p1);
        assert_eq!(b.center().to_array(), [1.0, 2.0, 1.0]);
        assert_eq!(b.radius(), 2.0);
        assert!(b.contains(&Bounds::new(p0, 0.0)));
        assert!(b.contains(&Bounds::new(p1, 0.0)));
    }
}
