// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::Vec3;

/// Geometry attached to a body, expressed in the body's local frame.
///
/// Capsules are aligned with the local Y axis. Polyhedra are point clouds
/// whose convex hull is the shape; no hull is built, the support function
/// scans the vertices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Shape {
    /// Zero-extent point.
    Particle,
    /// Sphere centered on the body origin.
    Sphere {
        /// Sphere radius.
        radius: f64,
    },
    /// Oriented box centered on the body origin.
    Box {
        /// Half-size along each local axis.
        half_extents: Vec3,
    },
    /// Segment from `-half_height` to `+half_height` on local Y, swept by `radius`.
    Capsule {
        /// Sweep radius.
        radius: f64,
        /// Half the length of the core segment.
        half_height: f64,
    },
    /// Convex hull of a vertex cloud.
    Polyhedron {
        /// Hull vertices in local space.
        vertices: Vec<Vec3>,
    },
}

/// Fieldless discriminant of [`Shape`], used for pair dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    /// [`Shape::Particle`].
    Particle,
    /// [`Shape::Sphere`].
    Sphere,
    /// [`Shape::Box`].
    Box,
    /// [`Shape::Capsule`].
    Capsule,
    /// [`Shape::Polyhedron`].
    Polyhedron,
}

impl Shape {
    /// Sphere with radius `|radius|`.
    pub fn sphere(radius: f64) -> Self {
        Self::Sphere {
            radius: radius.abs(),
        }
    }

    /// Box with half extents `|half_extents|`.
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box {
            half_extents: half_extents.abs(),
        }
    }

    /// Capsule with non-negative radius and half height.
    pub fn capsule(radius: f64, half_height: f64) -> Self {
        Self::Capsule {
            radius: radius.abs(),
            half_height: half_height.abs(),
        }
    }

    /// Convex polyhedron spanned by `vertices`.
    pub fn polyhedron(vertices: Vec<Vec3>) -> Self {
        Self::Polyhedron { vertices }
    }

    /// Discriminant for dispatch tables.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Particle => ShapeKind::Particle,
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Box { .. } => ShapeKind::Box,
            Self::Capsule { .. } => ShapeKind::Capsule,
            Self::Polyhedron { .. } => ShapeKind::Polyhedron,
        }
    }

    /// Particles are never inserted into the spatial index.
    pub fn is_particle(&self) -> bool {
        matches!(self, Self::Particle)
    }

    /// Radius of the smallest origin-centered sphere enclosing the shape.
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Self::Particle => 0.0,
            Self::Sphere { radius } => *radius,
            Self::Box { half_extents } => half_extents.length(),
            Self::Capsule {
                radius,
                half_height,
            } => radius + half_height,
            Self::Polyhedron { vertices } => vertices.iter().map(Vec3::length).fold(0.0, f64::max),
        }
    }

    /// Farthest local-space point of the shape along `direction`.
    ///
    /// `direction` need not be normalised. A zero direction returns a point on
    /// the shape chosen deterministically (the positive corner for boxes, the
    /// origin for round shapes).
    pub fn support_point(&self, direction: &Vec3) -> Vec3 {
        match self {
            Self::Particle => Vec3::ZERO,
            Self::Sphere { radius } => direction.normalize().scale(*radius),
            Self::Box { half_extents } => Vec3::new(
                half_extents.x().copysign(signum_or_one(direction.x())),
                half_extents.y().copysign(signum_or_one(direction.y())),
                half_extents.z().copysign(signum_or_one(direction.z())),
            ),
            Self::Capsule {
                radius,
                half_height,
            } => {
                let core = half_height.copysign(signum_or_one(direction.y()));
                Vec3::new(0.0, core, 0.0) + direction.normalize().scale(*radius)
            }
            Self::Polyhedron { vertices } => {
                let mut best = Vec3::ZERO;
                let mut best_dot = f64::NEG_INFINITY;
                for v in vertices {
                    let d = v.dot(direction);
                    if d > best_dot {
                        best_dot = d;
                        best = *v;
                    }
                }
                best
            }
        }
    }
}

fn signum_or_one(value: f64) -> f64 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}
