// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Narrow phase: exact overlap tests and position/velocity corrections.
//!
//! Every supported test produces a separation vector `n` that points from
//! body B toward body A with length equal to the penetration depth. The
//! shared resolver then records a trim on each movable body; nothing is
//! applied until the world commits the step.

use orb_geom::{Shape, ShapeKind, Vec3};
use tracing::trace;

use crate::body::Body;
use crate::config::BounceCombine;

/// Deterministic nudge for bodies whose centers coincide exactly.
///
/// Steps through `+x, -x, +y, -y, +z, -z` with magnitude `1e-100 * counter`,
/// so repeated calls never return the same vector. The counter starts at 1
/// and wraps back to 1 before `u32::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparationBias {
    counter: u32,
}

impl Default for SeparationBias {
    fn default() -> Self {
        Self { counter: 1 }
    }
}

impl SeparationBias {
    const SCALE: f64 = 1e-100;

    /// Fresh generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter value.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Returns the next bias vector and advances the counter.
    pub fn next_bias(&mut self) -> Vec3 {
        let counter = self.counter;
        let magnitude = Self::SCALE * f64::from(counter);
        let bias = match (counter - 1) % 6 {
            0 => Vec3::new(magnitude, 0.0, 0.0),
            1 => Vec3::new(-magnitude, 0.0, 0.0),
            2 => Vec3::new(0.0, magnitude, 0.0),
            3 => Vec3::new(0.0, -magnitude, 0.0),
            4 => Vec3::new(0.0, 0.0, magnitude),
            _ => Vec3::new(0.0, 0.0, -magnitude),
        };
        self.counter = if counter >= u32::MAX - 1 { 1 } else { counter + 1 };
        bias
    }
}

/// Narrow-phase routine selected for a pair of shapes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContactKind {
    /// Two spheres.
    SphereSphere,
    /// A particle and a sphere; `particle_first` tells which side is which.
    ParticleSphere {
        /// `true` when the first body is the particle.
        particle_first: bool,
    },
    /// A box and a sphere.
    BoxSphere {
        /// `true` when the first body is the box.
        box_first: bool,
    },
    /// A box and a particle.
    BoxParticle {
        /// `true` when the first body is the box.
        box_first: bool,
    },
    /// No routine exists; the pair never collides.
    Unsupported,
}

impl ContactKind {
    /// Dispatch table over every pair of shape kinds.
    #[must_use]
    pub fn classify(a: ShapeKind, b: ShapeKind) -> Self {
        use ShapeKind as K;
        match (a, b) {
            (K::Sphere, K::Sphere) => Self::SphereSphere,
            (K::Particle, K::Sphere) => Self::ParticleSphere {
                particle_first: true,
            },
            (K::Sphere, K::Particle) => Self::ParticleSphere {
                particle_first: false,
            },
            (K::Box, K::Sphere) => Self::BoxSphere { box_first: true },
            (K::Sphere, K::Box) => Self::BoxSphere { box_first: false },
            (K::Box, K::Particle) => Self::BoxParticle { box_first: true },
            (K::Particle, K::Box) => Self::BoxParticle { box_first: false },
            (K::Box, K::Box)
            | (K::Particle, K::Particle)
            | (K::Capsule | K::Polyhedron, _)
            | (_, K::Capsule | K::Polyhedron) => Self::Unsupported,
        }
    }

    /// Whether a routine exists for this pair.
    #[must_use]
    pub fn is_supported(self) -> bool {
        self != Self::Unsupported
    }
}

/// Pair resolver owned by a world.
///
/// Holds the restitution combine rule and the separation bias, so two worlds
/// never share state.
#[derive(Debug, Clone, Default)]
pub struct NarrowPhase {
    bounce_combine: BounceCombine,
    bias: SeparationBias,
}

impl NarrowPhase {
    /// Resolver using `bounce_combine` for restitution.
    #[must_use]
    pub fn new(bounce_combine: BounceCombine) -> Self {
        Self {
            bounce_combine,
            bias: SeparationBias::new(),
        }
    }

    /// Restitution combine rule.
    #[must_use]
    pub fn bounce_combine(&self) -> BounceCombine {
        self.bounce_combine
    }

    /// Bias generator state.
    #[must_use]
    pub fn bias(&self) -> &SeparationBias {
        &self.bias
    }

    /// Combined friction of two bodies (the smaller coefficient).
    #[must_use]
    pub fn combine_friction(a: &Body, b: &Body) -> f64 {
        a.friction().min(b.friction())
    }

    /// Tests `a` against `b` and records trims when they overlap.
    ///
    /// Returns `true` iff the shapes overlap and at least one body can be
    /// corrected. Unsupported shape pairs and pairs of immovable bodies
    /// return `false` without touching either body.
    pub fn collide(&mut self, a: &mut Body, b: &mut Body) -> bool {
        if a.is_immovable() && b.is_immovable() {
            return false;
        }
        let kind = ContactKind::classify(a.shape().kind(), b.shape().kind());
        let hit = match kind {
            ContactKind::SphereSphere => {
                let reach = a.shape().bounding_radius() + b.shape().bounding_radius();
                self.spheres(a, b, reach)
            }
            ContactKind::ParticleSphere {
                particle_first: true,
            } => {
                let reach = b.shape().bounding_radius();
                self.spheres(a, b, reach)
            }
            ContactKind::ParticleSphere {
                particle_first: false,
            } => {
                let reach = a.shape().bounding_radius();
                self.spheres(b, a, reach)
            }
            ContactKind::BoxSphere { box_first: true } => self.box_sphere(a, b),
            ContactKind::BoxSphere { box_first: false } => self.box_sphere(b, a),
            ContactKind::BoxParticle { box_first: true } => self.box_particle(a, b),
            ContactKind::BoxParticle { box_first: false } => self.box_particle(b, a),
            ContactKind::Unsupported => false,
        };
        if hit {
            trace!(?kind, "contact");
        }
        hit
    }

    /// Sphere-like pair: overlap when the centers are within `reach`.
    fn spheres(&mut self, a: &mut Body, b: &mut Body, reach: f64) -> bool {
        if a.position().distance(&b.position()) > reach {
            return false;
        }
        let mut offset = a.position() - b.position();
        if offset.is_zero() {
            offset = self.bias.next_bias();
        }
        let n = offset * (reach / offset.length() - 1.0);
        self.resolve(a, b, n);
        true
    }

    /// Box `a` against sphere `b`, worked in the box's local frame.
    fn box_sphere(&mut self, a: &mut Body, b: &mut Body) -> bool {
        let (Shape::Box { half_extents }, Shape::Sphere { radius }) = (a.shape(), b.shape())
        else {
            return false;
        };
        let (ext, r) = (*half_extents, *radius);
        let pos = a.pose().to_local_point(&b.position());

        let mut outside = Vec3::ZERO;
        let mut region = [0_i8; 3];
        for axis in 0..3 {
            let (p, e) = (pos.axis(axis), ext.axis(axis));
            if p < -e {
                outside = outside.with_axis(axis, p + e);
                region[axis] = -1;
            } else if p > e {
                outside = outside.with_axis(axis, p - e);
                region[axis] = 1;
            }
        }
        if outside.length_squared() > r * r {
            return false;
        }

        let inside_axes = region.iter().filter(|w| **w == 0).count();
        let local = if inside_axes >= 2 {
            // Face region: push out through the nearest face plane.
            let mut candidate = Vec3::ZERO;
            for axis in 0..3 {
                let (p, e) = (pos.axis(axis), ext.axis(axis));
                candidate = candidate.with_axis(axis, nearer_to_zero(p - r - e, p + r + e));
            }
            let axis = candidate.abs().min_axis();
            Vec3::ZERO.with_axis(axis, candidate.axis(axis))
        } else {
            // Edge or corner region: push along the line to the nearest feature.
            let mut feature = Vec3::ZERO;
            let mut center = Vec3::ZERO;
            let mut signs = Vec3::ZERO;
            for (axis, w) in region.iter().enumerate() {
                if *w != 0 {
                    let w = f64::from(*w);
                    feature = feature.with_axis(axis, ext.axis(axis) * w);
                    center = center.with_axis(axis, pos.axis(axis));
                    signs = signs.with_axis(axis, w);
                }
            }
            let delta = feature - center;
            let mag = delta.length();
            if mag > 0.0 {
                delta * (r / mag - 1.0)
            } else {
                signs * r
            }
        };
        let n = a.pose().to_world_direction(&local);
        self.resolve(a, b, n);
        true
    }

    /// Box `a` against particle `b`: the point must lie inside the box.
    fn box_particle(&mut self, a: &mut Body, b: &mut Body) -> bool {
        let Shape::Box { half_extents } = a.shape() else {
            return false;
        };
        let ext = *half_extents;
        let pos = a.pose().to_local_point(&b.position());
        if (0..3).any(|axis| pos.axis(axis).abs() > ext.axis(axis)) {
            return false;
        }
        let mut candidate = Vec3::ZERO;
        for axis in 0..3 {
            let (p, e) = (pos.axis(axis), ext.axis(axis));
            candidate = candidate.with_axis(axis, nearer_to_zero(p - e, p + e));
        }
        let axis = candidate.abs().min_axis();
        let local = Vec3::ZERO.with_axis(axis, candidate.axis(axis));
        let n = a.pose().to_world_direction(&local);
        self.resolve(a, b, n);
        true
    }

    /// Splits the correction `n` (B toward A) between the bodies.
    fn resolve(&self, a: &mut Body, b: &mut Body, n: Vec3) {
        let e = self.bounce_combine.combine(a.bounce(), b.bounce()) + 1.0;
        let an = a.velocity().project_onto(&n);
        let bn = b.velocity().project_onto(&n);
        if a.is_immovable() {
            b.set_trim(-n, -(bn * e));
        } else if b.is_immovable() {
            a.set_trim(n, -(an * e));
        } else {
            let total = a.mass() + b.mass();
            let wa = b.mass() / total;
            let wb = a.mass() / total;
            a.set_trim(n * wa, (bn - an) * (wa * e));
            b.set_trim(-(n * wb), (an - bn) * (wb * e));
        }
    }
}

fn nearer_to_zero(lhs: f64, rhs: f64) -> f64 {
    if lhs.abs() < rhs.abs() {
        lhs
    } else {
        rhs
    }
}
