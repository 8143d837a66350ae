// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![doc = r"Geometry and broad phase for Orb.

This crate provides:
- `f64` vector and quaternion math (`Vec3`, `Quat`).
- Bounding spheres (`Bounds`), rays, shapes and rigid poses.
- A self-balancing dynamic bounding-sphere tree (`DynamicTree`).
- A broad phase that turns moved proxies into sorted, deduplicated pairs.

Design notes:
- Deterministic: no ambient RNG, no hashing on hot paths; pair output order is
  canonical.
- `f64` throughout so that tiny separation biases remain representable.
- Rustdoc is treated as part of the contract; public items are documented.
"]

/// Broad-phase tree and pair generation.
pub mod broad;
/// Vector and quaternion math.
pub mod math;
/// Foundational geometric types.
pub mod types;

pub use broad::broad_phase::BroadPhase;
pub use broad::dynamic_tree::{DynamicTree, ProxyId, TreeError};
pub use math::{Quat, Vec3};
pub use types::bounds::Bounds;
pub use types::pose::Pose;
pub use types::ray::{Ray, RayCastInput};
pub use types::shape::{Shape, ShapeKind};
