// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Math helpers covering the vector and quaternion primitives the collision
//! pipeline consumes.
//!
//! Everything is `f64`. The degenerate-contact bias steps through magnitudes
//! around `1e-100`, which would flush to zero in `f32`.

mod quat;
mod vec3;

pub use quat::Quat;
pub use vec3::Vec3;

/// Degeneracy threshold used when normalising vectors and quaternions.
///
/// Values with length ≤ `EPSILON` are treated as zero. Separation biases for
/// coincident bodies are far smaller and never pass through `normalize`.
pub const EPSILON: f64 = 1e-12;
