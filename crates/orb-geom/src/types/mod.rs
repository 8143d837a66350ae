// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Core geometry types used by the collision pipeline.
//!
//! Determinism notes:
//! - Overlap is inclusive: touching spheres intersect, so contact boundaries
//!   do not churn pairs.
//! - All math is `f64` without fused multiply-add.

#[doc = "Bounding spheres (world space)."]
pub mod bounds;
#[doc = "Rigid placement of a shape."]
pub mod pose;
#[doc = "Rays and ray-cast requests."]
pub mod ray;
#[doc = "Collision shapes in local space."]
pub mod shape;
