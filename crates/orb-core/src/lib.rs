// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![doc = r"Orb core: bodies, narrow-phase resolution and the simulation world.

A [`World`] owns every [`Body`] and steps them with `update(dt)`:

1. Integrate active and particle bodies (explicit Euler plus gravity).
2. Ask the broad phase for candidate pairs among moved proxies.
3. Resolve each pair in the narrow phase, recording trims.
4. Query the tree once per particle and resolve those contacts.
5. Commit every trim and refresh proxies that moved.

Determinism: pair order is canonical, the separation bias is owned by the
world, and no hashing or ambient randomness is involved. Two worlds fed the
same calls end in bit-identical states.
"]

mod body;
mod body_set;
mod collide;
mod config;
mod error;
mod world;

pub use body::{Body, BodyDef};
pub use body_set::{BodyHandle, Category};
pub use collide::{ContactKind, NarrowPhase, SeparationBias};
pub use config::{BounceCombine, WorldConfig};
pub use error::{ConfigError, WorldError};
pub use world::{RayHit, StepReport, World};

pub use orb_geom::{Bounds, Quat, Ray, RayCastInput, Shape, ShapeKind, Vec3};
