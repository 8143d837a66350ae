// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for world configuration and stepping.

use orb_geom::TreeError;
use thiserror::Error;

/// Errors produced while loading or validating a [`crate::WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading a config source.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON was malformed or did not match the schema.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A field parsed but holds a value the world cannot run with.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Errors surfaced by [`crate::World`].
///
/// Stale handles are not errors; they turn operations into no-ops.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The spatial index found corrupted structure. The world must be rebuilt.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// `update` was called with a negative or non-finite time step.
    #[error("invalid time step: {dt}")]
    InvalidTimeStep {
        /// The rejected step length in seconds.
        dt: f64,
    },
    /// The world was constructed from an invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
