// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World configuration and its JSON loader.

use std::io::Read;

use orb_geom::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How two bodies' bounce coefficients combine into one restitution term.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BounceCombine {
    /// Arithmetic mean of both coefficients.
    #[default]
    Mean,
    /// The larger coefficient wins.
    Max,
}

impl BounceCombine {
    /// Combines two bounce coefficients.
    #[must_use]
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Mean => (a + b) * 0.5,
            Self::Max => a.max(b),
        }
    }
}

/// Tunables for a [`crate::World`].
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Radius added to every stored proxy bound. Larger margins trade query
    /// precision for fewer tree reinsertions.
    pub fat_margin: f64,
    /// Restitution combine rule used by the narrow phase.
    pub bounce_combine: BounceCombine,
    /// Acceleration added to every integrated body each step.
    pub gravity: Vec3,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            fat_margin: 0.1,
            bounce_combine: BounceCombine::Mean,
            gravity: Vec3::ZERO,
        }
    }
}

impl WorldConfig {
    /// Rejects values the simulation cannot run with.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fat_margin.is_finite() || self.fat_margin < 0.0 {
            return Err(ConfigError::Invalid {
                field: "fat_margin",
                reason: "must be finite and non-negative",
            });
        }
        if !self.gravity.to_array().iter().all(|c| c.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "gravity",
                reason: "components must be finite",
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON config.
    ///
    /// # Errors
    /// [`ConfigError::Serde`] for malformed JSON, [`ConfigError::Invalid`] for
    /// out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config.
    ///
    /// # Errors
    /// As [`WorldConfig::from_json_str`], plus [`ConfigError::Io`].
    pub fn from_json_reader<R: Read>(mut reader: R) -> Result<Self, ConfigError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json_str(&buf)
    }

    /// Pretty-printed JSON form.
    ///
    /// # Errors
    /// [`ConfigError::Serde`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
