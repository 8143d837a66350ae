// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene files: a world config plus the bodies to create.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use orb_core::{BodyDef, World, WorldConfig};
use serde::{Deserialize, Serialize};

/// On-disk scene description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scene {
    pub config: WorldConfig,
    pub bodies: Vec<BodyDef>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open scene {}", path.display()))?;
        let scene: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse scene {}", path.display()))?;
        scene.config.validate().context("invalid world config")?;
        for (i, body) in scene.bodies.iter().enumerate() {
            check_body(body).with_context(|| format!("invalid body #{i}"))?;
        }
        Ok(scene)
    }

    /// Builds a world and creates every body in file order.
    pub fn instantiate(&self) -> Result<World> {
        let mut world = World::with_config(self.config.clone())?;
        for def in &self.bodies {
            world.create_body(def)?;
        }
        Ok(world)
    }
}

fn check_body(body: &BodyDef) -> Result<()> {
    let vectors = [body.position, body.velocity, body.angular_velocity];
    if !vectors
        .iter()
        .flat_map(|v| v.to_array())
        .chain([body.mass, body.bounce, body.friction])
        .all(f64::is_finite)
    {
        bail!("non-finite value");
    }
    if !body.shape.bounding_radius().is_finite() {
        bail!("shape extent is not finite");
    }
    Ok(())
}
