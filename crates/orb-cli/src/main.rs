// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `orb`: load a JSON scene, step it, and report what happened.
//!
//! Logs go to stderr (filter with `RUST_LOG`); results go to stdout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use orb_core::StepReport;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod scene;

use scene::Scene;

#[derive(Parser, Debug)]
#[command(name = "orb", version, about = "Step Orb physics scenes from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scene for a number of fixed steps
    Run {
        /// Path to the scene JSON file
        scene: PathBuf,
        /// Number of steps to run
        #[arg(long, default_value_t = 60)]
        steps: u32,
        /// Step length in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,
        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Parse and validate a scene without running it
    Validate {
        /// Path to the scene JSON file
        scene: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct BodyState {
    index: u32,
    position: [f64; 3],
    velocity: [f64; 3],
}

#[derive(Debug, Serialize)]
struct RunOutput {
    steps: Vec<StepReport>,
    total_contacts: usize,
    bodies: Vec<BodyState>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            scene,
            steps,
            dt,
            json,
        } => run(&scene, steps, dt, json),
        Command::Validate { scene } => {
            let loaded = Scene::load(&scene)?;
            let mut out = io::stdout().lock();
            writeln!(
                out,
                "ok: {} bodies, fat_margin {}",
                loaded.bodies.len(),
                loaded.config.fat_margin
            )?;
            Ok(())
        }
    }
}

fn run(path: &Path, steps: u32, dt: f64, json: bool) -> Result<()> {
    if !dt.is_finite() || dt < 0.0 {
        bail!("--dt must be finite and non-negative, got {dt}");
    }
    let scene = Scene::load(path)?;
    let mut world = scene.instantiate()?;
    info!(bodies = world.len(), steps, dt, "running scene");

    let mut reports = Vec::with_capacity(steps as usize);
    for _ in 0..steps {
        let report = world
            .update(dt)
            .with_context(|| format!("step {} failed", world.step_count() + 1))?;
        reports.push(report);
    }

    let mut bodies = Vec::with_capacity(world.len());
    world.for_each_body(|handle, body| {
        bodies.push(BodyState {
            index: handle.index(),
            position: body.position().to_array(),
            velocity: body.velocity().to_array(),
        });
    });
    let output = RunOutput {
        total_contacts: reports.iter().map(|r| r.contacts).sum(),
        steps: reports,
        bodies,
    };

    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &output)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "ran {} steps, {} contacts",
            output.steps.len(),
            output.total_contacts
        )?;
        for body in &output.bodies {
            let [px, py, pz] = body.position;
            let [vx, vy, vz] = body.velocity;
            writeln!(
                out,
                "body {:>4}  pos ({px:.4}, {py:.4}, {pz:.4})  vel ({vx:.4}, {vy:.4}, {vz:.4})",
                body.index
            )?;
        }
    }
    Ok(())
}
