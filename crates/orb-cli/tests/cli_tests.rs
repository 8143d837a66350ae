// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Black-box tests for the `orb` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const TWO_SPHERES: &str = r#"{
    "config": { "fat_margin": 0.05 },
    "bodies": [
        { "shape": { "kind": "sphere", "radius": 1.0 } },
        { "shape": { "kind": "sphere", "radius": 1.0 }, "position": [1.5, 0, 0] }
    ]
}"#;

fn scene_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write scene");
    file
}

fn orb() -> Command {
    Command::cargo_bin("orb").expect("binary built")
}

#[test]
fn run_prints_a_text_summary() {
    let scene = scene_file(TWO_SPHERES);
    orb()
        .args(["run", "--steps", "1"])
        .arg(scene.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ran 1 steps, 1 contacts"))
        .stdout(predicate::str::contains("pos (-0.2500, 0.0000, 0.0000)"))
        .stdout(predicate::str::contains("pos (1.7500, 0.0000, 0.0000)"));
}

#[test]
fn run_json_reports_every_step() {
    let scene = scene_file(TWO_SPHERES);
    let output = orb()
        .args(["run", "--steps", "3", "--json"])
        .arg(scene.path())
        .output()
        .expect("run");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let steps = value["steps"].as_array().expect("steps");
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0]["step"], 1);
    assert_eq!(steps[0]["contacts"], 1);
    assert_eq!(value["bodies"].as_array().expect("bodies").len(), 2);
}

#[test]
fn validate_counts_bodies() {
    let scene = scene_file(TWO_SPHERES);
    orb()
        .arg("validate")
        .arg(scene.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok: 2 bodies"));
}

#[test]
fn unknown_fields_fail_with_context() {
    let scene = scene_file(r#"{ "bodies": [ { "radius": 1.0 } ] }"#);
    orb()
        .arg("validate")
        .arg(scene.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse scene"));
}

#[test]
fn invalid_config_is_rejected() {
    let scene = scene_file(r#"{ "config": { "fat_margin": -1.0 } }"#);
    orb()
        .args(["run"])
        .arg(scene.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid world config"));
}

#[test]
fn negative_dt_is_rejected() {
    let scene = scene_file(TWO_SPHERES);
    orb()
        .args(["run", "--dt=-0.5"])
        .arg(scene.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dt must be finite"));
}

#[test]
fn missing_scene_reports_the_path() {
    orb()
        .args(["validate", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/definitely/not/here.json"));
}
