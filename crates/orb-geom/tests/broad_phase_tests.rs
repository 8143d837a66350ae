// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for broad-phase pair generation.

use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use orb_geom::{BroadPhase, Bounds, ProxyId, Ray, RayCastInput, Vec3};

fn at(x: f64, r: f64) -> Bounds {
    Bounds::new(Vec3::new(x, 0.0, 0.0), r)
}

fn collect_pairs(bp: &mut BroadPhase<u32>) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    bp.update_pairs(|a, b| out.push((a, b)));
    out
}

#[test]
fn pairs_are_canonical_sorted_and_unique() {
    let mut bp = BroadPhase::new();
    let mut ids = Vec::new();
    for (payload, x) in [(0_u32, 0.0), (1, 1.0), (2, 100.0), (3, 0.5)] {
        ids.push(bp.create_proxy(at(x, 1.0), payload).expect("create"));
    }
    let mut pairs = Vec::new();
    bp.update_pairs(|a, b| pairs.push((ids[a as usize], ids[b as usize])));

    // Three proxies overlap pairwise; the far one pairs with nobody.
    assert_eq!(pairs.len(), 3);
    assert!(pairs.iter().all(|(a, b)| a < b));
    assert!(pairs.windows(2).all(|w| w[0] < w[1]));
    assert!(pairs.iter().all(|(a, b)| *a != ids[2] && *b != ids[2]));
}

#[test]
fn nothing_moved_means_no_pairs() {
    let mut bp = BroadPhase::new();
    bp.create_proxy(at(0.0, 1.0), 0_u32).expect("create");
    bp.create_proxy(at(1.0, 1.0), 1_u32).expect("create");
    assert_eq!(collect_pairs(&mut bp), vec![(0, 1)]);
    assert!(collect_pairs(&mut bp).is_empty());
}

#[test]
fn touch_reinstates_resting_pairs() {
    let mut bp = BroadPhase::new();
    let a = bp.create_proxy(at(0.0, 1.0), 0_u32).expect("create");
    bp.create_proxy(at(1.0, 1.0), 1_u32).expect("create");
    collect_pairs(&mut bp);

    assert!(bp.touch_proxy(a));
    assert_eq!(collect_pairs(&mut bp), vec![(0, 1)]);
    assert!(!bp.touch_proxy(ProxyId::from_raw(500)));
}

#[test]
fn both_sides_moving_still_reports_once() {
    let mut bp = BroadPhase::with_margin(0.0);
    let a = bp.create_proxy(at(0.0, 1.0), 0_u32).expect("create");
    let b = bp.create_proxy(at(10.0, 1.0), 1_u32).expect("create");
    collect_pairs(&mut bp);

    assert!(bp.move_proxy(a, at(4.5, 1.0)).expect("move"));
    assert!(bp.move_proxy(b, at(5.5, 1.0)).expect("move"));
    bp.touch_proxy(a);
    assert_eq!(bp.update_pairs(|_, _| {}), 1);
}

#[test]
fn moves_inside_fat_bounds_are_not_buffered() {
    let mut bp = BroadPhase::with_margin(1.0);
    let a = bp.create_proxy(at(0.0, 1.0), 0_u32).expect("create");
    collect_pairs(&mut bp);
    assert!(!bp.move_proxy(a, at(0.5, 1.0)).expect("move"));
    assert_eq!(bp.move_count(), 0);
    assert!(bp.move_proxy(a, at(3.0, 1.0)).expect("move"));
    assert_eq!(bp.move_count(), 1);
}

#[test]
fn ray_cast_passes_through_to_tree() {
    let mut bp = BroadPhase::new();
    bp.create_proxy(at(5.0, 1.0), 7_u32).expect("create");
    let mut hit = None;
    bp.ray_cast(
        &RayCastInput::new(Ray::new(Vec3::ZERO, Vec3::UNIT_X)),
        |id, d| {
            hit = Some((id, d));
            d
        },
    );
    let (id, d) = hit.expect("hit");
    assert_eq!(bp.payload(id), Some(7));
    assert!((d - 4.0).abs() < 1e-12);
}

#[test]
fn update_pairs_matches_brute_force() {
    const SEED_BYTES: [u8; 32] = [
        0x5a, 0xa5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0,
    ];
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(
        PropConfig {
            cases: 64,
            ..PropConfig::default()
        },
        rng,
    );

    let bound = (prop::array::uniform3(-20.0_f64..20.0), 0.1_f64..3.0)
        .prop_map(|(c, r)| Bounds::new(Vec3::from(c), r));
    let scene = (
        prop::collection::vec(bound.clone(), 2..60),
        prop::collection::vec((any::<usize>(), bound), 0..20),
    );

    runner
        .run(&scene, |(initial, moves)| {
            let mut bp = BroadPhase::with_margin(0.25);
            let ids: Vec<ProxyId> = initial
                .iter()
                .enumerate()
                .map(|(i, b)| bp.create_proxy(*b, u32::try_from(i).unwrap()).expect("create"))
                .collect();
            bp.update_pairs(|_, _| {});

            let mut moved = Vec::new();
            for (pick, b) in moves {
                let id = ids[pick % ids.len()];
                if bp.move_proxy(id, b).expect("move") {
                    moved.push(id);
                }
            }

            let mut expected = Vec::new();
            for &m in &moved {
                let mb = bp.bounds(m).expect("live");
                for &other in &ids {
                    if other != m && bp.bounds(other).expect("live").intersects(&mb) {
                        let (lo, hi) = (m.min(other), m.max(other));
                        expected.push((
                            bp.payload(lo).expect("live"),
                            bp.payload(hi).expect("live"),
                        ));
                    }
                }
            }
            // Leaf ids grow with creation order when nothing is destroyed, so
            // payload order matches proxy-id order.
            expected.sort_unstable();
            expected.dedup();

            let mut got = Vec::new();
            let count = bp.update_pairs(|a, b| got.push((a, b)));
            prop_assert_eq!(count, got.len());
            prop_assert_eq!(got, expected);
            Ok(())
        })
        .expect("broad phase agrees with brute force");
}
