// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for the dynamic bounding-sphere tree.

use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use orb_geom::{Bounds, DynamicTree, ProxyId, Ray, RayCastInput, Vec3};

const SEED_BYTES: [u8; 32] = [
    0x0b, 0x17, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0,
];

#[derive(Debug, Clone)]
enum Op {
    Create(Bounds),
    Destroy(usize),
    Move(usize, Bounds),
}

fn bounds_strategy() -> impl Strategy<Value = Bounds> {
    (
        prop::array::uniform3(-50.0_f64..50.0),
        0.05_f64..4.0,
    )
        .prop_map(|(c, r)| Bounds::new(Vec3::from(c), r))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => bounds_strategy().prop_map(Op::Create),
        1 => any::<usize>().prop_map(Op::Destroy),
        2 => (any::<usize>(), bounds_strategy()).prop_map(|(i, b)| Op::Move(i, b)),
    ]
}

fn runner() -> TestRunner {
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    TestRunner::new_with_rng(
        PropConfig {
            cases: 64,
            ..PropConfig::default()
        },
        rng,
    )
}

#[test]
fn random_operation_sequences_keep_tree_invariants() {
    let ops = prop::collection::vec(op_strategy(), 1..160);
    runner()
        .run(&ops, |ops| {
            let mut tree = DynamicTree::with_margin(0.1);
            let mut live: Vec<ProxyId> = Vec::new();
            for (step, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Create(b) => {
                        live.push(tree.create_proxy(b, step).expect("create"));
                    }
                    Op::Destroy(i) if !live.is_empty() => {
                        let id = live.swap_remove(i % live.len());
                        prop_assert!(tree.destroy_proxy(id).expect("destroy"));
                    }
                    Op::Move(i, b) if !live.is_empty() => {
                        let id = live[i % live.len()];
                        tree.move_proxy(id, b).expect("move");
                        let stored = tree.bounds(id).expect("live proxy");
                        prop_assert!(stored.contains(&b));
                    }
                    _ => {}
                }
                prop_assert_eq!(tree.validate(), Ok(()));
                prop_assert!(tree.max_balance() <= 1, "balance {}", tree.max_balance());
                prop_assert_eq!(tree.height(), tree.compute_height());
                prop_assert_eq!(tree.proxy_count(), live.len());
            }

            for id in live.drain(..).rev() {
                prop_assert!(tree.destroy_proxy(id).expect("destroy"));
            }
            prop_assert_eq!(tree.node_count(), 0);
            prop_assert!(tree.is_empty());
            prop_assert_eq!(tree.validate(), Ok(()));
            Ok(())
        })
        .expect("tree invariants hold");
}

#[test]
fn query_matches_brute_force_over_stored_bounds() {
    let input = (
        prop::collection::vec(bounds_strategy(), 0..80),
        bounds_strategy(),
    );
    runner()
        .run(&input, |(leaves, region)| {
            let mut tree = DynamicTree::new();
            let ids: Vec<ProxyId> = leaves
                .iter()
                .enumerate()
                .map(|(i, b)| tree.create_proxy(*b, i).expect("create"))
                .collect();

            let mut found = Vec::new();
            tree.query(&region, |id| {
                found.push(id);
                true
            });
            found.sort_unstable();

            let mut expected: Vec<ProxyId> = ids
                .iter()
                .zip(&leaves)
                .filter(|(_, b)| b.intersects(&region))
                .map(|(id, _)| *id)
                .collect();
            expected.sort_unstable();
            prop_assert_eq!(found, expected);
            Ok(())
        })
        .expect("query agrees with brute force");
}

#[test]
fn lifecycle_returns_every_slot_to_the_free_list() {
    let mut tree = DynamicTree::new();
    let ids: Vec<ProxyId> = (0..100_u32)
        .map(|i| {
            let x = f64::from(i % 10) * 2.5;
            let z = f64::from(i / 10) * 2.5;
            tree.create_proxy(Bounds::new(Vec3::new(x, 0.0, z), 1.0), i)
                .expect("create")
        })
        .collect();
    let capacity = tree.capacity();
    assert_eq!(tree.node_count(), 199);

    // Destroy in an interleaved order: evens ascending, then odds descending.
    for id in ids.iter().step_by(2) {
        assert!(tree.destroy_proxy(*id).expect("destroy"));
    }
    for id in ids.iter().skip(1).step_by(2).rev() {
        assert!(tree.destroy_proxy(*id).expect("destroy"));
    }
    assert_eq!(tree.node_count(), 0);
    assert_eq!(tree.capacity(), capacity);
    assert_eq!(tree.validate(), Ok(()));

    // Freed slots are reused before the pool grows again.
    for i in 0..50_u32 {
        tree.create_proxy(Bounds::new(Vec3::new(f64::from(i), 0.0, 0.0), 0.5), i)
            .expect("create");
    }
    assert_eq!(tree.capacity(), capacity);
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn invalid_ids_are_ignored() {
    let mut tree = DynamicTree::new();
    let a = tree
        .create_proxy(Bounds::new(Vec3::ZERO, 1.0), 'a')
        .expect("create");
    let b = tree
        .create_proxy(Bounds::new(Vec3::new(3.0, 0.0, 0.0), 1.0), 'b')
        .expect("create");

    let out_of_range = ProxyId::from_raw(10_000);
    assert!(!tree.destroy_proxy(out_of_range).expect("no-op"));
    assert!(!tree
        .move_proxy(out_of_range, Bounds::new(Vec3::ZERO, 1.0))
        .expect("no-op"));
    assert_eq!(tree.bounds(out_of_range), None);
    assert_eq!(tree.payload(out_of_range), None);

    // Slots 0 and 1 hold the leaves; slot 2 is their parent.
    let internal = ProxyId::from_raw(2);
    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.bounds(internal), None);
    assert!(!tree.destroy_proxy(internal).expect("no-op"));
    assert_eq!(tree.node_count(), 3);

    assert!(tree.destroy_proxy(a).expect("destroy"));
    assert!(!tree.destroy_proxy(a).expect("double destroy is a no-op"));
    assert_eq!(tree.payload(b), Some('b'));
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn small_moves_inside_fat_bound_do_not_reinsert() {
    let mut tree = DynamicTree::with_margin(0.5);
    let id = tree
        .create_proxy(Bounds::new(Vec3::ZERO, 1.0), ())
        .expect("create");
    assert_eq!(tree.bounds(id).map(|b| b.radius()), Some(1.5));

    let nudged = Bounds::new(Vec3::new(0.4, 0.0, 0.0), 1.0);
    assert!(!tree.move_proxy(id, nudged).expect("move"));
    assert_eq!(tree.bounds(id).map(|b| b.center()), Some(Vec3::ZERO));

    let escaped = Bounds::new(Vec3::new(0.6, 0.0, 0.0), 1.0);
    assert!(tree.move_proxy(id, escaped).expect("move"));
    let stored = tree.bounds(id).expect("live");
    assert_eq!(stored.center(), escaped.center());
    assert!((stored.radius() - 1.5).abs() < 1e-12);
}

#[test]
fn empty_tree_queries_report_nothing() {
    let tree: DynamicTree<u32> = DynamicTree::new();
    let mut hits = 0;
    tree.query(&Bounds::new(Vec3::ZERO, 1e6), |_| {
        hits += 1;
        true
    });
    tree.ray_cast(
        &RayCastInput::new(Ray::new(Vec3::ZERO, Vec3::UNIT_X)),
        |_, _| {
            hits += 1;
            0.0
        },
    );
    assert_eq!(hits, 0);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.area_ratio(), 0.0);
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn ray_cast_clipping_finds_closest_leaf() {
    let mut tree = DynamicTree::new();
    for (i, x) in [12.0, 4.0, 30.0, 8.0].into_iter().enumerate() {
        tree.create_proxy(Bounds::new(Vec3::new(x, 0.0, 0.0), 1.0), i)
            .expect("create");
    }
    tree.create_proxy(Bounds::new(Vec3::new(6.0, 10.0, 0.0), 1.0), 99)
        .expect("create");

    let input = RayCastInput::with_max_distance(Ray::new(Vec3::ZERO, Vec3::UNIT_X), 100.0);
    let mut closest = None;
    tree.ray_cast(&input, |id, distance| {
        closest = Some((tree.payload(id), distance));
        distance
    });
    let (payload, distance) = closest.expect("hit");
    assert_eq!(payload, Some(1));
    assert!((distance - 3.0).abs() < 1e-12);

    // A negative return stops after the first visited leaf.
    let mut visits = 0;
    tree.ray_cast(&input, |_, _| {
        visits += 1;
        -1.0
    });
    assert_eq!(visits, 1);

    // A negative max distance casts nothing.
    let mut any = false;
    tree.ray_cast(
        &RayCastInput::with_max_distance(Ray::new(Vec3::ZERO, Vec3::UNIT_X), -1.0),
        |_, d| {
            any = true;
            d
        },
    );
    assert!(!any);
}

#[test]
fn bottom_up_rebuild_keeps_leaves_and_structure_valid() {
    let mut tree = DynamicTree::new();
    let mut ids = Vec::new();
    for i in 0..40_u32 {
        let angle = f64::from(i) * 0.7;
        let c = Vec3::new(angle.cos() * 20.0, f64::from(i) * 0.3, angle.sin() * 20.0);
        ids.push(tree.create_proxy(Bounds::new(c, 1.0), i).expect("create"));
    }
    let before = tree.node_count();
    tree.rebuild_bottom_up();
    assert_eq!(tree.node_count(), before);
    assert_eq!(tree.validate(), Ok(()));
    assert_eq!(tree.height(), tree.compute_height());
    assert!(tree.area_ratio() >= 1.0);

    let mut leaves = Vec::new();
    tree.for_each_leaf(|id, _| leaves.push(id));
    leaves.sort_unstable();
    ids.sort_unstable();
    assert_eq!(leaves, ids);

    let mut internal = 0;
    tree.for_each_internal_bounds(|_| internal += 1);
    assert_eq!(internal, ids.len() - 1);

    // The rebuilt tree keeps accepting incremental edits.
    assert!(tree.destroy_proxy(ids[7]).expect("destroy"));
    tree.create_proxy(Bounds::new(Vec3::ZERO, 2.0), 100)
        .expect("create");
    assert_eq!(tree.validate(), Ok(()));
}
