// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase spatial index and pair generation.
//!
//! Determinism contract:
//! - Pair identity is canonicalized as `(min_id, max_id)`.
//! - Pairs are reported in strictly ascending lexicographic order, once each.
//! - Overlap is inclusive (touching bounds are considered overlapping).
//! - Tree shape depends only on the sequence of operations, never on
//!   addresses, hashing or ambient randomness.

#[doc = "Move buffer and sort-based pair deduplication."]
pub mod broad_phase;
#[doc = "Self-balancing bounding-sphere tree."]
pub mod dynamic_tree;
