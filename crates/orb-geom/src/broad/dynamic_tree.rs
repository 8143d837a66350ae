// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use thiserror::Error;

use crate::types::bounds::Bounds;
use crate::types::ray::RayCastInput;

const NULL_NODE: u32 = u32::MAX;
const MIN_CAPACITY: usize = 16;

/// Relative slack allowed when checking that a parent bound encloses a child.
const ENCLOSURE_TOLERANCE: f64 = 1e-9;

/// Identifier of a leaf in a [`DynamicTree`].
///
/// Ids are slots in the node pool. They stay valid until the proxy is
/// destroyed and may be handed out again afterwards. Ordering is the slot
/// order, which is what canonical pair sorting relies on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId(u32);

impl ProxyId {
    /// Wraps a raw slot index.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw slot index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Structural corruption detected inside the tree.
///
/// The public API never produces these on its own; they indicate that the
/// node pool was left inconsistent and the tree must not be trusted further.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A node reached during maintenance or validation broke a tree invariant.
    #[error("tree invariant violated at node {node}: {reason}")]
    InvariantViolation {
        /// Pool slot where the violation was observed.
        node: u32,
        /// Which invariant failed.
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
struct Node<T> {
    bounds: Bounds,
    payload: Option<T>,
    // Doubles as the next-free link while the slot is on the free list.
    parent: u32,
    child1: u32,
    child2: u32,
    // -1 for free slots, 0 for leaves.
    height: i32,
}

impl<T> Node<T> {
    fn vacant(next: u32) -> Self {
        Self {
            bounds: Bounds::default(),
            payload: None,
            parent: next,
            child1: NULL_NODE,
            child2: NULL_NODE,
            height: -1,
        }
    }

    fn is_leaf(&self) -> bool {
        self.child1 == NULL_NODE
    }

    fn is_free(&self) -> bool {
        self.height < 0
    }
}

/// Self-balancing bounding-sphere hierarchy over a dynamic set of proxies.
///
/// Leaves carry a (possibly fattened) bound plus a `Copy` payload; internal
/// nodes carry the union of their children. Insertion is a greedy
/// best-sibling descent and every ancestor touched by an insert or remove is
/// rebalanced with a height rotation, so `|height(c1) - height(c2)| <= 1`
/// holds for every internal node between calls.
///
/// Invalid proxy ids (out of range, free, or internal) are ignored: mutators
/// return `Ok(false)` and accessors return `None`.
#[derive(Debug, Clone)]
pub struct DynamicTree<T> {
    nodes: Vec<Node<T>>,
    root: u32,
    free_list: u32,
    node_count: usize,
    margin: f64,
}

impl<T: Copy> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> DynamicTree<T> {
    /// Empty tree storing tight bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_margin(0.0)
    }

    /// Empty tree that inflates every stored leaf bound by `margin`.
    ///
    /// Negative or non-finite margins are treated as zero.
    #[must_use]
    pub fn with_margin(margin: f64) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NULL_NODE,
            free_list: NULL_NODE,
            node_count: 0,
            margin: if margin.is_finite() && margin > 0.0 {
                margin
            } else {
                0.0
            },
        };
        tree.grow();
        tree
    }

    /// Fat margin applied to leaf bounds.
    #[must_use]
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Inserts a proxy, storing `bounds` inflated by the tree margin.
    ///
    /// The descent picks the cheapest of staying or entering a child, but
    /// staying is only allowed at nodes of height below 2 so the leaf lands
    /// low enough for rotations to keep the tree balanced.
    ///
    /// # Errors
    /// Returns [`TreeError::InvariantViolation`] if rebalancing meets a
    /// corrupted node.
    pub fn create_proxy(&mut self, bounds: Bounds, payload: T) -> Result<ProxyId, TreeError> {
        let leaf = self.allocate_node();
        {
            let node = &mut self.nodes[leaf as usize];
            node.bounds = bounds.inflate(self.margin);
            node.payload = Some(payload);
            node.height = 0;
        }
        self.insert_leaf(leaf)?;
        Ok(ProxyId(leaf))
    }

    /// Removes a proxy. Returns `Ok(false)` when `id` is not a live leaf.
    ///
    /// # Errors
    /// Returns [`TreeError::InvariantViolation`] if rebalancing meets a
    /// corrupted node.
    pub fn destroy_proxy(&mut self, id: ProxyId) -> Result<bool, TreeError> {
        let Some(leaf) = self.leaf_slot(id) else {
            return Ok(false);
        };
        self.remove_leaf(leaf)?;
        self.free_node(leaf);
        Ok(true)
    }

    /// Updates a proxy's bound.
    ///
    /// Returns `Ok(true)` only when the proxy was reinserted because `bounds`
    /// escaped the stored bound. A bound still inside the stored one leaves the
    /// tree untouched and returns `Ok(false)`, as does an invalid id.
    ///
    /// # Errors
    /// Returns [`TreeError::InvariantViolation`] if rebalancing meets a
    /// corrupted node.
    pub fn move_proxy(&mut self, id: ProxyId, bounds: Bounds) -> Result<bool, TreeError> {
        let Some(leaf) = self.leaf_slot(id) else {
            return Ok(false);
        };
        if self.nodes[leaf as usize].bounds.contains(&bounds) {
            return Ok(false);
        }
        self.remove_leaf(leaf)?;
        self.nodes[leaf as usize].bounds = bounds.inflate(self.margin);
        self.insert_leaf(leaf)?;
        Ok(true)
    }

    /// Stored (fat) bound of a live proxy.
    #[must_use]
    pub fn bounds(&self, id: ProxyId) -> Option<Bounds> {
        self.leaf_slot(id).map(|slot| self.nodes[slot as usize].bounds)
    }

    /// Payload of a live proxy.
    #[must_use]
    pub fn payload(&self, id: ProxyId) -> Option<T> {
        self.leaf_slot(id)
            .and_then(|slot| self.nodes[slot as usize].payload)
    }

    /// Visits every leaf whose bound intersects `bounds`.
    ///
    /// The visitor returns `false` to stop the traversal early.
    pub fn query<F>(&self, bounds: &Bounds, mut visit: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        let mut stack = self.traversal_stack();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.bounds.intersects(bounds) {
                continue;
            }
            if node.is_leaf() {
                if !visit(ProxyId(index)) {
                    return;
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Casts a ray through the tree.
    ///
    /// For every leaf whose bound the ray enters within the current maximum
    /// distance, `visit(id, distance)` is called and its return value becomes
    /// the new maximum distance. Returning a negative value stops the cast;
    /// returning the hit distance clips the cast to the closest hit so far.
    pub fn ray_cast<F>(&self, input: &RayCastInput, mut visit: F)
    where
        F: FnMut(ProxyId, f64) -> f64,
    {
        let mut max_distance = input.max_distance;
        if max_distance < 0.0 {
            return;
        }
        let mut stack = self.traversal_stack();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            let Some(distance) = node.bounds.intersect_ray(&input.ray) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if node.is_leaf() {
                max_distance = visit(ProxyId(index), distance);
                if max_distance < 0.0 {
                    return;
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Number of live nodes, leaves and internal nodes together.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of live leaves.
    #[must_use]
    pub fn proxy_count(&self) -> usize {
        // A full binary tree with `n` leaves has `2n - 1` nodes.
        (self.node_count + 1) / 2
    }

    /// Size of the node pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the tree holds no proxies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root == NULL_NODE
    }

    /// Cached height of the root (`0` for an empty tree or a single leaf).
    #[must_use]
    pub fn height(&self) -> i32 {
        if self.root == NULL_NODE {
            0
        } else {
            self.nodes[self.root as usize].height
        }
    }

    /// Height measured by walking the tree instead of trusting cached values.
    #[must_use]
    pub fn compute_height(&self) -> i32 {
        if self.root == NULL_NODE {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0_i32)];
        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index as usize];
            if node.is_leaf() {
                deepest = deepest.max(depth);
            } else {
                stack.push((node.child1, depth + 1));
                stack.push((node.child2, depth + 1));
            }
        }
        deepest
    }

    /// Largest `|height(child2) - height(child1)|` over all internal nodes.
    #[must_use]
    pub fn max_balance(&self) -> i32 {
        self.nodes
            .iter()
            .filter(|node| !node.is_free() && !node.is_leaf())
            .map(|node| {
                let h1 = self.nodes[node.child1 as usize].height;
                let h2 = self.nodes[node.child2 as usize].height;
                (h2 - h1).abs()
            })
            .max()
            .unwrap_or(0)
    }

    /// Sum of every live node's radius divided by the root radius.
    ///
    /// A quality metric: lower means tighter internal bounds. Returns `0` for
    /// an empty tree or a zero-radius root.
    #[must_use]
    pub fn area_ratio(&self) -> f64 {
        if self.root == NULL_NODE {
            return 0.0;
        }
        let root_radius = self.nodes[self.root as usize].bounds.radius();
        if root_radius <= 0.0 {
            return 0.0;
        }
        let total: f64 = self
            .nodes
            .iter()
            .filter(|node| !node.is_free())
            .map(|node| node.bounds.radius())
            .sum();
        total / root_radius
    }

    /// Calls `visit` with every live leaf and its stored bound.
    pub fn for_each_leaf<F>(&self, mut visit: F)
    where
        F: FnMut(ProxyId, &Bounds),
    {
        let mut stack = self.traversal_stack();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if node.is_leaf() {
                visit(ProxyId(index), &node.bounds);
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Calls `visit` with the bound of every internal node.
    pub fn for_each_internal_bounds<F>(&self, mut visit: F)
    where
        F: FnMut(&Bounds),
    {
        let mut stack = self.traversal_stack();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.is_leaf() {
                visit(&node.bounds);
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Discards every internal node and rebuilds the hierarchy by repeatedly
    /// pairing the two subtrees with the smallest combined radius.
    ///
    /// Quadratic per merge, meant for offline quality comparison. The result
    /// is not height balanced.
    pub fn rebuild_bottom_up(&mut self) {
        let mut roots: Vec<u32> = Vec::with_capacity(self.proxy_count());
        for index in 0..self.nodes.len() {
            let node = &self.nodes[index];
            if node.is_free() {
                continue;
            }
            if node.is_leaf() {
                self.nodes[index].parent = NULL_NODE;
                roots.push(index as u32);
            } else {
                self.free_node(index as u32);
            }
        }
        if roots.is_empty() {
            self.root = NULL_NODE;
            return;
        }
        while roots.len() > 1 {
            let mut best = (0, 1, f64::MAX);
            for i in 0..roots.len() {
                let bi = self.nodes[roots[i] as usize].bounds;
                for j in (i + 1)..roots.len() {
                    let cost = bi.union_radius(&self.nodes[roots[j] as usize].bounds);
                    if cost < best.2 {
                        best = (i, j, cost);
                    }
                }
            }
            let (i, j, _) = best;
            let (first, second) = (roots[i], roots[j]);
            let parent = self.allocate_node();
            self.join_under(parent, first, second);
            self.nodes[parent as usize].parent = NULL_NODE;
            roots.swap_remove(j);
            roots[i] = parent;
        }
        self.root = roots[0];
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Verifies parent/child links, cached heights, bound enclosure with a
    /// small relative tolerance, leaf payloads, and that the free list covers
    /// exactly the slots not reachable from the root.
    ///
    /// # Errors
    /// Returns the first [`TreeError::InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut reachable = 0_usize;
        if self.root != NULL_NODE {
            let root = self.slot(self.root, "root out of range or free")?;
            if self.nodes[root].parent != NULL_NODE {
                return Err(violation(self.root, "root has a parent"));
            }
            let mut stack = vec![self.root];
            while let Some(index) = stack.pop() {
                reachable += 1;
                if reachable > self.nodes.len() {
                    return Err(violation(index, "cycle in tree links"));
                }
                let node = &self.nodes[self.slot(index, "reachable node is free")?];
                if node.is_leaf() {
                    if node.height != 0 {
                        return Err(violation(index, "leaf height is not zero"));
                    }
                    if node.payload.is_none() {
                        return Err(violation(index, "leaf without payload"));
                    }
                    continue;
                }
                let c1 = self.slot(node.child1, "child1 out of range or free")?;
                let c2 = self.slot(node.child2, "child2 out of range or free")?;
                let (child1, child2) = (&self.nodes[c1], &self.nodes[c2]);
                if child1.parent != index || child2.parent != index {
                    return Err(violation(index, "child does not point back to parent"));
                }
                if node.height != 1 + child1.height.max(child2.height) {
                    return Err(violation(index, "stale height"));
                }
                if !encloses(&node.bounds, &child1.bounds) || !encloses(&node.bounds, &child2.bounds)
                {
                    return Err(violation(index, "bound does not enclose children"));
                }
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
        if reachable != self.node_count {
            return Err(violation(self.root, "node count disagrees with reachable nodes"));
        }

        let mut free = 0_usize;
        let mut cursor = self.free_list;
        while cursor != NULL_NODE {
            let Some(node) = self.nodes.get(cursor as usize) else {
                return Err(violation(cursor, "free list points out of range"));
            };
            if !node.is_free() {
                return Err(violation(cursor, "free list reaches a live node"));
            }
            free += 1;
            if free > self.nodes.len() {
                return Err(violation(cursor, "cycle in free list"));
            }
            cursor = node.parent;
        }
        if free + self.node_count != self.nodes.len() {
            return Err(violation(self.free_list, "free list leaks slots"));
        }
        Ok(())
    }

    fn leaf_slot(&self, id: ProxyId) -> Option<u32> {
        let node = self.nodes.get(id.0 as usize)?;
        (!node.is_free() && node.is_leaf()).then_some(id.0)
    }

    fn slot(&self, index: u32, reason: &'static str) -> Result<usize, TreeError> {
        match self.nodes.get(index as usize) {
            Some(node) if !node.is_free() => Ok(index as usize),
            _ => Err(violation(index, reason)),
        }
    }

    fn traversal_stack(&self) -> Vec<u32> {
        let mut stack = Vec::with_capacity(self.height().max(0) as usize + 1);
        if self.root != NULL_NODE {
            stack.push(self.root);
        }
        stack
    }

    fn grow(&mut self) {
        let old = self.nodes.len();
        let new = (old * 2).max(MIN_CAPACITY);
        self.nodes.reserve_exact(new - old);
        for index in old..new {
            let next = if index + 1 == new {
                self.free_list
            } else {
                (index + 1) as u32
            };
            self.nodes.push(Node::vacant(next));
        }
        self.free_list = old as u32;
    }

    fn allocate_node(&mut self) -> u32 {
        if self.free_list == NULL_NODE {
            self.grow();
        }
        let index = self.free_list;
        let node = &mut self.nodes[index as usize];
        self.free_list = node.parent;
        node.parent = NULL_NODE;
        node.child1 = NULL_NODE;
        node.child2 = NULL_NODE;
        node.height = 0;
        node.payload = None;
        self.node_count += 1;
        index
    }

    fn free_node(&mut self, index: u32) {
        let node = &mut self.nodes[index as usize];
        node.parent = self.free_list;
        node.child1 = NULL_NODE;
        node.child2 = NULL_NODE;
        node.height = -1;
        node.payload = None;
        self.free_list = index;
        self.node_count -= 1;
    }

    /// Makes `parent` an internal node over `first` and `second`.
    fn join_under(&mut self, parent: u32, first: u32, second: u32) {
        let (b1, h1) = {
            let n = &self.nodes[first as usize];
            (n.bounds, n.height)
        };
        let (b2, h2) = {
            let n = &self.nodes[second as usize];
            (n.bounds, n.height)
        };
        let node = &mut self.nodes[parent as usize];
        node.child1 = first;
        node.child2 = second;
        node.bounds = b1.union(&b2);
        node.height = 1 + h1.max(h2);
        node.payload = None;
        self.nodes[first as usize].parent = parent;
        self.nodes[second as usize].parent = parent;
    }

    fn insert_leaf(&mut self, leaf: u32) -> Result<(), TreeError> {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent = NULL_NODE;
            return Ok(());
        }

        let leaf_bounds = self.nodes[leaf as usize].bounds;
        let mut index = self.root;
        loop {
            let node = &self.nodes[self.slot(index, "descent reached a free node")?];
            if node.is_leaf() {
                break;
            }
            let c1 = self.slot(node.child1, "child1 out of range or free")?;
            let c2 = self.slot(node.child2, "child2 out of range or free")?;
            let stay = node.bounds.radius();
            let cost1 = self.nodes[c1].bounds.union_radius(&leaf_bounds);
            let cost2 = self.nodes[c2].bounds.union_radius(&leaf_bounds);
            // Pairing the leaf with a subtree of height >= 2 would leave an
            // imbalance no single rotation repairs, so staying only ends the
            // descent at shallow nodes.
            if stay <= cost1 && stay <= cost2 && node.height < 2 {
                break;
            }
            index = if cost1 <= cost2 { node.child1 } else { node.child2 };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling as usize].parent;
        let new_parent = self.allocate_node();
        self.join_under(new_parent, sibling, leaf);
        self.nodes[new_parent as usize].parent = old_parent;
        if old_parent == NULL_NODE {
            self.root = new_parent;
        } else {
            self.replace_child(old_parent, sibling, new_parent)?;
        }

        self.refit_upward(self.nodes[leaf as usize].parent)
    }

    fn remove_leaf(&mut self, leaf: u32) -> Result<(), TreeError> {
        if leaf == self.root {
            self.root = NULL_NODE;
            return Ok(());
        }
        let parent = self.nodes[leaf as usize].parent;
        let parent_slot = self.slot(parent, "leaf parent out of range or free")?;
        let grandparent = self.nodes[parent_slot].parent;
        let sibling = if self.nodes[parent_slot].child1 == leaf {
            self.nodes[parent_slot].child2
        } else {
            self.nodes[parent_slot].child1
        };
        self.slot(sibling, "sibling out of range or free")?;

        if grandparent == NULL_NODE {
            self.root = sibling;
            self.nodes[sibling as usize].parent = NULL_NODE;
            self.free_node(parent);
            return Ok(());
        }
        self.replace_child(grandparent, parent, sibling)?;
        self.nodes[sibling as usize].parent = grandparent;
        self.free_node(parent);
        self.refit_upward(grandparent)
    }

    fn replace_child(&mut self, parent: u32, old: u32, new: u32) -> Result<(), TreeError> {
        let slot = self.slot(parent, "parent out of range or free")?;
        let node = &mut self.nodes[slot];
        if node.child1 == old {
            node.child1 = new;
        } else if node.child2 == old {
            node.child2 = new;
        } else {
            return Err(violation(parent, "parent does not link to child"));
        }
        Ok(())
    }

    /// Rebalances and refits every node from `index` up to the root.
    fn refit_upward(&mut self, mut index: u32) -> Result<(), TreeError> {
        while index != NULL_NODE {
            index = self.balance(index)?;
            let slot = self.slot(index, "ancestor out of range or free")?;
            let (c1, c2) = (self.nodes[slot].child1, self.nodes[slot].child2);
            let c1 = self.slot(c1, "child1 out of range or free")?;
            let c2 = self.slot(c2, "child2 out of range or free")?;
            let bounds = self.nodes[c1].bounds.union(&self.nodes[c2].bounds);
            let height = 1 + self.nodes[c1].height.max(self.nodes[c2].height);
            let node = &mut self.nodes[slot];
            node.bounds = bounds;
            node.height = height;
            index = node.parent;
        }
        Ok(())
    }

    /// Rotates the taller child of `a` above it when the child heights differ
    /// by more than one. Returns the root of the rebalanced subtree.
    fn balance(&mut self, a: u32) -> Result<u32, TreeError> {
        let a_slot = self.slot(a, "balance target out of range or free")?;
        if self.nodes[a_slot].is_leaf() {
            return Ok(a);
        }
        let b = self.nodes[a_slot].child1;
        let c = self.nodes[a_slot].child2;
        let hb = self.nodes[self.slot(b, "child1 out of range or free")?].height;
        let hc = self.nodes[self.slot(c, "child2 out of range or free")?].height;
        if 1 + hb.max(hc) < 2 {
            return Ok(a);
        }
        match hc - hb {
            diff if diff > 1 => self.rotate_up(a, c, b),
            diff if diff < -1 => self.rotate_up(a, b, c),
            _ => Ok(a),
        }
    }

    /// Lifts `heavy` (a child of `a`) into `a`'s place.
    ///
    /// `heavy` keeps its taller child and hands the shorter one to `a`, which
    /// becomes `heavy`'s first child next to `light`.
    fn rotate_up(&mut self, a: u32, heavy: u32, light: u32) -> Result<u32, TreeError> {
        let g1 = self.nodes[heavy as usize].child1;
        let g2 = self.nodes[heavy as usize].child2;
        let g1_slot = self.slot(g1, "grandchild out of range or free")?;
        let g2_slot = self.slot(g2, "grandchild out of range or free")?;
        let (keep, give) = if self.nodes[g1_slot].height > self.nodes[g2_slot].height {
            (g1, g2)
        } else {
            (g2, g1)
        };

        let a_parent = self.nodes[a as usize].parent;
        if a_parent == NULL_NODE {
            self.root = heavy;
        } else {
            self.replace_child(a_parent, a, heavy)?;
        }
        self.nodes[heavy as usize].parent = a_parent;

        // `a` keeps `light` in place and takes `give` where `heavy` used to be.
        {
            let node = &mut self.nodes[a as usize];
            if node.child1 == heavy {
                node.child1 = give;
            } else {
                node.child2 = give;
            }
        }
        self.nodes[give as usize].parent = a;
        let (bl, hl) = {
            let n = &self.nodes[light as usize];
            (n.bounds, n.height)
        };
        let (bg, hg) = {
            let n = &self.nodes[give as usize];
            (n.bounds, n.height)
        };
        {
            let node = &mut self.nodes[a as usize];
            node.bounds = bl.union(&bg);
            node.height = 1 + hl.max(hg);
            node.parent = heavy;
        }

        let (ba, ha) = {
            let n = &self.nodes[a as usize];
            (n.bounds, n.height)
        };
        let (bk, hk) = {
            let n = &self.nodes[keep as usize];
            (n.bounds, n.height)
        };
        let node = &mut self.nodes[heavy as usize];
        node.child1 = a;
        node.child2 = keep;
        node.bounds = ba.union(&bk);
        node.height = 1 + ha.max(hk);
        Ok(heavy)
    }
}

fn violation(node: u32, reason: &'static str) -> TreeError {
    TreeError::InvariantViolation { node, reason }
}

fn encloses(outer: &Bounds, inner: &Bounds) -> bool {
    let slack = ENCLOSURE_TOLERANCE * (1.0 + outer.radius());
    outer.radius() + slack >= outer.center().distance(&inner.center()) + inner.radius()
}
