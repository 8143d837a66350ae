// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::broad::dynamic_tree::{DynamicTree, ProxyId, TreeError};
use crate::types::bounds::Bounds;
use crate::types::ray::RayCastInput;

/// Candidate-pair generator over a [`DynamicTree`].
///
/// Proxies that were created, reinserted or touched since the last
/// [`BroadPhase::update_pairs`] sit in a move buffer. Each pair update queries
/// the tree with every buffered proxy's stored bound, canonicalises hits as
/// `(min, max)`, sorts them and reports each distinct pair once, in ascending
/// order.
///
/// Both buffers are cleared rather than freed between updates, so a steady
/// scene generates pairs without allocating.
#[derive(Debug, Clone)]
pub struct BroadPhase<T> {
    tree: DynamicTree<T>,
    move_buffer: Vec<Option<ProxyId>>,
    pair_buffer: Vec<(ProxyId, ProxyId)>,
}

impl<T: Copy> Default for BroadPhase<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> BroadPhase<T> {
    /// Broad phase over a tree with tight bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_margin(0.0)
    }

    /// Broad phase whose tree fattens every stored bound by `margin`.
    #[must_use]
    pub fn with_margin(margin: f64) -> Self {
        Self {
            tree: DynamicTree::with_margin(margin),
            move_buffer: Vec::with_capacity(16),
            pair_buffer: Vec::with_capacity(16),
        }
    }

    /// Read access to the underlying tree.
    #[must_use]
    pub fn tree(&self) -> &DynamicTree<T> {
        &self.tree
    }

    /// Number of live proxies.
    #[must_use]
    pub fn proxy_count(&self) -> usize {
        self.tree.proxy_count()
    }

    /// Number of live entries waiting in the move buffer.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.move_buffer.iter().flatten().count()
    }

    /// Creates a proxy and schedules it for the next pair update.
    ///
    /// # Errors
    /// Propagates [`TreeError`] from the tree.
    pub fn create_proxy(&mut self, bounds: Bounds, payload: T) -> Result<ProxyId, TreeError> {
        let id = self.tree.create_proxy(bounds, payload)?;
        self.move_buffer.push(Some(id));
        Ok(id)
    }

    /// Destroys a proxy and tombstones any pending move entries for it.
    ///
    /// # Errors
    /// Propagates [`TreeError`] from the tree.
    pub fn destroy_proxy(&mut self, id: ProxyId) -> Result<bool, TreeError> {
        if self.tree.bounds(id).is_none() {
            return Ok(false);
        }
        for slot in &mut self.move_buffer {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        self.tree.destroy_proxy(id)
    }

    /// Moves a proxy, buffering it only if the tree reinserted it.
    ///
    /// # Errors
    /// Propagates [`TreeError`] from the tree.
    pub fn move_proxy(&mut self, id: ProxyId, bounds: Bounds) -> Result<bool, TreeError> {
        let reinserted = self.tree.move_proxy(id, bounds)?;
        if reinserted {
            self.move_buffer.push(Some(id));
        }
        Ok(reinserted)
    }

    /// Forces an unmoved proxy into the next pair update.
    ///
    /// Returns `false` for ids that are not live proxies.
    pub fn touch_proxy(&mut self, id: ProxyId) -> bool {
        if self.tree.bounds(id).is_none() {
            return false;
        }
        self.move_buffer.push(Some(id));
        true
    }

    /// Stored (fat) bound of a live proxy.
    #[must_use]
    pub fn bounds(&self, id: ProxyId) -> Option<Bounds> {
        self.tree.bounds(id)
    }

    /// Payload of a live proxy.
    #[must_use]
    pub fn payload(&self, id: ProxyId) -> Option<T> {
        self.tree.payload(id)
    }

    /// Reports every distinct overlapping pair involving a buffered proxy.
    ///
    /// `visit` receives the payloads of `(min_id, max_id)` in ascending pair
    /// order. The move buffer is empty afterwards. Returns the number of
    /// distinct pairs reported.
    pub fn update_pairs<F>(&mut self, mut visit: F) -> usize
    where
        F: FnMut(T, T),
    {
        self.pair_buffer.clear();
        let tree = &self.tree;
        let pairs = &mut self.pair_buffer;
        for query_id in self.move_buffer.iter().flatten().copied() {
            let Some(fat) = tree.bounds(query_id) else {
                continue;
            };
            tree.query(&fat, |other| {
                if other != query_id {
                    pairs.push((query_id.min(other), query_id.max(other)));
                }
                true
            });
        }
        self.move_buffer.clear();

        self.pair_buffer.sort_unstable();
        let mut reported = 0;
        let mut previous = None;
        for &(a, b) in &self.pair_buffer {
            if previous == Some((a, b)) {
                continue;
            }
            previous = Some((a, b));
            if let (Some(pa), Some(pb)) = (self.tree.payload(a), self.tree.payload(b)) {
                visit(pa, pb);
                reported += 1;
            }
        }
        reported
    }

    /// Visits every proxy whose stored bound intersects `bounds`.
    pub fn query<F>(&self, bounds: &Bounds, visit: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        self.tree.query(bounds, visit);
    }

    /// Ray cast through the tree; see [`DynamicTree::ray_cast`].
    pub fn ray_cast<F>(&self, input: &RayCastInput, visit: F)
    where
        F: FnMut(ProxyId, f64) -> f64,
    {
        self.tree.ray_cast(input, visit);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn destroyed_proxy_is_tombstoned_in_move_buffer() {
        let mut bp = BroadPhase::new();
        let a = bp
            .create_proxy(Bounds::new(Vec3::ZERO, 1.0), 'a')
            .expect("create");
        bp.touch_proxy(a);
        bp.create_proxy(Bounds::new(Vec3::new(1.0, 0.0, 0.0), 1.0), 'b')
            .expect("create");
        assert_eq!(bp.move_count(), 3);
        assert!(bp.destroy_proxy(a).expect("destroy"));
        assert_eq!(bp.move_count(), 1);

        let mut seen = Vec::new();
        assert_eq!(bp.update_pairs(|x, y| seen.push((x, y))), 0);
        assert!(seen.is_empty());
        assert_eq!(bp.move_count(), 0);
    }
}
