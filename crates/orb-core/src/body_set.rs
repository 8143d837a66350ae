// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Generational body storage with per-category membership lists.

use serde::{Deserialize, Serialize};

use crate::body::Body;

/// Stable reference to a body in a [`crate::World`].
///
/// The generation changes every time a slot is reused, so a handle to a
/// destroyed body never aliases a newer one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    /// Slot index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at creation time.
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Which per-step list a body belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Integrated each step and indexed in the tree.
    Active,
    /// Integrated each step and resolved by direct tree queries.
    Particle,
    /// Static or sleeping; skipped by integration.
    Inactive,
}

impl Category {
    /// List a body with the given flags belongs in.
    #[must_use]
    pub fn of(body: &Body) -> Self {
        if body.is_static() || body.is_asleep() {
            Self::Inactive
        } else if body.is_particle() {
            Self::Particle
        } else {
            Self::Active
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    body: Body,
    category: Category,
    list_pos: usize,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BodySet {
    slots: Vec<Slot>,
    free: Vec<u32>,
    active: Vec<u32>,
    particles: Vec<u32>,
    inactive: Vec<u32>,
    len: usize,
}

impl BodySet {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, body: Body) -> BodyHandle {
        let category = Category::of(&body);
        let index = if let Some(index) = self.free.pop() {
            index
        } else {
            self.slots.push(Slot {
                generation: 0,
                entry: None,
            });
            (self.slots.len() - 1) as u32
        };
        let list = self.list_mut(category);
        let list_pos = list.len();
        list.push(index);
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(Entry {
            body,
            category,
            list_pos,
        });
        self.len += 1;
        BodyHandle {
            index,
            generation: slot.generation,
        }
    }

    pub(crate) fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.unlink(entry.category, entry.list_pos);
        self.free.push(handle.index);
        self.len -= 1;
        Some(entry.body)
    }

    pub(crate) fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.entry(handle).map(|e| &e.body)
    }

    pub(crate) fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_mut().map(|e| &mut e.body)
    }

    /// Two distinct bodies borrowed mutably at once.
    pub(crate) fn get2_mut(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<(&mut Body, &mut Body)> {
        if a.index == b.index {
            return None;
        }
        let (lo, hi, swapped) = if a.index < b.index {
            (a, b, false)
        } else {
            (b, a, true)
        };
        let (head, tail) = self.slots.split_at_mut(hi.index as usize);
        let lo_slot = head.get_mut(lo.index as usize)?;
        let hi_slot = tail.first_mut()?;
        if lo_slot.generation != lo.generation || hi_slot.generation != hi.generation {
            return None;
        }
        let lo_body = &mut lo_slot.entry.as_mut()?.body;
        let hi_body = &mut hi_slot.entry.as_mut()?.body;
        Some(if swapped {
            (hi_body, lo_body)
        } else {
            (lo_body, hi_body)
        })
    }

    pub(crate) fn category(&self, handle: BodyHandle) -> Option<Category> {
        self.entry(handle).map(|e| e.category)
    }

    /// Moves a body to the list its current flags call for.
    pub(crate) fn recategorize(&mut self, handle: BodyHandle) {
        let Some(entry) = self.entry(handle) else {
            return;
        };
        let (old, pos) = (entry.category, entry.list_pos);
        let new = Category::of(&entry.body);
        if old == new {
            return;
        }
        self.unlink(old, pos);
        let list = self.list_mut(new);
        let list_pos = list.len();
        list.push(handle.index);
        if let Some(entry) = self.slots[handle.index as usize].entry.as_mut() {
            entry.category = new;
            entry.list_pos = list_pos;
        }
    }

    pub(crate) fn list(&self, category: Category) -> &[u32] {
        match category {
            Category::Active => &self.active,
            Category::Particle => &self.particles,
            Category::Inactive => &self.inactive,
        }
    }

    /// Live handle for a slot index taken from one of the lists.
    pub(crate) fn handle_at(&self, index: u32) -> Option<BodyHandle> {
        let slot = self.slots.get(index as usize)?;
        slot.entry.as_ref().map(|_| BodyHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Live bodies in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry.as_ref().map(|e| {
                (
                    BodyHandle {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    &e.body,
                )
            })
        })
    }

    pub(crate) fn handles(&self) -> Vec<BodyHandle> {
        self.iter().map(|(h, _)| h).collect()
    }

    fn entry(&self, handle: BodyHandle) -> Option<&Entry> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<u32> {
        match category {
            Category::Active => &mut self.active,
            Category::Particle => &mut self.particles,
            Category::Inactive => &mut self.inactive,
        }
    }

    /// Swap-removes `pos` from a list and patches the moved member's position.
    fn unlink(&mut self, category: Category, pos: usize) {
        let list = self.list_mut(category);
        if pos >= list.len() {
            return;
        }
        list.swap_remove(pos);
        let moved = list.get(pos).copied();
        if let Some(moved) = moved {
            if let Some(entry) = self.slots[moved as usize].entry.as_mut() {
                entry.list_pos = pos;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::body::BodyDef;

    fn body(def: &BodyDef) -> Body {
        Body::from_def(def)
    }

    #[test]
    fn stale_handles_do_not_alias_reused_slots() {
        let mut set = BodySet::default();
        let a = set.insert(body(&BodyDef::sphere(1.0)));
        assert!(set.remove(a).is_some());
        let b = set.insert(body(&BodyDef::sphere(2.0)));
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(set.get(a).is_none());
        assert!(set.remove(a).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn swap_remove_keeps_list_positions_consistent() {
        let mut set = BodySet::default();
        let handles: Vec<_> = (0..5)
            .map(|_| set.insert(body(&BodyDef::sphere(1.0))))
            .collect();
        set.remove(handles[1]).expect("live");
        set.remove(handles[0]).expect("live");
        let mut listed: Vec<u32> = set.list(Category::Active).to_vec();
        listed.sort_unstable();
        assert_eq!(listed, vec![2, 3, 4]);
        // Removing the body that was swapped into position 0 must still work.
        set.remove(handles[4]).expect("live");
        let mut listed: Vec<u32> = set.list(Category::Active).to_vec();
        listed.sort_unstable();
        assert_eq!(listed, vec![2, 3]);
    }

    #[test]
    fn categories_follow_flags() {
        let mut set = BodySet::default();
        let p = set.insert(body(&BodyDef::particle()));
        let s = set.insert(body(&BodyDef::sphere(1.0).fixed()));
        assert_eq!(set.category(p), Some(Category::Particle));
        assert_eq!(set.category(s), Some(Category::Inactive));

        set.get_mut(s).expect("live").is_static = false;
        set.recategorize(s);
        assert_eq!(set.category(s), Some(Category::Active));
        assert!(set.list(Category::Inactive).is_empty());
    }

    #[test]
    fn get2_mut_returns_bodies_in_argument_order() {
        let mut set = BodySet::default();
        let a = set.insert(body(&BodyDef::sphere(1.0).with_mass(1.0)));
        let b = set.insert(body(&BodyDef::sphere(1.0).with_mass(2.0)));
        let (first, second) = set.get2_mut(b, a).expect("distinct");
        assert!((first.mass() - 2.0).abs() < f64::EPSILON);
        assert!((second.mass() - 1.0).abs() < f64::EPSILON);
        assert!(set.get2_mut(a, a).is_none());
    }
}
