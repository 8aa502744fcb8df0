//! Building storage with deferred removal.
//!
//! Entries live in a [`SlotMap`] keyed by [`OverlayId`], so a key kept across
//! a removal resolves to `None` instead of aliasing the slot's next occupant.
//! [`Arena::delete_later`] only marks an entry and [`Arena::sweep`] removes
//! every marked entry between ticks. A walk over the arena during a tick never
//! sees it shrink.

use slotmap::{new_key_type, Key, SecondaryMap, SlotMap};

new_key_type! {
    /// Handle of a building on the city map.
    pub struct OverlayId;
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Low half is the slot, high half the version
        let ffi = self.data().as_ffi();
        write!(f, "#{}v{}", ffi & 0xffff_ffff, ffi >> 32)
    }
}

#[derive(Debug, Clone)]
pub struct Arena<T> {
    entries: SlotMap<OverlayId, T>,
    pending: SecondaryMap<OverlayId, ()>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            pending: SecondaryMap::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> OverlayId {
        self.entries.insert(value)
    }

    /// Resolve a key. Entries pending deletion still resolve until swept.
    pub fn get(&self, id: OverlayId) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.entries.contains_key(id)
    }

    /// Mark an entry for removal at the next [`Arena::sweep`].
    ///
    /// Returns `false` if the key is stale.
    pub fn delete_later(&mut self, id: OverlayId) -> bool {
        if !self.entries.contains_key(id) {
            return false;
        }
        self.pending.insert(id, ());
        true
    }

    pub fn is_pending_delete(&self, id: OverlayId) -> bool {
        self.pending.contains_key(id)
    }

    /// Remove all marked entries and return them in slot order.
    pub fn sweep(&mut self) -> Vec<(OverlayId, T)> {
        let marked: Vec<OverlayId> = self.pending.keys().collect();
        self.pending.clear();
        marked
            .into_iter()
            .filter_map(|id| self.entries.remove(id).map(|value| (id, value)))
            .collect()
    }

    /// Number of stored entries, including those pending deletion.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all live keys in slot order.
    ///
    /// Use this when the loop body needs `&mut self` on the owner.
    pub fn handles(&self) -> Vec<OverlayId> {
        self.entries.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverlayId, &T)> + '_ {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (OverlayId, &mut T)> + '_ {
        self.entries.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_delete_later_keeps_entry_until_sweep() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        assert!(arena.delete_later(a));
        assert!(arena.is_pending_delete(a));
        assert_eq!(arena.get(a), Some(&1));
        assert_eq!(arena.iter().count(), 1);

        let removed = arena.sweep();
        assert_eq!(removed, vec![(a, 1)]);
        assert_eq!(arena.get(a), None);
        assert!(!arena.is_pending_delete(a));
        assert!(arena.is_empty());
    }

    #[test]
    fn test_stale_handle_does_not_alias() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        arena.delete_later(a);
        arena.sweep();

        let b = arena.insert(2);
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
        assert_eq!(arena.get(a), None);
        assert!(!arena.delete_later(a));
        assert_eq!(arena.get(b), Some(&2));
        assert!(arena.sweep().is_empty());
    }

    #[test]
    fn test_sweep_without_pending_is_noop() {
        let mut arena = Arena::new();
        arena.insert(1);
        arena.insert(2);
        assert!(arena.sweep().is_empty());
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_sweep_returns_slot_order() {
        let mut arena = Arena::new();
        let a = arena.insert('a');
        let b = arena.insert('b');
        let c = arena.insert('c');
        arena.delete_later(c);
        arena.delete_later(a);
        assert_eq!(arena.sweep(), vec![(a, 'a'), (c, 'c')]);
        assert_eq!(arena.handles(), vec![b]);

        for (_, v) in arena.iter_mut() {
            *v = v.to_ascii_uppercase();
        }
        assert_eq!(arena.get(b), Some(&'B'));
    }
}
