//! Fixed-capacity object pool
//!
//! An arena of reusable slots addressed by generational handles. Every slot
//! is either free or active, never both: `get` pops a free slot (allocating
//! a fresh one only when none is left) and `release` resets the value and
//! pushes the slot back. Both are O(1). A handle whose slot has since been
//! released carries a stale generation, so releasing it again is a no-op.

use serde::{Deserialize, Serialize};

/// Stable reference to a pooled instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Slot index (stable for the lifetime of the pool)
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    generation: u32,
    active: bool,
}

/// Reusable-instance allocator
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    /// Free slot indices, popped from the back
    free: Vec<u32>,
    active: usize,
    create: fn() -> T,
    reset: fn(&mut T),
}

impl<T> Pool<T> {
    /// Pre-allocate `capacity` instances with `create`; `reset` runs on release
    pub fn new(capacity: usize, create: fn() -> T, reset: fn(&mut T)) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                value: create(),
                generation: 0,
                active: false,
            })
            .collect();
        // Reversed so the lowest index is handed out first
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            active: 0,
            create,
            reset,
        }
    }

    /// Take a free instance, growing the pool only if none is left
    pub fn get(&mut self) -> Handle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    value: (self.create)(),
                    generation: 0,
                    active: false,
                });
                log::debug!("Pool exhausted, grew to {}", self.slots.len());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.active = true;
        self.active += 1;
        Handle {
            index,
            generation: slot.generation,
        }
    }

    /// Take a free instance and initialize it in place
    pub fn spawn(&mut self, init: impl FnOnce(&mut T)) -> Handle {
        let handle = self.get();
        init(&mut self.slots[handle.index()].value);
        handle
    }

    /// Reset the instance and return its slot to the free list.
    ///
    /// Returns false (and does nothing) for a free slot or a stale handle.
    pub fn release(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if !slot.active || slot.generation != handle.generation {
            return false;
        }
        (self.reset)(&mut slot.value);
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.active -= 1;
        true
    }

    /// Reclaim every active instance
    pub fn release_all(&mut self) {
        for handle in self.handles() {
            self.release(handle);
        }
    }

    /// Release every active instance for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        for handle in self.handles() {
            let keep_it = keep(&mut self.slots[handle.index()].value);
            if !keep_it {
                self.release(handle);
            }
        }
    }

    pub fn get_ref(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &mut s.value)
    }

    /// Whether the handle still refers to a live instance
    pub fn is_active(&self, handle: Handle) -> bool {
        self.get_ref(handle).is_some()
    }

    /// Handles of all active instances, in slot order
    pub fn handles(&self) -> Vec<Handle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| Handle {
                index: i as u32,
                generation: s.generation,
            })
            .collect()
    }

    /// Active instances, in slot order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|s| s.active).map(|s| &s.value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots
            .iter_mut()
            .filter(|s| s.active)
            .map(|s| &mut s.value)
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Total slots (free + active)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn counter_pool(capacity: usize) -> Pool<u32> {
        Pool::new(capacity, || 0, |v| *v = 0)
    }

    #[test]
    fn test_get_marks_active() {
        let mut pool = counter_pool(4);
        assert_eq!(pool.free_count(), 4);
        let h = pool.get();
        assert_eq!(h.index(), 0);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.free_count(), 3);
        assert!(pool.is_active(h));
    }

    #[test]
    fn test_release_resets_and_frees() {
        let mut pool = counter_pool(2);
        let h = pool.spawn(|v| *v = 7);
        assert_eq!(pool.get_ref(h), Some(&7));
        assert!(pool.release(h));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free_count(), 2);

        // The slot comes back reset
        let again = pool.get();
        assert_eq!(again.index(), h.index());
        assert_eq!(pool.get_ref(again), Some(&0));
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut pool = counter_pool(2);
        let h = pool.get();
        assert!(pool.release(h));
        assert!(!pool.release(h));
        assert_eq!(pool.free_count(), 2);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_stale_handle_cannot_release_new_owner() {
        let mut pool = counter_pool(1);
        let old = pool.get();
        pool.release(old);
        let new = pool.get();
        assert!(!pool.release(old));
        assert!(pool.is_active(new));
        assert!(pool.get_mut(old).is_none());
    }

    #[test]
    fn test_grows_only_when_exhausted() {
        let mut pool = counter_pool(2);
        pool.get();
        pool.get();
        assert_eq!(pool.capacity(), 2);
        pool.get();
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_release_all_and_retain() {
        let mut pool = counter_pool(5);
        for i in 0..5 {
            pool.spawn(|v| *v = i);
        }
        pool.retain(|v| *v % 2 == 0);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
        pool.release_all();
        assert!(pool.is_empty());
        assert_eq!(pool.free_count(), 5);
    }

    proptest! {
        #[test]
        fn prop_partition_holds(ops in proptest::collection::vec((any::<bool>(), 0usize..16), 0..200)) {
            let mut pool = counter_pool(8);
            let mut live: Vec<Handle> = Vec::new();
            let mut seen_capacity = pool.capacity();

            for (take, pick) in ops {
                if take || live.is_empty() {
                    let exhausted = pool.free_count() == 0;
                    let h = pool.get();
                    // No instance is handed out twice while active
                    prop_assert!(!live.contains(&h));
                    live.push(h);
                    if exhausted {
                        prop_assert_eq!(pool.capacity(), seen_capacity + 1);
                    } else {
                        prop_assert_eq!(pool.capacity(), seen_capacity);
                    }
                } else {
                    let h = live.swap_remove(pick % live.len());
                    prop_assert!(pool.release(h));
                }
                seen_capacity = pool.capacity();
                prop_assert_eq!(pool.free_count() + pool.active_count(), pool.capacity());
                prop_assert_eq!(pool.active_count(), live.len());
                let distinct: HashSet<usize> = live.iter().map(|h| h.index()).collect();
                prop_assert_eq!(distinct.len(), live.len());
            }
        }
    }
}
