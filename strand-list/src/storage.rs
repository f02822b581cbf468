//! Storage trait for slab-like containers with stable indices.
//!
//! Storage owns the nodes; lists only rewire the [`Link`](crate::Link)s
//! inside them. Indices stay valid until the node is removed, so a list can
//! address nodes by index instead of by pointer.

use core::convert::Infallible;
use std::collections::TryReserveError;

use crate::Index;

/// Slab-like storage with stable indices.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable indices**: an index remains valid until explicitly removed
/// - **O(1)** insert, remove, get operations
/// - **Slot reuse**: removed slots can be reused by future inserts
///
/// # Implementations
///
/// - [`Slots<T>`] - growable, free-list backed (in this crate)
/// - `slab::Slab<T>` - growable (feature `slab`)
pub trait Storage<T> {
    /// Index type for this storage.
    type Index: Index;

    /// Error type for failed insertions.
    type Error;

    /// Inserts a value, returning its stable index.
    fn try_insert(&mut self, value: T) -> Result<Self::Index, Self::Error>;

    /// Removes and returns the value at `index`, if present.
    fn remove(&mut self, index: Self::Index) -> Option<T>;

    /// Returns a reference to the value at `index`, if present.
    fn get(&self, index: Self::Index) -> Option<&T>;

    /// Returns a mutable reference to the value at `index`, if present.
    fn get_mut(&mut self, index: Self::Index) -> Option<&mut T>;
}

#[derive(Debug)]
enum Slot<T, Idx> {
    Occupied(T),
    Vacant { next_free: Idx },
}

/// Growable storage with a free list threaded through vacant slots.
///
/// Removed slots are reused LIFO. The backing `Vec` only grows; capacity is
/// retained across removals.
///
/// # Example
///
/// ```
/// use strand_list::{Slots, Storage};
///
/// let mut slots: Slots<&str> = Slots::with_capacity(4);
/// let a = slots.insert("a");
/// let b = slots.insert("b");
///
/// assert_eq!(slots.remove(a), Some("a"));
/// assert_eq!(slots.get(b), Some(&"b"));
///
/// // The freed slot is reused.
/// assert_eq!(slots.insert("c"), a);
/// ```
#[derive(Debug)]
pub struct Slots<T, Idx: Index = u32> {
    slots: Vec<Slot<T, Idx>>,
    free_head: Idx,
    len: usize,
}

impl<T, Idx: Index> Default for Slots<T, Idx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Idx: Index> Slots<T, Idx> {
    /// Creates empty storage without allocating.
    #[inline]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: Idx::NONE,
            len: 0,
        }
    }

    /// Creates empty storage with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: Idx::NONE,
            len: 0,
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slots are occupied.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots that can be held without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Inserts a value, returning its stable index.
    ///
    /// # Panics
    ///
    /// Panics if every index below `Idx::NONE` is in use.
    pub fn insert(&mut self, value: T) -> Idx {
        if self.free_head.is_some() {
            let idx = self.free_head;
            let slot = &mut self.slots[idx.as_usize()];
            let Slot::Vacant { next_free } = *slot else {
                unreachable!("free list points at an occupied slot");
            };
            self.free_head = next_free;
            *slot = Slot::Occupied(value);
            self.len += 1;
            return idx;
        }

        let pos = self.slots.len();
        assert!(pos < Idx::NONE.as_usize(), "index space exhausted");
        self.slots.push(Slot::Occupied(value));
        self.len += 1;
        Idx::from_usize(pos)
    }

    /// Returns `true` if every index below `Idx::NONE` is in use, so the
    /// next [`insert`](Self::insert) would panic.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_head.is_none() && self.slots.len() >= Idx::NONE.as_usize()
    }

    /// Makes room for at least `additional` more inserts without the
    /// backing `Vec` reallocating, reporting allocation failure instead of
    /// aborting.
    ///
    /// # Errors
    ///
    /// Returns the allocator's error if the `Vec` cannot grow.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let vacant = self.slots.len() - self.len;
        match additional.checked_sub(vacant) {
            Some(needed) if needed > 0 => self.slots.try_reserve(needed),
            _ => Ok(()),
        }
    }

    /// Removes every value, keeping the allocation.
    ///
    /// Any list still threaded through these slots is left dangling; clear
    /// or drain lists first.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = Idx::NONE;
        self.len = 0;
    }

    /// Iterates over `(index, &value)` for every occupied slot, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Idx, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| match slot {
                Slot::Occupied(value) => Some((Idx::from_usize(pos), value)),
                Slot::Vacant { .. } => None,
            })
    }
}

impl<T, Idx: Index> Storage<T> for Slots<T, Idx> {
    type Index = Idx;
    type Error = Infallible;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<Idx, Infallible> {
        Ok(self.insert(value))
    }

    fn remove(&mut self, index: Idx) -> Option<T> {
        let slot = self.slots.get_mut(index.as_usize())?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }

        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        let Slot::Occupied(value) = core::mem::replace(slot, vacant) else {
            unreachable!("slot checked occupied above");
        };
        self.free_head = index;
        self.len -= 1;
        Some(value)
    }

    #[inline]
    fn get(&self, index: Idx) -> Option<&T> {
        match self.slots.get(index.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, index: Idx) -> Option<&mut T> {
        match self.slots.get_mut(index.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Index = usize;
    type Error = Infallible;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<Self::Index, Self::Error> {
        Ok(self.insert(value))
    }

    #[inline]
    fn remove(&mut self, index: Self::Index) -> Option<T> {
        self.try_remove(index)
    }

    #[inline]
    fn get(&self, index: Self::Index) -> Option<&T> {
        slab::Slab::get(self, index)
    }

    #[inline]
    fn get_mut(&mut self, index: Self::Index) -> Option<&mut T> {
        slab::Slab::get_mut(self, index)
    }
}
