//! Intrusive doubly-linked list over external storage.
//!
//! The list stores only its anchor (head, tail) and a length. Each node
//! carries its own [`Link`]; the list reaches it through an [`Adapter`]. The
//! list never allocates, frees, or moves nodes. Every operation only rewires
//! links and is O(1).
//!
//! # The Anchor
//!
//! `Idx::NONE` plays the role of a sentinel anchor node: a node whose `prev`
//! is `NONE` is the head, a node whose `next` is `NONE` is the tail, and the
//! list's own `head`/`tail` fields are the anchor's `next`/`prev`. Positional
//! operations accept `Option<Idx>` where `None` means the anchor:
//!
//! ```text
//! next(None)              -> head
//! prev(None)              -> tail
//! insert_after(None, n)   -> n becomes the head
//! insert_before(None, n)  -> n becomes the tail
//! ```
//!
//! # Storage Invariant
//!
//! A list instance must always be used with the same storage instance, and a
//! node may be linked into at most one list per adapter. Breaking either
//! rule corrupts the chain (it cannot cause memory unsafety, but the list
//! will return nonsense or panic).
//!
//! # Example
//!
//! ```
//! use strand_list::{link_adapter, Link, List, Slots, Storage};
//!
//! struct Job {
//!     id: u32,
//!     link: Link<u32>,
//! }
//!
//! link_adapter!(JobLink = Job { link: Link<u32> });
//!
//! let mut slots: Slots<Job> = Slots::new();
//! let mut queue: List<JobLink> = List::new();
//!
//! // Storage owns the node, the list only links it.
//! let a = slots.insert(Job { id: 1, link: Link::new() });
//! let b = slots.insert(Job { id: 2, link: Link::new() });
//! queue.insert_tail(&mut slots, a);
//! queue.insert_tail(&mut slots, b);
//!
//! assert_eq!(queue.head(), Some(a));
//! assert_eq!(queue.next(&slots, Some(a)), Some(b));
//!
//! // Deleting detaches; the node is still in storage.
//! queue.delete(&mut slots, a);
//! assert_eq!(slots.get(a).map(|j| j.id), Some(1));
//! assert_eq!(queue.len(), 1);
//! ```

use core::fmt;
use core::marker::PhantomData;

use crate::{Adapter, Index, Link, Storage};

/// An intrusive doubly-linked list.
///
/// See the [module documentation](self) for the anchor convention.
pub struct List<A: Adapter> {
    head: A::Index,
    tail: A::Index,
    len: usize,
    _marker: PhantomData<fn() -> A>,
}

impl<A: Adapter> Default for List<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Adapter> fmt::Debug for List<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("len", &self.len)
            .finish()
    }
}

#[inline]
fn link<'s, A, S>(storage: &'s S, idx: A::Index) -> &'s Link<A::Index>
where
    A: Adapter,
    A::Node: 's,
    S: Storage<A::Node, Index = A::Index> + ?Sized,
{
    A::link(storage.get(idx).expect("invalid index"))
}

#[inline]
fn link_mut<'s, A, S>(storage: &'s mut S, idx: A::Index) -> &'s mut Link<A::Index>
where
    A: Adapter,
    A::Node: 's,
    S: Storage<A::Node, Index = A::Index> + ?Sized,
{
    A::link_mut(storage.get_mut(idx).expect("invalid index"))
}

impl<A: Adapter> List<A> {
    /// Creates an empty list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: A::Index::NONE,
            tail: A::Index::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Consumes an empty list.
    ///
    /// # Panics
    ///
    /// Panics if the list still has nodes linked.
    pub fn finish(self) {
        assert!(self.is_empty(), "list finished with {} nodes linked", self.len);
    }

    /// Returns the number of linked nodes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no nodes are linked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the head index, or `None` if empty.
    #[inline]
    pub fn head(&self) -> Option<A::Index> {
        self.head.into_option()
    }

    /// Returns the tail index, or `None` if empty.
    #[inline]
    pub fn tail(&self) -> Option<A::Index> {
        self.tail.into_option()
    }

    /// Returns the node after `at`, where `None` is the anchor.
    ///
    /// `next(None)` is the head; the tail's next is `None`.
    ///
    /// # Panics
    ///
    /// Panics if `at` is not valid in storage.
    #[inline]
    pub fn next<S>(&self, storage: &S, at: Option<A::Index>) -> Option<A::Index>
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        self.next_of(storage, A::Index::from_option(at)).into_option()
    }

    /// Returns the node before `at`, where `None` is the anchor.
    ///
    /// `prev(None)` is the tail; the head's prev is `None`.
    ///
    /// # Panics
    ///
    /// Panics if `at` is not valid in storage.
    #[inline]
    pub fn prev<S>(&self, storage: &S, at: Option<A::Index>) -> Option<A::Index>
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        self.prev_of(storage, A::Index::from_option(at)).into_option()
    }

    /// Returns `true` if `idx` is linked into this list.
    ///
    /// Decided from the node's own link, so it cannot distinguish this list
    /// from another list using the same adapter.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn contains<S>(&self, storage: &S, idx: A::Index) -> bool
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        link::<A, S>(storage, idx).has_siblings() || self.head == idx
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Links `idx` immediately before `before` (`None` = the anchor, so the
    /// node becomes the tail).
    ///
    /// The node must be detached.
    ///
    /// # Panics
    ///
    /// Panics if `before` or `idx` is not valid in storage.
    #[inline]
    pub fn insert_before<S>(&mut self, storage: &mut S, before: Option<A::Index>, idx: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        let next = A::Index::from_option(before);
        let prev = self.prev_of(storage, next);
        self.splice(storage, idx, prev, next);
    }

    /// Links `idx` immediately after `after` (`None` = the anchor, so the
    /// node becomes the head).
    ///
    /// The node must be detached.
    ///
    /// # Panics
    ///
    /// Panics if `after` or `idx` is not valid in storage.
    #[inline]
    pub fn insert_after<S>(&mut self, storage: &mut S, after: Option<A::Index>, idx: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        let prev = A::Index::from_option(after);
        let next = self.next_of(storage, prev);
        self.splice(storage, idx, prev, next);
    }

    /// Links `idx` at the head.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn insert_head<S>(&mut self, storage: &mut S, idx: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        self.insert_after(storage, None, idx);
    }

    /// Links `idx` at the tail.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn insert_tail<S>(&mut self, storage: &mut S, idx: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        self.insert_before(storage, None, idx);
    }

    // ========================================================================
    // Removal (detach only, storage keeps the node)
    // ========================================================================

    /// Detaches `idx` and clears its links.
    ///
    /// The node stays in storage. Deleting a node that is not linked into
    /// this list corrupts the list; guard against double deletion with
    /// [`contains`](Self::contains) if in doubt.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn delete<S>(&mut self, storage: &mut S, idx: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        debug_assert!(self.len > 0, "delete from an empty list");

        let node = link_mut::<A, S>(storage, idx);
        let prev = node.prev;
        let next = node.next;
        node.clear();

        self.set_next(storage, prev, next);
        self.set_prev(storage, next, prev);
        self.len -= 1;
    }

    /// Detaches and returns the head, or `None` if empty.
    #[inline]
    pub fn delete_head<S>(&mut self, storage: &mut S) -> Option<A::Index>
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        let head = self.head()?;
        self.delete(storage, head);
        Some(head)
    }

    /// Detaches and returns the tail, or `None` if empty.
    #[inline]
    pub fn delete_tail<S>(&mut self, storage: &mut S) -> Option<A::Index>
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        let tail = self.tail()?;
        self.delete(storage, tail);
        Some(tail)
    }

    /// Detaches every node, clearing their links.
    ///
    /// O(n); nodes stay in storage.
    pub fn clear<S>(&mut self, storage: &mut S)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        let mut idx = self.head;
        while idx.is_some() {
            let node = link_mut::<A, S>(storage, idx);
            idx = node.next;
            node.clear();
        }

        self.reset();
    }

    // ========================================================================
    // Bulk relinking
    // ========================================================================

    /// Moves the whole chain from `src` to `dst`, leaving `src` empty.
    ///
    /// O(1) regardless of length; no node is touched.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is not empty.
    #[inline]
    pub fn move_all(src: &mut Self, dst: &mut Self) {
        assert!(dst.is_empty(), "move_all into a non-empty list");
        core::mem::swap(src, dst);
    }

    /// Appends `other`'s chain after this list's tail, leaving `other` empty.
    ///
    /// O(1).
    pub fn append<S>(&mut self, storage: &mut S, other: &mut Self)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        if other.is_empty() {
            return;
        }

        if self.is_empty() {
            Self::move_all(other, self);
            return;
        }

        link_mut::<A, S>(storage, self.tail).next = other.head;
        link_mut::<A, S>(storage, other.head).prev = self.tail;
        self.tail = other.tail;
        self.len += other.len;
        other.reset();
    }

    /// Exchanges the positions of `a` and `b`.
    ///
    /// Both must be linked into this list. Adjacent nodes are handled
    /// separately so that neither is ever reinserted relative to itself.
    ///
    /// # Panics
    ///
    /// Panics if `a` or `b` is not valid in storage.
    pub fn swap<S>(&mut self, storage: &mut S, a: A::Index, b: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        if a == b {
            return;
        }

        let a_prev = link::<A, S>(storage, a).prev;
        let b_prev = link::<A, S>(storage, b).prev;

        if a == b_prev {
            // a -> b  becomes  b -> a
            self.delete(storage, a);
            self.insert_after(storage, Some(b), a);
        } else if b == a_prev {
            // b -> a  becomes  a -> b
            self.delete(storage, b);
            self.insert_after(storage, Some(a), b);
        } else {
            self.delete(storage, a);
            self.delete(storage, b);
            self.insert_after(storage, b_prev.into_option(), a);
            self.insert_after(storage, a_prev.into_option(), b);
        }
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Iterates over `(index, &node)` from head to tail.
    #[inline]
    pub fn iter<'a, S>(&self, storage: &'a S) -> Iter<'a, A, S>
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        Iter {
            storage,
            front: self.head,
            back: self.tail,
        }
    }

    /// Iterates over indices from head to tail.
    #[inline]
    pub fn keys<'a, S>(
        &self,
        storage: &'a S,
    ) -> impl DoubleEndedIterator<Item = A::Index> + use<'a, A, S>
    where
        A::Node: 'a,
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        self.iter(storage).map(|(idx, _)| idx)
    }

    // ========================================================================
    // Anchor-aware link access
    // ========================================================================

    #[inline]
    fn next_of<S>(&self, storage: &S, at: A::Index) -> A::Index
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        if at.is_none() {
            self.head
        } else {
            link::<A, S>(storage, at).next
        }
    }

    #[inline]
    fn prev_of<S>(&self, storage: &S, at: A::Index) -> A::Index
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        if at.is_none() {
            self.tail
        } else {
            link::<A, S>(storage, at).prev
        }
    }

    #[inline]
    fn set_next<S>(&mut self, storage: &mut S, at: A::Index, to: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        if at.is_none() {
            self.head = to;
        } else {
            link_mut::<A, S>(storage, at).next = to;
        }
    }

    #[inline]
    fn set_prev<S>(&mut self, storage: &mut S, at: A::Index, to: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        if at.is_none() {
            self.tail = to;
        } else {
            link_mut::<A, S>(storage, at).prev = to;
        }
    }

    /// Wires `idx` between `prev` and `next`, which must be adjacent.
    #[inline]
    fn splice<S>(&mut self, storage: &mut S, idx: A::Index, prev: A::Index, next: A::Index)
    where
        S: Storage<A::Node, Index = A::Index> + ?Sized,
    {
        let node = link_mut::<A, S>(storage, idx);
        debug_assert!(
            !node.has_siblings() && self.head != idx,
            "node is already linked"
        );
        node.prev = prev;
        node.next = next;

        self.set_next(storage, prev, idx);
        self.set_prev(storage, next, idx);
        self.len += 1;
    }

    #[inline]
    fn reset(&mut self) {
        self.head = A::Index::NONE;
        self.tail = A::Index::NONE;
        self.len = 0;
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over `(index, &node)` pairs of a [`List`].
pub struct Iter<'a, A: Adapter, S: ?Sized> {
    storage: &'a S,
    front: A::Index,
    back: A::Index,
}

impl<'a, A, S> Iterator for Iter<'a, A, S>
where
    A: Adapter,
    A::Node: 'a,
    S: Storage<A::Node, Index = A::Index> + ?Sized,
{
    type Item = (A::Index, &'a A::Node);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }

        let idx = self.front;
        let node = self.storage.get(idx).expect("invalid index");

        // Check if we've met in the middle
        if self.front == self.back {
            self.front = A::Index::NONE;
            self.back = A::Index::NONE;
        } else {
            self.front = A::link(node).next;
        }

        Some((idx, node))
    }
}

impl<'a, A, S> DoubleEndedIterator for Iter<'a, A, S>
where
    A: Adapter,
    A::Node: 'a,
    S: Storage<A::Node, Index = A::Index> + ?Sized,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }

        let idx = self.back;
        let node = self.storage.get(idx).expect("invalid index");

        if self.front == self.back {
            self.front = A::Index::NONE;
            self.back = A::Index::NONE;
        } else {
            self.back = A::link(node).prev;
        }

        Some((idx, node))
    }
}
