//! Embedded links and the adapters that locate them.
//!
//! A [`Link`] is the pair of sibling indices a node carries so a [`List`]
//! can thread through it. The node type owns the link as an ordinary field;
//! an [`Adapter`] tells the list which field to use. Embedding several
//! links (with one adapter each) lets the same node sit in several lists at
//! once.
//!
//! ```
//! use strand_list::{link_adapter, Link};
//!
//! struct Order {
//!     id: u64,
//!     by_price: Link<u32>,
//!     by_time: Link<u32>,
//! }
//!
//! link_adapter!(PriceLink = Order { by_price: Link<u32> });
//! link_adapter!(TimeLink = Order { by_time: Link<u32> });
//! ```
//!
//! [`List`]: crate::List

use crate::Index;

/// Previous/next indices embedded in a list node.
///
/// Both sides are `Idx::NONE` while the node is detached. A node that is the
/// only element of a list also has both sides `NONE`; use
/// [`List::contains`](crate::List::contains) to tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<Idx: Index = u32> {
    pub(crate) prev: Idx,
    pub(crate) next: Idx,
}

impl<Idx: Index> Link<Idx> {
    /// Creates a detached link.
    #[inline]
    pub const fn new() -> Self {
        Self {
            prev: Idx::NONE,
            next: Idx::NONE,
        }
    }

    /// Index of the previous node, or `None` at the head.
    #[inline]
    pub fn prev(&self) -> Option<Idx> {
        self.prev.into_option()
    }

    /// Index of the next node, or `None` at the tail.
    #[inline]
    pub fn next(&self) -> Option<Idx> {
        self.next.into_option()
    }

    /// Returns `true` if either side points at a sibling.
    #[inline]
    pub fn has_siblings(&self) -> bool {
        self.prev.is_some() || self.next.is_some()
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.prev = Idx::NONE;
        self.next = Idx::NONE;
    }
}

impl<Idx: Index> Default for Link<Idx> {
    fn default() -> Self {
        Self::new()
    }
}

/// Locates the [`Link`] a list threads through inside its node type.
///
/// Usually generated with [`link_adapter!`](crate::link_adapter).
pub trait Adapter {
    /// The node type stored in storage.
    type Node;

    /// Index type used by the storage and the link.
    type Index: Index;

    /// Returns the link inside `node`.
    fn link(node: &Self::Node) -> &Link<Self::Index>;

    /// Returns the link inside `node`, mutably.
    fn link_mut(node: &mut Self::Node) -> &mut Link<Self::Index>;
}

/// Declares a zero-sized [`Adapter`] for a `Link` field.
///
/// ```
/// use strand_list::{link_adapter, Adapter, Link};
///
/// struct Task {
///     id: u64,
///     link: Link<u32>,
/// }
///
/// link_adapter!(
///     /// Threads tasks through their run-queue link.
///     TaskLink = Task { link: Link<u32> }
/// );
///
/// let task = Task { id: 1, link: Link::new() };
/// assert!(!TaskLink::link(&task).has_siblings());
/// ```
#[macro_export]
macro_rules! link_adapter {
    ($(#[$meta:meta])* $vis:vis $name:ident = $node:ty { $field:ident : Link<$idx:ty> }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::Adapter for $name {
            type Node = $node;
            type Index = $idx;

            #[inline]
            fn link(node: &Self::Node) -> &$crate::Link<$idx> {
                &node.$field
            }

            #[inline]
            fn link_mut(node: &mut Self::Node) -> &mut $crate::Link<$idx> {
                &mut node.$field
            }
        }
    };
}
