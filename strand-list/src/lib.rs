//! Intrusive doubly-linked list over caller-owned, index-addressed storage.
//!
//! Nodes carry their own [`Link`]; the list holds only the anchor. Inserting,
//! deleting, moving and swapping rewire indices and never allocate, free, or
//! move a node, so a node can sit in several lists at once (one [`Link`] and
//! one [`Adapter`] per list) and outlive all of them.
//!
//! Storage is passed into every operation instead of being owned by the
//! list. Any slab-like container implementing [`Storage`] works; [`Slots`]
//! is a ready-made free-list arena, and `slab::Slab` is supported behind the
//! `slab` feature.
//!
//! # Example
//!
//! ```
//! use strand_list::{link_adapter, Link, List, Slots};
//!
//! struct Packet {
//!     seq: u32,
//!     link: Link<u32>,
//! }
//!
//! link_adapter!(PacketLink = Packet { link: Link<u32> });
//!
//! let mut slots: Slots<Packet> = Slots::new();
//! let mut inflight: List<PacketLink> = List::new();
//! let mut retry: List<PacketLink> = List::new();
//!
//! for seq in 0..4 {
//!     let idx = slots.insert(Packet { seq, link: Link::new() });
//!     inflight.insert_tail(&mut slots, idx);
//! }
//!
//! // Hand the whole backlog over in O(1).
//! List::move_all(&mut inflight, &mut retry);
//! assert!(inflight.is_empty());
//!
//! let seqs: Vec<u32> = retry.iter(&slots).map(|(_, p)| p.seq).collect();
//! assert_eq!(seqs, [0, 1, 2, 3]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod index;
pub mod link;
pub mod list;
pub mod storage;

pub use index::Index;
pub use link::{Adapter, Link};
pub use list::{Iter, List};
pub use storage::{Slots, Storage};
