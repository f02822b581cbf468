//! Bounded, thread-safe ring buffer of fixed-size byte entries.
//!
//! [`RingBuffer`] is a classic bounded buffer: one lock around the state and
//! two condition variables, one for "data available" and one for "space
//! available". Every operation comes in a blocking and a non-blocking form:
//!
//! ```text
//! push(src)     waits while full      try_push(src)  Err(WouldBlock) if full
//! pop(dst)      waits while empty     try_pop(dst)   Err(WouldBlock) if empty
//! ```
//!
//! Blocking calls have no timeout. Callers that need a deadline should poll
//! the `try_` variants with their own backoff.
//!
//! Storage is either allocated by the ring (see [`RingConfig`] for the
//! allocation policy) or lent by the caller with
//! [`RingBuffer::with_storage`], in which case the ring borrows it and never
//! frees it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod ring;

pub use config::RingConfig;
pub use ring::RingBuffer;
pub use strand_core::{AllocPolicy, Error, Result};
