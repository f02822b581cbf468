//! Time-bounded list of fixed-size byte entries with lazy eviction.
//!
//! [`TimeoutList`] keeps owned copies of inserted entries, each stamped with
//! the monotonic time of insertion. Entries older than the configured
//! horizon are dropped only when somebody reads: there is no background
//! thread and no timer. Between reads, stale entries simply occupy memory.
//!
//! Ordering and O(1) removal come from an intrusive
//! [`strand_list::List`] threaded through the entries; a single
//! `parking_lot` mutex guards it.
//!
//! Time comes from a [`Clock`](strand_core::Clock). Production code uses the
//! default [`MonotonicClock`](strand_core::MonotonicClock); tests can drive
//! a [`ManualClock`](strand_core::ManualClock) through
//! [`TimeoutList::with_clock`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod timeout;

pub use config::TimeoutConfig;
pub use strand_core::{AllocPolicy, Error, Result};
pub use timeout::TimeoutList;
