//! Shared plumbing for the strand containers.
//!
//! The containers themselves live in sibling crates; this crate holds the
//! pieces they all lean on:
//!
//! - [`Error`] - the small, fixed error taxonomy every fallible operation
//!   reports through
//! - [`alloc`] - zero-filling allocation with a caller-chosen
//!   [`AllocPolicy`] (block until success, or fail fast)
//! - [`clock`] - a process-wide monotonic clock with ns/us/ms views, plus a
//!   [`Clock`] trait so time-dependent code can be driven by hand in tests
//! - [`trace`] - optional `tracing-subscriber` bootstrap
//!
//! # Example
//!
//! ```
//! use strand_core::{alloc, AllocPolicy, Error};
//!
//! let buf = alloc::zeroed(64, AllocPolicy::FailFast).unwrap();
//! assert!(buf.iter().all(|&b| b == 0));
//!
//! let err = alloc::zeroed_array(usize::MAX, 2, AllocPolicy::Block).unwrap_err();
//! assert!(matches!(err, Error::InvalidArgument(_)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod alloc;
pub mod clock;
pub mod error;
pub mod trace;

pub use alloc::AllocPolicy;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{Error, Result};
