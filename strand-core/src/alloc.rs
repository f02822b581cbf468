//! Zero-filling allocation with a caller-chosen failure policy.
//!
//! Every buffer a strand container owns comes from here. The policy decides
//! what happens when the allocator refuses:
//!
//! ```text
//! AllocPolicy::Block     retry until it succeeds (never reports failure)
//! AllocPolicy::FailFast  return Error::OutOfMemory immediately
//! ```
//!
//! `Block` is a "succeed or hang" contract. It backs off with
//! [`crossbeam_utils::Backoff`] first, then sleeps [`RETRY_INTERVAL`] between
//! attempts until memory frees up.
//!
//! Requests that no allocator could ever satisfy (overflowing `count * size`,
//! or more than `isize::MAX` bytes) are rejected with
//! [`Error::InvalidArgument`] under both policies.

use std::thread;
use std::time::Duration;

use crossbeam_utils::Backoff;
use tracing::{trace, warn};

use crate::{Error, Result};

/// Sleep between allocation attempts once spinning has been exhausted.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// What to do when an allocation cannot be satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AllocPolicy {
    /// Retry until the allocation succeeds.
    #[default]
    Block,
    /// Fail with [`Error::OutOfMemory`] on the first refusal.
    FailFast,
}

/// Allocates `len` zero-filled bytes.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `len` exceeds `isize::MAX`
/// - [`Error::OutOfMemory`] if the allocator refuses and `policy` is
///   [`AllocPolicy::FailFast`]
///
/// # Example
///
/// ```
/// use strand_core::{alloc, AllocPolicy};
///
/// let buf = alloc::zeroed(16, AllocPolicy::Block).unwrap();
/// assert_eq!(&*buf, &[0u8; 16]);
/// ```
pub fn zeroed(len: usize, policy: AllocPolicy) -> Result<Box<[u8]>> {
    if len > isize::MAX as usize {
        return Err(Error::InvalidArgument("allocation exceeds isize::MAX bytes"));
    }

    with_policy(len, policy, || try_zeroed(len))
}

/// Allocates `count` zero-filled objects of `size` bytes each.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `count * size` overflows or exceeds
///   `isize::MAX`
/// - [`Error::OutOfMemory`] under [`AllocPolicy::FailFast`] when the allocator
///   refuses
pub fn zeroed_array(count: usize, size: usize, policy: AllocPolicy) -> Result<Box<[u8]>> {
    let len = count
        .checked_mul(size)
        .ok_or(Error::InvalidArgument("allocation size overflows usize"))?;
    zeroed(len, policy)
}

/// Runs a fallible allocation `attempt` under `policy`.
///
/// `attempt` returns `None` when the allocator refuses. Under
/// [`AllocPolicy::FailFast`] the first refusal becomes
/// [`Error::OutOfMemory`] reporting `bytes`; under [`AllocPolicy::Block`]
/// the attempt is repeated, with the same backoff as [`zeroed`], until it
/// succeeds.
///
/// Use this for allocations a component makes outside of [`zeroed`], such
/// as growing an arena with `try_reserve`, so that every allocation honors
/// the caller's policy.
///
/// # Errors
///
/// Returns [`Error::OutOfMemory`] under [`AllocPolicy::FailFast`] if
/// `attempt` returns `None`.
///
/// # Example
///
/// ```
/// use strand_core::{alloc, AllocPolicy};
///
/// let mut arena: Vec<u64> = Vec::new();
/// alloc::with_policy(8 * 16, AllocPolicy::Block, || arena.try_reserve(16).ok()).unwrap();
/// assert!(arena.capacity() >= 16);
/// ```
pub fn with_policy<T>(
    bytes: usize,
    policy: AllocPolicy,
    mut attempt: impl FnMut() -> Option<T>,
) -> Result<T> {
    if let Some(value) = attempt() {
        return Ok(value);
    }

    match policy {
        AllocPolicy::FailFast => {
            trace!(bytes, "fail-fast allocation refused");
            Err(Error::OutOfMemory { bytes })
        }
        AllocPolicy::Block => Ok(retry_until_ok(bytes, attempt)),
    }
}

fn retry_until_ok<T>(bytes: usize, mut attempt: impl FnMut() -> Option<T>) -> T {
    warn!(bytes, "allocation failed, retrying until it succeeds");

    let backoff = Backoff::new();
    loop {
        if backoff.is_completed() {
            thread::sleep(RETRY_INTERVAL);
        } else {
            backoff.snooze();
        }

        if let Some(value) = attempt() {
            return value;
        }
    }
}

fn try_zeroed(len: usize) -> Option<Box<[u8]>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).ok()?;
    buf.resize(len, 0u8);
    Some(buf.into_boxed_slice())
}
