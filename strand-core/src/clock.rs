//! Monotonic clock with nanosecond granularity.
//!
//! Readings are nanoseconds since a process-wide anchor taken the first time
//! any reading is requested. The anchor is a [`minstant::Instant`], so reads
//! go through the TSC where it is reliable and fall back to the OS monotonic
//! clock elsewhere.
//!
//! ```
//! use strand_core::clock;
//!
//! let a = clock::now_ns();
//! let b = clock::now_ns();
//! assert!(b >= a);
//! assert!(clock::now_ms() <= clock::now_ns() / 1_000_000);
//! ```
//!
//! Time-dependent components take a [`Clock`] so tests can substitute a
//! [`ManualClock`] and step time explicitly.

use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use minstant::Instant;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;

fn anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

/// Current monotonic time in nanoseconds.
#[inline]
pub fn now_ns() -> u64 {
    u64::try_from(anchor().elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// Current monotonic time in microseconds.
#[inline]
pub fn now_us() -> u64 {
    now_ns() / NANOS_PER_MICRO
}

/// Current monotonic time in milliseconds.
#[inline]
pub fn now_ms() -> u64 {
    now_ns() / NANOS_PER_MILLI
}

/// Monotonic time `offset_ms` milliseconds from now (negative = in the past).
///
/// Saturates at zero and `u64::MAX`.
#[inline]
pub fn timestamp_ms(offset_ms: i64) -> u64 {
    now_ms().saturating_add_signed(offset_ms)
}

/// A source of monotonic time.
pub trait Clock: Send + Sync {
    /// Current time in nanoseconds. Must never go backwards.
    fn now_ns(&self) -> u64;

    /// Current time in microseconds.
    #[inline]
    fn now_us(&self) -> u64 {
        self.now_ns() / NANOS_PER_MICRO
    }

    /// Current time in milliseconds.
    #[inline]
    fn now_ms(&self) -> u64 {
        self.now_ns() / NANOS_PER_MILLI
    }

    /// Time `offset_ms` milliseconds from now, saturating.
    #[inline]
    fn timestamp_ms(&self, offset_ms: i64) -> u64 {
        self.now_ms().saturating_add_signed(offset_ms)
    }
}

/// The process-wide monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        now_ns()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can hand one clone to the
/// component under test and keep another to advance time.
///
/// ```
/// use std::time::Duration;
/// use strand_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
///
/// handle.advance(Duration::from_millis(5));
/// assert_eq!(clock.now_ms(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock reading `nanos`.
    pub fn starting_at(nanos: u64) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(nanos)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(by))
            });
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        self.nanos.load(Ordering::Acquire)
    }
}
