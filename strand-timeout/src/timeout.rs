//! The timeout list itself.

use std::fmt;
use std::mem;
use std::time::Duration;

use parking_lot::Mutex;
use strand_core::{AllocPolicy, Clock, Error, MonotonicClock, Result, alloc};
use strand_list::{Index, Link, List, Slots, Storage, link_adapter};
use tracing::{debug, trace};

use crate::TimeoutConfig;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Makes room in `entries` for one more insert under `policy`.
///
/// Running out of indices is reported as [`Error::OutOfMemory`] under either
/// policy: the caller holds the lock, so no slot could free up while waiting.
fn reserve_slot<Idx: Index>(entries: &mut Slots<Entry, Idx>, policy: AllocPolicy) -> Result<()> {
    let bytes = mem::size_of::<Entry>();
    if entries.is_full() {
        return Err(Error::OutOfMemory { bytes });
    }
    alloc::with_policy(bytes, policy, || entries.try_reserve(1).ok())
}

/// An owned copy of one inserted entry.
struct Entry {
    data: Box<[u8]>,
    stamp_ns: u64,
    link: Link<u32>,
}

link_adapter!(EntryLink = Entry { link: Link<u32> });

/// Everything the lock protects.
///
/// `list` runs newest (head) to oldest (tail). Stamps are taken under the
/// lock, so they never decrease from tail to head.
struct Inner {
    entries: Slots<Entry>,
    list: List<EntryLink>,
}

impl Inner {
    /// Drops entries older than `horizon_ns` from the tail, returning how
    /// many went.
    fn evict(&mut self, now_ns: u64, horizon_ns: u64) -> usize {
        let mut evicted = 0;
        while let Some(tail) = self.list.tail() {
            let Some(entry) = self.entries.get(tail) else {
                unreachable!("linked entry missing from storage");
            };
            if now_ns.saturating_sub(entry.stamp_ns) <= horizon_ns {
                break;
            }
            self.list.delete(&mut self.entries, tail);
            self.entries.remove(tail);
            evicted += 1;
        }
        evicted
    }
}

/// A list of fixed-size byte entries that expire a fixed time after
/// insertion.
///
/// Expiry is lazy: nothing happens in the background. [`get`](Self::get)
/// and [`snapshot`](Self::snapshot) first drop every entry older than the
/// horizon, oldest first, then read what is left, newest first. An entry
/// aged exactly the horizon is still valid.
///
/// ```text
///  put ──► [ E5 | E4 | E3 | E2 | E1 ] ──► evicted by get once stale
///          head (newest)      tail (oldest)
/// ```
///
/// Stale entries that nobody reads stay resident until the next read or
/// until the list is dropped.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use strand_core::ManualClock;
/// use strand_timeout::{TimeoutConfig, TimeoutList};
///
/// let clock = ManualClock::new();
/// let list = TimeoutList::with_clock(&TimeoutConfig::new(100, 2), clock.clone()).unwrap();
///
/// list.put(b"aa").unwrap();
/// clock.advance(Duration::from_millis(60));
/// list.put(b"bb").unwrap();
/// clock.advance(Duration::from_millis(60));
///
/// // "aa" is 120ms old and goes; "bb" is 60ms old and stays.
/// let mut buf = [0u8; 4];
/// assert_eq!(list.get(&mut buf).unwrap(), 2);
/// assert_eq!(&buf[..2], b"bb");
/// assert_eq!(list.len(), 1);
/// ```
pub struct TimeoutList<C: Clock = MonotonicClock> {
    horizon_ns: u64,
    entry_size: usize,
    alloc_policy: AllocPolicy,
    clock: C,
    inner: Mutex<Inner>,
}

impl TimeoutList {
    /// Creates a list on the process-wide monotonic clock, blocking on
    /// allocation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `entry_size` is zero.
    pub fn new(horizon_ms: u64, entry_size: usize) -> Result<Self> {
        Self::from_config(&TimeoutConfig::new(horizon_ms, entry_size))
    }

    /// Creates a list per `config` on the process-wide monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the config is invalid.
    pub fn from_config(config: &TimeoutConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> TimeoutList<C> {
    /// Creates a list per `config` that reads time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the config is invalid.
    pub fn with_clock(config: &TimeoutConfig, clock: C) -> Result<Self> {
        config.validate()?;
        debug!(
            horizon_ms = config.horizon_ms,
            entry_size = config.entry_size,
            alloc_policy = ?config.alloc_policy,
            "timeout list created"
        );

        Ok(Self {
            horizon_ns: config.horizon_ms.saturating_mul(NANOS_PER_MILLI),
            entry_size: config.entry_size,
            alloc_policy: config.alloc_policy,
            clock,
            inner: Mutex::new(Inner {
                entries: Slots::new(),
                list: List::new(),
            }),
        })
    }

    /// Copies `entry` in, stamped with the current time, as the newest entry.
    ///
    /// The copy is allocated before the lock is taken; growing the entry
    /// arena happens under the lock. Both follow the configured
    /// [`AllocPolicy`], so under `Block` a refused allocation is retried
    /// (holding the lock while the arena retries). On failure nothing is
    /// inserted.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `entry.len() != entry_size`
    /// - [`Error::OutOfMemory`] under [`AllocPolicy::FailFast`] if the copy
    ///   or the arena slot cannot be allocated, and under either policy once
    ///   every entry index is in use
    pub fn put(&self, entry: &[u8]) -> Result<()> {
        if entry.len() != self.entry_size {
            return Err(Error::InvalidArgument("entry length must equal entry size"));
        }

        let mut data = alloc::zeroed(self.entry_size, self.alloc_policy)?;
        data.copy_from_slice(entry);

        let mut inner = self.inner.lock();
        let Inner { entries, list } = &mut *inner;

        reserve_slot(entries, self.alloc_policy)?;

        let stamp_ns = self.clock.now_ns();
        let idx = entries.insert(Entry {
            data,
            stamp_ns,
            link: Link::new(),
        });
        list.insert_head(entries, idx);

        trace!(stamp_ns, len = list.len(), "entry inserted");
        Ok(())
    }

    /// Evicts stale entries, then copies the remaining ones into `buf`,
    /// newest first, and returns the number of bytes written.
    ///
    /// Only whole entries are copied: the result is a multiple of
    /// `entry_size`, and entries that do not fit are left out (but stay in
    /// the list).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `buf` cannot hold one entry.
    pub fn get(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < self.entry_size {
            return Err(Error::InvalidArgument("buffer smaller than one entry"));
        }

        let mut inner = self.inner.lock();
        let evicted = inner.evict(self.clock.now_ns(), self.horizon_ns);

        let mut written = 0;
        for ((_, entry), slot) in inner
            .list
            .iter(&inner.entries)
            .zip(buf.chunks_exact_mut(self.entry_size))
        {
            slot.copy_from_slice(&entry.data);
            written += self.entry_size;
        }

        trace!(evicted, written, "entries read");
        Ok(written)
    }

    /// Evicts stale entries and returns copies of the rest, newest first.
    pub fn snapshot(&self) -> Vec<Box<[u8]>> {
        let mut inner = self.inner.lock();
        let evicted = inner.evict(self.clock.now_ns(), self.horizon_ns);

        let out: Vec<Box<[u8]>> = inner
            .list
            .iter(&inner.entries)
            .map(|(_, entry)| entry.data.clone())
            .collect();

        trace!(evicted, len = out.len(), "snapshot taken");
        out
    }

    /// Number of resident entries, stale ones included.
    ///
    /// Does not evict.
    pub fn len(&self) -> usize {
        self.inner.lock().list.len()
    }

    /// Returns `true` if no entries are resident.
    ///
    /// Does not evict.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().list.is_empty()
    }

    /// Maximum age an entry may reach and still be returned.
    pub fn horizon(&self) -> Duration {
        Duration::from_nanos(self.horizon_ns)
    }

    /// Size in bytes of every entry.
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }
}

impl<C: Clock> Drop for TimeoutList<C> {
    fn drop(&mut self) {
        let Inner { entries, list } = self.inner.get_mut();

        let mut drained = 0usize;
        while let Some(idx) = list.delete_tail(entries) {
            entries.remove(idx);
            drained += 1;
        }
        mem::take(list).finish();

        debug!(drained, "timeout list destroyed");
    }
}

impl<C: Clock> fmt::Debug for TimeoutList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutList")
            .field("horizon", &self.horizon())
            .field("entry_size", &self.entry_size)
            .field("alloc_policy", &self.alloc_policy)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
