//! The ring buffer itself.

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::{Condvar, Mutex};
use strand_core::{Error, Result, alloc};
use tracing::{debug, trace};

use crate::RingConfig;

/// Backing storage: allocated by the ring, or lent by the caller.
enum Backing<'a> {
    Owned(Box<[u8]>),
    Borrowed(&'a mut [u8]),
}

impl Deref for Backing<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            Backing::Owned(buf) => buf,
            Backing::Borrowed(buf) => buf,
        }
    }
}

impl DerefMut for Backing<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            Backing::Owned(buf) => buf,
            Backing::Borrowed(buf) => buf,
        }
    }
}

/// Everything the lock protects.
struct State<'a> {
    slots: Backing<'a>,
    /// Next slot to read.
    read: usize,
    /// Next slot to write.
    write: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Block,
    NonBlock,
}

/// A bounded FIFO of fixed-size byte entries, safe to share between threads.
///
/// `slot_count` slots of `entry_size` bytes each, with one slot always kept
/// free so that `read == write` means empty and `write + 1 == read` means
/// full. [`capacity`](Self::capacity) is therefore `slot_count - 1`.
///
/// All state sits behind one lock. Blocking calls wait on a condition
/// variable, which releases the lock while parked:
///
/// ```text
/// push ──► copy into slot[write] ──► write += 1 ──► readable.notify_one()
/// pop  ──► copy out of slot[read] ──► read += 1 ──► writable.notify_one()
/// ```
///
/// Each successful push frees exactly one entry for one popper, and each
/// pop frees exactly one slot for one pusher, so waking a single waiter per
/// operation is enough even with many producers and consumers. Wake order
/// among waiters is whatever the lock and condvar provide; it is not FIFO.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use strand_ring::RingBuffer;
///
/// let ring = Arc::new(RingBuffer::new(8, 4).unwrap());
///
/// let producer = {
///     let ring = Arc::clone(&ring);
///     thread::spawn(move || {
///         for i in 0..100u64 {
///             ring.push(&i.to_le_bytes()).unwrap();
///         }
///     })
/// };
///
/// let mut buf = [0u8; 8];
/// for i in 0..100u64 {
///     ring.pop(&mut buf).unwrap();
///     assert_eq!(u64::from_le_bytes(buf), i);
/// }
/// producer.join().unwrap();
/// ```
pub struct RingBuffer<'a> {
    entry_size: usize,
    slot_count: usize,
    owns_storage: bool,
    state: Mutex<State<'a>>,
    /// Signaled after a push; poppers wait here.
    readable: Condvar,
    /// Signaled after a pop; pushers wait here.
    writable: Condvar,
}

impl RingBuffer<'static> {
    /// Creates a ring with owned storage, blocking until it is allocated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `entry_size` is zero,
    /// `slot_count <= 1`, or the storage size overflows.
    pub fn new(entry_size: usize, slot_count: usize) -> Result<Self> {
        Self::from_config(&RingConfig::new(entry_size, slot_count))
    }

    /// Creates a ring with owned storage per `config`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for an invalid shape
    /// - [`Error::OutOfMemory`] if storage cannot be allocated under
    ///   [`AllocPolicy::FailFast`](strand_core::AllocPolicy::FailFast)
    pub fn from_config(config: &RingConfig) -> Result<Self> {
        config.validate()?;
        let slots = alloc::zeroed_array(config.slot_count, config.entry_size, config.alloc_policy)?;
        Ok(Self::build(
            Backing::Owned(slots),
            config.entry_size,
            config.slot_count,
        ))
    }
}

impl<'a> RingBuffer<'a> {
    /// Creates a ring over caller-supplied storage.
    ///
    /// Only the first `entry_size * slot_count` bytes are used. The storage
    /// is borrowed for the ring's lifetime and never freed by it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an invalid shape or if
    /// `storage` is too short.
    pub fn with_storage(storage: &'a mut [u8], entry_size: usize, slot_count: usize) -> Result<Self> {
        let len = RingConfig::new(entry_size, slot_count).storage_len()?;
        let slots = storage
            .get_mut(..len)
            .ok_or(Error::InvalidArgument("storage shorter than entry_size * slot_count"))?;
        Ok(Self::build(Backing::Borrowed(slots), entry_size, slot_count))
    }

    fn build(slots: Backing<'a>, entry_size: usize, slot_count: usize) -> Self {
        let owns_storage = matches!(slots, Backing::Owned(_));
        debug!(entry_size, slot_count, owns_storage, "ring buffer created");

        Self {
            entry_size,
            slot_count,
            owns_storage,
            state: Mutex::new(State {
                slots,
                read: 0,
                write: 0,
            }),
            readable: Condvar::new(),
            writable: Condvar::new(),
        }
    }

    // ========================================================================
    // Push / pop
    // ========================================================================

    /// Copies `src` into the ring, waiting for room if it is full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `src.len() != entry_size`.
    pub fn push(&self, src: &[u8]) -> Result<()> {
        self.push_with(src, Mode::Block)
    }

    /// Copies `src` into the ring if there is room.
    ///
    /// # Errors
    ///
    /// - [`Error::WouldBlock`] if the ring is full
    /// - [`Error::InvalidArgument`] if `src.len() != entry_size`
    pub fn try_push(&self, src: &[u8]) -> Result<()> {
        self.push_with(src, Mode::NonBlock)
    }

    /// Copies the oldest entry into `dst`, waiting for one if the ring is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `dst.len() != entry_size`.
    pub fn pop(&self, dst: &mut [u8]) -> Result<()> {
        self.pop_with(dst, Mode::Block)
    }

    /// Copies the oldest entry into `dst` if there is one.
    ///
    /// # Errors
    ///
    /// - [`Error::WouldBlock`] if the ring is empty
    /// - [`Error::InvalidArgument`] if `dst.len() != entry_size`
    pub fn try_pop(&self, dst: &mut [u8]) -> Result<()> {
        self.pop_with(dst, Mode::NonBlock)
    }

    fn push_with(&self, src: &[u8], mode: Mode) -> Result<()> {
        if src.len() != self.entry_size {
            return Err(Error::InvalidArgument("source length must equal entry size"));
        }

        let mut state = self.state.lock();
        while self.full(&state) {
            if mode == Mode::NonBlock {
                return Err(Error::WouldBlock);
            }
            trace!("ring full, waiting for space");
            self.writable.wait(&mut state);
        }

        let offset = state.write * self.entry_size;
        state.slots[offset..offset + self.entry_size].copy_from_slice(src);
        state.write = self.advance(state.write);
        drop(state);

        self.readable.notify_one();
        Ok(())
    }

    fn pop_with(&self, dst: &mut [u8], mode: Mode) -> Result<()> {
        if dst.len() != self.entry_size {
            return Err(Error::InvalidArgument("destination length must equal entry size"));
        }

        let mut state = self.state.lock();
        while state.read == state.write {
            if mode == Mode::NonBlock {
                return Err(Error::WouldBlock);
            }
            trace!("ring empty, waiting for data");
            self.readable.wait(&mut state);
        }

        let offset = state.read * self.entry_size;
        dst.copy_from_slice(&state.slots[offset..offset + self.entry_size]);
        state.read = self.advance(state.read);
        drop(state);

        self.writable.notify_one();
        Ok(())
    }

    #[inline]
    fn advance(&self, cursor: usize) -> usize {
        let next = cursor + 1;
        if next == self.slot_count { 0 } else { next }
    }

    #[inline]
    fn full(&self, state: &State<'_>) -> bool {
        self.advance(state.write) == state.read
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Size in bytes of every entry.
    #[inline]
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Total number of slots, including the one kept free.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Maximum number of entries held at once.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slot_count - 1
    }

    /// Whether the backing storage was allocated by the ring.
    #[inline]
    pub fn owns_storage(&self) -> bool {
        self.owns_storage
    }

    /// Number of entries currently held.
    ///
    /// A snapshot; concurrent pushes and pops may change it immediately.
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        (state.write + self.slot_count - state.read) % self.slot_count
    }

    /// Returns `true` if no entries are held.
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock();
        state.read == state.write
    }

    /// Returns `true` if every usable slot is taken.
    pub fn is_full(&self) -> bool {
        let state = self.state.lock();
        self.full(&state)
    }
}

impl Drop for RingBuffer<'_> {
    fn drop(&mut self) {
        debug!(
            entry_size = self.entry_size,
            slot_count = self.slot_count,
            owns_storage = self.owns_storage,
            "ring buffer destroyed"
        );
    }
}

impl fmt::Debug for RingBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("entry_size", &self.entry_size)
            .field("slot_count", &self.slot_count)
            .field("owns_storage", &self.owns_storage)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use proptest::prelude::*;
    use strand_core::AllocPolicy;

    use super::*;

    fn entry(i: u64) -> [u8; 8] {
        i.to_le_bytes()
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(RingBuffer::new(8, 1), Err(Error::InvalidArgument(_))));
        assert!(matches!(RingBuffer::new(8, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(RingBuffer::new(0, 8), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn two_slots_hold_one_entry() {
        let ring = RingBuffer::new(8, 2).unwrap();
        assert_eq!(ring.capacity(), 1);

        ring.try_push(&entry(1)).unwrap();
        assert!(ring.is_full());
        assert_eq!(ring.try_push(&entry(2)), Err(Error::WouldBlock));
    }

    #[test]
    fn exposes_slot_count_minus_one() {
        const SLOTS: usize = 16;
        let ring = RingBuffer::new(8, SLOTS).unwrap();

        for i in 0..(SLOTS - 1) as u64 {
            ring.try_push(&entry(i)).unwrap();
        }
        assert_eq!(ring.len(), SLOTS - 1);
        assert!(ring.is_full());

        let err = ring.try_push(&entry(99)).unwrap_err();
        assert!(err.is_would_block());
    }

    #[test]
    fn fifo_ordering() {
        const SLOTS: usize = 8;
        let ring = RingBuffer::new(8, SLOTS).unwrap();
        let mut buf = [0u8; 8];

        // Several laps so the cursors wrap.
        for lap in 0..4u64 {
            for i in 0..(SLOTS - 1) as u64 {
                ring.try_push(&entry(lap * 100 + i)).unwrap();
            }
            for i in 0..(SLOTS - 1) as u64 {
                ring.try_pop(&mut buf).unwrap();
                assert_eq!(u64::from_le_bytes(buf), lap * 100 + i);
            }
            assert!(ring.is_empty());
        }
    }

    #[test]
    fn try_pop_empty() {
        let ring = RingBuffer::new(4, 4).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(ring.try_pop(&mut buf), Err(Error::WouldBlock));
    }

    #[test]
    fn length_checks() {
        let ring = RingBuffer::new(8, 4).unwrap();

        assert!(matches!(ring.try_push(&[0u8; 7]), Err(Error::InvalidArgument(_))));
        assert!(matches!(ring.push(&[0u8; 9]), Err(Error::InvalidArgument(_))));

        ring.try_push(&entry(5)).unwrap();
        let mut short = [0u8; 4];
        assert!(matches!(ring.try_pop(&mut short), Err(Error::InvalidArgument(_))));
        assert!(matches!(ring.pop(&mut short), Err(Error::InvalidArgument(_))));
        // Nothing was consumed by the rejected pops.
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn oversized_destination_is_rejected() {
        let ring = RingBuffer::new(4, 4).unwrap();
        ring.try_push(&[1, 2, 3, 4]).unwrap();
        ring.try_push(&[5, 6, 7, 8]).unwrap();

        let mut long = [0xffu8; 6];
        assert!(matches!(ring.try_pop(&mut long), Err(Error::InvalidArgument(_))));
        assert!(matches!(ring.pop(&mut long), Err(Error::InvalidArgument(_))));
        assert_eq!(long, [0xff; 6]);
        assert_eq!(ring.len(), 2);

        let mut buf = [0u8; 4];
        ring.try_pop(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn blocking_pop_waits_for_push() {
        let ring = Arc::new(RingBuffer::new(8, 4).unwrap());
        let pushed = Arc::new(AtomicBool::new(false));

        let consumer = {
            let ring = Arc::clone(&ring);
            let pushed = Arc::clone(&pushed);
            thread::spawn(move || {
                let mut buf = [0u8; 8];
                ring.pop(&mut buf).unwrap();
                // The push happens-before the pop returns.
                assert!(pushed.load(Ordering::SeqCst));
                u64::from_le_bytes(buf)
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!consumer.is_finished());

        pushed.store(true, Ordering::SeqCst);
        ring.push(&entry(42)).unwrap();

        assert_eq!(consumer.join().unwrap(), 42);
    }

    #[test]
    fn blocking_push_waits_for_pop() {
        let ring = Arc::new(RingBuffer::new(8, 2).unwrap());
        ring.push(&entry(1)).unwrap();

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || ring.push(&entry(2)).unwrap())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());

        let mut buf = [0u8; 8];
        ring.pop(&mut buf).unwrap();
        assert_eq!(u64::from_le_bytes(buf), 1);

        producer.join().unwrap();
        ring.pop(&mut buf).unwrap();
        assert_eq!(u64::from_le_bytes(buf), 2);
    }

    #[test]
    fn cross_thread_many_producers_many_consumers() {
        const PRODUCERS: u64 = 4;
        const CONSUMERS: usize = 4;
        const PER_PRODUCER: u64 = 5_000;

        let ring = RingBuffer::new(8, 8).unwrap();
        let total = PRODUCERS * PER_PRODUCER;

        let sums: Vec<u64> = thread::scope(|s| {
            for p in 0..PRODUCERS {
                let ring = &ring;
                s.spawn(move || {
                    for i in 0..PER_PRODUCER {
                        ring.push(&entry(p * PER_PRODUCER + i)).unwrap();
                    }
                });
            }

            let per_consumer = total as usize / CONSUMERS;
            let consumers: Vec<_> = (0..CONSUMERS)
                .map(|_| {
                    let ring = &ring;
                    s.spawn(move || {
                        let mut buf = [0u8; 8];
                        let mut sum = 0u64;
                        for _ in 0..per_consumer {
                            ring.pop(&mut buf).unwrap();
                            sum += u64::from_le_bytes(buf);
                        }
                        sum
                    })
                })
                .collect();

            consumers.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sums.iter().sum::<u64>(), (0..total).sum::<u64>());
        assert!(ring.is_empty());
    }

    #[test]
    fn cross_thread_single_producer_keeps_order() {
        const COUNT: u64 = 20_000;
        let ring = RingBuffer::new(8, 16).unwrap();

        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..COUNT {
                    ring.push(&entry(i)).unwrap();
                }
            });

            let mut buf = [0u8; 8];
            for i in 0..COUNT {
                ring.pop(&mut buf).unwrap();
                assert_eq!(u64::from_le_bytes(buf), i);
            }
        });
    }

    #[test]
    fn borrowed_storage_is_used_and_returned() {
        let mut storage = vec![0u8; 3 * 4 + 5];
        {
            let ring = RingBuffer::with_storage(&mut storage, 4, 3).unwrap();
            assert!(!ring.owns_storage());
            ring.try_push(&[9, 9, 9, 9]).unwrap();
        }
        // The ring wrote into our buffer and left it alive for us.
        assert_eq!(&storage[..4], &[9, 9, 9, 9]);
        assert_eq!(storage.len(), 17);
    }

    #[test]
    fn borrowed_storage_too_short() {
        let mut storage = [0u8; 11];
        assert!(matches!(
            RingBuffer::with_storage(&mut storage, 4, 3),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn owned_storage_flag() {
        let ring = RingBuffer::new(4, 3).unwrap();
        assert!(ring.owns_storage());
        assert_eq!(ring.entry_size(), 4);
        assert_eq!(ring.slot_count(), 3);
    }

    #[test]
    fn fail_fast_out_of_memory() {
        let config = RingConfig::new(isize::MAX as usize / 2, 2).alloc_policy(AllocPolicy::FailFast);
        assert!(matches!(
            RingBuffer::from_config(&config),
            Err(Error::OutOfMemory { .. })
        ));
    }

    #[test]
    fn queries_are_idempotent() {
        let ring = RingBuffer::new(8, 4).unwrap();
        ring.try_push(&entry(1)).unwrap();
        for _ in 0..3 {
            assert!(!ring.is_empty());
            assert!(!ring.is_full());
            assert_eq!(ring.len(), 1);
        }
    }

    proptest! {
        #[test]
        fn bytes_round_trip(
            entry_size in 1usize..64,
            slot_count in 2usize..16,
            seed in proptest::collection::vec(any::<u8>(), 64 * 40),
        ) {
            let ring = RingBuffer::new(entry_size, slot_count).unwrap();
            let entries: Vec<&[u8]> = seed.chunks_exact(entry_size).take(40).collect();

            let mut out = vec![0u8; entry_size];
            let mut pending = std::collections::VecDeque::new();
            for e in &entries {
                if ring.try_push(e).is_err() {
                    let want: &[u8] = pending.pop_front().unwrap();
                    ring.try_pop(&mut out).unwrap();
                    prop_assert_eq!(&out[..], want);
                    ring.try_push(e).unwrap();
                }
                pending.push_back(*e);
            }
            while let Some(want) = pending.pop_front() {
                ring.try_pop(&mut out).unwrap();
                prop_assert_eq!(&out[..], want);
            }
            prop_assert!(ring.is_empty());
        }
    }
}
