use core::fmt;

use spsc_common::CACHE_LINE_SIZE;

use crate::Full;
use crate::protocol;
use crate::ring::{RingStorage, Slot};
use crate::sync::{AtomicUsize, Ordering};

/// Write side of the queue. Owned by exactly one thread.
///
/// Holds the only store access to the ring's head index, a read reference to
/// the consumer's tail index, and a private cache of that tail. The struct is
/// aligned to a cache line so nothing the consumer writes can share a line
/// with it.
#[repr(C, align(64))]
pub struct Producer<'a, T> {
    head: &'a AtomicUsize,
    tail: &'a AtomicUsize,
    cached_tail: usize,
    slots: &'a [Slot<T>],
}

/// Read side of the queue. Owned by exactly one thread.
///
/// Mirror image of [`Producer`]: stores the tail index, reads the head index,
/// and caches the last head it observed.
#[repr(C, align(64))]
pub struct Consumer<'a, T> {
    tail: &'a AtomicUsize,
    head: &'a AtomicUsize,
    cached_head: usize,
    slots: &'a [Slot<T>],
}

const _: () = assert!(core::mem::align_of::<Producer<'static, usize>>() == CACHE_LINE_SIZE);
const _: () = assert!(core::mem::align_of::<Consumer<'static, usize>>() == CACHE_LINE_SIZE);

/// Binds a producer and a consumer to `storage`.
///
/// Resets both published indices and both cached indices to zero, so any
/// values left over from an earlier pair of handles are discarded. The
/// mutable borrow guarantees no other handle on this storage is alive, and
/// the returned handles keep the storage borrowed until both are dropped.
pub fn init<T: Copy>(storage: &mut RingStorage<T>) -> (Producer<'_, T>, Consumer<'_, T>) {
    storage.head.store(0, Ordering::Relaxed);
    storage.tail.store(0, Ordering::Relaxed);

    let storage: &RingStorage<T> = storage;
    let producer = Producer {
        head: &storage.head.0,
        tail: &storage.tail.0,
        cached_tail: 0,
        slots: &storage.slots,
    };
    let consumer = Consumer {
        tail: &storage.tail.0,
        head: &storage.head.0,
        cached_head: 0,
        slots: &storage.slots,
    };
    (producer, consumer)
}

impl<T: Copy> Producer<'_, T> {
    /// Appends `value` without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`Full`] carrying `value` back when all usable slots are
    /// occupied. The queue is unchanged in that case.
    #[inline]
    pub fn enqueue(&mut self, value: T) -> Result<(), Full<T>> {
        // SAFETY: `&mut self` makes this the only caller for this head, the
        // indices and slots come from one storage, and both indices start at
        // zero and are only advanced with `next_index`.
        unsafe {
            protocol::enqueue(
                self.head,
                self.tail,
                &mut self.cached_tail,
                self.slots,
                value,
            )
        }
    }
}

impl<T> Producer<'_, T> {
    /// Total number of slots in the ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of values the ring can hold at once.
    #[inline]
    pub fn usable_capacity(&self) -> usize {
        self.slots.len() - 1
    }
}

impl<T: Copy> Consumer<'_, T> {
    /// Takes the oldest value without blocking, or `None` if the queue is
    /// empty.
    #[inline]
    pub fn dequeue(&mut self) -> Option<T> {
        // SAFETY: see `Producer::enqueue`; the roles are mirrored.
        unsafe { protocol::dequeue(self.tail, self.head, &mut self.cached_head, self.slots) }
    }
}

impl<T> Consumer<'_, T> {
    /// Total number of slots in the ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of values the ring can hold at once.
    #[inline]
    pub fn usable_capacity(&self) -> usize {
        self.slots.len() - 1
    }
}

impl<T> fmt::Debug for Producer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("cached_tail", &self.cached_tail)
            .field("capacity", &self.slots.len())
            .finish()
    }
}

impl<T> fmt::Debug for Consumer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .field("cached_head", &self.cached_head)
            .field("capacity", &self.slots.len())
            .finish()
    }
}
