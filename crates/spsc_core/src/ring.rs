use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::mem::MaybeUninit;
use core::ops::Deref;

use spsc_common::{CACHE_LINE_SIZE, MIN_CAPACITY};

use crate::QueueError;
use crate::handle::{self, Consumer, Producer};
use crate::sync::{AtomicUsize, Ordering, UnsafeCell};

/// Wrapper that places `T` at the start of its own cache line and pads it to
/// the end of that line.
#[repr(C, align(64))]
pub struct CacheAligned<T>(pub T);

const _: () = assert!(core::mem::align_of::<CacheAligned<u8>>() == CACHE_LINE_SIZE);

impl<T> CacheAligned<T> {
    /// Wraps `value`.
    pub const fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

/// One ring slot holding a single handle-sized value.
///
/// The slot is `repr(transparent)` over `T`, so a caller-provided array of
/// `T` (for example a C array of `void*`) can be viewed as a slice of slots.
/// Whether a slot may be written or read at a given instant is decided by
/// the head/tail protocol, not by the slot itself. Under `--cfg loom` the
/// cell is loom's, which checks each access against that protocol.
#[repr(transparent)]
pub struct Slot<T>(UnsafeCell<MaybeUninit<T>>);

// SAFETY: the protocol hands each slot to exactly one side at a time. The
// producer writes a slot only while it lies outside [tail, head), and the
// consumer reads it only after observing the head publish that covers it.
unsafe impl<T: Send> Sync for Slot<T> {}

impl<T> Slot<T> {
    /// An uninitialized slot.
    pub fn empty() -> Self {
        Self(UnsafeCell::new(MaybeUninit::uninit()))
    }

    /// Stores `value` in the slot.
    ///
    /// # Safety
    ///
    /// The caller must be the producer and the slot must not be visible to
    /// the consumer, i.e. the head index covering it is not yet published.
    #[inline(always)]
    pub unsafe fn write(&self, value: T) {
        // SAFETY: exclusive access per the caller contract.
        self.0
            .with_mut(|cell| unsafe { cell.write(MaybeUninit::new(value)) })
    }

    /// Copies the value out of the slot.
    ///
    /// # Safety
    ///
    /// The caller must be the consumer, the slot must have been written, and
    /// the head publish covering that write must have been observed with
    /// acquire ordering.
    #[inline(always)]
    pub unsafe fn read(&self) -> T
    where
        T: Copy,
    {
        // SAFETY: initialized and not concurrently written per the caller contract.
        self.0.with(|cell| unsafe { cell.read().assume_init() })
    }
}

/// Advances a ring index by one, wrapping to zero at `capacity`.
///
/// Equivalent to `(index + 1) % capacity` without the division.
#[inline(always)]
pub const fn next_index(index: usize, capacity: usize) -> usize {
    let next = index + 1;
    if next == capacity { 0 } else { next }
}

/// Caller-owned backing store shared by one producer and one consumer.
///
/// Holds the slot array and the two authoritative indices. `head` is the
/// next slot the producer writes and is only ever stored by the producer;
/// `tail` is the next slot the consumer reads and is only ever stored by the
/// consumer. The storage must outlive both handles, which the borrow taken by
/// [`RingStorage::split`] enforces.
pub struct RingStorage<T> {
    pub(crate) head: CacheAligned<AtomicUsize>,
    pub(crate) tail: CacheAligned<AtomicUsize>,
    pub(crate) slots: Box<[Slot<T>]>,
}

impl<T> RingStorage<T> {
    /// Allocates a ring of `capacity` slots, of which `capacity - 1` are
    /// usable at once.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::CapacityTooSmall`] when `capacity < 2`.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity < MIN_CAPACITY {
            return Err(QueueError::CapacityTooSmall { capacity });
        }
        let slots: Vec<Slot<T>> = (0..capacity).map(|_| Slot::empty()).collect();
        Self::from_slots(slots.into_boxed_slice())
    }

    /// Wraps an existing slot array allocated by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::CapacityTooSmall`] when fewer than two slots are
    /// supplied.
    pub fn from_slots(slots: Box<[Slot<T>]>) -> Result<Self, QueueError> {
        if slots.len() < MIN_CAPACITY {
            return Err(QueueError::CapacityTooSmall {
                capacity: slots.len(),
            });
        }
        Ok(Self {
            head: CacheAligned::new(AtomicUsize::new(0)),
            tail: CacheAligned::new(AtomicUsize::new(0)),
            slots,
        })
    }

    /// Total number of slots, including the one that is always kept empty.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of values the ring can hold at once.
    #[inline]
    pub fn usable_capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Binds a producer and a consumer to this storage. See [`handle::init`].
    pub fn split(&mut self) -> (Producer<'_, T>, Consumer<'_, T>)
    where
        T: Copy,
    {
        handle::init(self)
    }
}

impl<T> fmt::Debug for RingStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingStorage")
            .field("capacity", &self.slots.len())
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish()
    }
}
