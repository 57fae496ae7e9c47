//! Lock-free hand-off protocol over two published indices.
//!
//! ```text
//! producer: write slot[head], then Release-store head  ->  consumer: Acquire-load head, then read slot
//! consumer: read slot[tail],  then Release-store tail  ->  producer: Acquire-load tail, then overwrite slot
//! ```
//!
//! Each side loads its own index with `Relaxed` ordering because it is the
//! only writer of that index. Each side keeps a private, possibly stale copy
//! of the other side's index and only performs the synchronizing load when
//! that copy claims the ring is full (producer) or empty (consumer). A stale
//! copy can only under-report progress, so the fast path never hands out a
//! slot the other side still owns.
//!
//! The functions here take raw references so that the safe handles in
//! [`crate::handle`] and the C ABI, which stores its indices inside the
//! handles themselves, share one implementation.

use crate::Full;
use crate::ring::{Slot, next_index};
use crate::sync::{AtomicUsize, Ordering};

/// Attempts to append `value` at the producer's head.
///
/// Returns [`Full`] with the value, leaving every index untouched, when the
/// only free slot is the one kept empty to distinguish full from empty.
///
/// # Safety
///
/// - Only one thread ever calls this for a given `head`, and it is the only
///   thread that stores to `head` or touches `cached_tail`.
/// - `tail` is the consumer index of the same ring, and `slots` is that
///   ring's storage with at least two slots.
/// - `head`, `tail` and `*cached_tail` hold values below `slots.len()`.
#[inline]
pub unsafe fn enqueue<T: Copy>(
    head: &AtomicUsize,
    tail: &AtomicUsize,
    cached_tail: &mut usize,
    slots: &[Slot<T>],
    value: T,
) -> Result<(), Full<T>> {
    let current = head.load(Ordering::Relaxed);
    let next = next_index(current, slots.len());
    debug_assert!(current < slots.len(), "head {} out of range", current);

    if next == *cached_tail {
        *cached_tail = tail.load(Ordering::Acquire);
        if next == *cached_tail {
            return Err(Full(value));
        }
    }

    // SAFETY: `current` is in bounds, and the consumer cannot reach it until
    // the head store below publishes it.
    unsafe { slots.get_unchecked(current).write(value) };

    head.store(next, Ordering::Release);
    Ok(())
}

/// Attempts to take the value at the consumer's tail.
///
/// Returns `None`, leaving every index untouched, when the ring is empty.
///
/// # Safety
///
/// - Only one thread ever calls this for a given `tail`, and it is the only
///   thread that stores to `tail` or touches `cached_head`.
/// - `head` is the producer index of the same ring, and `slots` is that
///   ring's storage with at least two slots.
/// - `head`, `tail` and `*cached_head` hold values below `slots.len()`.
#[inline]
pub unsafe fn dequeue<T: Copy>(
    tail: &AtomicUsize,
    head: &AtomicUsize,
    cached_head: &mut usize,
    slots: &[Slot<T>],
) -> Option<T> {
    let current = tail.load(Ordering::Relaxed);
    debug_assert!(current < slots.len(), "tail {} out of range", current);

    if current == *cached_head {
        *cached_head = head.load(Ordering::Acquire);
        if current == *cached_head {
            return None;
        }
    }

    // SAFETY: `current` is in bounds, and the acquire load of a head past it
    // (now or on an earlier call) makes the producer's write visible.
    let value = unsafe { slots.get_unchecked(current).read() };

    // Release orders the slot read before the producer's next overwrite of
    // this slot, which it performs after an acquire load of this store.
    tail.store(next_index(current, slots.len()), Ordering::Release);
    Some(value)
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use alloc::boxed::Box;

    struct Raw {
        head: AtomicUsize,
        tail: AtomicUsize,
        cached_tail: usize,
        cached_head: usize,
        slots: Box<[Slot<u32>]>,
    }

    impl Raw {
        fn new(capacity: usize) -> Self {
            Self {
                head: AtomicUsize::new(0),
                tail: AtomicUsize::new(0),
                cached_tail: 0,
                cached_head: 0,
                slots: (0..capacity).map(|_| Slot::empty()).collect(),
            }
        }

        fn push(&mut self, value: u32) -> Result<(), Full<u32>> {
            unsafe {
                enqueue(
                    &self.head,
                    &self.tail,
                    &mut self.cached_tail,
                    &self.slots,
                    value,
                )
            }
        }

        fn pop(&mut self) -> Option<u32> {
            unsafe { dequeue(&self.tail, &self.head, &mut self.cached_head, &self.slots) }
        }
    }

    #[test]
    fn full_leaves_indices_untouched() {
        let mut raw = Raw::new(3);
        raw.push(1).unwrap();
        raw.push(2).unwrap();

        assert_eq!(raw.push(3), Err(Full(3)));
        assert_eq!(raw.head.load(Ordering::Relaxed), 2);
        assert_eq!(raw.tail.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn empty_leaves_indices_untouched() {
        let mut raw = Raw::new(3);
        assert_eq!(raw.pop(), None);
        assert_eq!(raw.head.load(Ordering::Relaxed), 0);
        assert_eq!(raw.tail.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn producer_cache_refreshes_only_when_ring_looks_full() {
        let mut raw = Raw::new(4);
        for v in 0..3 {
            raw.push(v).unwrap();
        }
        assert_eq!(raw.pop(), Some(0));
        assert_eq!(raw.pop(), Some(1));

        // The consumer advanced, but the producer has not needed to look yet.
        assert_eq!(raw.cached_tail, 0);

        raw.push(3).unwrap();
        assert_eq!(raw.cached_tail, 2);
    }

    #[test]
    fn consumer_cache_refreshes_only_when_ring_looks_empty() {
        let mut raw = Raw::new(4);
        raw.push(7).unwrap();
        assert_eq!(raw.pop(), Some(7));
        assert_eq!(raw.cached_head, 1);

        raw.push(8).unwrap();
        raw.push(9).unwrap();
        assert_eq!(raw.pop(), Some(8));
        assert_eq!(raw.cached_head, 3);

        // Served from the cached head.
        assert_eq!(raw.pop(), Some(9));
        assert_eq!(raw.cached_head, 3);
        assert_eq!(raw.pop(), None);
    }
}
