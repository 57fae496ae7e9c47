//! C ABI for the SPSC queue.
//!
//! Exposes the queue to C and C++ callers that allocate the handles
//! themselves. The handle structs keep the classic layout where each side
//! embeds its own published index and points at the peer's, so a caller can
//! place them anywhere (static storage, a shared arena, two separate heaps)
//! as long as it honours the size and alignment reported by the accessors.
//! The enqueue and dequeue paths call straight into
//! [`spsc_core::protocol`], so there is a single implementation of the
//! algorithm behind both the Rust and the C interfaces.
//!
//! The matching declarations live in `include/spsc_queue.h`.

use core::ffi::{c_int, c_void};
use core::ptr;
use core::slice;

use spsc_common::layout::HandleLayout;
use spsc_common::{CACHE_LINE_SIZE, MIN_CAPACITY, abi};
use spsc_core::protocol;
use spsc_core::ring::Slot;
use spsc_core::sync::AtomicUsize;

/// Producer handle as seen from C (`struct producer_q`).
///
/// Only the producer thread may touch it after initialization, except for
/// `head`, which the consumer reads through its `head_ptr`.
#[repr(C, align(64))]
pub struct ProducerQ {
    /// Next slot to write. Published with release ordering.
    head: AtomicUsize,

    /// The consumer's `tail` field.
    tail_ptr: *const AtomicUsize,

    /// Last tail value observed by the producer.
    cached_tail: usize,

    /// Number of slots in `buf`.
    cap: usize,

    /// Caller-owned array of `cap` pointer slots.
    buf: *const Slot<*mut c_void>,
}

/// Consumer handle as seen from C (`struct consumer_q`).
///
/// Only the consumer thread may touch it after initialization, except for
/// `tail`, which the producer reads through its `tail_ptr`.
#[repr(C, align(64))]
pub struct ConsumerQ {
    /// Next slot to read. Published with release ordering.
    tail: AtomicUsize,

    /// The producer's `head` field.
    head_ptr: *const AtomicUsize,

    /// Last head value observed by the consumer.
    cached_head: usize,

    /// Number of slots in `buf`.
    cap: usize,

    /// Caller-owned array of `cap` pointer slots.
    buf: *const Slot<*mut c_void>,
}

const _: () = assert!(core::mem::align_of::<ProducerQ>() == CACHE_LINE_SIZE);
const _: () = assert!(core::mem::align_of::<ConsumerQ>() == CACHE_LINE_SIZE);

/// Binds a producer and a consumer handle to a caller-provided buffer.
///
/// Writes both handles from scratch, so the memory behind `pq` and `cq` may
/// be uninitialized. Must run once, on one thread, before either side calls
/// `spsc_enqueue` or `spsc_dequeue`, and must not run again while either side
/// is still active.
///
/// # Arguments
///
/// * `pq` - Memory for the producer handle, sized and aligned per
///   `sizeof_producer_q` / `alignof_producer_q`
/// * `cq` - Memory for the consumer handle, sized and aligned per
///   `sizeof_consumer_q` / `alignof_consumer_q`
/// * `buf` - Array of `size` pointers, pointer-aligned
/// * `size` - Number of slots; the queue holds at most `size - 1` values
///
/// # Returns
///
/// `0` on success, or `-EINVAL` if a pointer is null or misaligned or
/// `size < 2`. Nothing is written when the call fails.
///
/// # Safety
///
/// `pq`, `cq` and `buf` must be valid for writes of their respective sizes
/// and must stay valid until both sides have stopped using the queue.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spsc_queue_init(
    pq: *mut ProducerQ,
    cq: *mut ConsumerQ,
    buf: *mut c_void,
    size: usize,
) -> c_int {
    let slots = buf.cast::<Slot<*mut c_void>>().cast_const();
    if pq.is_null()
        || cq.is_null()
        || slots.is_null()
        || !pq.is_aligned()
        || !cq.is_aligned()
        || !slots.is_aligned()
        || size < MIN_CAPACITY
    {
        return -abi::EINVAL;
    }

    // SAFETY: both handles are non-null, aligned and writable per the caller
    // contract. Raw borrows of the index fields do not read them.
    unsafe {
        pq.write(ProducerQ {
            head: AtomicUsize::new(0),
            tail_ptr: &raw const (*cq).tail,
            cached_tail: 0,
            cap: size,
            buf: slots,
        });
        cq.write(ConsumerQ {
            tail: AtomicUsize::new(0),
            head_ptr: &raw const (*pq).head,
            cached_head: 0,
            cap: size,
            buf: slots,
        });
    }
    abi::OK
}

/// Enqueues one pointer without blocking.
///
/// # Arguments
///
/// * `q` - Producer handle initialized by `spsc_queue_init`
/// * `data` - Value to hand to the consumer. NULL is accepted but cannot be
///   told apart from "empty" on the consumer side.
///
/// # Returns
///
/// `0` if the value was enqueued, or `-EAGAIN` if the queue was full.
///
/// # Safety
///
/// `q` must be initialized and used only from the producer thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spsc_enqueue(q: *mut ProducerQ, data: *mut c_void) -> c_int {
    // SAFETY: per the caller contract `q` is initialized and this thread is
    // the sole producer. Each field is borrowed separately so the consumer's
    // concurrent reads of `head` never alias a unique borrow.
    let sent = unsafe {
        let slots = slice::from_raw_parts((*q).buf, (*q).cap);
        let head = &(*q).head;
        let tail = &*(*q).tail_ptr;
        let cached_tail = &mut *(&raw mut (*q).cached_tail);
        protocol::enqueue(head, tail, cached_tail, slots, data)
    };
    match sent {
        Ok(()) => abi::OK,
        Err(_) => -abi::EAGAIN,
    }
}

/// Dequeues one pointer without blocking.
///
/// # Arguments
///
/// * `q` - Consumer handle initialized by `spsc_queue_init`
///
/// # Returns
///
/// The oldest enqueued pointer, or NULL if the queue was empty.
///
/// # Safety
///
/// `q` must be initialized and used only from the consumer thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn spsc_dequeue(q: *mut ConsumerQ) -> *mut c_void {
    // SAFETY: mirror of `spsc_enqueue`.
    let taken = unsafe {
        let slots = slice::from_raw_parts((*q).buf, (*q).cap);
        let tail = &(*q).tail;
        let head = &*(*q).head_ptr;
        let cached_head = &mut *(&raw mut (*q).cached_head);
        protocol::dequeue(tail, head, cached_head, slots)
    };
    taken.unwrap_or(ptr::null_mut())
}

/// Byte size of `struct producer_q`, padding included.
#[unsafe(no_mangle)]
pub extern "C" fn sizeof_producer_q() -> usize {
    HandleLayout::of::<ProducerQ>().size
}

/// Required alignment of `struct producer_q`.
#[unsafe(no_mangle)]
pub extern "C" fn alignof_producer_q() -> usize {
    HandleLayout::of::<ProducerQ>().align
}

/// Byte size of `struct consumer_q`, padding included.
#[unsafe(no_mangle)]
pub extern "C" fn sizeof_consumer_q() -> usize {
    HandleLayout::of::<ConsumerQ>().size
}

/// Required alignment of `struct consumer_q`.
#[unsafe(no_mangle)]
pub extern "C" fn alignof_consumer_q() -> usize {
    HandleLayout::of::<ConsumerQ>().align
}
