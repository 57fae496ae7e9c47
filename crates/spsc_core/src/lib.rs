//! Bounded lock-free single-producer single-consumer queue.
//!
//! This crate moves fixed-width `Copy` handles (indices, pointers, small POD
//! values) from exactly one producer thread to exactly one consumer thread
//! without locks, system calls, or blocking. The ring storage is owned by the
//! caller; the two handles borrow it and each publishes one index with
//! release/acquire ordering. All modules are `no_std` so the queue can sit
//! between a capture core and a processing core in firmware as well as
//! between two host threads.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

/// Producer and consumer handles, and the initialization that binds them.
///
/// A `Producer` can only enqueue and a `Consumer` can only dequeue. Both are
/// created together from a mutable borrow of the storage, which makes a
/// second producer or consumer on the same ring unrepresentable.
pub mod handle;

/// Size and alignment queries for the handle types.
///
/// Used when handles are laid out by code outside the Rust type system and
/// the cache-line padding has to be reproduced exactly.
pub mod layout;

/// The enqueue/dequeue algorithm over raw index references.
///
/// This is the one implementation of the protocol. The safe handles and the
/// C ABI both call into it with their own notion of where the indices live.
pub mod protocol;

/// Caller-owned ring storage: slots plus the two published indices.
///
/// Each index sits on its own cache line so the producer's head publishes
/// never invalidate the line holding the consumer's tail.
pub mod ring;

/// Atomic types used by the protocol.
///
/// Resolves to `core::sync::atomic` normally and to loom's model-checked
/// atomics when built with `--cfg loom`.
pub mod sync;

pub use handle::{Consumer, Producer, init};
pub use ring::{RingStorage, Slot};

use core::fmt;

/// Errors raised while constructing queue storage.
///
/// Full and empty conditions are not errors; they are reported through
/// [`Full`] and `None` respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The requested capacity cannot hold any value.
    ///
    /// One slot is always left empty to tell a full ring from an empty one,
    /// so a capacity below two leaves no usable slot.
    CapacityTooSmall {
        /// The capacity that was requested.
        capacity: usize,
    },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::CapacityTooSmall { capacity } => write!(
                f,
                "ring capacity {} is below the minimum of {}",
                capacity,
                spsc_common::MIN_CAPACITY
            ),
        }
    }
}

impl core::error::Error for QueueError {}

/// Rejected enqueue: the ring had no free slot.
///
/// Carries the value back so a retry loop can resubmit it. This is the
/// normal backpressure signal, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ring buffer is full")
    }
}

impl<T: fmt::Debug> core::error::Error for Full<T> {}
