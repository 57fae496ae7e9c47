//! Exhaustive interleaving checks of the hand-off protocol.
//!
//! Run with `RUSTFLAGS="--cfg loom" cargo test -p spsc_core --test loom --release`.

#![cfg(loom)]

use std::sync::Arc;

use loom::thread;
use spsc_core::protocol;
use spsc_core::ring::Slot;
use spsc_core::sync::{AtomicUsize, Ordering};

struct Shared {
    head: AtomicUsize,
    tail: AtomicUsize,
    slots: Box<[Slot<u32>]>,
}

impl Shared {
    fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            slots: (0..capacity).map(|_| Slot::empty()).collect(),
        })
    }
}

fn run(capacity: usize, count: u32) {
    loom::model(move || {
        let shared = Shared::new(capacity);

        let producer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let mut cached_tail = 0;
                for v in 0..count {
                    loop {
                        let sent = unsafe {
                            protocol::enqueue(
                                &shared.head,
                                &shared.tail,
                                &mut cached_tail,
                                &shared.slots,
                                v,
                            )
                        };
                        match sent {
                            Ok(()) => break,
                            Err(_) => thread::yield_now(),
                        }
                    }
                }
            })
        };

        let mut cached_head = 0;
        let mut expected = 0;
        while expected < count {
            let got = unsafe {
                protocol::dequeue(&shared.tail, &shared.head, &mut cached_head, &shared.slots)
            };
            match got {
                Some(v) => {
                    assert_eq!(v, expected);
                    expected += 1;
                }
                None => thread::yield_now(),
            }
        }

        producer.join().unwrap();
        assert_eq!(
            shared.head.load(Ordering::Relaxed),
            shared.tail.load(Ordering::Relaxed)
        );
    });
}

#[test]
fn fifo_across_wrap() {
    run(2, 3);
}

#[test]
fn fifo_with_spare_slots() {
    run(3, 3);
}

// The two tests below publish with `Relaxed` instead of `Release`. Loom has to
// flag the unsynchronized slot access each one produces, which shows the slot
// cells are tracked and that both publishes in `protocol` carry the edge.

#[test]
#[should_panic]
fn relaxed_head_publish_races_on_the_slot() {
    loom::model(|| {
        let shared = Shared::new(2);

        let producer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                unsafe { shared.slots[0].write(7) };
                shared.head.store(1, Ordering::Relaxed);
            })
        };

        if shared.head.load(Ordering::Acquire) == 1 {
            assert_eq!(unsafe { shared.slots[0].read() }, 7);
        }
        producer.join().unwrap();
    });
}

#[test]
#[should_panic]
fn relaxed_tail_publish_races_on_the_slot() {
    loom::model(|| {
        let shared = Shared::new(2);
        unsafe { shared.slots[0].write(7) };
        shared.head.store(1, Ordering::Release);

        let consumer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                if shared.head.load(Ordering::Acquire) == 1 {
                    let _ = unsafe { shared.slots[0].read() };
                    shared.tail.store(1, Ordering::Relaxed);
                }
            })
        };

        if shared.tail.load(Ordering::Acquire) == 1 {
            unsafe { shared.slots[0].write(8) };
        }
        consumer.join().unwrap();
    });
}

#[test]
fn fifo_reusing_every_slot() {
    run(3, 4);
}
