#![cfg(not(loom))]

use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use spsc_core::{Full, RingStorage, init};

fn send_all<T: Copy + Send + Sync>(values: &[T], capacity: usize) -> Vec<T> {
    let mut storage = RingStorage::<T>::new(capacity).unwrap();
    let (mut producer, mut consumer) = init(&mut storage);

    thread::scope(|s| {
        s.spawn(move || {
            for &v in values {
                let mut item = v;
                while let Err(Full(back)) = producer.enqueue(item) {
                    item = back;
                    thread::yield_now();
                }
            }
        });

        let received = s.spawn(move || {
            let mut out = Vec::with_capacity(values.len());
            while out.len() < values.len() {
                match consumer.dequeue() {
                    Some(v) => out.push(v),
                    None => thread::yield_now(),
                }
            }
            out
        });

        received.join().unwrap()
    })
}

#[test]
fn million_values_arrive_once_and_in_order() {
    const COUNT: u64 = 1_000_000;
    let values: Vec<u64> = (0..COUNT).collect();

    let received = send_all(&values, 1024);

    assert_eq!(received.len(), values.len());
    for (i, &v) in received.iter().enumerate() {
        assert_eq!(v, i as u64, "FIFO violation at index {}", i);
    }
}

#[test]
fn smallest_ring_still_delivers_everything() {
    let values: Vec<u64> = (0..50_000).collect();
    assert_eq!(send_all(&values, 2), values);
}

#[test]
fn random_payloads_are_bit_identical() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let values: Vec<u64> = (0..200_000).map(|_| rng.next_u64()).collect();
    let capacity = rng.gen_range(2..64);

    assert_eq!(send_all(&values, capacity), values);
}

#[test]
fn pointer_sized_handles_survive_the_hand_off() {
    let boxes: Vec<Box<u64>> = (0..10_000u64).map(|i| Box::new(i * 3)).collect();
    let addrs: Vec<usize> = boxes.iter().map(|b| &**b as *const u64 as usize).collect();

    let received = send_all(&addrs, 16);

    assert_eq!(received, addrs);
    for (i, &addr) in received.iter().enumerate() {
        let value = unsafe { *(addr as *const u64) };
        assert_eq!(value, i as u64 * 3);
    }
}

#[test]
fn randomized_capacities_hold_their_bound() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..32 {
        let capacity = rng.gen_range(2..200);
        let mut storage = RingStorage::<usize>::new(capacity).unwrap();
        let (mut producer, mut consumer) = init(&mut storage);

        let mut accepted = 0;
        while producer.enqueue(accepted).is_ok() {
            accepted += 1;
        }
        assert_eq!(accepted, capacity - 1);

        assert_eq!(consumer.dequeue(), Some(0));
        assert!(producer.enqueue(accepted).is_ok());
        assert!(producer.enqueue(accepted + 1).is_err());
    }
}
