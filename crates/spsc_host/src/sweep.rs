use anyhow::{Context, Result, ensure};
use rayon::prelude::*;
use spsc_core::RingStorage;
use std::hint::black_box;
use std::time::Instant;
use tracing::debug;

pub struct SweepRow {
    pub capacity: usize,
    pub ops: u64,
    pub ns_per_op: f64,
}

/// Measures single-thread enqueue/dequeue cost for each capacity.
///
/// Each capacity gets its own ring and runs on its own rayon worker: `rounds`
/// times the ring is filled until it reports full and then drained until it
/// reports empty. Every fill must accept exactly `capacity - 1` values and
/// every drain must return them, so the sweep doubles as a bound check
/// across capacities.
pub fn run_sweep(capacities: &[usize], rounds: usize) -> Result<Vec<SweepRow>> {
    capacities
        .par_iter()
        .map(|&capacity| measure(capacity, rounds))
        .collect()
}

fn measure(capacity: usize, rounds: usize) -> Result<SweepRow> {
    let mut storage = RingStorage::<usize>::new(capacity)
        .with_context(|| format!("allocating a ring of {} slots", capacity))?;
    let (mut producer, mut consumer) = storage.split();
    let usable = capacity - 1;
    let mut ops = 0u64;

    let start = Instant::now();
    for round in 0..rounds {
        let mut accepted = 0;
        while producer.enqueue(black_box(round ^ accepted)).is_ok() {
            accepted += 1;
        }
        ensure!(
            accepted == usable,
            "capacity {}: fill accepted {} values, expected {}",
            capacity,
            accepted,
            usable
        );

        let mut drained = 0;
        while let Some(v) = consumer.dequeue() {
            black_box(v);
            drained += 1;
        }
        ensure!(
            drained == accepted,
            "capacity {}: drained {} of {} values",
            capacity,
            drained,
            accepted
        );
        ops += (accepted + drained) as u64;
    }
    let elapsed = start.elapsed();
    debug!(capacity, ops, ?elapsed, "sweep point done");

    let ns_per_op = if ops == 0 {
        0.0
    } else {
        elapsed.as_nanos() as f64 / ops as f64
    };
    Ok(SweepRow {
        capacity,
        ops,
        ns_per_op,
    })
}

pub fn print_sweep(rows: &[SweepRow]) {
    println!("{:>10} | {:>12} | {:>8}", "capacity", "ops", "ns/op");
    println!("-----------+--------------+---------");
    for row in rows {
        println!(
            "{:>10} | {:>12} | {:>8.2}",
            row.capacity, row.ops, row.ns_per_op
        );
    }
}
