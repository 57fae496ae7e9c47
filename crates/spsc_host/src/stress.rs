use crate::verify::{SequenceChecker, VerifyError};
use anyhow::{Context, Result, anyhow};
use spsc_core::{Full, RingStorage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long the consumer may see an empty ring without progress before the
/// run is declared stalled.
const STALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Empty polls between two stall-clock checks.
const STALL_CHECK_INTERVAL: u64 = 4096;

pub struct StressReport {
    pub count: u64,
    pub capacity: usize,
    pub elapsed: Duration,
    pub full_spins: u64,
    pub empty_spins: u64,
}

impl StressReport {
    pub fn throughput(&self) -> f64 {
        self.count as f64 / self.elapsed.as_secs_f64()
    }

    pub fn print(&self) {
        println!("Results");
        println!("Transferred: {} values", self.count);
        println!("Capacity:    {} slots", self.capacity);
        println!("Time:        {:.4} s", self.elapsed.as_secs_f64());
        println!("Throughput:  {:.2} Mvalues/s", self.throughput() / 1e6);
        println!("Full spins:  {}", self.full_spins);
        println!("Empty spins: {}", self.empty_spins);
    }
}

/// Moves `0..count` from a producer thread to a consumer thread and checks
/// that every value arrives exactly once and in order.
///
/// # Errors
///
/// Fails if the ring cannot be allocated, a thread panics, or the consumer
/// observes a [`VerifyError`].
pub fn run_stress(count: u64, capacity: usize) -> Result<StressReport> {
    let mut storage = RingStorage::<u64>::new(capacity)
        .with_context(|| format!("allocating a ring of {} slots", capacity))?;
    let (mut producer, mut consumer) = storage.split();
    let abort = AtomicBool::new(false);

    info!(count, capacity, "stress run starting");
    let start = Instant::now();

    let (full_spins, consumed) = thread::scope(|s| {
        let abort = &abort;

        let prod = thread::Builder::new()
            .name("producer".into())
            .spawn_scoped(s, move || {
                let mut spins = 0u64;
                for v in 0..count {
                    let mut item = v;
                    while let Err(Full(back)) = producer.enqueue(item) {
                        if abort.load(Ordering::Relaxed) {
                            return spins;
                        }
                        item = back;
                        spins += 1;
                        thread::yield_now();
                    }
                }
                spins
            })?;

        let cons = thread::Builder::new()
            .name("consumer".into())
            .spawn_scoped(s, move || {
                let mut checker = SequenceChecker::new();
                let mut spins = 0u64;
                let mut last_progress = Instant::now();

                while checker.received() < count {
                    match consumer.dequeue() {
                        Some(v) => {
                            checker.observe(v);
                            last_progress = Instant::now();
                        }
                        None => {
                            spins += 1;
                            if spins % STALL_CHECK_INTERVAL == 0
                                && last_progress.elapsed() > STALL_TIMEOUT
                            {
                                abort.store(true, Ordering::Relaxed);
                                return Err(VerifyError::Stalled {
                                    received: checker.received(),
                                    expected: count,
                                });
                            }
                            thread::yield_now();
                        }
                    }
                }
                checker.finish().map(|_| spins)
            })
            .inspect_err(|_| abort.store(true, Ordering::Relaxed))?;

        let consumed = cons
            .join()
            .map_err(|_| anyhow!("consumer thread panicked"))?;
        if consumed.is_err() {
            abort.store(true, Ordering::Relaxed);
        }
        let full_spins = prod
            .join()
            .map_err(|_| anyhow!("producer thread panicked"))?;
        Ok::<_, anyhow::Error>((full_spins, consumed))
    })?;

    let elapsed = start.elapsed();
    let empty_spins = consumed.inspect_err(|err| warn!(%err, "verification failed"))?;
    debug!(full_spins, empty_spins, "spin counters");

    Ok(StressReport {
        count,
        capacity,
        elapsed,
        full_spins,
        empty_spins,
    })
}
