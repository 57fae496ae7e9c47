use crate::stats::LatencyStats;
use anyhow::{Context, Result, anyhow};
use spsc_core::RingStorage;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counters shared between the worker threads and the reporting loop.
#[derive(Default)]
pub struct StreamStats {
    pub processed: AtomicU64,
    pub generated: AtomicU64,
    pub dropped: AtomicU64,
    pub latency_ns: AtomicU64,
}

/// Streams timestamps through the queue at a fixed rate.
///
/// The producer stamps each value with the nanoseconds elapsed since a shared
/// origin and enqueues it once per interval, counting a drop whenever the
/// ring is full. The consumer polls continuously and records how long each
/// value sat in the ring. One status line is printed per second, and the
/// latency histogram at the end.
///
/// # Arguments
///
/// * `capacity` - Ring capacity in slots
/// * `freq` - Target enqueue rate in values per second (non-zero)
/// * `duration_secs` - How long to run
pub fn run_stream(capacity: usize, freq: u64, duration_secs: u64) -> Result<()> {
    println!("SPSC STREAMING");
    println!("Capacity: {}", capacity);
    println!("Target Freq: {} Hz", freq);
    println!("Duration: {} s", duration_secs);
    println!("-------------------------------");

    let mut storage = RingStorage::<u64>::new(capacity)
        .with_context(|| format!("allocating a ring of {} slots", capacity))?;
    let (mut producer, mut consumer) = storage.split();

    let running = AtomicBool::new(true);
    let stats = StreamStats::default();
    let origin = Instant::now();
    let interval = Duration::from_nanos(1_000_000_000 / freq.max(1));
    info!(capacity, freq, duration_secs, "stream starting");

    let latency = thread::scope(|s| {
        let running = &running;
        let stats = &stats;

        let cons = s.spawn(move || {
            let mut lat_stats = LatencyStats::new();
            while running.load(Ordering::Relaxed) {
                if let Some(stamp) = consumer.dequeue() {
                    let now = origin.elapsed().as_nanos() as u64;
                    let lat_ns = now.saturating_sub(stamp);
                    stats.processed.fetch_add(1, Ordering::Relaxed);
                    stats.latency_ns.store(lat_ns, Ordering::Relaxed);
                    lat_stats.update(lat_ns);
                } else {
                    thread::yield_now();
                }
            }
            lat_stats
        });

        let prod = s.spawn(move || {
            while running.load(Ordering::Relaxed) {
                let start = Instant::now();
                let stamp = origin.elapsed().as_nanos() as u64;

                if producer.enqueue(stamp).is_ok() {
                    stats.generated.fetch_add(1, Ordering::Relaxed);
                } else {
                    stats.dropped.fetch_add(1, Ordering::Relaxed);
                }

                while start.elapsed() < interval && running.load(Ordering::Relaxed) {
                    std::hint::spin_loop();
                }
            }
        });

        let mut last_processed = 0;
        while origin.elapsed().as_secs() < duration_secs {
            thread::sleep(Duration::from_secs(1));
            let recv = stats.processed.load(Ordering::Relaxed);
            let sent = stats.generated.load(Ordering::Relaxed);
            let dropped = stats.dropped.load(Ordering::Relaxed);
            let lat = stats.latency_ns.load(Ordering::Relaxed);

            let tput = recv - last_processed;
            last_processed = recv;

            println!(
                "T={:2}s | Sent: {:9} | Recv: {:9} ({:8}/s) | Drop: {:6} | Latency: {:6} ns",
                origin.elapsed().as_secs(),
                sent,
                recv,
                tput,
                dropped,
                lat
            );
        }

        running.store(false, Ordering::Relaxed);
        prod.join().map_err(|_| anyhow!("producer thread panicked"))?;
        cons.join().map_err(|_| anyhow!("consumer thread panicked"))
    })?;

    let dropped = stats.dropped.load(Ordering::Relaxed);
    if dropped > 0 {
        warn!(dropped, "producer outran the consumer");
    }
    latency.print_report();

    println!("Done.");
    Ok(())
}
