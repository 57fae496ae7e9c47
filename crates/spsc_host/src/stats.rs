//! Hand-off latency statistics.
//!
//! Collects the time between a value being stamped by the producer and the
//! consumer taking it out of the ring, and prints a summary with a coarse
//! histogram.

/// Width of one histogram bucket in nanoseconds.
const BUCKET_NS: u64 = 100;

/// Number of histogram buckets; the last one collects everything above.
const BUCKETS: usize = 20;

/// Running latency summary with constant-time updates.
///
/// Keeps min, max, sum and count plus a fixed histogram, so the consumer
/// thread can record every sample without allocating.
pub struct LatencyStats {
    pub min: u64,
    pub max: u64,
    pub sum: u64,
    pub count: u64,
    pub buckets: [u64; BUCKETS],
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyStats {
    /// Creates an empty tracker. `min` starts at `u64::MAX` so the first
    /// sample replaces it.
    pub fn new() -> Self {
        Self {
            min: u64::MAX,
            max: 0,
            sum: 0,
            count: 0,
            buckets: [0; BUCKETS],
        }
    }

    /// Records one latency sample.
    ///
    /// # Arguments
    ///
    /// * `nanos` - Latency in nanoseconds
    pub fn update(&mut self, nanos: u64) {
        if nanos < self.min {
            self.min = nanos;
        }
        if nanos > self.max {
            self.max = nanos;
        }
        self.sum = self.sum.saturating_add(nanos);
        self.count += 1;

        let idx = (nanos / BUCKET_NS).min(BUCKETS as u64 - 1) as usize;
        self.buckets[idx] += 1;
    }

    /// Mean latency in nanoseconds, or 0.0 before any sample.
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    /// Prints count, min, mean, max and the non-empty histogram buckets.
    pub fn print_report(&self) {
        println!("\nHand-off Latency");
        println!("Count: {}", self.count);
        if self.count == 0 {
            return;
        }

        let avg_ns = self.avg();
        if avg_ns < 1000.0 {
            println!("Min:   {:.2} ns", self.min as f64);
            println!("Avg:   {:.2} ns", avg_ns);
            println!("Max:   {:.2} ns", self.max as f64);
        } else {
            println!("Min:   {:.2} us", self.min as f64 / 1000.0);
            println!("Avg:   {:.2} us", avg_ns / 1000.0);
            println!("Max:   {:.2} us", self.max as f64 / 1000.0);
        }

        println!("Distribution ({}ns buckets):", BUCKET_NS);
        for (i, &count) in self.buckets.iter().enumerate() {
            if count > 0 {
                let lower = i as u64 * BUCKET_NS;
                if i == BUCKETS - 1 {
                    println!("[{:5}+      ns]: {}", lower, count);
                } else {
                    println!("[{:5}-{:5} ns]: {}", lower, lower + BUCKET_NS, count);
                }
            }
        }
    }
}
