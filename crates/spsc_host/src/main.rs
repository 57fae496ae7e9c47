mod layout;
mod stats;
mod stream;
mod stress;
mod sweep;
mod trace;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(about = "Stress, latency and layout harness for the SPSC queue")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move a counted sequence between two threads and verify it.
    Stress {
        #[arg(short = 'n', long, default_value_t = 1_000_000)]
        count: u64,
        #[arg(short, long, default_value_t = 1024)]
        capacity: usize,
    },
    /// Rate-limited producer, latency-recording consumer.
    Stream {
        #[arg(short, long, default_value_t = 1024)]
        capacity: usize,
        #[arg(short, long, default_value_t = 100_000, value_parser = clap::value_parser!(u64).range(1..))]
        freq: u64,
        #[arg(short, long, default_value_t = 10)]
        duration: u64,
    },
    /// Single-thread fill/drain cost across capacities.
    Sweep {
        #[arg(long, value_delimiter = ',', default_values_t = [2usize, 4, 16, 64, 256, 1024, 4096])]
        capacities: Vec<usize>,
        #[arg(short, long, default_value_t = 1_000)]
        rounds: usize,
    },
    /// Print handle sizes and alignments.
    Layout,
}

fn main() -> Result<()> {
    trace::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Stress { count, capacity } => {
            stress::run_stress(count, capacity)?.print();
        }
        Commands::Stream {
            capacity,
            freq,
            duration,
        } => {
            stream::run_stream(capacity, freq, duration)?;
        }
        Commands::Sweep { capacities, rounds } => {
            let rows = sweep::run_sweep(&capacities, rounds)?;
            sweep::print_sweep(&rows);
        }
        Commands::Layout => layout::print_layouts(),
    }
    Ok(())
}
