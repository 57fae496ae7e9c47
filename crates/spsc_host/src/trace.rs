//! Tracing setup for the host harness.
//!
//! Diagnostics go through `tracing` to stderr; measurement reports are
//! printed to stdout so they can be piped without log noise.

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` when set and defaults to
/// `spsc_host=info` otherwise.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spsc_host=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .init();
}
