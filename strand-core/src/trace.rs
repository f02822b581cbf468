//! Tracing bootstrap.
//!
//! The strand crates log through the `tracing` facade and never install a
//! subscriber themselves. Binaries and tests that want output can call
//! [`init_tracing`] with the `subscriber` feature enabled; without the
//! feature it does nothing.

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `strand=debug`).
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strand=debug"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

/// Installs nothing; enable the `subscriber` feature for output.
#[cfg(not(feature = "subscriber"))]
pub const fn init_tracing() {}
