//! Diagnostic logging setup

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// `debug` turns on TRACE; otherwise `RUST_LOG` decides, defaulting to `warn`.
/// Calling this twice is harmless.
pub fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
