use tracing_subscriber::{EnvFilter, fmt};

/// Install the global tracing subscriber used by the binaries.
///
/// Output goes to stderr so that stdout stays reserved for results. The
/// level defaults to `info` (`debug` when `verbose`) and can be overridden
/// through `RUST_LOG`.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second call keeps the first subscriber
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
