use tracing_subscriber::EnvFilter;

use crate::progress::SpinnerAwareStderr;

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
/// Lines printed while a spinner runs are written with the spinner suspended.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(|| SpinnerAwareStderr)
        .with_target(false)
        .try_init();
}
