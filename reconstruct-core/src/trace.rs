// RECONSTRUCT_LOG / RECONSTRUCT_TRACE gated logging (stderr only)

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "RECONSTRUCT_LOG";
pub const TRACE_ENV: &str = "RECONSTRUCT_TRACE";

/// Filter directive used when `RECONSTRUCT_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose || std::env::var_os(TRACE_ENV).is_some() {
        "trace"
    } else {
        "warn"
    }
}

/// Install the stderr subscriber. A second call in the same process is a
/// no-op, so tests and both binaries may call it freely.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = Registry::default().with(filter).with(layer).try_init();
}
