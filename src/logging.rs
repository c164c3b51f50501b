//! Log subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "loadrig=info,tower_http=info";

/// Installs a global `fmt` subscriber writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `loadrig=debug`
/// over [`DEFAULT_FILTER`]. Calling this twice is a no-op.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "loadrig=debug,tower_http=debug"
    } else {
        DEFAULT_FILTER
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
