/*!
Logging setup for the command-line front-end.

Logs go to stderr so that `--json` output on stdout stays machine readable.
`RUST_LOG` always wins; otherwise the filter is `info`, or `debug` for this
workspace's crates when `--verbose` is given.
*/

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "info";
const VERBOSE_FILTER: &str = "info,track_surface_lib=debug,track_surface_cli=debug";

/// Install the global tracing subscriber
pub fn setup_logging(verbose: bool) {
    let default_filter = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    #[cfg(feature = "profiling")]
    tracing::info!("Profiling scopes enabled (emitted as tracing spans)");
}
