//! Logging init for the command-line tool.
//!
//! Logs go to stderr so stdout only carries the run summary and the source
//! list. `RUST_LOG` overrides the level picked from `--verbose`.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity setting.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug,hyper=info,reqwest=info,html5ever=info,selectors=info"
    } else {
        "info"
    }
}

/// Install the global `tracing` subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
