use tracing_subscriber::{EnvFilter, fmt};

use crate::utils::consts::LOG_LEVEL;

/// Level for a `-v` count: none keeps the default, then debug, then trace
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => LOG_LEVEL,
        1 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_for_verbosity(verbose)))
        .unwrap_or_else(|_| EnvFilter::new(LOG_LEVEL));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}
