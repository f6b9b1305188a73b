//! Logging setup.
//!
//! Graph construction logs through `tracing`. Binaries and tests that want to
//! see those events call [`init_logging`] once; the filter is read from the
//! `OPGRAPH_LOG` env var using `EnvFilter` syntax, e.g.
//! `OPGRAPH_LOG="streamweave_opgraph=debug,warn"`.

use tracing_subscriber::EnvFilter;

/// Env var holding the log filter directives.
pub const LOG_ENV_VAR: &str = "OPGRAPH_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Error returned when a global subscriber is already installed.
pub type LoggingError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Installs a stdout `fmt` subscriber as the global default.
pub fn init_logging() -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn second_install_is_rejected() {
        let _ = init_logging();
        assert!(init_logging().is_err());
    }
}
