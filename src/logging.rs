//! Diagnostic logging setup.
//!
//! Installs a global tracing subscriber writing to stderr. The `FINV_LOG`
//! environment variable takes any `EnvFilter` directive and overrides the
//! level derived from the command-line flags.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::output::Verbosity;

/// Environment variable holding a filter directive such as `fileinventory=debug`.
pub const LOG_ENV: &str = "FINV_LOG";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Another subscriber was installed first.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Default filter level for a verbosity setting.
#[must_use]
pub const fn default_level(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "info",
    }
}

/// Initialize tracing once per process. Later calls are no-ops.
///
/// # Errors
///
/// Returns an error if a different global subscriber is already set.
pub fn init(verbosity: Verbosity) -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let subscriber = Registry::default()
        .with(build_env_filter(verbosity))
        .with(layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = INSTALLED.set(());
    Ok(())
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_levels() {
        assert_eq!(default_level(Verbosity::Quiet), "error");
        assert_eq!(default_level(Verbosity::Normal), "warn");
        assert_eq!(default_level(Verbosity::Verbose), "info");
    }
}
