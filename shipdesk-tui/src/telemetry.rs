//! File logging. The terminal belongs to the UI, so every event goes to a
//! JSON-lines log file instead of stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Env var holding an `EnvFilter` directive. Overrides the config value.
pub const LOG_ENV: &str = "SHIPDESK_LOG";

const DEFAULT_FILTER: &str = "shipdesk_tui=info,shipdesk_core=info,warn";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid log filter '{0}'")]
    Filter(String),
    #[error("Logging already initialized: {0}")]
    Init(String),
}

/// Build the filter from `SHIPDESK_LOG`, then `configured`, then the default.
/// A variable that is set but does not parse is an error, not a fallback.
pub fn build_filter(configured: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    match std::env::var(LOG_ENV) {
        Ok(directive) => parse_filter(Some(&directive), configured),
        Err(std::env::VarError::NotPresent) => parse_filter(None, configured),
        Err(std::env::VarError::NotUnicode(raw)) => {
            Err(TelemetryError::Filter(raw.to_string_lossy().into_owned()))
        }
    }
}

fn parse_filter(env: Option<&str>, configured: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    let directive = env
        .filter(|value| !value.trim().is_empty())
        .or(configured)
        .unwrap_or(DEFAULT_FILTER);
    EnvFilter::try_new(directive).map_err(|_| TelemetryError::Filter(directive.to_string()))
}

pub fn init_logging(path: &Path, configured: Option<&str>) -> Result<(), TelemetryError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TelemetryError::Open {
            path: path.display().to_string(),
            source,
        })?;
    let filter = build_filter(configured)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directive() {
        assert!(matches!(
            parse_filter(None, Some("shipdesk_tui=loud")),
            Err(TelemetryError::Filter(_))
        ));
        assert!(parse_filter(None, None).is_ok());
    }

    #[test]
    fn malformed_env_directive_is_an_error() {
        let result = parse_filter(Some("shipdesk_tui=loud"), Some("info"));
        assert!(matches!(result, Err(TelemetryError::Filter(d)) if d == "shipdesk_tui=loud"));
    }

    #[test]
    fn env_directive_wins_over_config() {
        assert!(parse_filter(Some("debug"), Some("shipdesk_tui=loud")).is_ok());
        assert!(parse_filter(Some("  "), Some("info")).is_ok());
    }
}
