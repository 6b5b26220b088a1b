//! Query configuration
//!
//! Loaded from a JSON file, from the environment, or built in code.
//! Missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event, Event, Severity};
use crate::query::{QueryError, QueryResult};

/// Environment variable overriding `log_severity`
pub const LOG_SEVERITY_ENV: &str = "KEYQUERY_LOG_SEVERITY";

/// Configuration attached to a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Minimum severity of emitted log events (default: WARN)
    #[serde(default = "default_log_severity")]
    pub log_severity: Severity,

    /// Check every referenced index against the store before evaluation
    /// starts, failing the request immediately on unknown names
    /// (default: true)
    #[serde(default = "default_validate_indexes")]
    pub validate_indexes: bool,
}

fn default_log_severity() -> Severity {
    Severity::Warn
}

fn default_validate_indexes() -> bool {
    true
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            log_severity: default_log_severity(),
            validate_indexes: default_validate_indexes(),
        }
    }
}

impl QueryConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(content: &str) -> QueryResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| QueryError::invalid_config(format!("Invalid config: {}", e)))
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            QueryError::invalid_config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json(&content)?;
        let shown = path.display().to_string();
        config.log(Event::ConfigLoaded, &[("path", shown.as_str())]);
        Ok(config)
    }

    /// Defaults, with `log_severity` taken from `KEYQUERY_LOG_SEVERITY`
    /// when set
    pub fn from_env() -> QueryResult<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(LOG_SEVERITY_ENV) {
            config.log_severity = raw.parse().map_err(|e: String| {
                QueryError::invalid_config(format!("{}: {}", LOG_SEVERITY_ENV, e))
            })?;
        }
        Ok(config)
    }

    /// Create a config logging at `severity` and above
    pub fn with_log_severity(severity: Severity) -> Self {
        Self {
            log_severity: severity,
            ..Default::default()
        }
    }

    /// Log `event` if this config's threshold allows it
    pub(crate) fn log(&self, event: Event, fields: &[(&str, &str)]) {
        log_event(self.log_severity, event, fields);
    }
}
