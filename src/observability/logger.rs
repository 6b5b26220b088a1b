//! JSON line rendering for query events
//!
//! Each emitted event becomes exactly one line. Field order is fixed
//! (event, severity, sorted fields) so identical events render identically.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log severity levels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Per-call detail (store calls, cursor steps)
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Unexpected but tolerated conditions
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Severity::Trace),
            "INFO" => Ok(Severity::Info),
            "WARN" | "WARNING" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// One rendered log record.
///
/// Renders as a single JSON object on one line: `event`, then `severity`,
/// then the fields sorted by key. Keys and values are escaped with
/// `serde_json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine<'a> {
    severity: Severity,
    event: &'a str,
    fields: Vec<(&'a str, &'a str)>,
}

impl<'a> LogLine<'a> {
    pub fn new(severity: Severity, event: &'a str, fields: &[(&'a str, &'a str)]) -> Self {
        let mut fields = fields.to_vec();
        fields.sort_by_key(|(key, _)| *key);
        Self {
            severity,
            event,
            fields,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// JSON text of the line, newline terminated
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(64 + self.fields.len() * 32);
        out.push_str("{\"event\":");
        push_json_str(&mut out, self.event);
        out.push_str(",\"severity\":");
        push_json_str(&mut out, self.severity.as_str());
        for (key, value) in &self.fields {
            out.push(',');
            push_json_str(&mut out, key);
            out.push(':');
            push_json_str(&mut out, value);
        }
        out.push_str("}\n");
        out
    }

    /// Write the line with a single `write_all`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()
    }
}

fn push_json_str(out: &mut String, s: &str) {
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str("\"\""),
    }
}

/// Synchronous sink for [`LogLine`]s: `ERROR` to stderr, the rest to stdout
pub struct Logger;

impl Logger {
    pub fn emit(line: &LogLine<'_>) {
        // Logging never fails the operation being logged
        let _ = if line.severity() >= Severity::Error {
            line.write_to(&mut io::stderr().lock())
        } else {
            line.write_to(&mut io::stdout().lock())
        };
    }
}
