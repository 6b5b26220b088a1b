//! Observable events of the query layer
//!
//! Events are explicit and typed. Each event carries a fixed severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Requests
    /// Terminal operation issued
    RequestOpen,
    /// Request completed with a result
    RequestComplete,
    /// Request completed with a failure
    RequestFailed,

    // Evaluation
    /// Index range scan issued
    IndexScan,
    /// Evaluated key was absent from the store during `get_all`
    RecordMissing,

    // Cursors
    /// Cursor moved to its next key
    CursorAdvance,
    /// Cursor ran out of keys
    CursorExhausted,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RequestOpen => "REQUEST_OPEN",
            Event::RequestComplete => "REQUEST_COMPLETE",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::IndexScan => "INDEX_SCAN",
            Event::RecordMissing => "RECORD_MISSING",
            Event::CursorAdvance => "CURSOR_ADVANCE",
            Event::CursorExhausted => "CURSOR_EXHAUSTED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::IndexScan | Event::CursorAdvance | Event::RequestOpen => Severity::Trace,
            Event::RequestComplete | Event::CursorExhausted | Event::ConfigLoaded => {
                Severity::Info
            }
            Event::RecordMissing => Severity::Warn,
            Event::RequestFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
