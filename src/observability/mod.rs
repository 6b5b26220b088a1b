//! Observability for the query layer
//!
//! Structured JSON logging of request lifecycle, index scans and cursor
//! steps.
//!
//! # Principles
//!
//! - Logging never changes evaluation results
//! - Output is deterministic for identical events
//!
//! # Usage
//!
//! ```ignore
//! use keyquery::observability::{log_event, Event, Severity};
//!
//! log_event(Severity::Trace, Event::IndexScan, &[("index", "make")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{LogLine, Logger, Severity};

/// Log `event` if its severity reaches `threshold`
pub fn log_event(threshold: Severity, event: Event, fields: &[(&str, &str)]) {
    let severity = event.severity();
    if severity >= threshold {
        Logger::emit(&LogLine::new(severity, event.as_str(), fields));
    }
}
