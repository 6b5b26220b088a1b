//! Query error types
//!
//! Error codes:
//! - KQ_UNKNOWN_INDEX (REJECT)
//! - KQ_INVALID_QUERY (REJECT)
//! - KQ_INVALID_CONFIG (REJECT)
//! - KQ_NO_RUNTIME (REJECT)
//! - KQ_STORE_FAILURE (ERROR)
//! - KQ_TASK_FAILED (ERROR)
//!
//! Caller errors are rejected before any result is produced. Store failures
//! are surfaced verbatim on the originating request; nothing is retried.

use std::fmt;

use crate::store::StoreError;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller error, request rejected
    Reject,
    /// Store or runtime failure during evaluation
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Query references an index the store does not declare
    KqUnknownIndex,
    /// Malformed query (e.g. empty `one_of` list)
    KqInvalidQuery,
    /// Configuration could not be loaded
    KqInvalidConfig,
    /// Terminal operation issued outside a Tokio runtime
    KqNoRuntime,
    /// An asynchronous store call failed
    KqStoreFailure,
    /// The evaluation task panicked or was cancelled
    KqTaskFailed,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::KqUnknownIndex => "KQ_UNKNOWN_INDEX",
            QueryErrorCode::KqInvalidQuery => "KQ_INVALID_QUERY",
            QueryErrorCode::KqInvalidConfig => "KQ_INVALID_CONFIG",
            QueryErrorCode::KqNoRuntime => "KQ_NO_RUNTIME",
            QueryErrorCode::KqStoreFailure => "KQ_STORE_FAILURE",
            QueryErrorCode::KqTaskFailed => "KQ_TASK_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            QueryErrorCode::KqStoreFailure | QueryErrorCode::KqTaskFailed => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error type with full context
#[derive(Debug, Clone)]
pub struct QueryError {
    /// Error code
    code: QueryErrorCode,
    /// Human-readable message
    message: String,
    /// Index name if applicable
    index: Option<String>,
    /// Underlying store error
    source: Option<StoreError>,
}

impl QueryError {
    /// Create an unknown index error
    pub fn unknown_index(index: impl Into<String>) -> Self {
        let name = index.into();
        Self {
            code: QueryErrorCode::KqUnknownIndex,
            message: format!("Index '{}' does not exist", name),
            index: Some(name),
            source: None,
        }
    }

    /// Create an invalid query error
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::KqInvalidQuery,
            message: reason.into(),
            index: None,
            source: None,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::KqInvalidConfig,
            message: reason.into(),
            index: None,
            source: None,
        }
    }

    /// Create a missing runtime error
    pub fn no_runtime() -> Self {
        Self {
            code: QueryErrorCode::KqNoRuntime,
            message: "Terminal operations must be issued from within a Tokio runtime".into(),
            index: None,
            source: None,
        }
    }

    /// Create a task failure error
    pub fn task_failed(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::KqTaskFailed,
            message: reason.into(),
            index: None,
            source: None,
        }
    }

    /// Wrap a store error raised while working on `index` (if any).
    ///
    /// `StoreError::UnknownIndex` maps to `KQ_UNKNOWN_INDEX`; everything else
    /// is a store failure.
    pub fn from_store(index: Option<&str>, err: StoreError) -> Self {
        let code = match err {
            StoreError::UnknownIndex(_) => QueryErrorCode::KqUnknownIndex,
            _ => QueryErrorCode::KqStoreFailure,
        };
        Self {
            code,
            message: err.to_string(),
            index: index.map(str::to_string),
            source: Some(err),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the index name if applicable
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Returns the underlying store error, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        self.source.as_ref()
    }

    /// Returns true for caller errors
    pub fn is_rejection(&self) -> bool {
        self.severity() == Severity::Reject
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(index) = &self.index {
            write!(f, " (index '{}')", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
