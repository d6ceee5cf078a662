//! # Workflow Error Type
//!
//! The failure half of every command result.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Veranda                                │
//! │                                                                         │
//! │  Caller (UI / reporting layer)       Workflow Engine                    │
//! │  ─────────────────────────────       ───────────────                    │
//! │                                                                         │
//! │  check_out(booking_id)                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<BookingView, WorkflowError>                              │  │
//! │  │         │                                                        │  │
//! │  │  Validation error?  ── before the transaction ── VALIDATION ───►│  │
//! │  │  Wrong state/room?  ── zero writes ───────────── PRECONDITION ─►│  │
//! │  │  Lost the race?     ── rolled back ───────────── CONFLICT ─────►│  │
//! │  │  Store failure?     ── rolled back ───────────── PERSISTENCE ──►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The kind is stable for programmatic handling; the message is for      │
//! │  humans. This engine never renders display text itself.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All four kinds mean the unit of work was rolled back in full before the
//! error was returned. `Conflict` additionally means "re-query and retry".

use serde::Serialize;
use ts_rs::TS;

use crate::error::DbError;
use veranda_core::{CoreError, ValidationError};

/// Error returned from workflow commands.
///
/// ## Serialization
/// This is what a caller receives when a command fails:
/// ```json
/// {
///   "kind": "PRECONDITION_FAILED",
///   "message": "room room-17 is not bookable: cleaning status is Dirty"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct WorkflowError {
    /// Machine-readable error kind for programmatic handling
    pub kind: ErrorKind,

    /// Human-readable error message for display
    pub message: String,
}

/// Stable error kinds for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorKind {
    /// Malformed or missing input; rejected before touching the store.
    ValidationError,

    /// Target room/rate not eligible, or booking not in the required
    /// source state for the requested transition. Zero writes occurred.
    PreconditionFailed,

    /// Another caller won the race; re-query and retry.
    ConcurrencyConflict,

    /// Underlying store failure; transaction rolled back.
    PersistenceError,
}

impl WorkflowError {
    /// Creates a new workflow error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        WorkflowError {
            kind,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::new(ErrorKind::ValidationError, message)
    }

    /// Creates a precondition failure.
    pub fn precondition(message: impl Into<String>) -> Self {
        WorkflowError::new(ErrorKind::PreconditionFailed, message)
    }

    /// Creates a concurrency conflict.
    pub fn conflict(message: impl Into<String>) -> Self {
        WorkflowError::new(ErrorKind::ConcurrencyConflict, message)
    }

    /// Creates a persistence error with a generic message.
    pub fn persistence(message: impl Into<String>) -> Self {
        WorkflowError::new(ErrorKind::PersistenceError, message)
    }
}

/// Converts database errors to workflow errors.
impl From<DbError> for WorkflowError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                WorkflowError::precondition(format!("{} not found: {}", entity, id))
            }
            DbError::Conflict { entity, id } => WorkflowError::conflict(format!(
                "{} {} was changed by a concurrent operation",
                entity, id
            )),
            DbError::UniqueViolation { field, value } => {
                WorkflowError::validation(format!("{} '{}' already exists", field, value))
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "persistence failure in workflow");
                WorkflowError::persistence("database operation failed")
            }
        }
    }
}

/// Converts raw sqlx errors (begin/commit) through the DbError mapping.
impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::from(DbError::from(err))
    }
}

/// Converts core errors to workflow errors.
impl From<CoreError> for WorkflowError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => WorkflowError::validation(e.to_string()),
            other => WorkflowError::precondition(other.to_string()),
        }
    }
}

impl From<ValidationError> for WorkflowError {
    fn from(err: ValidationError) -> Self {
        WorkflowError::validation(err.to_string())
    }
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for WorkflowError {}

/// Result type for workflow commands.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_is_precondition() {
        let err = WorkflowError::from(DbError::not_found("Room", "room-1"));
        assert_eq!(err.kind, ErrorKind::PreconditionFailed);
        assert!(err.message.contains("room-1"));
    }

    #[test]
    fn test_db_conflict_is_conflict() {
        let err = WorkflowError::from(DbError::conflict("Booking", "b-1"));
        assert_eq!(err.kind, ErrorKind::ConcurrencyConflict);
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = WorkflowError::from(DbError::Internal("disk on fire".to_string()));
        assert_eq!(err.kind, ErrorKind::PersistenceError);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::ConcurrencyConflict).unwrap();
        assert_eq!(json, "\"CONCURRENCY_CONFLICT\"");
    }
}
