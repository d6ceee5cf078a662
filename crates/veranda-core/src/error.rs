//! # Error Types
//!
//! Domain-specific error types for veranda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  veranda-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  veranda-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── WorkflowError    - What command callers see (kind + message)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → WorkflowError → caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (booking id, status, ...)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a stable caller-facing kind

use thiserror::Error;

use crate::status::InvalidTransition;
use crate::types::BookingStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. The workflow engine
/// translates them to a stable error kind before they reach a caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The booking lifecycle does not allow the requested move.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// A booking is not in the required source state for an operation.
    ///
    /// ## When This Occurs
    /// - Assigning a room to a pending or declined booking
    /// - Checking out a booking that is not checked in
    /// - Cancelling an already-terminal booking
    #[error("booking {booking_id} is {current:?}, cannot {operation}")]
    BookingNotActionable {
        booking_id: String,
        current: BookingStatus,
        operation: &'static str,
    },

    /// The room is archived, not available, or not clean.
    #[error("room {room_id} is not bookable: {reason}")]
    RoomNotBookable { room_id: String, reason: String },

    /// The rate is archived, belongs to another branch, or the room does
    /// not offer it.
    #[error("rate {rate_id} is not eligible: {reason}")]
    RateNotEligible { rate_id: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Raised before
/// any store access - a validation failure never touches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A datetime window is inverted or degenerate.
    #[error("{field}: the end must be after the start")]
    InvalidWindow { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::BookingNotActionable {
            booking_id: "b-1".to_string(),
            current: BookingStatus::CheckedOut,
            operation: "check out",
        };
        assert_eq!(err.to_string(), "booking b-1 is CheckedOut, cannot check out");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "client_name".to_string(),
        };
        assert_eq!(err.to_string(), "client_name is required");

        let err = ValidationError::TooLong {
            field: "notes".to_string(),
            max: 1000,
        };
        assert_eq!(err.to_string(), "notes must be at most 1000 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "client_name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
