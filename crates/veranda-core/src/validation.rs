//! # Validation Module
//!
//! Input validation utilities for Veranda.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front desk UI                                                │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Workflow engine (Rust)                                       │
//! │  └── THIS MODULE, before the transaction opens                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── CHECK constraints on status columns                               │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A validation failure is rejected before the store is touched at all.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::{MAX_CLIENT_NAME_LEN, MAX_NOTES_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a client name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_CLIENT_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use veranda_core::validation::validate_client_name;
///
/// assert!(validate_client_name("Dela Cruz, Juan").is_ok());
/// assert!(validate_client_name("   ").is_err());
/// ```
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "client_name".to_string(),
        });
    }

    if name.chars().count() > MAX_CLIENT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "client_name".to_string(),
            max: MAX_CLIENT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates free-form booking notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    if let Some(notes) = notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: MAX_NOTES_LEN,
            });
        }
    }
    Ok(())
}

/// Validates an entity id (UUID-shaped, non-empty).
///
/// Repositories look ids up anyway; this exists so a blank id fails as
/// `Validation` rather than a confusing not-found precondition.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Reservation Window
// =============================================================================

/// Validates an advance reservation window.
///
/// ## Rules
/// - Both ends optional (a walk-in reservation has neither)
/// - If both are present, the departure must be after the arrival
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use veranda_core::validation::validate_reservation_window;
///
/// let arrive = Utc::now();
/// let depart = arrive + Duration::hours(12);
/// assert!(validate_reservation_window(Some(arrive), Some(depart)).is_ok());
/// assert!(validate_reservation_window(Some(depart), Some(arrive)).is_err());
/// ```
pub fn validate_reservation_window(
    reserved_check_in: Option<DateTime<Utc>>,
    reserved_check_out: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let (Some(arrive), Some(depart)) = (reserved_check_in, reserved_check_out) {
        if depart <= arrive {
            return Err(ValidationError::InvalidWindow {
                field: "reserved window".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Tender
// =============================================================================

/// Validates a cash tender amount in cents, when one is supplied.
pub fn validate_tender(tender_cents: Option<i64>) -> ValidationResult<()> {
    if let Some(cents) = tender_cents {
        if cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "tender_amount".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_client_name() {
        assert!(validate_client_name("Juan Dela Cruz").is_ok());
        assert!(validate_client_name("").is_err());
        assert!(validate_client_name("   ").is_err());
        assert!(validate_client_name(&"x".repeat(MAX_CLIENT_NAME_LEN + 1)).is_err());
        assert!(validate_client_name(&"x".repeat(MAX_CLIENT_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_notes() {
        assert!(validate_notes(None).is_ok());
        assert!(validate_notes(Some("late arrival expected")).is_ok());
        assert!(validate_notes(Some(&"x".repeat(MAX_NOTES_LEN + 1))).is_err());
    }

    #[test]
    fn test_id() {
        assert!(validate_id("room_id", "room-1").is_ok());
        assert!(validate_id("room_id", "").is_err());
        assert!(validate_id("room_id", "  ").is_err());
    }

    #[test]
    fn test_reservation_window() {
        let now = Utc::now();
        assert!(validate_reservation_window(None, None).is_ok());
        assert!(validate_reservation_window(Some(now), None).is_ok());
        assert!(validate_reservation_window(Some(now), Some(now + Duration::hours(3))).is_ok());
        assert!(validate_reservation_window(Some(now), Some(now)).is_err());
        assert!(validate_reservation_window(Some(now), Some(now - Duration::hours(1))).is_err());
    }

    #[test]
    fn test_tender() {
        assert!(validate_tender(None).is_ok());
        assert!(validate_tender(Some(50_000)).is_ok());
        assert!(validate_tender(Some(0)).is_err());
        assert!(validate_tender(Some(-100)).is_err());
    }
}
