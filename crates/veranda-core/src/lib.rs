//! # veranda-core: Pure Business Logic for Veranda
//!
//! This crate is the **heart** of Veranda, a booking and room-occupancy
//! engine for a multi-branch lodging operator. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Veranda Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front Desk / Admin Console (out of scope)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               veranda-db (Workflow Engine)                      │   │
//! │  │    create_immediate_stay, assign_room_and_check_in, check_out   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ veranda-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  status   │  │  billing  │  │ validation│  │   │
//! │  │   │   Room    │  │ lifecycle │  │  excess   │  │   rules   │  │   │
//! │  │   │  Booking  │  │transitions│  │   hours   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Room, Rate, Booking and their status enums)
//! - [`status`] - The centralized booking lifecycle state machine
//! - [`billing`] - Excess-hour checkout billing calculator
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **No Clock**: `now` is always a parameter, never read from the system
//! 4. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 5. **Closed Status Dimensions**: Every status is a tagged enum with one
//!    exhaustive transition validator - there are no loose integer constants
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use veranda_core::billing::compute_bill;
//! use veranda_core::money::Money;
//! use veranda_core::types::Rate;
//!
//! let rate = Rate::sample("rate-1", "branch-1", 50_000, 3, Some(10_000));
//! let check_in = Utc::now();
//! let now = check_in + Duration::minutes(190); // 3h10m
//!
//! let bill = compute_bill(&rate, check_in, now);
//! assert_eq!(bill.hours_used, 4);
//! assert_eq!(bill.total, Money::from_cents(60_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod money;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use veranda_core::Booking` instead of
// `use veranda_core::types::Booking`

pub use billing::Bill;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID for v0.1 (single-tenant runtime with multi-tenant schema)
///
/// ## Why a constant?
/// v0.1 runs one lodging operator, but the database schema includes tenant_id
/// for future multi-tenancy. This constant is used throughout the codebase and
/// will be replaced with dynamic tenant resolution later.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Minimum billable duration of a stay, in hours
///
/// ## Business Reason
/// A guest who checks out five minutes after checking in still pays for a
/// full hour. This also guards the bill against non-monotonic clock input.
pub const MIN_BILLABLE_HOURS: i64 = 1;

/// Maximum length of a client name
pub const MAX_CLIENT_NAME_LEN: usize = 120;

/// Maximum length of free-form booking notes
pub const MAX_NOTES_LEN: usize = 1000;
