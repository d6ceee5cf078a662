//! # Repository Module
//!
//! Database repository implementations for Veranda.
//!
//! ## Repository Pattern, Two Scopes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pool-scoped methods (&self, pool)                                      │
//! │  ├── unlocked listing/dashboard reads                                   │
//! │  └── catalog inserts used by seeding and tests                          │
//! │                                                                         │
//! │  Transaction-scoped associated fns (conn: &mut SqliteConnection)        │
//! │  ├── fetch_for_update: the read half of the unit of work                │
//! │  └── guarded writes: UPDATE ... WHERE id = ? AND <expected state>       │
//! │       └── zero rows affected → DbError::Conflict, whole txn aborts      │
//! │                                                                         │
//! │  The workflow engine owns the transaction; repositories never           │
//! │  commit or roll back themselves.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`room::RoomRepository`] - Room rows, bindings, rate compatibility
//! - [`rate::RateRepository`] - Rate catalog reads
//! - [`booking::BookingRepository`] - Booking rows and status transitions

pub mod booking;
pub mod rate;
pub mod room;
