//! # veranda-db: Storage & Workflow Layer for Veranda
//!
//! This crate provides SQLite persistence and the booking workflow engine
//! for the Veranda room-occupancy system. It uses sqlx for async access
//! and embeds its migrations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Veranda Data Flow                                │
//! │                                                                         │
//! │  Caller (front desk UI / reporting layer)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     veranda-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │   Workflow    │    │ Repositories │  │   │
//! │  │   │   (pool.rs)   │───►│   Engine      │───►│ (room, rate, │  │   │
//! │  │   │               │    │               │    │  booking)    │  │   │
//! │  │   │ SqlitePool    │    │ one tx per    │    │ guarded      │  │   │
//! │  │   │ WAL, busy     │    │ command       │    │ writes       │  │   │
//! │  │   │ timeout       │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite Database (veranda.db, one file per branch host)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Domain rules (states, transitions, billing, validation) live in       │
//! │  veranda-core; this crate enforces them transactionally.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Row-level operations (room, rate, booking)
//! - [`workflow`] - The booking workflow engine and its view model
//! - [`audit`] - Best-effort activity log boundary
//!
//! ## Usage
//!
//! ```rust,ignore
//! use veranda_db::{Database, DbConfig, StaffContext};
//!
//! let db = Database::new(DbConfig::new("path/to/veranda.db")).await?;
//!
//! let ctx = StaffContext {
//!     tenant_id: tenant.clone(),
//!     branch_id: branch.clone(),
//!     actor_id: actor.clone(),
//! };
//! let view = db.workflow().create_immediate_stay(&ctx, request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod workflow;

// =============================================================================
// Public Re-exports
// =============================================================================

pub use audit::{ActivityEntry, ActivityLog, NoopActivityLog};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::booking::BookingRepository;
pub use repository::rate::RateRepository;
pub use repository::room::RoomRepository;
pub use workflow::{
    BookingView, BookingWorkflow, CreateStayRequest, CreateUnassignedRequest, ErrorKind,
    StaffContext, UpdateMetadataRequest, WorkflowError, WorkflowResult,
};
