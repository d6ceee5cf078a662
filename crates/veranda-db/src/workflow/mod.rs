//! # Booking Workflow Engine
//!
//! The command surface of the system. Every state change a caller can make
//! to a booking or a room binding goes through exactly one method here.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Workflow Command Shape                             │
//! │                                                                         │
//! │  validate inputs          ← veranda-core, before any store access      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pool.begin()             ← one transaction per command                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read room / rate / booking rows on the transaction                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  check preconditions      ← veranda-core predicates and transitions    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  guarded writes           ← booking AND room, zero rows = Conflict     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hydrate BookingView on the same transaction                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commit, then best-effort activity log                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Command Inventory
//! | Module       | Commands                                                 |
//! |--------------|----------------------------------------------------------|
//! | `create`     | create_immediate_stay, create_room_reservation,          |
//! |              | create_unassigned_reservation                            |
//! | `acceptance` | accept_pending_booking, decline_pending_booking,         |
//! |              | list_unassigned_reservations                             |
//! | `assign`     | assign_room_and_check_in, check_in_reserved_booking      |
//! | `checkout`   | check_out                                                |
//! | `cancel`     | cancel_booking, update_booking_metadata                  |
//!
//! Queries (`get_booking`, `get_active_booking_for_room`) live on this type
//! too so callers hold a single handle.

mod acceptance;
mod assign;
mod cancel;
mod create;
mod checkout;
pub mod error;
pub mod view;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;
use ts_rs::TS;

use crate::audit::{ActivityEntry, ActivityLog};
use crate::error::DbResult;
use veranda_core::{BookingOrigin, PaymentMethod};

pub use error::{ErrorKind, WorkflowError, WorkflowResult};
pub use view::BookingView;

// =============================================================================
// Caller Context
// =============================================================================

/// Identity and scope of the acting caller.
///
/// Supplied by the session layer on every call. The engine trusts it; it
/// does not authenticate.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct StaffContext {
    /// Tenant the caller operates in.
    pub tenant_id: String,

    /// Branch the caller operates in. Every command is branch-scoped.
    pub branch_id: String,

    /// The acting staff member or admin.
    pub actor_id: String,
}

// =============================================================================
// Command Requests
// =============================================================================

/// Input for [`BookingWorkflow::create_immediate_stay`] and
/// [`BookingWorkflow::create_room_reservation`].
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CreateStayRequest {
    /// Target room.
    pub room_id: String,

    /// Selected rate. Must be offered by the room.
    pub rate_id: String,

    /// Guest-facing client name.
    pub client_name: String,

    /// How the guest pays.
    pub payment_method: PaymentMethod,

    /// Free-form front-desk notes.
    pub notes: Option<String>,

    /// Whether the rate's base price was collected up front.
    pub paid: bool,

    /// Cash tendered at the desk, in cents.
    pub tender_cents: Option<i64>,

    /// Booked arrival slot. Required for reservations, ignored for stays.
    #[ts(as = "Option<String>")]
    pub reserved_check_in: Option<DateTime<Utc>>,

    /// Booked departure slot.
    #[ts(as = "Option<String>")]
    pub reserved_check_out: Option<DateTime<Utc>>,
}

/// Input for [`BookingWorkflow::create_unassigned_reservation`].
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct CreateUnassignedRequest {
    /// Selected rate, if already chosen. May be picked at assignment time.
    pub rate_id: Option<String>,

    /// Guest-facing client name.
    pub client_name: String,

    /// How the guest intends to pay.
    pub payment_method: PaymentMethod,

    /// Free-form notes.
    pub notes: Option<String>,

    /// Booked arrival slot, for advance reservations.
    #[ts(as = "Option<String>")]
    pub reserved_check_in: Option<DateTime<Utc>>,

    /// Booked departure slot.
    #[ts(as = "Option<String>")]
    pub reserved_check_out: Option<DateTime<Utc>>,

    /// Who originated the booking. Admin-originated bookings enter the
    /// acceptance queue.
    pub origin: BookingOrigin,
}

/// Input for [`BookingWorkflow::update_booking_metadata`].
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct UpdateMetadataRequest {
    /// New client name.
    pub client_name: String,

    /// New payment method.
    pub payment_method: PaymentMethod,

    /// New notes, replacing the old value.
    pub notes: Option<String>,
}

// =============================================================================
// Workflow Engine
// =============================================================================

/// The booking workflow engine.
///
/// Cheap to clone and to construct from [`Database::workflow`]; holds a
/// pool handle and the audit hook, nothing else.
///
/// [`Database::workflow`]: crate::Database::workflow
#[derive(Clone)]
pub struct BookingWorkflow {
    pool: SqlitePool,
    activity_log: Arc<dyn ActivityLog>,
}

impl BookingWorkflow {
    /// Creates a workflow engine on an existing pool.
    pub fn new(pool: SqlitePool, activity_log: Arc<dyn ActivityLog>) -> Self {
        BookingWorkflow { pool, activity_log }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Records a completed action, best-effort.
    ///
    /// Called only after commit. A failing audit collaborator is logged
    /// and swallowed; it never fails the primary operation.
    pub(crate) fn record_activity(&self, ctx: &StaffContext, action: &'static str, booking_id: &str) {
        let entry = ActivityEntry {
            tenant_id: ctx.tenant_id.clone(),
            branch_id: ctx.branch_id.clone(),
            actor_id: ctx.actor_id.clone(),
            action,
            booking_id: booking_id.to_string(),
            recorded_at: Utc::now(),
        };

        if let Err(e) = self.activity_log.record(entry) {
            warn!(action, booking_id, error = %e, "activity log rejected entry");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetches one booking as a hydrated view.
    pub async fn get_booking(&self, booking_id: &str) -> DbResult<Option<BookingView>> {
        BookingView::fetch(&self.pool, booking_id).await
    }

    /// Finds the booking currently bound to a room, if any.
    pub async fn get_active_booking_for_room(
        &self,
        room_id: &str,
    ) -> DbResult<Option<BookingView>> {
        let booking_id: Option<String> =
            sqlx::query_scalar("SELECT bound_booking_id FROM rooms WHERE id = ?1")
                .bind(room_id)
                .fetch_optional(&self.pool)
                .await?
                .flatten();

        match booking_id {
            Some(id) => BookingView::fetch(&self.pool, &id).await,
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for BookingWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingWorkflow")
            .field("pool", &self.pool)
            .finish()
    }
}

/// Generates a new booking id.
pub(crate) fn new_booking_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
