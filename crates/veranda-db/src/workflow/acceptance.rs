//! # Acceptance Queue Commands
//!
//! Admin-originated bookings arrive as `PendingBranchAcceptance` and are
//! not actionable by branch staff until explicitly accepted or declined.
//!
//! ```text
//!                        ┌──────────────────────────┐
//!   admin creates ─────► │ PENDING_BRANCH_ACCEPTANCE │
//!                        └─────────┬────────────────┘
//!                        accept    │    decline
//!                  ┌───────────────┴───────────────┐
//!                  ▼                               ▼
//!        RESERVATION_NO_ROOM           ADMIN_RESERVATION_DECLINED
//!        (actionable from here)        (terminal)
//! ```

use tracing::info;

use crate::repository::booking::BookingRepository;
use veranda_core::status::validate_transition;
use veranda_core::validation::validate_id;
use veranda_core::BookingStatus;

use super::error::{WorkflowError, WorkflowResult};
use super::view::BookingView;
use super::{BookingWorkflow, StaffContext};

impl BookingWorkflow {
    /// Accepts a pending admin-originated booking.
    ///
    /// The booking becomes a regular unassigned reservation and can now
    /// receive a room.
    pub async fn accept_pending_booking(
        &self,
        ctx: &StaffContext,
        booking_id: &str,
    ) -> WorkflowResult<BookingView> {
        self.resolve_pending(ctx, booking_id, true).await
    }

    /// Declines a pending admin-originated booking. Terminal.
    pub async fn decline_pending_booking(
        &self,
        ctx: &StaffContext,
        booking_id: &str,
    ) -> WorkflowResult<BookingView> {
        self.resolve_pending(ctx, booking_id, false).await
    }

    async fn resolve_pending(
        &self,
        ctx: &StaffContext,
        booking_id: &str,
        accept: bool,
    ) -> WorkflowResult<BookingView> {
        validate_id("booking_id", booking_id)?;

        let mut tx = self.pool().begin().await?;

        let booking = BookingRepository::fetch_for_update(&mut tx, booking_id)
            .await?
            .filter(|b| b.branch_id == ctx.branch_id)
            .ok_or_else(|| {
                WorkflowError::precondition(format!("booking {booking_id} not found"))
            })?;

        let target = if accept {
            BookingStatus::ReservationNoRoom
        } else {
            BookingStatus::AdminReservationDeclined
        };
        validate_transition(booking.status, target).map_err(|e| {
            WorkflowError::precondition(e.to_string())
        })?;

        if accept {
            BookingRepository::set_accepted(&mut tx, booking_id).await?;
        } else {
            BookingRepository::set_declined(&mut tx, booking_id).await?;
        }

        let view = BookingView::hydrate(&mut tx, booking_id).await?;
        tx.commit().await?;

        let action = if accept {
            "accept_pending_booking"
        } else {
            "decline_pending_booking"
        };
        info!(booking_id, accept, "Resolved pending booking");
        self.record_activity(ctx, action, booking_id);

        Ok(view)
    }

    /// Lists the branch's unassigned reservations, pending ones included.
    ///
    /// This is the front desk's work queue: everything that still needs a
    /// room or an acceptance decision, oldest first.
    pub async fn list_unassigned_reservations(
        &self,
        ctx: &StaffContext,
    ) -> WorkflowResult<Vec<BookingView>> {
        let mut views = BookingView::list_for_branch(
            self.pool(),
            &ctx.branch_id,
            &[
                "reservation_no_room",
                "advance_reservation_no_room",
                "pending_branch_acceptance",
            ],
        )
        .await?;

        // The queue is worked oldest-first; the shared listing query
        // returns newest-first for history screens.
        views.reverse();
        views.retain(|v| v.booking.room_id.is_none());

        Ok(views)
    }
}
