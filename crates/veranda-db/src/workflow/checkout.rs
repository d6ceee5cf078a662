//! # Checkout Command
//!
//! Ends a stay: computes the bill, finalizes the booking and releases the
//! room, all inside one transaction.
//!
//! ## Billing
//! The arithmetic lives in [`veranda_core::billing::compute_bill`]; this
//! command only feeds it the rate and the timestamps. The rate is fetched
//! without a lifecycle filter because a stay billed under a since-archived
//! rate is still billed under that rate.
//!
//! Checkout does not touch the room's cleaning state. Housekeeping flips
//! rooms to dirty through its own flow; an automatic flip here would fight
//! with branches that inspect before cleaning.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::repository::booking::BookingRepository;
use crate::repository::rate::RateRepository;
use crate::repository::room::RoomRepository;
use veranda_core::billing::compute_bill;
use veranda_core::validation::validate_id;
use veranda_core::BookingStatus;

use super::error::{WorkflowError, WorkflowResult};
use super::view::BookingView;
use super::{BookingWorkflow, StaffContext};

impl BookingWorkflow {
    /// Checks out a `CheckedIn` booking at the wall clock.
    pub async fn check_out(
        &self,
        ctx: &StaffContext,
        booking_id: &str,
    ) -> WorkflowResult<BookingView> {
        self.check_out_at(ctx, booking_id, Utc::now()).await
    }

    /// Checks out a `CheckedIn` booking at an explicit timestamp.
    ///
    /// The explicit-`now` form exists for deterministic billing in tests
    /// and for back-dated corrections by a supervisor.
    pub async fn check_out_at(
        &self,
        ctx: &StaffContext,
        booking_id: &str,
        now: DateTime<Utc>,
    ) -> WorkflowResult<BookingView> {
        validate_id("booking_id", booking_id)?;

        let mut tx = self.pool().begin().await?;

        let booking = BookingRepository::fetch_for_update(&mut tx, booking_id)
            .await?
            .filter(|b| b.branch_id == ctx.branch_id)
            .ok_or_else(|| {
                WorkflowError::precondition(format!("booking {booking_id} not found"))
            })?;

        if booking.status != BookingStatus::CheckedIn {
            return Err(WorkflowError::precondition(format!(
                "booking {} is {:?}, cannot check out",
                booking.id, booking.status
            )));
        }

        // A checked-in booking always has these; missing ones mean the row
        // was corrupted outside the workflow.
        let check_in_at = booking.check_in_at.ok_or_else(|| {
            WorkflowError::precondition(format!(
                "booking {} has no check-in time recorded",
                booking.id
            ))
        })?;
        let rate_id = booking.rate_id.clone().ok_or_else(|| {
            WorkflowError::precondition(format!("booking {} has no rate recorded", booking.id))
        })?;
        let room_id = booking.room_id.clone().ok_or_else(|| {
            WorkflowError::precondition(format!("booking {} holds no room", booking.id))
        })?;

        let rate = RateRepository::fetch_for_billing(&mut tx, &rate_id)
            .await?
            .ok_or_else(|| {
                WorkflowError::precondition(format!("rate {rate_id} no longer exists"))
            })?;

        let bill = compute_bill(&rate, check_in_at, now);

        BookingRepository::finalize_checkout(
            &mut tx,
            booking_id,
            now,
            bill.hours_used,
            bill.total.cents(),
            &ctx.actor_id,
        )
        .await?;

        // The room must still be bound to this booking; anything else is a
        // concurrent mutation and aborts the whole checkout.
        if !RoomRepository::release(&mut tx, &room_id, booking_id).await? {
            return Err(WorkflowError::conflict(format!(
                "room {room_id} is no longer bound to booking {booking_id}"
            )));
        }

        let view = BookingView::hydrate(&mut tx, booking_id).await?;
        tx.commit().await?;

        info!(
            booking_id,
            room_id = %room_id,
            hours_used = bill.hours_used,
            total_cents = bill.total.cents(),
            "Checked out booking"
        );
        self.record_activity(ctx, "check_out", booking_id);

        Ok(view)
    }
}
