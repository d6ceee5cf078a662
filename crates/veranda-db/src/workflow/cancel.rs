//! # Cancellation & Metadata Commands
//!
//! `cancel_booking` voids a pre-occupancy reservation. The room release is
//! deliberately conditional: by the time the cancel runs, the room may
//! already have been released and rebound to a newer booking, and that
//! newer binding must never be torn down.
//!
//! `update_booking_metadata` edits client-facing fields only; it never
//! touches status or the room binding.

use tracing::info;

use crate::repository::booking::BookingRepository;
use crate::repository::room::RoomRepository;
use veranda_core::validation::{validate_client_name, validate_id, validate_notes};

use super::error::{WorkflowError, WorkflowResult};
use super::view::BookingView;
use super::{BookingWorkflow, StaffContext, UpdateMetadataRequest};

impl BookingWorkflow {
    /// Voids a reservation that has not begun occupancy. Terminal.
    ///
    /// Applies to roomless reservations and to advance reservations that
    /// hold a room. Checked-in stays cannot be cancelled; they check out.
    pub async fn cancel_booking(
        &self,
        ctx: &StaffContext,
        booking_id: &str,
    ) -> WorkflowResult<BookingView> {
        validate_id("booking_id", booking_id)?;

        let mut tx = self.pool().begin().await?;

        let booking = BookingRepository::fetch_for_update(&mut tx, booking_id)
            .await?
            .filter(|b| b.branch_id == ctx.branch_id)
            .ok_or_else(|| {
                WorkflowError::precondition(format!("booking {booking_id} not found"))
            })?;

        if !booking.status.is_cancellable() {
            return Err(WorkflowError::precondition(format!(
                "booking {} is {:?}, cannot cancel",
                booking.id, booking.status
            )));
        }

        BookingRepository::cancel(&mut tx, booking_id, booking.status).await?;

        // Release the held room only if it still points at this booking.
        // A false return means the binding moved on; that is not an error.
        if let Some(room_id) = &booking.room_id {
            let released = RoomRepository::release(&mut tx, room_id, booking_id).await?;
            if !released {
                info!(booking_id, room_id = %room_id, "Room already rebound, left untouched");
            }
        }

        let view = BookingView::hydrate(&mut tx, booking_id).await?;
        tx.commit().await?;

        info!(booking_id, "Cancelled booking");
        self.record_activity(ctx, "cancel_booking", booking_id);

        Ok(view)
    }

    /// Edits client name, payment method and notes in place.
    ///
    /// Allowed in every pre-checkout state, pending ones included; a typo
    /// in a guest's name should not require declining the booking.
    pub async fn update_booking_metadata(
        &self,
        ctx: &StaffContext,
        booking_id: &str,
        request: UpdateMetadataRequest,
    ) -> WorkflowResult<BookingView> {
        validate_id("booking_id", booking_id)?;
        validate_client_name(&request.client_name)?;
        validate_notes(request.notes.as_deref())?;

        let mut tx = self.pool().begin().await?;

        let booking = BookingRepository::fetch_for_update(&mut tx, booking_id)
            .await?
            .filter(|b| b.branch_id == ctx.branch_id)
            .ok_or_else(|| {
                WorkflowError::precondition(format!("booking {booking_id} not found"))
            })?;

        if !booking.status.is_metadata_editable() {
            return Err(WorkflowError::precondition(format!(
                "booking {} is {:?}, metadata is frozen",
                booking.id, booking.status
            )));
        }

        BookingRepository::update_metadata(
            &mut tx,
            booking_id,
            request.client_name.trim(),
            request.payment_method,
            request.notes.as_deref(),
            booking.status,
        )
        .await?;

        let view = BookingView::hydrate(&mut tx, booking_id).await?;
        tx.commit().await?;

        self.record_activity(ctx, "update_booking_metadata", booking_id);

        Ok(view)
    }
}
