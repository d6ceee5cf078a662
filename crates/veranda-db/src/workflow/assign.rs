//! # Room Assignment & Arrival Commands
//!
//! Moves a reservation into occupancy.
//!
//! `assign_room_and_check_in` serves the unassigned queue: pick a room,
//! bind it, guest is in. `check_in_reserved_booking` serves advance
//! reservations that already hold a room and just need the arrival
//! recorded.
//!
//! ## Effective Check-in Time
//! A booking carrying a booked arrival slot checks in *at that slot*, not
//! at the wall clock, so billing starts where the guest's agreement says
//! it does. Same-day bookings with no slot use the wall clock. The rule
//! lives on [`Booking::effective_check_in`] and is covered by tests there.
//!
//! [`Booking::effective_check_in`]: veranda_core::Booking::effective_check_in

use chrono::Utc;
use tracing::info;

use crate::repository::booking::BookingRepository;
use crate::repository::room::RoomRepository;
use veranda_core::validation::validate_id;
use veranda_core::RoomAvailability;

use super::create::load_bookable_pair;
use super::error::{WorkflowError, WorkflowResult};
use super::view::BookingView;
use super::{BookingWorkflow, StaffContext};

impl BookingWorkflow {
    /// Binds a room to an unassigned reservation and checks the guest in.
    ///
    /// The reservation must be accepted (not pending) and roomless; the
    /// room must pass the same eligibility checks as at creation, and must
    /// offer the reservation's rate.
    pub async fn assign_room_and_check_in(
        &self,
        ctx: &StaffContext,
        booking_id: &str,
        room_id: &str,
    ) -> WorkflowResult<BookingView> {
        validate_id("booking_id", booking_id)?;
        validate_id("room_id", room_id)?;

        let mut tx = self.pool().begin().await?;

        let booking = BookingRepository::fetch_for_update(&mut tx, booking_id)
            .await?
            .filter(|b| b.branch_id == ctx.branch_id)
            .ok_or_else(|| {
                WorkflowError::precondition(format!("booking {booking_id} not found"))
            })?;

        if !booking.status.can_receive_room() {
            return Err(WorkflowError::precondition(format!(
                "booking {} is {:?}, cannot receive a room",
                booking.id, booking.status
            )));
        }
        if booking.room_id.is_some() {
            return Err(WorkflowError::precondition(format!(
                "booking {} already holds a room",
                booking.id
            )));
        }
        let rate_id = booking.rate_id.clone().ok_or_else(|| {
            WorkflowError::precondition(format!("booking {} has no rate selected", booking.id))
        })?;

        load_bookable_pair(&mut tx, ctx, room_id, &rate_id).await?;

        let check_in_at = booking.effective_check_in(Utc::now());

        BookingRepository::assign_room(&mut tx, booking_id, room_id, check_in_at, booking.status)
            .await?;
        RoomRepository::bind(&mut tx, room_id, booking_id, RoomAvailability::Occupied).await?;

        let view = BookingView::hydrate(&mut tx, booking_id).await?;
        tx.commit().await?;

        info!(booking_id, room_id, %check_in_at, "Assigned room and checked in");
        self.record_activity(ctx, "assign_room_and_check_in", booking_id);

        Ok(view)
    }

    /// Records the arrival of a guest whose reservation already holds a room.
    ///
    /// The reserved room flips to occupied; the booked slot, if present,
    /// becomes the check-in time.
    pub async fn check_in_reserved_booking(
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

        let room_id = booking.room_id.clone().ok_or_else(|| {
            WorkflowError::precondition(format!("booking {} holds no room", booking.id))
        })?;

        let check_in_at = booking.effective_check_in(Utc::now());

        // The UPDATE guards on ReservationWithRoom; any other source state
        // surfaces as a conflict from the guarded write, but checking here
        // first gives the caller a precise precondition message.
        if booking.status != veranda_core::BookingStatus::ReservationWithRoom {
            return Err(WorkflowError::precondition(format!(
                "booking {} is {:?}, cannot check in",
                booking.id, booking.status
            )));
        }

        BookingRepository::check_in_reserved(&mut tx, booking_id, check_in_at).await?;
        RoomRepository::occupy_reserved(&mut tx, &room_id, booking_id).await?;

        let view = BookingView::hydrate(&mut tx, booking_id).await?;
        tx.commit().await?;

        info!(booking_id, room_id = %room_id, "Checked in reserved booking");
        self.record_activity(ctx, "check_in_reserved_booking", booking_id);

        Ok(view)
    }
}
