//! # Booking Creation Commands
//!
//! The three entry points that bring a booking into existence:
//!
//! | Command                         | Room      | Status after commit        |
//! |---------------------------------|-----------|----------------------------|
//! | `create_immediate_stay`         | occupied  | `CheckedIn`                |
//! | `create_room_reservation`       | reserved  | `ReservationWithRoom`      |
//! | `create_unassigned_reservation` | none      | `ReservationNoRoom` /      |
//! |                                 |           | advance variant / pending  |
//!
//! Room and rate eligibility is always re-checked inside the command's own
//! transaction; a stale caller-side room list can never produce a double
//! binding because the room's guarded UPDATE re-checks availability.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;

use crate::repository::rate::RateRepository;
use crate::repository::room::RoomRepository;
use crate::repository::booking::BookingRepository;
use veranda_core::validation::{
    validate_client_name, validate_id, validate_notes, validate_reservation_window,
    validate_tender,
};
use veranda_core::{
    AcceptanceStatus, Booking, BookingOrigin, BookingStatus, PaymentStatus, Rate, Room,
    RoomAvailability,
};

use super::error::{WorkflowError, WorkflowResult};
use super::view::BookingView;
use super::{new_booking_id, BookingWorkflow, CreateStayRequest, CreateUnassignedRequest, StaffContext};

impl BookingWorkflow {
    /// Creates a walk-in stay: the guest is in the room now.
    ///
    /// The booking is born `CheckedIn` with `check_in_at` set to the wall
    /// clock, and the room flips to occupied in the same transaction.
    pub async fn create_immediate_stay(
        &self,
        ctx: &StaffContext,
        request: CreateStayRequest,
    ) -> WorkflowResult<BookingView> {
        validate_id("room_id", &request.room_id)?;
        validate_id("rate_id", &request.rate_id)?;
        validate_client_name(&request.client_name)?;
        validate_notes(request.notes.as_deref())?;
        validate_tender(request.tender_cents)?;

        let mut tx = self.pool().begin().await?;

        let (_, rate) =
            load_bookable_pair(&mut tx, ctx, &request.room_id, &request.rate_id).await?;

        let now = Utc::now();
        let booking = Booking {
            id: new_booking_id(),
            tenant_id: ctx.tenant_id.clone(),
            branch_id: ctx.branch_id.clone(),
            room_id: Some(request.room_id.clone()),
            rate_id: Some(request.rate_id.clone()),
            client_name: request.client_name.trim().to_string(),
            payment_method: request.payment_method,
            notes: request.notes.clone(),
            check_in_at: Some(now),
            check_out_at: None,
            reserved_check_in_at: None,
            reserved_check_out_at: None,
            status: BookingStatus::CheckedIn,
            payment_status: if request.paid {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Unpaid
            },
            acceptance: AcceptanceStatus::Default,
            hours_used: None,
            // A pre-paid stay carries the base price; checkout recomputes
            // the final total including excess hours.
            total_cents: request.paid.then_some(rate.price_cents),
            tender_cents: request.tender_cents,
            created_by: ctx.actor_id.clone(),
            checked_out_by: None,
            origin: BookingOrigin::Staff,
            created_at: now,
            updated_at: now,
        };

        BookingRepository::insert(&mut tx, &booking).await?;
        RoomRepository::bind(&mut tx, &request.room_id, &booking.id, RoomAvailability::Occupied)
            .await?;

        let view = BookingView::hydrate(&mut tx, &booking.id).await?;
        tx.commit().await?;

        info!(
            booking_id = %booking.id,
            room_id = %request.room_id,
            branch_id = %ctx.branch_id,
            "Created immediate stay"
        );
        self.record_activity(ctx, "create_immediate_stay", &booking.id);

        Ok(view)
    }

    /// Reserves a specific room for a future arrival.
    ///
    /// Same eligibility rules as an immediate stay, but the room flips to
    /// reserved instead of occupied and no check-in time is set yet. The
    /// booked slot is kept on the booking and becomes the effective
    /// check-in time when the guest arrives.
    pub async fn create_room_reservation(
        &self,
        ctx: &StaffContext,
        request: CreateStayRequest,
    ) -> WorkflowResult<BookingView> {
        validate_id("room_id", &request.room_id)?;
        validate_id("rate_id", &request.rate_id)?;
        validate_client_name(&request.client_name)?;
        validate_notes(request.notes.as_deref())?;
        validate_tender(request.tender_cents)?;
        validate_reservation_window(request.reserved_check_in, request.reserved_check_out)?;

        if request.reserved_check_in.is_none() {
            return Err(WorkflowError::validation(
                "reserved_check_in is required for a room reservation",
            ));
        }

        let mut tx = self.pool().begin().await?;

        let (_, rate) =
            load_bookable_pair(&mut tx, ctx, &request.room_id, &request.rate_id).await?;

        let now = Utc::now();
        let booking = Booking {
            id: new_booking_id(),
            tenant_id: ctx.tenant_id.clone(),
            branch_id: ctx.branch_id.clone(),
            room_id: Some(request.room_id.clone()),
            rate_id: Some(request.rate_id.clone()),
            client_name: request.client_name.trim().to_string(),
            payment_method: request.payment_method,
            notes: request.notes.clone(),
            check_in_at: None,
            check_out_at: None,
            reserved_check_in_at: request.reserved_check_in,
            reserved_check_out_at: request.reserved_check_out,
            status: BookingStatus::ReservationWithRoom,
            payment_status: if request.paid {
                PaymentStatus::AdvancePaid
            } else {
                PaymentStatus::Unpaid
            },
            acceptance: AcceptanceStatus::Default,
            hours_used: None,
            total_cents: request.paid.then_some(rate.price_cents),
            tender_cents: request.tender_cents,
            created_by: ctx.actor_id.clone(),
            checked_out_by: None,
            origin: BookingOrigin::Staff,
            created_at: now,
            updated_at: now,
        };

        BookingRepository::insert(&mut tx, &booking).await?;
        RoomRepository::bind(&mut tx, &request.room_id, &booking.id, RoomAvailability::Reserved)
            .await?;

        let view = BookingView::hydrate(&mut tx, &booking.id).await?;
        tx.commit().await?;

        info!(
            booking_id = %booking.id,
            room_id = %request.room_id,
            "Created room reservation"
        );
        self.record_activity(ctx, "create_room_reservation", &booking.id);

        Ok(view)
    }

    /// Creates a reservation without a room.
    ///
    /// Staff-originated bookings are self-accepted and become actionable
    /// immediately; admin-originated ones enter the acceptance queue as
    /// `PendingBranchAcceptance` and stay unactionable until a branch
    /// actor accepts or declines them.
    pub async fn create_unassigned_reservation(
        &self,
        ctx: &StaffContext,
        request: CreateUnassignedRequest,
    ) -> WorkflowResult<BookingView> {
        validate_client_name(&request.client_name)?;
        validate_notes(request.notes.as_deref())?;
        validate_reservation_window(request.reserved_check_in, request.reserved_check_out)?;
        if let Some(rate_id) = &request.rate_id {
            validate_id("rate_id", rate_id)?;
        }

        let mut tx = self.pool().begin().await?;

        // The rate may legitimately be chosen later, but a supplied one
        // must exist, be active and belong to this branch.
        if let Some(rate_id) = &request.rate_id {
            RateRepository::fetch_active(&mut tx, rate_id, &ctx.branch_id)
                .await?
                .ok_or_else(|| {
                    WorkflowError::precondition(format!(
                        "rate {rate_id} is not active in this branch"
                    ))
                })?;
        }

        let (status, acceptance) = match request.origin {
            BookingOrigin::Admin => (
                BookingStatus::PendingBranchAcceptance,
                AcceptanceStatus::Pending,
            ),
            BookingOrigin::Staff if request.reserved_check_in.is_some() => (
                BookingStatus::AdvanceReservationNoRoom,
                AcceptanceStatus::Accepted,
            ),
            BookingOrigin::Staff => (BookingStatus::ReservationNoRoom, AcceptanceStatus::Accepted),
        };

        let now = Utc::now();
        let booking = Booking {
            id: new_booking_id(),
            tenant_id: ctx.tenant_id.clone(),
            branch_id: ctx.branch_id.clone(),
            room_id: None,
            rate_id: request.rate_id.clone(),
            client_name: request.client_name.trim().to_string(),
            payment_method: request.payment_method,
            notes: request.notes.clone(),
            check_in_at: None,
            check_out_at: None,
            reserved_check_in_at: request.reserved_check_in,
            reserved_check_out_at: request.reserved_check_out,
            status,
            payment_status: PaymentStatus::Unpaid,
            acceptance,
            hours_used: None,
            total_cents: None,
            tender_cents: None,
            created_by: ctx.actor_id.clone(),
            checked_out_by: None,
            origin: request.origin,
            created_at: now,
            updated_at: now,
        };

        BookingRepository::insert(&mut tx, &booking).await?;

        let view = BookingView::hydrate(&mut tx, &booking.id).await?;
        tx.commit().await?;

        info!(
            booking_id = %booking.id,
            origin = ?request.origin,
            status = ?status,
            "Created unassigned reservation"
        );
        self.record_activity(ctx, "create_unassigned_reservation", &booking.id);

        Ok(view)
    }
}

/// Loads and checks the room/rate pair for the assigning commands.
///
/// All four checks report as `PreconditionFailed`:
/// room exists in this branch, room is bookable (active + available +
/// clean), rate is active in this branch, room offers the rate.
pub(super) async fn load_bookable_pair(
    conn: &mut SqliteConnection,
    ctx: &StaffContext,
    room_id: &str,
    rate_id: &str,
) -> WorkflowResult<(Room, Rate)> {
    let room = RoomRepository::fetch_for_update(conn, room_id)
        .await?
        .filter(|r| r.branch_id == ctx.branch_id)
        .ok_or_else(|| WorkflowError::precondition(format!("room {room_id} not found")))?;

    if !room.is_bookable() {
        return Err(WorkflowError::precondition(format!(
            "room {} is not bookable: lifecycle {:?}, availability {:?}, cleaning {:?}",
            room.id, room.lifecycle, room.availability, room.cleaning
        )));
    }

    let rate = RateRepository::fetch_active(conn, rate_id, &ctx.branch_id)
        .await?
        .ok_or_else(|| {
            WorkflowError::precondition(format!("rate {rate_id} is not active in this branch"))
        })?;

    if !RoomRepository::offers_rate(conn, room_id, rate_id).await? {
        return Err(WorkflowError::precondition(format!(
            "room {} does not offer rate {}",
            room.id, rate.id
        )));
    }

    Ok((room, rate))
}
