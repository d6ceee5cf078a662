//! End-to-end workflow tests against a migrated SQLite database.
//!
//! Each test builds its own in-memory database; the double-booking race
//! at the bottom uses a file-backed one so two connections can actually
//! contend for the write lock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use veranda_core::{
    BookingOrigin, BookingStatus, CleaningStatus, PaymentMethod, PaymentStatus, Rate,
    RateLifecycle, Room, RoomAvailability, RoomLifecycle, DEFAULT_TENANT_ID,
};
use veranda_db::workflow::ErrorKind;
use veranda_db::{
    CreateStayRequest, CreateUnassignedRequest, Database, DbConfig, StaffContext,
    UpdateMetadataRequest,
};

const BRANCH: &str = "branch-1";

fn ctx() -> StaffContext {
    StaffContext {
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        branch_id: BRANCH.to_string(),
        actor_id: "staff-1".to_string(),
    }
}

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

async fn seed_room(db: &Database, label: &str, cleaning: CleaningStatus) -> Room {
    let now = Utc::now();
    let room = Room {
        id: Uuid::new_v4().to_string(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        branch_id: BRANCH.to_string(),
        label: label.to_string(),
        lifecycle: RoomLifecycle::Active,
        availability: RoomAvailability::Available,
        cleaning,
        bound_booking_id: None,
        created_at: now,
        updated_at: now,
    };
    db.rooms().insert(&room).await.expect("insert room");
    room
}

async fn seed_rate(db: &Database, branch_id: &str, excess: Option<i64>) -> Rate {
    let now = Utc::now();
    let rate = Rate {
        id: Uuid::new_v4().to_string(),
        branch_id: branch_id.to_string(),
        name: "3 Hour Block".to_string(),
        lifecycle: RateLifecycle::Active,
        price_cents: 50_000,
        included_hours: 3,
        excess_price_cents: excess,
        created_at: now,
        updated_at: now,
    };
    db.rates().insert(&rate).await.expect("insert rate");
    rate
}

/// Standard fixture: one clean room offering one excess-priced rate.
async fn seed_pair(db: &Database) -> (Room, Rate) {
    let room = seed_room(db, "101", CleaningStatus::Clean).await;
    let rate = seed_rate(db, BRANCH, Some(10_000)).await;
    db.rooms()
        .set_compatible_rates(&room.id, &[rate.id.clone()])
        .await
        .expect("compat set");
    (room, rate)
}

fn stay_request(room: &Room, rate: &Rate) -> CreateStayRequest {
    CreateStayRequest {
        room_id: room.id.clone(),
        rate_id: rate.id.clone(),
        client_name: "Ada Guest".to_string(),
        payment_method: PaymentMethod::Cash,
        notes: None,
        paid: false,
        tender_cents: None,
        reserved_check_in: None,
        reserved_check_out: None,
    }
}

fn unassigned_request(
    rate_id: Option<String>,
    slot: Option<DateTime<Utc>>,
    origin: BookingOrigin,
) -> CreateUnassignedRequest {
    CreateUnassignedRequest {
        rate_id,
        client_name: "Ada Guest".to_string(),
        payment_method: PaymentMethod::Card,
        notes: None,
        reserved_check_in: slot,
        reserved_check_out: slot.map(|s| s + Duration::hours(6)),
        origin,
    }
}

/// Asserts the room binding invariant across every room in the branch.
async fn assert_bindings_consistent(db: &Database) {
    for room in db.rooms().list_for_branch(BRANCH).await.expect("rooms") {
        assert!(
            room.binding_is_consistent(),
            "room {} violates the binding invariant: {:?} / {:?}",
            room.label,
            room.availability,
            room.bound_booking_id
        );
    }
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn immediate_stay_occupies_room() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;

    let view = db
        .workflow()
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .expect("create stay");

    assert_eq!(view.booking.status, BookingStatus::CheckedIn);
    assert!(view.booking.check_in_at.is_some());
    assert_eq!(view.booking.payment_status, PaymentStatus::Unpaid);
    assert_eq!(view.room_label.as_deref(), Some("101"));
    assert_eq!(view.rate_name.as_deref(), Some("3 Hour Block"));

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Occupied);
    assert_eq!(stored.bound_booking_id.as_deref(), Some(view.booking.id.as_str()));
    assert_bindings_consistent(&db).await;
}

#[tokio::test]
async fn prepaid_stay_carries_base_price() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;

    let mut request = stay_request(&room, &rate);
    request.paid = true;
    request.tender_cents = Some(60_000);

    let view = db
        .workflow()
        .create_immediate_stay(&ctx(), request)
        .await
        .expect("create stay");

    assert_eq!(view.booking.payment_status, PaymentStatus::Paid);
    assert_eq!(view.booking.total_cents, Some(50_000));
    assert_eq!(view.booking.tender_cents, Some(60_000));
}

#[tokio::test]
async fn dirty_room_rejects_stay_with_zero_writes() {
    let db = test_db().await;
    let room = seed_room(&db, "102", CleaningStatus::Dirty).await;
    let rate = seed_rate(&db, BRANCH, None).await;
    db.rooms()
        .set_compatible_rates(&room.id, &[rate.id.clone()])
        .await
        .unwrap();

    let err = db
        .workflow()
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .expect_err("dirty room must be rejected");

    assert_eq!(err.kind, ErrorKind::PreconditionFailed);

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Available);
    assert!(stored.bound_booking_id.is_none());
}

#[tokio::test]
async fn foreign_branch_rate_is_rejected() {
    let db = test_db().await;
    let room = seed_room(&db, "103", CleaningStatus::Clean).await;
    let rate = seed_rate(&db, "branch-other", Some(10_000)).await;
    db.rooms()
        .set_compatible_rates(&room.id, &[rate.id.clone()])
        .await
        .unwrap();

    let err = db
        .workflow()
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .expect_err("foreign rate must be rejected");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);
}

#[tokio::test]
async fn rate_not_offered_by_room_is_rejected() {
    let db = test_db().await;
    let room = seed_room(&db, "104", CleaningStatus::Clean).await;
    // Rate exists and is active, but the room's compatibility set is empty.
    let rate = seed_rate(&db, BRANCH, Some(10_000)).await;

    let err = db
        .workflow()
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .expect_err("unoffered rate must be rejected");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);
}

#[tokio::test]
async fn empty_client_name_is_validation_error() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;

    let mut request = stay_request(&room, &rate);
    request.client_name = "   ".to_string();

    let err = db
        .workflow()
        .create_immediate_stay(&ctx(), request)
        .await
        .expect_err("blank name must be rejected");
    assert_eq!(err.kind, ErrorKind::ValidationError);
}

#[tokio::test]
async fn room_reservation_reserves_room() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;

    let slot = Utc::now() + Duration::days(2);
    let mut request = stay_request(&room, &rate);
    request.reserved_check_in = Some(slot);
    request.reserved_check_out = Some(slot + Duration::hours(6));

    let view = db
        .workflow()
        .create_room_reservation(&ctx(), request)
        .await
        .expect("create reservation");

    assert_eq!(view.booking.status, BookingStatus::ReservationWithRoom);
    assert!(view.booking.check_in_at.is_none());

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Reserved);
    assert_bindings_consistent(&db).await;
}

#[tokio::test]
async fn room_reservation_requires_slot() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;

    let err = db
        .workflow()
        .create_room_reservation(&ctx(), stay_request(&room, &rate))
        .await
        .expect_err("missing slot must be rejected");
    assert_eq!(err.kind, ErrorKind::ValidationError);
}

#[tokio::test]
async fn inverted_reservation_window_is_rejected() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;

    let slot = Utc::now() + Duration::days(2);
    let mut request = stay_request(&room, &rate);
    request.reserved_check_in = Some(slot);
    request.reserved_check_out = Some(slot - Duration::hours(1));

    let err = db
        .workflow()
        .create_room_reservation(&ctx(), request)
        .await
        .expect_err("inverted window must be rejected");
    assert_eq!(err.kind, ErrorKind::ValidationError);
}

#[tokio::test]
async fn staff_unassigned_reservation_variants() {
    let db = test_db().await;
    let rate = seed_rate(&db, BRANCH, None).await;
    let workflow = db.workflow();

    let same_day = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id.clone()), None, BookingOrigin::Staff),
        )
        .await
        .expect("same-day");
    assert_eq!(same_day.booking.status, BookingStatus::ReservationNoRoom);
    assert!(same_day.booking.room_id.is_none());

    let advance = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(
                Some(rate.id.clone()),
                Some(Utc::now() + Duration::days(3)),
                BookingOrigin::Staff,
            ),
        )
        .await
        .expect("advance");
    assert_eq!(
        advance.booking.status,
        BookingStatus::AdvanceReservationNoRoom
    );
}

// =============================================================================
// Acceptance queue
// =============================================================================

#[tokio::test]
async fn pending_booking_is_not_actionable_until_accepted() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let pending = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id.clone()), None, BookingOrigin::Admin),
        )
        .await
        .expect("admin reservation");
    assert_eq!(
        pending.booking.status,
        BookingStatus::PendingBranchAcceptance
    );

    // Not actionable yet
    let err = workflow
        .assign_room_and_check_in(&ctx(), &pending.booking.id, &room.id)
        .await
        .expect_err("pending booking must not receive a room");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);

    // Accept, then the same assignment succeeds
    let accepted = workflow
        .accept_pending_booking(&ctx(), &pending.booking.id)
        .await
        .expect("accept");
    assert_eq!(accepted.booking.status, BookingStatus::ReservationNoRoom);

    let checked_in = workflow
        .assign_room_and_check_in(&ctx(), &pending.booking.id, &room.id)
        .await
        .expect("assign after accept");
    assert_eq!(checked_in.booking.status, BookingStatus::CheckedIn);
    assert_bindings_consistent(&db).await;
}

#[tokio::test]
async fn declined_booking_is_terminal() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let pending = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id.clone()), None, BookingOrigin::Admin),
        )
        .await
        .unwrap();

    let declined = workflow
        .decline_pending_booking(&ctx(), &pending.booking.id)
        .await
        .expect("decline");
    assert_eq!(
        declined.booking.status,
        BookingStatus::AdminReservationDeclined
    );

    for result in [
        workflow
            .assign_room_and_check_in(&ctx(), &pending.booking.id, &room.id)
            .await,
        workflow.accept_pending_booking(&ctx(), &pending.booking.id).await,
        workflow.cancel_booking(&ctx(), &pending.booking.id).await,
    ] {
        let err = result.expect_err("declined booking must stay terminal");
        assert_eq!(err.kind, ErrorKind::PreconditionFailed);
    }
}

#[tokio::test]
async fn unassigned_list_is_oldest_first_and_roomless() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let first = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id.clone()), None, BookingOrigin::Staff),
        )
        .await
        .unwrap();
    let second = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id.clone()), None, BookingOrigin::Admin),
        )
        .await
        .unwrap();

    // A checked-in stay must never appear in the queue.
    workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();

    let queue = workflow
        .list_unassigned_reservations(&ctx())
        .await
        .expect("list");
    let ids: Vec<&str> = queue.iter().map(|v| v.booking.id.as_str()).collect();
    assert_eq!(ids, vec![first.booking.id.as_str(), second.booking.id.as_str()]);
}

// =============================================================================
// Assignment & arrival
// =============================================================================

#[tokio::test]
async fn assignment_preserves_reserved_slot_as_check_in() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let slot = Utc::now() - Duration::hours(2);
    let reservation = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id.clone()), Some(slot), BookingOrigin::Staff),
        )
        .await
        .unwrap();

    let view = workflow
        .assign_room_and_check_in(&ctx(), &reservation.booking.id, &room.id)
        .await
        .expect("assign");

    assert_eq!(view.booking.status, BookingStatus::CheckedIn);
    // The booked slot, not the wall clock, is the effective check-in.
    assert_eq!(view.booking.check_in_at, Some(slot));

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Occupied);
}

#[tokio::test]
async fn assignment_requires_a_selected_rate() {
    let db = test_db().await;
    let (room, _) = seed_pair(&db).await;
    let workflow = db.workflow();

    let reservation = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(None, None, BookingOrigin::Staff),
        )
        .await
        .unwrap();

    let err = workflow
        .assign_room_and_check_in(&ctx(), &reservation.booking.id, &room.id)
        .await
        .expect_err("rateless booking cannot be assigned");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);
}

#[tokio::test]
async fn reserved_room_check_in_flips_room_to_occupied() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let slot = Utc::now() + Duration::hours(1);
    let mut request = stay_request(&room, &rate);
    request.reserved_check_in = Some(slot);
    request.reserved_check_out = Some(slot + Duration::hours(6));
    let reservation = workflow
        .create_room_reservation(&ctx(), request)
        .await
        .unwrap();

    let view = workflow
        .check_in_reserved_booking(&ctx(), &reservation.booking.id)
        .await
        .expect("check in");

    assert_eq!(view.booking.status, BookingStatus::CheckedIn);
    assert_eq!(view.booking.check_in_at, Some(slot));

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Occupied);
    assert_bindings_consistent(&db).await;
}

// =============================================================================
// Checkout & billing
// =============================================================================

#[tokio::test]
async fn checkout_bills_excess_hours_and_releases_room() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();
    let check_in = stay.booking.check_in_at.unwrap();

    // 4h30m on a 3-hour rate: 5 billed hours, 2 of them excess.
    let view = workflow
        .check_out_at(&ctx(), &stay.booking.id, check_in + Duration::minutes(270))
        .await
        .expect("checkout");

    assert_eq!(view.booking.status, BookingStatus::CheckedOut);
    assert_eq!(view.booking.payment_status, PaymentStatus::Paid);
    assert_eq!(view.booking.hours_used, Some(5));
    assert_eq!(view.booking.total_cents, Some(70_000));
    assert_eq!(view.booking.checked_out_by.as_deref(), Some("staff-1"));

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Available);
    assert!(stored.bound_booking_id.is_none());
    // Housekeeping owns the cleaning flag; checkout must not touch it.
    assert_eq!(stored.cleaning, CleaningStatus::Clean);
    assert_bindings_consistent(&db).await;
}

#[tokio::test]
async fn checkout_without_excess_price_bills_base_only() {
    let db = test_db().await;
    let room = seed_room(&db, "105", CleaningStatus::Clean).await;
    let rate = seed_rate(&db, BRANCH, None).await;
    db.rooms()
        .set_compatible_rates(&room.id, &[rate.id.clone()])
        .await
        .unwrap();
    let workflow = db.workflow();

    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();
    let check_in = stay.booking.check_in_at.unwrap();

    let view = workflow
        .check_out_at(&ctx(), &stay.booking.id, check_in + Duration::hours(10))
        .await
        .unwrap();

    assert_eq!(view.booking.hours_used, Some(10));
    assert_eq!(view.booking.total_cents, Some(50_000));
}

#[tokio::test]
async fn checkout_charges_minimum_hour_on_backwards_clock() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();
    let check_in = stay.booking.check_in_at.unwrap();

    let view = workflow
        .check_out_at(&ctx(), &stay.booking.id, check_in - Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(view.booking.hours_used, Some(1));
    assert_eq!(view.booking.total_cents, Some(50_000));
}

#[tokio::test]
async fn checkout_rejects_non_checked_in_booking() {
    let db = test_db().await;
    let rate = seed_rate(&db, BRANCH, None).await;
    let workflow = db.workflow();

    let reservation = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id), None, BookingOrigin::Staff),
        )
        .await
        .unwrap();

    let err = workflow
        .check_out(&ctx(), &reservation.booking.id)
        .await
        .expect_err("roomless reservation cannot check out");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);

    // Checked-out is terminal: a second checkout of a finished stay fails too.
    let (room, rate) = seed_pair(&db).await;
    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();
    workflow.check_out(&ctx(), &stay.booking.id).await.unwrap();
    let err = workflow
        .check_out(&ctx(), &stay.booking.id)
        .await
        .expect_err("double checkout must fail");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);
}

// =============================================================================
// Cancellation & metadata
// =============================================================================

#[tokio::test]
async fn cancelling_room_reservation_releases_room() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let slot = Utc::now() + Duration::days(1);
    let mut request = stay_request(&room, &rate);
    request.reserved_check_in = Some(slot);
    let reservation = workflow
        .create_room_reservation(&ctx(), request)
        .await
        .unwrap();

    let view = workflow
        .cancel_booking(&ctx(), &reservation.booking.id)
        .await
        .expect("cancel");
    assert_eq!(view.booking.status, BookingStatus::VoidedCancelled);

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Available);
    assert!(stored.bound_booking_id.is_none());
    assert_bindings_consistent(&db).await;

    // Terminal: cancelling twice fails.
    let err = workflow
        .cancel_booking(&ctx(), &reservation.booking.id)
        .await
        .expect_err("second cancel must fail");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);
}

#[tokio::test]
async fn cancelling_roomless_booking_leaves_rooms_untouched() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let reservation = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id.clone()), None, BookingOrigin::Staff),
        )
        .await
        .unwrap();

    let before = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();

    let view = workflow
        .cancel_booking(&ctx(), &reservation.booking.id)
        .await
        .expect("cancel roomless reservation");
    assert_eq!(view.booking.status, BookingStatus::VoidedCancelled);

    // Zero room writes: the row is byte-for-byte what it was.
    let after = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(after.availability, RoomAvailability::Available);
    assert!(after.bound_booking_id.is_none());
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn cancel_never_tears_down_a_rebound_room() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let slot = Utc::now() + Duration::days(1);
    let mut request = stay_request(&room, &rate);
    request.reserved_check_in = Some(slot);
    let stale = workflow
        .create_room_reservation(&ctx(), request)
        .await
        .unwrap();

    // The room slips away out-of-band (a manual front-desk correction)
    // and is rebound to a fresh walk-in stay.
    {
        let mut conn = db.pool().acquire().await.unwrap();
        assert!(
            veranda_db::RoomRepository::release(&mut conn, &room.id, &stale.booking.id)
                .await
                .unwrap()
        );
    }
    let newer = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();

    // Cancelling the stale reservation must still succeed, but its room
    // release is a no-op: the binding now belongs to the newer stay.
    let view = workflow
        .cancel_booking(&ctx(), &stale.booking.id)
        .await
        .expect("cancel stale reservation");
    assert_eq!(view.booking.status, BookingStatus::VoidedCancelled);

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Occupied);
    assert_eq!(
        stored.bound_booking_id.as_deref(),
        Some(newer.booking.id.as_str())
    );
    assert_bindings_consistent(&db).await;
}

#[tokio::test]
async fn checked_in_stay_cannot_be_cancelled() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();

    let err = workflow
        .cancel_booking(&ctx(), &stay.booking.id)
        .await
        .expect_err("occupancy cannot be cancelled");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);
}

#[tokio::test]
async fn metadata_update_edits_pending_booking() {
    let db = test_db().await;
    let rate = seed_rate(&db, BRANCH, None).await;
    let workflow = db.workflow();

    let pending = workflow
        .create_unassigned_reservation(
            &ctx(),
            unassigned_request(Some(rate.id), None, BookingOrigin::Admin),
        )
        .await
        .unwrap();

    let view = workflow
        .update_booking_metadata(
            &ctx(),
            &pending.booking.id,
            UpdateMetadataRequest {
                client_name: "Grace Guest".to_string(),
                payment_method: PaymentMethod::OnlineTransfer,
                notes: Some("arrives late".to_string()),
            },
        )
        .await
        .expect("metadata update");

    assert_eq!(view.booking.client_name, "Grace Guest");
    assert_eq!(view.booking.payment_method, PaymentMethod::OnlineTransfer);
    assert_eq!(view.booking.notes.as_deref(), Some("arrives late"));
    // Status and acceptance untouched.
    assert_eq!(view.booking.status, BookingStatus::PendingBranchAcceptance);
}

#[tokio::test]
async fn metadata_is_frozen_after_checkout() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();
    workflow.check_out(&ctx(), &stay.booking.id).await.unwrap();

    let err = workflow
        .update_booking_metadata(
            &ctx(),
            &stay.booking.id,
            UpdateMetadataRequest {
                client_name: "Too Late".to_string(),
                payment_method: PaymentMethod::Cash,
                notes: None,
            },
        )
        .await
        .expect_err("terminal booking metadata is frozen");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn active_booking_for_room_tracks_occupancy() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    assert!(workflow
        .get_active_booking_for_room(&room.id)
        .await
        .unwrap()
        .is_none());

    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();
    let active = workflow
        .get_active_booking_for_room(&room.id)
        .await
        .unwrap()
        .expect("occupied room has an active booking");
    assert_eq!(active.booking.id, stay.booking.id);

    workflow.check_out(&ctx(), &stay.booking.id).await.unwrap();
    assert!(workflow
        .get_active_booking_for_room(&room.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn foreign_branch_booking_is_invisible() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .unwrap();

    let mut foreign = ctx();
    foreign.branch_id = "branch-other".to_string();

    let err = workflow
        .check_out(&foreign, &stay.booking.id)
        .await
        .expect_err("foreign branch must not see the booking");
    assert_eq!(err.kind, ErrorKind::PreconditionFailed);
}

// =============================================================================
// Activity log
// =============================================================================

/// Collaborator that rejects every entry, simulating an offline audit
/// service.
struct RejectingLog;

impl veranda_db::ActivityLog for RejectingLog {
    fn record(&self, _entry: veranda_db::ActivityEntry) -> Result<(), String> {
        Err("audit service unreachable".to_string())
    }
}

/// An audit failure is logged and swallowed; the primary operation
/// commits and stays committed.
#[tokio::test]
async fn failing_activity_log_never_fails_a_command() {
    let db = test_db().await.with_activity_log(Arc::new(RejectingLog));
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let stay = workflow
        .create_immediate_stay(&ctx(), stay_request(&room, &rate))
        .await
        .expect("create succeeds despite rejected audit entry");

    let view = workflow
        .check_out(&ctx(), &stay.booking.id)
        .await
        .expect("checkout succeeds despite rejected audit entry");
    assert_eq!(view.booking.status, BookingStatus::CheckedOut);

    // The committed state survived the collaborator failure.
    let stored = db
        .workflow()
        .get_booking(&stay.booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.booking.status, BookingStatus::CheckedOut);
}

// =============================================================================
// Concurrency
// =============================================================================

/// Two callers race to book the same room; exactly one may win.
///
/// Uses a file-backed database so the contenders hold separate
/// connections and actually contend for the SQLite write lock.
#[tokio::test]
async fn double_booking_race_has_one_winner() {
    let path = std::env::temp_dir().join(format!("veranda-race-{}.db", Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path)).await.expect("file db");

    let (room, rate) = seed_pair(&db).await;

    let w1 = db.workflow();
    let w2 = db.workflow();
    let caller = ctx();
    let (r1, r2) = tokio::join!(
        w1.create_immediate_stay(&caller, stay_request(&room, &rate)),
        w2.create_immediate_stay(&caller, stay_request(&room, &rate)),
    );

    let outcomes = [r1, r2];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one booking may win the room");

    let loser = outcomes
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one loser");
    assert!(
        matches!(
            loser.kind,
            ErrorKind::PreconditionFailed | ErrorKind::ConcurrencyConflict
        ),
        "loser got {:?}: {}",
        loser.kind,
        loser.message
    );

    let stored = db.rooms().get_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(stored.availability, RoomAvailability::Occupied);
    assert_bindings_consistent(&db).await;

    db.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

/// A guarded booking transition that lost its race maps to a conflict.
#[tokio::test]
async fn stale_transition_is_a_conflict() {
    let db = test_db().await;
    let (room, rate) = seed_pair(&db).await;
    let workflow = db.workflow();

    let slot = Utc::now() + Duration::hours(4);
    let mut request = stay_request(&room, &rate);
    request.reserved_check_in = Some(slot);
    let reservation = workflow
        .create_room_reservation(&ctx(), request)
        .await
        .unwrap();

    // The reservation is cancelled out from under a stale caller.
    workflow
        .cancel_booking(&ctx(), &reservation.booking.id)
        .await
        .unwrap();

    let mut conn = db.pool().acquire().await.unwrap();
    let err = veranda_db::BookingRepository::check_in_reserved(&mut conn, &reservation.booking.id, Utc::now())
        .await
        .expect_err("stale guarded write must conflict");
    assert!(matches!(err, veranda_db::DbError::Conflict { .. }));
}
