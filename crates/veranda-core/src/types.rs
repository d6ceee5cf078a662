//! # Domain Types
//!
//! Core domain types used throughout Veranda.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Room       │   │      Rate       │   │     Booking     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  label          │   │  price_cents    │   │  status         │       │
//! │  │  availability   │   │  included_hours │   │  payment_status │       │
//! │  │  bound_booking  │   │  excess_price   │   │  acceptance     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Every status dimension is a closed enum:                               │
//! │    BookingStatus, PaymentStatus, AcceptanceStatus,                      │
//! │    RoomAvailability, CleaningStatus, RoomLifecycle, RateLifecycle       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Binding Invariant
//! `room.bound_booking_id.is_some()` ⇔ `room.availability ∈ {Occupied, Reserved}`.
//! Only the workflow engine writes these two fields, and always together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Room Lifecycle
// =============================================================================

/// Catalog lifecycle of a room. Archived rooms are kept for history but can
/// never be bound to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoomLifecycle {
    Active,
    Archived,
}

// =============================================================================
// Room Availability
// =============================================================================

/// Occupancy state of a room.
///
/// ## Pairing With Binding
/// `Occupied` and `Reserved` always come with a bound booking;
/// `Available` always comes with no binding. See the invariant note above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoomAvailability {
    /// Free for a walk-in or a reservation.
    Available,
    /// A guest is checked in right now.
    Occupied,
    /// Held for an advance reservation; no guest inside yet.
    Reserved,
}

// =============================================================================
// Cleaning Status
// =============================================================================

/// Housekeeping state of a room.
///
/// ## Ownership
/// This engine only *reads* the cleaning state (a room must be `Clean` to be
/// booked). Writing it is the housekeeping workflow's job - checkout
/// deliberately does NOT flip a room to `Dirty` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStatus {
    Clean,
    Dirty,
    Inspection,
    OutOfOrder,
}

// =============================================================================
// Rate Lifecycle
// =============================================================================

/// Catalog lifecycle of a rate. Archived rates stay referenced by historical
/// bookings but cannot be attached to new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RateLifecycle {
    Active,
    Archived,
}

// =============================================================================
// Booking Status
// =============================================================================

/// Lifecycle status of a booking.
///
/// ## State Machine
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  create (staff, no room) ──► RESERVATION_NO_ROOM ──┐                    │
/// │  create (staff, future)  ──► ADVANCE_RESERVATION ──┤ assign room        │
/// │                                   ▲                ▼                    │
/// │  create (admin) ──► PENDING ──────┘ accept      CHECKED_IN ──► CHECKED  │
/// │                        │                           ▲           _OUT     │
/// │                        │ decline                   │ arrives            │
/// │                        ▼                           │                    │
/// │                   ADMIN_DECLINED          RESERVATION_WITH_ROOM         │
/// │                                                    ▲                    │
/// │  create (room + future window) ────────────────────┘                    │
/// │                                                                         │
/// │  {RESERVATION_NO_ROOM, ADVANCE, WITH_ROOM} ──cancel──► VOIDED_CANCELLED │
/// │                                                                         │
/// │  Terminal: CHECKED_OUT, VOIDED_CANCELLED, ADMIN_DECLINED                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// The allowed edges are enforced by [`crate::status::validate_transition`];
/// nothing else in the codebase compares raw status values to decide a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Reservation with a selected (or pending) rate but no room yet.
    ReservationNoRoom,
    /// Same as `ReservationNoRoom`, but for a future date window.
    AdvanceReservationNoRoom,
    /// Admin-originated booking awaiting branch accept/decline.
    PendingBranchAcceptance,
    /// Branch declined an admin-originated booking. Terminal.
    AdminReservationDeclined,
    /// Advance reservation with a room already held (`Reserved`).
    ReservationWithRoom,
    /// Guest is in the room; the room is `Occupied`.
    CheckedIn,
    /// Stay finished and billed. Terminal.
    CheckedOut,
    /// Reservation cancelled before occupancy. Terminal.
    VoidedCancelled,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing collected yet; settled at checkout.
    Unpaid,
    /// Fully settled.
    Paid,
    /// A deposit was collected for an advance reservation.
    AdvancePaid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

// =============================================================================
// Acceptance Status
// =============================================================================

/// Acceptance gate for bookings originated outside the branch.
///
/// Staff-originated bookings are self-accepted; admin-originated ones sit in
/// `Pending` until a branch actor explicitly accepts or declines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceStatus {
    /// No acceptance gate applies (bookings created with a room).
    Default,
    /// Branch declined the booking.
    NotAccepted,
    /// Branch accepted the booking (or it was self-accepted).
    Accepted,
    /// Awaiting the branch's decision.
    Pending,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment at the desk.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Bank/app transfer, reconciled out of band.
    OnlineTransfer,
}

// =============================================================================
// Booking Origin
// =============================================================================

/// Who created the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingOrigin {
    /// Created by branch staff at the front desk.
    Staff,
    /// Created by central administration; must pass the acceptance gate.
    Admin,
}

// =============================================================================
// Room
// =============================================================================

/// A physical room in a branch.
///
/// Rate compatibility is an explicit association (`room_rates` table) owned
/// by the room aggregate, validated against the live rate catalog when a
/// booking is made - never trusted from the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this room belongs to.
    pub tenant_id: String,

    /// Branch this room belongs to.
    pub branch_id: String,

    /// Door label shown to staff ("101", "Deluxe 2A").
    pub label: String,

    /// Catalog lifecycle (active / archived).
    pub lifecycle: RoomLifecycle,

    /// Occupancy state.
    pub availability: RoomAvailability,

    /// Housekeeping state (read-only for this engine).
    pub cleaning: CleaningStatus,

    /// The booking currently bound to this room, if any.
    pub bound_booking_id: Option<String>,

    /// When the room was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the room was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Checks the binding invariant for this row.
    ///
    /// `bound_booking_id` is set exactly when the room is occupied or
    /// reserved. The workflow tests assert this between every operation.
    pub fn binding_is_consistent(&self) -> bool {
        let held = matches!(
            self.availability,
            RoomAvailability::Occupied | RoomAvailability::Reserved
        );
        self.bound_booking_id.is_some() == held
    }

    /// Checks whether the room can accept a new booking right now.
    pub fn is_bookable(&self) -> bool {
        self.lifecycle == RoomLifecycle::Active
            && self.availability == RoomAvailability::Available
            && self.cleaning == CleaningStatus::Clean
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A priced duration offer for a branch.
///
/// Example: 500.00 for 3 included hours, then 100.00 per excess hour.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Rate {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Branch this rate belongs to.
    pub branch_id: String,

    /// Display name ("3 Hours", "Overnight").
    pub name: String,

    /// Catalog lifecycle (active / archived).
    pub lifecycle: RateLifecycle,

    /// Base price in cents for the included duration.
    pub price_cents: i64,

    /// Hours covered by the base price.
    pub included_hours: i64,

    /// Price in cents per hour past the included duration.
    /// `None` means excess hours are not separately billed.
    pub excess_price_cents: Option<i64>,

    /// When the rate was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the rate was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Rate {
    /// Returns the base price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the excess-hour price, if one is configured.
    #[inline]
    pub fn excess_price(&self) -> Option<Money> {
        self.excess_price_cents.map(Money::from_cents)
    }

    /// Builds an active rate with fixed timestamps. Test and doc helper.
    pub fn sample(
        id: &str,
        branch_id: &str,
        price_cents: i64,
        included_hours: i64,
        excess_price_cents: Option<i64>,
    ) -> Self {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        Rate {
            id: id.to_string(),
            branch_id: branch_id.to_string(),
            name: format!("{} Hours", included_hours),
            lifecycle: RateLifecycle::Active,
            price_cents,
            included_hours,
            excess_price_cents,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Booking
// =============================================================================

/// One reservation/stay from creation to a terminal state.
///
/// ## Lifecycle
/// A booking is created by exactly one workflow entry point, mutated in
/// place by workflow transitions, and never deleted - `CheckedOut`,
/// `VoidedCancelled` and `AdminReservationDeclined` are retained rows.
/// `status`, `check_in_at` and `check_out_at` are the only historical
/// markers; there is no separate transition log.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Booking {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this booking belongs to.
    pub tenant_id: String,

    /// Branch this booking belongs to.
    pub branch_id: String,

    /// The bound room, if any.
    pub room_id: Option<String>,

    /// The selected rate. May be chosen later for unassigned reservations.
    pub rate_id: Option<String>,

    /// Guest-facing client name.
    pub client_name: String,

    /// How the guest pays (or intends to pay).
    pub payment_method: PaymentMethod,

    /// Free-form front-desk notes.
    pub notes: Option<String>,

    /// Effective start of occupancy. Set at check-in.
    #[ts(as = "Option<String>")]
    pub check_in_at: Option<DateTime<Utc>>,

    /// End of occupancy. Set at checkout.
    #[ts(as = "Option<String>")]
    pub check_out_at: Option<DateTime<Utc>>,

    /// Booked arrival slot for advance reservations.
    #[ts(as = "Option<String>")]
    pub reserved_check_in_at: Option<DateTime<Utc>>,

    /// Booked departure slot for advance reservations.
    #[ts(as = "Option<String>")]
    pub reserved_check_out_at: Option<DateTime<Utc>>,

    /// Lifecycle status (see the state machine on [`BookingStatus`]).
    pub status: BookingStatus,

    /// Payment state.
    pub payment_status: PaymentStatus,

    /// Acceptance gate state.
    pub acceptance: AcceptanceStatus,

    /// Billed hours. Set only at checkout.
    pub hours_used: Option<i64>,

    /// Billed total in cents. Set at checkout, or at creation if pre-paid.
    pub total_cents: Option<i64>,

    /// Cash tendered at the desk, in cents.
    pub tender_cents: Option<i64>,

    /// Actor who created the booking.
    pub created_by: String,

    /// Actor who performed checkout.
    pub checked_out_by: Option<String>,

    /// Staff vs. admin origin.
    pub origin: BookingOrigin,

    /// When the booking was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the booking was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Resolves the effective check-in time when a room is assigned.
    ///
    /// Advance reservations keep their booked slot: the guest is treated as
    /// arriving at `reserved_check_in_at`. Same-day bookings with no slot
    /// use the wall clock passed by the caller.
    #[inline]
    pub fn effective_check_in(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.reserved_check_in_at.unwrap_or(now)
    }

    /// Returns the billed total as Money, if set.
    #[inline]
    pub fn total(&self) -> Option<Money> {
        self.total_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_room(availability: RoomAvailability, bound: Option<&str>) -> Room {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        Room {
            id: "room-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            branch_id: "branch-1".to_string(),
            label: "101".to_string(),
            lifecycle: RoomLifecycle::Active,
            availability,
            cleaning: CleaningStatus::Clean,
            bound_booking_id: bound.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_binding_invariant() {
        assert!(sample_room(RoomAvailability::Available, None).binding_is_consistent());
        assert!(sample_room(RoomAvailability::Occupied, Some("b-1")).binding_is_consistent());
        assert!(sample_room(RoomAvailability::Reserved, Some("b-1")).binding_is_consistent());

        assert!(!sample_room(RoomAvailability::Available, Some("b-1")).binding_is_consistent());
        assert!(!sample_room(RoomAvailability::Occupied, None).binding_is_consistent());
    }

    #[test]
    fn test_room_bookable() {
        let room = sample_room(RoomAvailability::Available, None);
        assert!(room.is_bookable());

        let mut dirty = room.clone();
        dirty.cleaning = CleaningStatus::Dirty;
        assert!(!dirty.is_bookable());

        let mut archived = room.clone();
        archived.lifecycle = RoomLifecycle::Archived;
        assert!(!archived.is_bookable());

        let occupied = sample_room(RoomAvailability::Occupied, Some("b-1"));
        assert!(!occupied.is_bookable());
    }

    #[test]
    fn test_effective_check_in_prefers_reserved_slot() {
        let now = DateTime::<Utc>::UNIX_EPOCH + Duration::days(10);
        let slot = now - Duration::hours(2);

        let mut booking = sample_booking();
        assert_eq!(booking.effective_check_in(now), now);

        booking.reserved_check_in_at = Some(slot);
        assert_eq!(booking.effective_check_in(now), slot);
    }

    fn sample_booking() -> Booking {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        Booking {
            id: "booking-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            branch_id: "branch-1".to_string(),
            room_id: None,
            rate_id: Some("rate-1".to_string()),
            client_name: "Walk-in Guest".to_string(),
            payment_method: PaymentMethod::Cash,
            notes: None,
            check_in_at: None,
            check_out_at: None,
            reserved_check_in_at: None,
            reserved_check_out_at: None,
            status: BookingStatus::ReservationNoRoom,
            payment_status: PaymentStatus::Unpaid,
            acceptance: AcceptanceStatus::Accepted,
            hours_used: None,
            total_cents: None,
            tender_cents: None,
            created_by: "actor-1".to_string(),
            checked_out_by: None,
            origin: BookingOrigin::Staff,
            created_at: now,
            updated_at: now,
        }
    }
}
