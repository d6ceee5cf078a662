//! # Booking Lifecycle State Machine
//!
//! The single place where booking status transitions are validated.
//!
//! ## Why Centralize This?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Transition Validation                              │
//! │                                                                         │
//! │  Workflow operation (check_out, cancel_booking, ...)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_transition(current, target)  ← THIS MODULE                   │
//! │       │                                                                 │
//! │       ├── Ok(())            → proceed with the guarded writes           │
//! │       └── Err(Transition..) → PreconditionFailed, zero writes           │
//! │                                                                         │
//! │  Call sites never compare status values themselves. Adding a state     │
//! │  or an edge is a change to exactly one exhaustive match.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An operation applied to a booking outside its required source state fails
//! loudly - there are no silent no-ops anywhere in the workflow.

use thiserror::Error;

use crate::types::BookingStatus;

// =============================================================================
// Transition Error
// =============================================================================

/// A lifecycle move that the state machine does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid booking transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

// =============================================================================
// Transition Table
// =============================================================================

/// Validates a booking lifecycle transition.
///
/// The match is exhaustive over the source state; every edge of the state
/// machine appears here exactly once:
///
/// - `PendingBranchAcceptance` → `ReservationNoRoom` (accept)
/// - `PendingBranchAcceptance` → `AdminReservationDeclined` (decline)
/// - `ReservationNoRoom` / `AdvanceReservationNoRoom` → `CheckedIn` (assign room)
/// - `ReservationWithRoom` → `CheckedIn` (guest arrives)
/// - `CheckedIn` → `CheckedOut` (checkout)
/// - `ReservationNoRoom` / `AdvanceReservationNoRoom` / `ReservationWithRoom`
///   → `VoidedCancelled` (cancel)
pub fn validate_transition(
    from: BookingStatus,
    to: BookingStatus,
) -> Result<(), InvalidTransition> {
    use BookingStatus::*;

    let allowed = match from {
        PendingBranchAcceptance => matches!(to, ReservationNoRoom | AdminReservationDeclined),
        ReservationNoRoom | AdvanceReservationNoRoom => matches!(to, CheckedIn | VoidedCancelled),
        ReservationWithRoom => matches!(to, CheckedIn | VoidedCancelled),
        CheckedIn => matches!(to, CheckedOut),
        // Terminal states allow nothing.
        CheckedOut | VoidedCancelled | AdminReservationDeclined => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}

// =============================================================================
// Status Predicates
// =============================================================================

impl BookingStatus {
    /// Terminal states admit no further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::CheckedOut
                | BookingStatus::VoidedCancelled
                | BookingStatus::AdminReservationDeclined
        )
    }

    /// States in which a booking has no room and may receive one.
    ///
    /// `PendingBranchAcceptance` is deliberately excluded: an unaccepted
    /// booking is not actionable until the branch accepts it.
    #[inline]
    pub fn can_receive_room(&self) -> bool {
        matches!(
            self,
            BookingStatus::ReservationNoRoom | BookingStatus::AdvanceReservationNoRoom
        )
    }

    /// Pre-occupancy states that cancellation applies to.
    #[inline]
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            BookingStatus::ReservationNoRoom
                | BookingStatus::AdvanceReservationNoRoom
                | BookingStatus::ReservationWithRoom
        )
    }

    /// States in which client-facing metadata may still be edited.
    ///
    /// Everything before occupancy ends: reservations (pending ones too,
    /// a typo in the client name should not require a decline) and active
    /// stays. Terminal states are frozen.
    #[inline]
    pub fn is_metadata_editable(&self) -> bool {
        matches!(
            self,
            BookingStatus::ReservationNoRoom
                | BookingStatus::AdvanceReservationNoRoom
                | BookingStatus::PendingBranchAcceptance
                | BookingStatus::ReservationWithRoom
                | BookingStatus::CheckedIn
        )
    }

    /// States a room may be bound in (the room side of the invariant).
    #[inline]
    pub fn may_hold_room(&self) -> bool {
        matches!(
            self,
            BookingStatus::CheckedIn | BookingStatus::ReservationWithRoom
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    const ALL: [BookingStatus; 8] = [
        ReservationNoRoom,
        AdvanceReservationNoRoom,
        PendingBranchAcceptance,
        AdminReservationDeclined,
        ReservationWithRoom,
        CheckedIn,
        CheckedOut,
        VoidedCancelled,
    ];

    /// The full set of allowed edges, spelled out. Everything else must fail.
    const EDGES: [(BookingStatus, BookingStatus); 9] = [
        (PendingBranchAcceptance, ReservationNoRoom),
        (PendingBranchAcceptance, AdminReservationDeclined),
        (ReservationNoRoom, CheckedIn),
        (ReservationNoRoom, VoidedCancelled),
        (AdvanceReservationNoRoom, CheckedIn),
        (AdvanceReservationNoRoom, VoidedCancelled),
        (ReservationWithRoom, CheckedIn),
        (ReservationWithRoom, VoidedCancelled),
        (CheckedIn, CheckedOut),
    ];

    #[test]
    fn test_every_pair_against_edge_table() {
        for from in ALL {
            for to in ALL {
                let expected = EDGES.contains(&(from, to));
                let actual = validate_transition(from, to).is_ok();
                assert_eq!(
                    actual, expected,
                    "transition {:?} -> {:?}: got {}, expected {}",
                    from, to, actual, expected
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for from in [CheckedOut, VoidedCancelled, AdminReservationDeclined] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(validate_transition(from, to).is_err());
            }
        }
    }

    #[test]
    fn test_pending_cannot_receive_room() {
        assert!(!PendingBranchAcceptance.can_receive_room());
        assert!(ReservationNoRoom.can_receive_room());
        assert!(AdvanceReservationNoRoom.can_receive_room());
        assert!(!ReservationWithRoom.can_receive_room());
    }

    #[test]
    fn test_cancellable_states() {
        assert!(ReservationNoRoom.is_cancellable());
        assert!(AdvanceReservationNoRoom.is_cancellable());
        assert!(ReservationWithRoom.is_cancellable());
        assert!(!CheckedIn.is_cancellable());
        assert!(!PendingBranchAcceptance.is_cancellable());
        assert!(!CheckedOut.is_cancellable());
    }

    #[test]
    fn test_error_message_names_both_states() {
        let err = validate_transition(CheckedOut, CheckedIn).unwrap_err();
        assert_eq!(err.from, CheckedOut);
        assert_eq!(err.to, CheckedIn);
        assert!(err.to_string().contains("CheckedOut"));
    }
}
