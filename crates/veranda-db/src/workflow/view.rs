//! # Booking View
//!
//! Read model returned by every workflow command and by the listing
//! queries. A view is the booking row joined with the display names of
//! its room and rate, so callers never issue follow-up lookups to
//! render a line on screen.
//!
//! Views produced inside a command are hydrated on the command's own
//! transaction, so they reflect exactly the state that was committed.

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use ts_rs::TS;

use crate::error::{DbError, DbResult};
use veranda_core::Booking;

/// SELECT list shared by every view query. Aliases keep the joined
/// columns from colliding with the booking columns during row mapping.
const VIEW_COLUMNS: &str = "b.id, b.tenant_id, b.branch_id, b.room_id, b.rate_id, \
                            b.client_name, b.payment_method, b.notes, b.check_in_at, \
                            b.check_out_at, b.reserved_check_in_at, b.reserved_check_out_at, \
                            b.status, b.payment_status, b.acceptance, b.hours_used, \
                            b.total_cents, b.tender_cents, b.created_by, b.checked_out_by, \
                            b.origin, b.created_at, b.updated_at, \
                            rm.label AS room_label, rt.name AS rate_name, \
                            rt.price_cents AS rate_price_cents";

const VIEW_JOINS: &str = "FROM bookings b \
                          LEFT JOIN rooms rm ON rm.id = b.room_id \
                          LEFT JOIN rates rt ON rt.id = b.rate_id";

/// A booking hydrated with room and rate display data.
///
/// `room_label` is `None` for unassigned reservations; `rate_name` is
/// `None` only if the rate row was deleted out-of-band (rates are
/// archived, not deleted, so in practice it is always present).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, TS)]
#[ts(export)]
pub struct BookingView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,

    /// Display label of the assigned room, if any.
    pub room_label: Option<String>,

    /// Display name of the booking's rate.
    pub rate_name: Option<String>,

    /// Current base price of the rate, in cents.
    pub rate_price_cents: Option<i64>,
}

impl BookingView {
    /// Hydrates a view for one booking on an open transaction.
    ///
    /// Used by workflow commands just before commit, so the returned
    /// view matches the state the command is about to publish.
    pub async fn hydrate(conn: &mut SqliteConnection, booking_id: &str) -> DbResult<BookingView> {
        let view = sqlx::query_as::<_, BookingView>(&format!(
            "SELECT {VIEW_COLUMNS} {VIEW_JOINS} WHERE b.id = ?1"
        ))
        .bind(booking_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("Booking", booking_id))?;

        Ok(view)
    }

    /// Fetches a view for one booking outside any transaction.
    pub async fn fetch(pool: &SqlitePool, booking_id: &str) -> DbResult<Option<BookingView>> {
        let view = sqlx::query_as::<_, BookingView>(&format!(
            "SELECT {VIEW_COLUMNS} {VIEW_JOINS} WHERE b.id = ?1"
        ))
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;

        Ok(view)
    }

    /// Lists all bookings for a branch in the given statuses, newest first.
    pub async fn list_for_branch(
        pool: &SqlitePool,
        branch_id: &str,
        statuses: &[&str],
    ) -> DbResult<Vec<BookingView>> {
        // IN-list built from placeholders; status names come from the
        // BookingStatus enum, never from caller input.
        let placeholders: Vec<String> = (0..statuses.len())
            .map(|i| format!("?{}", i + 2))
            .collect();
        let sql = format!(
            "SELECT {VIEW_COLUMNS} {VIEW_JOINS} \
             WHERE b.branch_id = ?1 AND b.status IN ({}) \
             ORDER BY b.created_at DESC",
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, BookingView>(&sql).bind(branch_id);
        for status in statuses {
            query = query.bind(*status);
        }

        let views = query.fetch_all(pool).await?;
        Ok(views)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use veranda_core::{
        AcceptanceStatus, BookingOrigin, BookingStatus, PaymentMethod, PaymentStatus,
    };

    #[test]
    fn test_view_serializes_flattened() {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        let booking = Booking {
            id: "booking-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            branch_id: "branch-1".to_string(),
            room_id: Some("room-1".to_string()),
            rate_id: Some("rate-1".to_string()),
            client_name: "Walk-in Guest".to_string(),
            payment_method: PaymentMethod::Cash,
            notes: None,
            check_in_at: Some(now),
            check_out_at: None,
            reserved_check_in_at: None,
            reserved_check_out_at: None,
            status: BookingStatus::CheckedIn,
            payment_status: PaymentStatus::Unpaid,
            acceptance: AcceptanceStatus::Default,
            hours_used: None,
            total_cents: None,
            tender_cents: None,
            created_by: "actor-1".to_string(),
            checked_out_by: None,
            origin: BookingOrigin::Staff,
            created_at: now,
            updated_at: now,
        };
        let view = BookingView {
            booking,
            room_label: Some("101".to_string()),
            rate_name: Some("Standard".to_string()),
            rate_price_cents: Some(50_000),
        };

        let json = serde_json::to_value(&view).unwrap();
        // Flattened booking fields sit next to the joined columns.
        assert!(json.get("id").is_some());
        assert_eq!(json["room_label"], "101");
        assert_eq!(json["rate_name"], "Standard");
    }
}
