//! # Booking Repository
//!
//! Database operations for booking rows.
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Row Lifecycle                             │
//! │                                                                         │
//! │  1. INSERT                                                              │
//! │     └── insert() - one workflow entry point writes the full row         │
//! │                                                                         │
//! │  2. GUARDED TRANSITIONS (in-place UPDATE, one per workflow command)     │
//! │     └── set_accepted() / set_declined()                                 │
//! │     └── assign_room() / check_in_reserved()                             │
//! │     └── finalize_checkout()                                             │
//! │     └── cancel()                                                        │
//! │     └── update_metadata()                                               │
//! │         Every UPDATE re-checks the expected source status in its        │
//! │         WHERE clause; zero rows affected → DbError::Conflict            │
//! │                                                                         │
//! │  3. NEVER DELETED                                                       │
//! │     └── checked_out / voided_cancelled / admin_reservation_declined     │
//! │         rows are retained history                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use veranda_core::{Booking, BookingStatus, PaymentMethod};

const BOOKING_COLUMNS: &str = "id, tenant_id, branch_id, room_id, rate_id, client_name, \
                               payment_method, notes, check_in_at, check_out_at, \
                               reserved_check_in_at, reserved_check_out_at, status, \
                               payment_status, acceptance, hours_used, total_cents, \
                               tender_cents, created_by, checked_out_by, origin, \
                               created_at, updated_at";

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Gets a booking by ID (unlocked read).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    // =========================================================================
    // Transaction-scoped operations (workflow engine only)
    // =========================================================================

    /// Reads a booking inside a workflow transaction.
    pub async fn fetch_for_update(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(booking)
    }

    /// Inserts a complete booking row.
    pub async fn insert(conn: &mut SqliteConnection, booking: &Booking) -> DbResult<()> {
        debug!(id = %booking.id, status = ?booking.status, "Inserting booking");

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, tenant_id, branch_id, room_id, rate_id, client_name,
                payment_method, notes, check_in_at, check_out_at,
                reserved_check_in_at, reserved_check_out_at, status,
                payment_status, acceptance, hours_used, total_cents,
                tender_cents, created_by, checked_out_by, origin,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15, ?16, ?17,
                ?18, ?19, ?20, ?21,
                ?22, ?23
            )
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.tenant_id)
        .bind(&booking.branch_id)
        .bind(&booking.room_id)
        .bind(&booking.rate_id)
        .bind(&booking.client_name)
        .bind(booking.payment_method)
        .bind(&booking.notes)
        .bind(booking.check_in_at)
        .bind(booking.check_out_at)
        .bind(booking.reserved_check_in_at)
        .bind(booking.reserved_check_out_at)
        .bind(booking.status)
        .bind(booking.payment_status)
        .bind(booking.acceptance)
        .bind(booking.hours_used)
        .bind(booking.total_cents)
        .bind(booking.tender_cents)
        .bind(&booking.created_by)
        .bind(&booking.checked_out_by)
        .bind(booking.origin)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Accepts a pending admin-originated booking.
    pub async fn set_accepted(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = 'reservation_no_room',
                acceptance = 'accepted',
                updated_at = ?2
            WHERE id = ?1
              AND status = 'pending_branch_acceptance'
              AND acceptance = 'pending'
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Booking", id));
        }

        Ok(())
    }

    /// Declines a pending admin-originated booking. Terminal.
    pub async fn set_declined(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = 'admin_reservation_declined',
                acceptance = 'not_accepted',
                updated_at = ?2
            WHERE id = ?1
              AND status = 'pending_branch_acceptance'
              AND acceptance = 'pending'
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Booking", id));
        }

        Ok(())
    }

    /// Binds a room to an unassigned reservation and checks the guest in.
    ///
    /// Guarded on the exact source status observed by the workflow's read
    /// and on the booking still having no room.
    pub async fn assign_room(
        conn: &mut SqliteConnection,
        id: &str,
        room_id: &str,
        check_in_at: DateTime<Utc>,
        expected: BookingStatus,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                room_id = ?2,
                status = 'checked_in',
                check_in_at = ?3,
                updated_at = ?4
            WHERE id = ?1
              AND status = ?5
              AND room_id IS NULL
            "#,
        )
        .bind(id)
        .bind(room_id)
        .bind(check_in_at)
        .bind(Utc::now())
        .bind(expected)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Booking", id));
        }

        Ok(())
    }

    /// Checks in a reservation that already holds a room.
    pub async fn check_in_reserved(
        conn: &mut SqliteConnection,
        id: &str,
        check_in_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = 'checked_in',
                check_in_at = ?2,
                updated_at = ?3
            WHERE id = ?1
              AND status = 'reservation_with_room'
            "#,
        )
        .bind(id)
        .bind(check_in_at)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Booking", id));
        }

        Ok(())
    }

    /// Finalizes checkout: bill, timestamps, actor, paid.
    #[allow(clippy::too_many_arguments)]
    pub async fn finalize_checkout(
        conn: &mut SqliteConnection,
        id: &str,
        check_out_at: DateTime<Utc>,
        hours_used: i64,
        total_cents: i64,
        checked_out_by: &str,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = 'checked_out',
                payment_status = 'paid',
                check_out_at = ?2,
                hours_used = ?3,
                total_cents = ?4,
                checked_out_by = ?5,
                updated_at = ?6
            WHERE id = ?1
              AND status = 'checked_in'
            "#,
        )
        .bind(id)
        .bind(check_out_at)
        .bind(hours_used)
        .bind(total_cents)
        .bind(checked_out_by)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Booking", id));
        }

        Ok(())
    }

    /// Cancels a pre-occupancy reservation. Terminal.
    pub async fn cancel(
        conn: &mut SqliteConnection,
        id: &str,
        expected: BookingStatus,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = 'voided_cancelled',
                updated_at = ?2
            WHERE id = ?1
              AND status = ?3
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(expected)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Booking", id));
        }

        Ok(())
    }

    /// Updates client-facing metadata without touching status or binding.
    pub async fn update_metadata(
        conn: &mut SqliteConnection,
        id: &str,
        client_name: &str,
        payment_method: PaymentMethod,
        notes: Option<&str>,
        expected: BookingStatus,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                client_name = ?2,
                payment_method = ?3,
                notes = ?4,
                updated_at = ?5
            WHERE id = ?1
              AND status = ?6
            "#,
        )
        .bind(id)
        .bind(client_name)
        .bind(payment_method)
        .bind(notes)
        .bind(Utc::now())
        .bind(expected)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Booking", id));
        }

        Ok(())
    }
}
