//! # Room Repository
//!
//! Database operations for rooms: lookup, binding, and rate compatibility.
//!
//! ## The Guarded Binding Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             Serializing Concurrent Booking Attempts                     │
//! │                                                                         │
//! │  Caller A                          Caller B                             │
//! │  ────────                          ────────                             │
//! │  BEGIN                                                                  │
//! │  read room (available)             BEGIN                                │
//! │  UPDATE rooms SET occupied         read room (available snapshot)       │
//! │    WHERE availability='available'  UPDATE rooms ... ← waits for lock    │
//! │  COMMIT                                                                 │
//! │                                    lock acquired; guard matches 0 rows  │
//! │                                    → DbError::Conflict, ROLLBACK        │
//! │                                                                         │
//! │  The WHERE clause re-checks the expected state under the write lock,    │
//! │  so the room ends bound to exactly one booking.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use veranda_core::{Room, RoomAvailability};

const ROOM_COLUMNS: &str = "id, tenant_id, branch_id, label, lifecycle, availability, cleaning, \
                            bound_booking_id, created_at, updated_at";

/// Repository for room database operations.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Gets a room by ID (unlocked read).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// Lists all rooms for a branch, ordered by label (dashboard read).
    pub async fn list_for_branch(&self, branch_id: &str) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE branch_id = ?1 ORDER BY label"
        ))
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Inserts a room (catalog seeding and tests; catalog CRUD proper lives
    /// outside this engine).
    pub async fn insert(&self, room: &Room) -> DbResult<()> {
        debug!(id = %room.id, label = %room.label, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO rooms (
                id, tenant_id, branch_id, label,
                lifecycle, availability, cleaning, bound_booking_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&room.id)
        .bind(&room.tenant_id)
        .bind(&room.branch_id)
        .bind(&room.label)
        .bind(room.lifecycle)
        .bind(room.availability)
        .bind(room.cleaning)
        .bind(&room.bound_booking_id)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces the set of rates a room offers.
    pub async fn set_compatible_rates(&self, room_id: &str, rate_ids: &[String]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM room_rates WHERE room_id = ?1")
            .bind(room_id)
            .execute(&mut *tx)
            .await?;

        for rate_id in rate_ids {
            sqlx::query("INSERT INTO room_rates (room_id, rate_id) VALUES (?1, ?2)")
                .bind(room_id)
                .bind(rate_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Transaction-scoped operations (workflow engine only)
    // =========================================================================

    /// Reads a room inside a workflow transaction.
    ///
    /// The availability observed here is re-checked by the guard of the
    /// following [`bind`](Self::bind) / [`release`](Self::release) write, so
    /// a stale read can never produce a double binding.
    pub async fn fetch_for_update(
        conn: &mut SqliteConnection,
        room_id: &str,
    ) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?1"
        ))
        .bind(room_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(room)
    }

    /// Binds an AVAILABLE room to a booking.
    ///
    /// `availability` is the new state (Occupied for stays, Reserved for
    /// advance reservations). The guard requires the room to still be
    /// available and unbound; zero rows affected means another caller won
    /// the race and the whole transaction must abort.
    pub async fn bind(
        conn: &mut SqliteConnection,
        room_id: &str,
        booking_id: &str,
        availability: RoomAvailability,
    ) -> DbResult<()> {
        debug!(room_id, booking_id, ?availability, "Binding room");

        let result = sqlx::query(
            r#"
            UPDATE rooms SET
                availability = ?2,
                bound_booking_id = ?3,
                updated_at = ?4
            WHERE id = ?1
              AND availability = 'available'
              AND bound_booking_id IS NULL
            "#,
        )
        .bind(room_id)
        .bind(availability)
        .bind(booking_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Room", room_id));
        }

        Ok(())
    }

    /// Flips a RESERVED room to OCCUPIED when its guest arrives.
    ///
    /// Guarded on the binding still pointing at this booking.
    pub async fn occupy_reserved(
        conn: &mut SqliteConnection,
        room_id: &str,
        booking_id: &str,
    ) -> DbResult<()> {
        debug!(room_id, booking_id, "Occupying reserved room");

        let result = sqlx::query(
            r#"
            UPDATE rooms SET
                availability = 'occupied',
                updated_at = ?3
            WHERE id = ?1
              AND availability = 'reserved'
              AND bound_booking_id = ?2
            "#,
        )
        .bind(room_id)
        .bind(booking_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Room", room_id));
        }

        Ok(())
    }

    /// Releases a room, but only if it is still bound to `booking_id`.
    ///
    /// Returns whether a row was released. Checkout treats `false` as a
    /// conflict; cancellation treats it as "the room was already rebound
    /// to a newer booking, leave it alone".
    pub async fn release(
        conn: &mut SqliteConnection,
        room_id: &str,
        booking_id: &str,
    ) -> DbResult<bool> {
        debug!(room_id, booking_id, "Releasing room");

        let result = sqlx::query(
            r#"
            UPDATE rooms SET
                availability = 'available',
                bound_booking_id = NULL,
                updated_at = ?3
            WHERE id = ?1
              AND bound_booking_id = ?2
            "#,
        )
        .bind(room_id)
        .bind(booking_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether a room offers a rate.
    ///
    /// The compatibility set is the `room_rates` association owned by the
    /// room aggregate - the caller's idea of it is never trusted.
    pub async fn offers_rate(
        conn: &mut SqliteConnection,
        room_id: &str,
        rate_id: &str,
    ) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM room_rates WHERE room_id = ?1 AND rate_id = ?2",
        )
        .bind(room_id)
        .bind(rate_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count > 0)
    }
}
