//! # Rate Repository
//!
//! Read access to the rate catalog.
//!
//! Rate CRUD (create/archive) belongs to the out-of-scope catalog component;
//! this engine only reads rates during booking and billing, plus an insert
//! used by seeding and tests.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use veranda_core::Rate;

const RATE_COLUMNS: &str = "id, branch_id, name, lifecycle, price_cents, included_hours, \
                            excess_price_cents, created_at, updated_at";

/// Repository for rate catalog reads.
#[derive(Debug, Clone)]
pub struct RateRepository {
    pool: SqlitePool,
}

impl RateRepository {
    /// Creates a new RateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RateRepository { pool }
    }

    /// Gets a rate by ID regardless of lifecycle (unlocked read).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Rate>> {
        let rate = sqlx::query_as::<_, Rate>(&format!(
            "SELECT {RATE_COLUMNS} FROM rates WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rate)
    }

    /// Lists active rates for a branch, ordered by included hours.
    pub async fn list_active_for_branch(&self, branch_id: &str) -> DbResult<Vec<Rate>> {
        let rates = sqlx::query_as::<_, Rate>(&format!(
            "SELECT {RATE_COLUMNS} FROM rates \
             WHERE branch_id = ?1 AND lifecycle = 'active' \
             ORDER BY included_hours"
        ))
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    /// Inserts a rate (seeding and tests).
    pub async fn insert(&self, rate: &Rate) -> DbResult<()> {
        debug!(id = %rate.id, name = %rate.name, "Inserting rate");

        sqlx::query(
            r#"
            INSERT INTO rates (
                id, branch_id, name, lifecycle,
                price_cents, included_hours, excess_price_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&rate.id)
        .bind(&rate.branch_id)
        .bind(&rate.name)
        .bind(rate.lifecycle)
        .bind(rate.price_cents)
        .bind(rate.included_hours)
        .bind(rate.excess_price_cents)
        .bind(rate.created_at)
        .bind(rate.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Transaction-scoped operations (workflow engine only)
    // =========================================================================

    /// Fetches an ACTIVE rate belonging to `branch_id`.
    ///
    /// Returns `None` for unknown, archived, or foreign-branch rates - the
    /// workflow reports all three the same way, as a failed precondition.
    pub async fn fetch_active(
        conn: &mut SqliteConnection,
        rate_id: &str,
        branch_id: &str,
    ) -> DbResult<Option<Rate>> {
        let rate = sqlx::query_as::<_, Rate>(&format!(
            "SELECT {RATE_COLUMNS} FROM rates \
             WHERE id = ?1 AND branch_id = ?2 AND lifecycle = 'active'"
        ))
        .bind(rate_id)
        .bind(branch_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(rate)
    }

    /// Fetches a rate by ID for billing.
    ///
    /// No lifecycle filter: a stay billed under a since-archived rate is
    /// still billed under that rate.
    pub async fn fetch_for_billing(
        conn: &mut SqliteConnection,
        rate_id: &str,
    ) -> DbResult<Option<Rate>> {
        let rate = sqlx::query_as::<_, Rate>(&format!(
            "SELECT {RATE_COLUMNS} FROM rates WHERE id = ?1"
        ))
        .bind(rate_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(rate)
    }
}
