//! Wallet Store
//!
//! Owns the wallet rows: creation, point lookup, balance mutation, and
//! locked-for-update retrieval. Lock acquisition is non-blocking
//! (`FOR UPDATE NOWAIT`); contention surfaces immediately as
//! `AppError::WalletLocked` instead of waiting.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::Wallet;
use crate::error::{AppError, AppResult};

/// Postgres SQLSTATE raised by `FOR UPDATE NOWAIT` when the row is held
/// by another transaction (lock_not_available).
const SQLSTATE_LOCK_NOT_AVAILABLE: &str = "55P03";

type WalletRow = (
    i64,
    i64,
    i64,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    bool,
    Option<DateTime<Utc>>,
);

fn wallet_from_row(row: WalletRow) -> Wallet {
    let (id, owner_id, balance, currency, created_at, updated_at, is_deleted, deleted_at) = row;
    Wallet {
        id,
        owner_id,
        balance,
        currency,
        created_at,
        updated_at,
        is_deleted,
        deleted_at,
    }
}

/// Repository for wallet rows
#[derive(Debug, Clone)]
pub struct WalletStore {
    pool: PgPool,
}

impl WalletStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new wallet with zero balance in the given currency.
    pub async fn create(&self, owner_id: i64, currency: &str) -> AppResult<i64> {
        let wallet_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO wallets (owner_id, balance, currency)
            VALUES ($1, 0, $2)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(currency)
        .fetch_one(&self.pool)
        .await?;

        Ok(wallet_id)
    }

    /// Point lookup, soft-delete filtered. Absent wallets are `None`,
    /// not an error.
    pub async fn find(&self, wallet_id: i64) -> AppResult<Option<Wallet>> {
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, balance, currency, created_at, updated_at, is_deleted, deleted_at
            FROM wallets
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(wallet_from_row))
    }

    /// Acquire a row-exclusive lock on the wallet inside the given atomic
    /// scope without waiting. Returns `None` for absent or soft-deleted
    /// wallets, `AppError::WalletLocked` if another in-flight operation
    /// already holds the row.
    pub async fn lock_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet_id: i64,
    ) -> AppResult<Option<Wallet>> {
        let result: Result<Option<WalletRow>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT id, owner_id, balance, currency, created_at, updated_at, is_deleted, deleted_at
            FROM wallets
            WHERE id = $1 AND is_deleted = FALSE
            FOR UPDATE NOWAIT
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&mut **tx)
        .await;

        match result {
            Ok(row) => Ok(row.map(wallet_from_row)),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(SQLSTATE_LOCK_NOT_AVAILABLE) =>
            {
                Err(AppError::WalletLocked(wallet_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add `delta` (positive or negative) to the wallet balance inside the
    /// given atomic scope. The caller must already hold the row lock and
    /// have validated the resulting balance; no re-validation happens here.
    pub async fn adjust_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet_id: i64,
        delta: i64,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance + $1, updated_at = NOW()
            WHERE id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(delta)
        .bind(wallet_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
