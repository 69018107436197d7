//! Transaction Ledger
//!
//! Owns the append-only transaction records: insertion inside an atomic
//! scope, plus the two read patterns (by wallet, by owning user with
//! optional filters). Entries touching soft-deleted wallets are excluded
//! from every query.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction as PgTransaction};

use crate::domain::{NewTransaction, PartyRef, Transaction, TransactionKind};
use crate::error::AppResult;

type TransactionRow = (
    i64,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    String,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
    bool,
    Option<DateTime<Utc>>,
);

fn transaction_from_row(row: TransactionRow) -> Result<Transaction, sqlx::Error> {
    let (
        id,
        source_wallet_id,
        external_source_id,
        destination_wallet_id,
        external_destination_id,
        kind,
        amount,
        created_at,
        updated_at,
        is_deleted,
        deleted_at,
    ) = row;

    let kind: TransactionKind = kind
        .parse()
        .map_err(|e: String| sqlx::Error::Decode(Box::from(e)))?;

    Ok(Transaction {
        id,
        source: PartyRef::from_columns(source_wallet_id, external_source_id),
        destination: PartyRef::from_columns(destination_wallet_id, external_destination_id),
        kind,
        amount,
        created_at,
        updated_at,
        is_deleted,
        deleted_at,
    })
}

/// Repository for immutable ledger entries
#[derive(Debug, Clone)]
pub struct TransactionLedger {
    pool: PgPool,
}

impl TransactionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a ledger entry inside the given atomic scope.
    pub async fn append(
        &self,
        tx: &mut PgTransaction<'_, Postgres>,
        entry: &NewTransaction,
    ) -> AppResult<i64> {
        let (source_wallet_id, external_source_id) = PartyRef::into_columns(entry.source);
        let (destination_wallet_id, external_destination_id) =
            PartyRef::into_columns(entry.destination);

        let transaction_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (
                source_wallet_id, external_source_id,
                destination_wallet_id, external_destination_id,
                kind, amount
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(source_wallet_id)
        .bind(external_source_id)
        .bind(destination_wallet_id)
        .bind(external_destination_id)
        .bind(entry.kind.as_str())
        .bind(entry.amount)
        .fetch_one(&mut **tx)
        .await?;

        Ok(transaction_id)
    }

    /// All non-deleted transactions where the wallet appears as internal
    /// source or destination, in storage order.
    pub async fn find_by_wallet(&self, wallet_id: i64) -> AppResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT t.id, t.source_wallet_id, t.external_source_id,
                   t.destination_wallet_id, t.external_destination_id,
                   t.kind, t.amount, t.created_at, t.updated_at, t.is_deleted, t.deleted_at
            FROM transactions t
            LEFT JOIN wallets src ON src.id = t.source_wallet_id
            LEFT JOIN wallets dst ON dst.id = t.destination_wallet_id
            WHERE (t.source_wallet_id = $1 OR t.destination_wallet_id = $1)
              AND t.is_deleted = FALSE
              AND COALESCE(src.is_deleted, FALSE) = FALSE
              AND COALESCE(dst.is_deleted, FALSE) = FALSE
            ORDER BY t.id
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| transaction_from_row(row).map_err(Into::into))
            .collect()
    }

    /// Transactions joined through wallet ownership, with an optional kind
    /// filter and inclusive time bounds. Omitted filters are unrestricted.
    pub async fn find_by_user(
        &self,
        user_id: i64,
        kind: Option<TransactionKind>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT t.id, t.source_wallet_id, t.external_source_id,
                   t.destination_wallet_id, t.external_destination_id,
                   t.kind, t.amount, t.created_at, t.updated_at, t.is_deleted, t.deleted_at
            FROM transactions t
            JOIN wallets w ON (t.source_wallet_id = w.id OR t.destination_wallet_id = w.id)
            LEFT JOIN wallets src ON src.id = t.source_wallet_id
            LEFT JOIN wallets dst ON dst.id = t.destination_wallet_id
            WHERE w.owner_id = $1
              AND w.is_deleted = FALSE
              AND t.is_deleted = FALSE
              AND COALESCE(src.is_deleted, FALSE) = FALSE
              AND COALESCE(dst.is_deleted, FALSE) = FALSE
              AND ($2::TEXT IS NULL OR t.kind = $2)
              AND ($3::TIMESTAMPTZ IS NULL OR t.created_at >= $3)
              AND ($4::TIMESTAMPTZ IS NULL OR t.created_at <= $4)
            ORDER BY t.id
            "#,
        )
        .bind(user_id)
        .bind(kind.map(|k| k.as_str()))
        .bind(start_time)
        .bind(end_time)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| transaction_from_row(row).map_err(Into::into))
            .collect()
    }
}
