//! Wallet entity
//!
//! A wallet holds a single balance in the smallest currency unit.
//! Soft-deleted wallets are invisible to every lookup and mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A wallet row as read from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Wallet {
    pub id: i64,
    pub owner_id: i64,
    /// Balance in the smallest currency unit (e.g. paise for INR).
    /// Invariant: 0 <= balance <= configured max balance limit.
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Whether `amount` can be debited without going negative.
    pub fn has_sufficient_balance(&self, amount: i64) -> bool {
        self.balance >= amount
    }

    /// Whether crediting `amount` stays within `limit`.
    /// Overflowing i64 counts as exceeding the limit.
    pub fn within_limit_after_credit(&self, amount: i64, limit: i64) -> bool {
        match self.balance.checked_add(amount) {
            Some(total) => total <= limit,
            None => false,
        }
    }
}
