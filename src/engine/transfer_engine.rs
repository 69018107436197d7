//! Transfer Engine
//!
//! The money-movement state machine. Every operation follows the same
//! skeleton: validate the request before any lock is taken, open an atomic
//! scope, lock the wallet rows in ascending-id order, re-check the business
//! invariants against the locked snapshots, append the ledger entry, adjust
//! the balance(s), commit. Any failure after the scope opens drops the
//! transaction, which rolls back every effect.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::config::LedgerSettings;
use crate::domain::{NewTransaction, Transaction, TransactionKind, Wallet};
use crate::error::{AppError, AppResult};
use crate::store::{TransactionLedger, WalletStore};

use super::{DepositCommand, MovementResult, TransferCommand, WithdrawCommand};

/// Orchestrates WalletStore and TransactionLedger under one atomic scope.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    wallets: WalletStore,
    ledger: TransactionLedger,
    pool: PgPool,
    settings: LedgerSettings,
}

impl TransferEngine {
    pub fn new(pool: PgPool, settings: LedgerSettings) -> Self {
        Self {
            wallets: WalletStore::new(pool.clone()),
            ledger: TransactionLedger::new(pool.clone()),
            pool,
            settings,
        }
    }

    /// Create a wallet with zero balance in the configured currency.
    pub async fn create_wallet(&self, owner_id: i64) -> AppResult<i64> {
        if owner_id <= 0 {
            return Err(AppError::InvalidRequest(
                "user ID must be a positive integer".to_string(),
            ));
        }

        let wallet_id = self
            .wallets
            .create(owner_id, &self.settings.default_currency)
            .await?;

        tracing::info!(wallet_id, owner_id, "wallet created");
        Ok(wallet_id)
    }

    /// Fetch a wallet for its balance. Absent or soft-deleted wallets are
    /// an error here, unlike the raw store lookup.
    pub async fn wallet_balance(&self, wallet_id: i64) -> AppResult<Wallet> {
        if wallet_id <= 0 {
            return Err(AppError::InvalidRequest(
                "wallet ID must be a positive integer".to_string(),
            ));
        }

        self.wallets
            .find(wallet_id)
            .await?
            .ok_or(AppError::WalletNotFound(wallet_id))
    }

    /// Credit a wallet. Fails `BalanceLimitExceeded` if the new balance
    /// would pass the configured ceiling.
    pub async fn deposit(&self, command: DepositCommand) -> AppResult<MovementResult> {
        validate_deposit(&command)?;

        let mut tx = self.pool.begin().await?;

        let wallet = self
            .wallets
            .lock_for_update(&mut tx, command.destination_wallet_id)
            .await?
            .ok_or(AppError::WalletNotFound(command.destination_wallet_id))?;

        if !wallet.within_limit_after_credit(command.amount, self.settings.max_balance_limit) {
            return Err(AppError::BalanceLimitExceeded {
                wallet_id: wallet.id,
                limit: self.settings.max_balance_limit,
            });
        }

        let entry = NewTransaction::credit(wallet.id, command.external_source_id, command.amount);
        let transaction_id = self.ledger.append(&mut tx, &entry).await?;
        self.wallets
            .adjust_balance(&mut tx, wallet.id, command.amount)
            .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id,
            wallet_id = wallet.id,
            amount = command.amount,
            "deposit committed"
        );
        Ok(MovementResult { transaction_id })
    }

    /// Debit a wallet. Fails `InsufficientBalance` if the wallet cannot
    /// cover the amount.
    pub async fn withdraw(&self, command: WithdrawCommand) -> AppResult<MovementResult> {
        validate_withdraw(&command)?;

        let mut tx = self.pool.begin().await?;

        let wallet = self
            .wallets
            .lock_for_update(&mut tx, command.source_wallet_id)
            .await?
            .ok_or(AppError::WalletNotFound(command.source_wallet_id))?;

        if !wallet.has_sufficient_balance(command.amount) {
            return Err(AppError::InsufficientBalance {
                required: command.amount,
                available: wallet.balance,
            });
        }

        let entry =
            NewTransaction::debit(wallet.id, command.external_destination_id, command.amount);
        let transaction_id = self.ledger.append(&mut tx, &entry).await?;
        self.wallets
            .adjust_balance(&mut tx, wallet.id, -command.amount)
            .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id,
            wallet_id = wallet.id,
            amount = command.amount,
            "withdrawal committed"
        );
        Ok(MovementResult { transaction_id })
    }

    /// Move money between two wallets as a single ledger entry.
    ///
    /// Locks are always taken in ascending wallet-id order, regardless of
    /// which side is source. That total order across all concurrent
    /// operations makes a wait cycle, and therefore deadlock, impossible.
    pub async fn transfer(&self, command: TransferCommand) -> AppResult<MovementResult> {
        validate_transfer(&command)?;

        let mut tx = self.pool.begin().await?;

        let (lower_id, higher_id) = if command.source_wallet_id < command.destination_wallet_id {
            (command.source_wallet_id, command.destination_wallet_id)
        } else {
            (command.destination_wallet_id, command.source_wallet_id)
        };

        let lower = self.wallets.lock_for_update(&mut tx, lower_id).await?;
        let higher = self.wallets.lock_for_update(&mut tx, higher_id).await?;

        // Both rows are held; map them back to their requested roles.
        let (source_wallet, destination_wallet) = if lower_id == command.source_wallet_id {
            (lower, higher)
        } else {
            (higher, lower)
        };

        let source_wallet =
            source_wallet.ok_or(AppError::WalletNotFound(command.source_wallet_id))?;
        let destination_wallet =
            destination_wallet.ok_or(AppError::WalletNotFound(command.destination_wallet_id))?;

        if !source_wallet.has_sufficient_balance(command.amount) {
            return Err(AppError::InsufficientBalance {
                required: command.amount,
                available: source_wallet.balance,
            });
        }
        if !destination_wallet
            .within_limit_after_credit(command.amount, self.settings.max_balance_limit)
        {
            return Err(AppError::BalanceLimitExceeded {
                wallet_id: destination_wallet.id,
                limit: self.settings.max_balance_limit,
            });
        }

        // One entry carries both internal references; the transfer is never
        // recorded as two separate legs.
        let entry =
            NewTransaction::transfer(source_wallet.id, destination_wallet.id, command.amount);
        let transaction_id = self.ledger.append(&mut tx, &entry).await?;

        self.wallets
            .adjust_balance(&mut tx, source_wallet.id, -command.amount)
            .await?;
        self.wallets
            .adjust_balance(&mut tx, destination_wallet.id, command.amount)
            .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id,
            source_wallet_id = source_wallet.id,
            destination_wallet_id = destination_wallet.id,
            amount = command.amount,
            "transfer committed"
        );
        Ok(MovementResult { transaction_id })
    }

    /// Ledger entries where the wallet appears as source or destination.
    pub async fn transactions_for_wallet(&self, wallet_id: i64) -> AppResult<Vec<Transaction>> {
        if wallet_id <= 0 {
            return Err(AppError::InvalidRequest(
                "wallet ID must be a positive integer".to_string(),
            ));
        }

        self.ledger.find_by_wallet(wallet_id).await
    }

    /// Ledger entries across all of a user's wallets, with optional kind
    /// and inclusive time-range filters.
    pub async fn transactions_for_user(
        &self,
        user_id: i64,
        kind: Option<TransactionKind>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Transaction>> {
        if user_id <= 0 {
            return Err(AppError::InvalidRequest(
                "user ID must be a positive integer".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if start > end {
                return Err(AppError::InvalidRequest(
                    "start time must be before end time".to_string(),
                ));
            }
        }

        self.ledger
            .find_by_user(user_id, kind, start_time, end_time)
            .await
    }
}

// Preflight checks, run before any atomic scope is opened. Structurally
// invalid requests never reach a lock.

fn validate_deposit(command: &DepositCommand) -> AppResult<()> {
    if command.destination_wallet_id <= 0 {
        return Err(AppError::InvalidRequest(
            "destination wallet ID must be a positive integer".to_string(),
        ));
    }
    if command.amount <= 0 {
        return Err(AppError::InvalidRequest(
            "amount must be a positive integer".to_string(),
        ));
    }
    if matches!(command.external_source_id, Some(id) if id <= 0) {
        return Err(AppError::InvalidRequest(
            "external source ID must be a positive integer if provided".to_string(),
        ));
    }
    Ok(())
}

fn validate_withdraw(command: &WithdrawCommand) -> AppResult<()> {
    if command.source_wallet_id <= 0 {
        return Err(AppError::InvalidRequest(
            "source wallet ID must be a positive integer".to_string(),
        ));
    }
    if command.amount <= 0 {
        return Err(AppError::InvalidRequest(
            "amount must be a positive integer".to_string(),
        ));
    }
    if matches!(command.external_destination_id, Some(id) if id <= 0) {
        return Err(AppError::InvalidRequest(
            "external destination ID must be a positive integer if provided".to_string(),
        ));
    }
    Ok(())
}

fn validate_transfer(command: &TransferCommand) -> AppResult<()> {
    if command.source_wallet_id <= 0 || command.destination_wallet_id <= 0 {
        return Err(AppError::InvalidRequest(
            "source and destination wallet IDs must be positive integers".to_string(),
        ));
    }
    if command.source_wallet_id == command.destination_wallet_id {
        return Err(AppError::InvalidRequest(
            "source and destination wallet IDs must be different".to_string(),
        ));
    }
    if command.amount <= 0 {
        return Err(AppError::InvalidRequest(
            "amount must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_preflight() {
        assert!(validate_deposit(&DepositCommand::new(1, 100)).is_ok());
        assert!(validate_deposit(&DepositCommand::new(0, 100)).is_err());
        assert!(validate_deposit(&DepositCommand::new(1, 0)).is_err());
        assert!(validate_deposit(&DepositCommand::new(1, -5)).is_err());
        assert!(validate_deposit(&DepositCommand::new(1, 100).with_external_source(-1)).is_err());
        assert!(validate_deposit(&DepositCommand::new(1, 100).with_external_source(9)).is_ok());
    }

    #[test]
    fn test_withdraw_preflight() {
        assert!(validate_withdraw(&WithdrawCommand::new(1, 100)).is_ok());
        assert!(validate_withdraw(&WithdrawCommand::new(-1, 100)).is_err());
        assert!(validate_withdraw(&WithdrawCommand::new(1, 0)).is_err());
        assert!(
            validate_withdraw(&WithdrawCommand::new(1, 100).with_external_destination(0)).is_err()
        );
    }

    #[test]
    fn test_transfer_preflight_rejects_same_wallet() {
        let err = validate_transfer(&TransferCommand::new(4, 4, 50)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_transfer_preflight() {
        assert!(validate_transfer(&TransferCommand::new(5, 3, 50)).is_ok());
        assert!(validate_transfer(&TransferCommand::new(0, 3, 50)).is_err());
        assert!(validate_transfer(&TransferCommand::new(5, -3, 50)).is_err());
        assert!(validate_transfer(&TransferCommand::new(5, 3, 0)).is_err());
    }
}
