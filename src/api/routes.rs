//! API Routes
//!
//! HTTP endpoint definitions. Handlers stay thin: decode the request,
//! hand it to the transfer engine, encode the result.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::LedgerSettings;
use crate::domain::{PartyRef, Transaction, TransactionKind};
use crate::engine::{DepositCommand, TransferCommand, TransferEngine, WithdrawCommand};
use crate::error::AppError;

/// Shared router state
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: LedgerSettings,
}

impl AppState {
    fn engine(&self) -> TransferEngine {
        TransferEngine::new(self.pool.clone(), self.settings.clone())
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateWalletRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateWalletResponse {
    pub wallet_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub wallet_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletBalanceResponse {
    pub wallet_id: i64,
    pub amount: i64,
}

/// Shared request shape for add, withdraw, and transfer, matching the
/// movement intent: an optional side is an external counterparty for
/// deposits/withdrawals and required for transfers.
#[derive(Debug, Deserialize, Serialize)]
pub struct MovementRequest {
    #[serde(default, rename = "sourceId")]
    pub source_id: Option<i64>,
    #[serde(default, rename = "destinationId")]
    pub destination_id: Option<i64>,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovementResponse {
    #[serde(rename = "transactionId")]
    pub transaction_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UserTransactionsQuery {
    pub user_id: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub start_time_stamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time_stamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_wallet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_source_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_wallet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_destination_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(txn: Transaction) -> Self {
        let (source_wallet_id, external_source_id) = PartyRef::into_columns(txn.source);
        let (destination_wallet_id, external_destination_id) =
            PartyRef::into_columns(txn.destination);
        Self {
            id: txn.id,
            source_wallet_id,
            external_source_id,
            destination_wallet_id,
            external_destination_id,
            kind: txn.kind.to_string(),
            amount: txn.amount,
            created_at: txn.created_at,
            updated_at: txn.updated_at,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/wallets", post(create_wallet))
        .route("/wallets", get(get_wallet_balance))
        .route("/wallets/add", post(add_money))
        .route("/wallets/withdraw", post(withdraw_money))
        .route("/transactions", post(transfer_money))
        .route("/transactions", get(get_transactions_for_user))
        .route("/transactions/wallet", get(get_transactions_for_wallet))
}

// =========================================================================
// Handlers
// =========================================================================

/// POST /wallets - create a wallet for a user
async fn create_wallet(
    State(state): State<AppState>,
    Json(request): Json<CreateWalletRequest>,
) -> Result<(StatusCode, Json<CreateWalletResponse>), AppError> {
    let wallet_id = state.engine().create_wallet(request.user_id).await?;
    Ok((StatusCode::CREATED, Json(CreateWalletResponse { wallet_id })))
}

/// GET /wallets?wallet_id= - current balance
async fn get_wallet_balance(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<WalletBalanceResponse>, AppError> {
    let wallet = state.engine().wallet_balance(query.wallet_id).await?;
    Ok(Json(WalletBalanceResponse {
        wallet_id: wallet.id,
        amount: wallet.balance,
    }))
}

/// POST /wallets/add - credit a wallet
async fn add_money(
    State(state): State<AppState>,
    Json(request): Json<MovementRequest>,
) -> Result<Json<MovementResponse>, AppError> {
    let destination_id = request.destination_id.ok_or_else(|| {
        AppError::InvalidRequest("destination wallet ID is required".to_string())
    })?;

    let mut command = DepositCommand::new(destination_id, request.amount);
    if let Some(external_source) = request.source_id {
        command = command.with_external_source(external_source);
    }

    let result = state.engine().deposit(command).await?;
    Ok(Json(MovementResponse {
        transaction_id: result.transaction_id,
    }))
}

/// POST /wallets/withdraw - debit a wallet
async fn withdraw_money(
    State(state): State<AppState>,
    Json(request): Json<MovementRequest>,
) -> Result<Json<MovementResponse>, AppError> {
    let source_id = request
        .source_id
        .ok_or_else(|| AppError::InvalidRequest("source wallet ID is required".to_string()))?;

    let mut command = WithdrawCommand::new(source_id, request.amount);
    if let Some(external_destination) = request.destination_id {
        command = command.with_external_destination(external_destination);
    }

    let result = state.engine().withdraw(command).await?;
    Ok(Json(MovementResponse {
        transaction_id: result.transaction_id,
    }))
}

/// POST /transactions - move money between two wallets
async fn transfer_money(
    State(state): State<AppState>,
    Json(request): Json<MovementRequest>,
) -> Result<Json<MovementResponse>, AppError> {
    let (source_id, destination_id) = match (request.source_id, request.destination_id) {
        (Some(source), Some(destination)) => (source, destination),
        _ => {
            return Err(AppError::InvalidRequest(
                "source and destination wallet IDs are required".to_string(),
            ))
        }
    };

    let command = TransferCommand::new(source_id, destination_id, request.amount);
    let result = state.engine().transfer(command).await?;
    Ok(Json(MovementResponse {
        transaction_id: result.transaction_id,
    }))
}

/// GET /transactions/wallet?wallet_id= - ledger entries for one wallet
async fn get_transactions_for_wallet(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let transactions = state
        .engine()
        .transactions_for_wallet(query.wallet_id)
        .await?;
    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// GET /transactions?user_id=&type=&start_time_stamp=&end_time_stamp=
async fn get_transactions_for_user(
    State(state): State<AppState>,
    Query(query): Query<UserTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<TransactionKind>)
        .transpose()
        .map_err(|_| {
            AppError::InvalidRequest(
                "transaction type must be 'credit' or 'debit' if provided".to_string(),
            )
        })?;

    let transactions = state
        .engine()
        .transactions_for_user(
            query.user_id,
            kind,
            query.start_time_stamp,
            query.end_time_stamp,
        )
        .await?;
    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_request_optional_sides() {
        let req: MovementRequest =
            serde_json::from_str(r#"{"destinationId": 3, "amount": 100}"#).unwrap();
        assert_eq!(req.destination_id, Some(3));
        assert!(req.source_id.is_none());
        assert_eq!(req.amount, 100);
    }

    #[test]
    fn test_transaction_response_omits_empty_sides() {
        let txn = Transaction {
            id: 1,
            source: Some(PartyRef::Wallet(5)),
            destination: None,
            kind: TransactionKind::Debit,
            amount: 100,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_deleted: false,
            deleted_at: None,
        };
        let body = serde_json::to_value(TransactionResponse::from(txn)).unwrap();
        assert_eq!(body["source_wallet_id"], 5);
        assert_eq!(body["type"], "debit");
        assert!(body.get("destination_wallet_id").is_none());
        assert!(body.get("external_destination_id").is_none());
    }
}
