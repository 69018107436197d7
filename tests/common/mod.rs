//! Common test utilities

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use wallet_ledger::LedgerSettings;

/// Setup test database - truncate tables for a fresh state
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query("TRUNCATE TABLE transactions, wallets RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

/// Ledger settings used across tests: the production default limit
/// and currency.
pub fn test_settings() -> LedgerSettings {
    LedgerSettings::default()
}

/// Create a wallet owned by `owner_id` and credit it to `balance` through
/// the store, returning the wallet id.
#[allow(dead_code)]
pub async fn seed_wallet(pool: &PgPool, owner_id: i64, balance: i64) -> i64 {
    let store = wallet_ledger::store::WalletStore::new(pool.clone());
    let wallet_id = store
        .create(owner_id, "INR")
        .await
        .expect("Failed to create wallet");

    if balance > 0 {
        sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(wallet_id)
            .execute(pool)
            .await
            .expect("Failed to seed balance");
    }

    wallet_id
}

/// Fetch the current balance directly, bypassing the engine.
#[allow(dead_code)]
pub async fn balance_of(pool: &PgPool, wallet_id: i64) -> i64 {
    sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1")
        .bind(wallet_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance")
}
