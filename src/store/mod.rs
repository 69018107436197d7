//! Store module
//!
//! Stateless facades over the shared Postgres store. Neither facade opens
//! its own transaction for mutations; the atomic scope is always supplied
//! by the transfer engine.

pub mod ledger;
pub mod wallet_store;

pub use ledger::TransactionLedger;
pub use wallet_store::WalletStore;
