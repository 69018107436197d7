//! wallet-ledger Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod domain;
pub mod engine;
pub mod store;

// Private modules (used only by the server binary)
pub mod config;
pub mod db;
mod error;

pub use config::{Config, LedgerSettings};
pub use domain::{NewTransaction, PartyRef, Transaction, TransactionKind, Wallet};
pub use error::{AppError, AppResult};
