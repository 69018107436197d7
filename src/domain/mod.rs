//! Domain module
//!
//! Core entity types for the wallet ledger.

pub mod transaction;
pub mod wallet;

pub use transaction::{NewTransaction, PartyRef, Transaction, TransactionKind};
pub use wallet::Wallet;
