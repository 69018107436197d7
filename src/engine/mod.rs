//! Transfer engine module
//!
//! Orchestrates the wallet store and transaction ledger under a single
//! atomic scope to implement the money-movement operations.

mod commands;
mod transfer_engine;

pub use commands::{DepositCommand, MovementResult, TransferCommand, WithdrawCommand};
pub use transfer_engine::TransferEngine;
