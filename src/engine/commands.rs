//! Money-movement commands
//!
//! Input records for the three transfer engine operations, plus the shared
//! success payload.

/// Credit a wallet, optionally naming an external counterparty as source.
#[derive(Debug, Clone)]
pub struct DepositCommand {
    pub destination_wallet_id: i64,
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// Opaque reference to an external source, if any
    pub external_source_id: Option<i64>,
}

impl DepositCommand {
    pub fn new(destination_wallet_id: i64, amount: i64) -> Self {
        Self {
            destination_wallet_id,
            amount,
            external_source_id: None,
        }
    }

    pub fn with_external_source(mut self, external_source_id: i64) -> Self {
        self.external_source_id = Some(external_source_id);
        self
    }
}

/// Debit a wallet, optionally naming an external counterparty as destination.
#[derive(Debug, Clone)]
pub struct WithdrawCommand {
    pub source_wallet_id: i64,
    pub amount: i64,
    pub external_destination_id: Option<i64>,
}

impl WithdrawCommand {
    pub fn new(source_wallet_id: i64, amount: i64) -> Self {
        Self {
            source_wallet_id,
            amount,
            external_destination_id: None,
        }
    }

    pub fn with_external_destination(mut self, external_destination_id: i64) -> Self {
        self.external_destination_id = Some(external_destination_id);
        self
    }
}

/// Move money between two wallets managed by this system.
#[derive(Debug, Clone)]
pub struct TransferCommand {
    pub source_wallet_id: i64,
    pub destination_wallet_id: i64,
    pub amount: i64,
}

impl TransferCommand {
    pub fn new(source_wallet_id: i64, destination_wallet_id: i64, amount: i64) -> Self {
        Self {
            source_wallet_id,
            destination_wallet_id,
            amount,
        }
    }
}

/// Result of a committed money movement.
#[derive(Debug, Clone)]
pub struct MovementResult {
    pub transaction_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_command_builder() {
        let cmd = DepositCommand::new(3, 500);
        assert_eq!(cmd.destination_wallet_id, 3);
        assert_eq!(cmd.amount, 500);
        assert!(cmd.external_source_id.is_none());

        let cmd = cmd.with_external_source(42);
        assert_eq!(cmd.external_source_id, Some(42));
    }

    #[test]
    fn test_withdraw_command_builder() {
        let cmd = WithdrawCommand::new(5, 100).with_external_destination(7);
        assert_eq!(cmd.source_wallet_id, 5);
        assert_eq!(cmd.external_destination_id, Some(7));
    }

    #[test]
    fn test_transfer_command() {
        let cmd = TransferCommand::new(5, 3, 50);
        assert_eq!(cmd.source_wallet_id, 5);
        assert_eq!(cmd.destination_wallet_id, 3);
        assert_eq!(cmd.amount, 50);
    }
}
