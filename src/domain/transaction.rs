//! Transaction entity
//!
//! An immutable ledger entry documenting one committed balance change.
//! Each side of the entry references either a wallet managed by this system
//! or an opaque external counterparty, never both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(TransactionKind::Credit),
            "debit" => Ok(TransactionKind::Debit),
            other => Err(format!("unknown transaction kind: {}", other)),
        }
    }
}

/// One side of a ledger entry: a wallet managed by this system or an
/// opaque external counterparty reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRef {
    Wallet(i64),
    External(i64),
}

impl PartyRef {
    /// Rebuild a party from the pair of nullable columns it is stored as.
    /// An internal wallet reference wins if both are somehow set.
    pub fn from_columns(wallet_id: Option<i64>, external_id: Option<i64>) -> Option<Self> {
        match (wallet_id, external_id) {
            (Some(id), _) => Some(PartyRef::Wallet(id)),
            (None, Some(id)) => Some(PartyRef::External(id)),
            (None, None) => None,
        }
    }

    /// Split a party back into its (wallet_id, external_id) column pair.
    pub fn into_columns(party: Option<PartyRef>) -> (Option<i64>, Option<i64>) {
        match party {
            Some(PartyRef::Wallet(id)) => (Some(id), None),
            Some(PartyRef::External(id)) => (None, Some(id)),
            None => (None, None),
        }
    }

    /// The wallet id if this party is an internal wallet.
    pub fn wallet_id(&self) -> Option<i64> {
        match self {
            PartyRef::Wallet(id) => Some(*id),
            PartyRef::External(_) => None,
        }
    }
}

/// A committed ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub source: Option<PartyRef>,
    pub destination: Option<PartyRef>,
    pub kind: TransactionKind,
    /// Amount moved, in the smallest currency unit. Always positive.
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Whether the given wallet appears as internal source or destination.
    pub fn touches_wallet(&self, wallet_id: i64) -> bool {
        self.source.and_then(|p| p.wallet_id()) == Some(wallet_id)
            || self.destination.and_then(|p| p.wallet_id()) == Some(wallet_id)
    }
}

/// A ledger entry about to be appended. Constructors guarantee that at
/// least one side references an internal wallet, so an external-to-external
/// entry cannot be built.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub source: Option<PartyRef>,
    pub destination: Option<PartyRef>,
    pub kind: TransactionKind,
    pub amount: i64,
}

impl NewTransaction {
    /// Money entering `destination_wallet`, optionally from an external source.
    pub fn credit(destination_wallet: i64, external_source: Option<i64>, amount: i64) -> Self {
        Self {
            source: external_source.map(PartyRef::External),
            destination: Some(PartyRef::Wallet(destination_wallet)),
            kind: TransactionKind::Credit,
            amount,
        }
    }

    /// Money leaving `source_wallet`, optionally to an external destination.
    pub fn debit(source_wallet: i64, external_destination: Option<i64>, amount: i64) -> Self {
        Self {
            source: Some(PartyRef::Wallet(source_wallet)),
            destination: external_destination.map(PartyRef::External),
            kind: TransactionKind::Debit,
            amount,
        }
    }

    /// A wallet-to-wallet transfer, recorded as a single debit entry
    /// carrying both internal references.
    pub fn transfer(source_wallet: i64, destination_wallet: i64, amount: i64) -> Self {
        Self {
            source: Some(PartyRef::Wallet(source_wallet)),
            destination: Some(PartyRef::Wallet(destination_wallet)),
            kind: TransactionKind::Debit,
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!("credit".parse::<TransactionKind>().unwrap(), TransactionKind::Credit);
        assert_eq!("debit".parse::<TransactionKind>().unwrap(), TransactionKind::Debit);
        assert!("refund".parse::<TransactionKind>().is_err());
        assert_eq!(TransactionKind::Credit.as_str(), "credit");
    }

    #[test]
    fn test_party_from_columns_prefers_internal() {
        assert_eq!(PartyRef::from_columns(Some(3), None), Some(PartyRef::Wallet(3)));
        assert_eq!(PartyRef::from_columns(None, Some(9)), Some(PartyRef::External(9)));
        assert_eq!(PartyRef::from_columns(None, None), None);
        // Internal wins over a stray external value
        assert_eq!(PartyRef::from_columns(Some(3), Some(9)), Some(PartyRef::Wallet(3)));
    }

    #[test]
    fn test_party_column_split() {
        assert_eq!(PartyRef::into_columns(Some(PartyRef::Wallet(5))), (Some(5), None));
        assert_eq!(PartyRef::into_columns(Some(PartyRef::External(5))), (None, Some(5)));
        assert_eq!(PartyRef::into_columns(None), (None, None));
    }

    #[test]
    fn test_constructors_always_reference_a_wallet() {
        let credit = NewTransaction::credit(2, Some(77), 100);
        assert_eq!(credit.destination, Some(PartyRef::Wallet(2)));
        assert_eq!(credit.source, Some(PartyRef::External(77)));
        assert_eq!(credit.kind, TransactionKind::Credit);

        let debit = NewTransaction::debit(2, None, 100);
        assert_eq!(debit.source, Some(PartyRef::Wallet(2)));
        assert_eq!(debit.destination, None);
        assert_eq!(debit.kind, TransactionKind::Debit);

        let transfer = NewTransaction::transfer(5, 3, 50);
        assert_eq!(transfer.source, Some(PartyRef::Wallet(5)));
        assert_eq!(transfer.destination, Some(PartyRef::Wallet(3)));
        assert_eq!(transfer.kind, TransactionKind::Debit);
    }

    #[test]
    fn test_touches_wallet() {
        let txn = Transaction {
            id: 1,
            source: Some(PartyRef::Wallet(5)),
            destination: Some(PartyRef::Wallet(3)),
            kind: TransactionKind::Debit,
            amount: 50,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_deleted: false,
            deleted_at: None,
        };
        assert!(txn.touches_wallet(5));
        assert!(txn.touches_wallet(3));
        assert!(!txn.touches_wallet(4));
    }
}
