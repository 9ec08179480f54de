use mwe_common::MicroUsd;
use thiserror::Error;

use crate::db_types::{LedgerEntry, NewLedgerEntry};

/// The business outcome of one [`WalletDatabase::apply_operation`] call.
///
/// Every outcome a caller has to act on is a variant here; the `Err` arm of the surrounding
/// `Result` is reserved for infrastructure failure, where the backend guarantees that nothing was
/// committed and the caller may safely retry the whole operation with the same reference.
#[derive(Debug, Clone)]
pub enum ApplyResult {
    /// The delta was committed together with its ledger entry.
    Applied { entry: LedgerEntry },
    /// A ledger entry with this reference already exists. The operation was not applied again;
    /// `balance_after` is the balance recorded by the original entry.
    Duplicate { balance_after: MicroUsd },
    /// The debit would have driven the balance negative. Nothing was written.
    InsufficientFunds { available: MicroUsd, requested: MicroUsd },
    /// The request failed validation (zero delta, empty account id or reference). Nothing was
    /// written; retrying without fixing the request is pointless.
    InvalidAmount,
}

impl ApplyResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyResult::Applied { .. })
    }

    /// The post-operation balance, where one is known.
    pub fn balance_after(&self) -> Option<MicroUsd> {
        match self {
            ApplyResult::Applied { entry } => Some(entry.balance_after),
            ApplyResult::Duplicate { balance_after } => Some(*balance_after),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum WalletStoreError {
    /// The store could not be reached, or the atomic unit timed out waiting for the write lock.
    /// Nothing was committed.
    #[error("The wallet store is unavailable: {0}")]
    StoreUnavailable(String),
    /// The backend reported a failure that is not a liveness problem (constraint violation,
    /// corrupt row, decode failure). Nothing was committed.
    #[error("Wallet store backend error: {0}")]
    BackendError(String),
}

impl From<sqlx::Error> for WalletStoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                WalletStoreError::StoreUnavailable(e.to_string())
            },
            sqlx::Error::Database(db) => {
                let msg = db.message();
                if msg.contains("locked") || msg.contains("busy") {
                    WalletStoreError::StoreUnavailable(e.to_string())
                } else {
                    WalletStoreError::BackendError(e.to_string())
                }
            },
            _ => WalletStoreError::BackendError(e.to_string()),
        }
    }
}

/// The write path of a wallet engine backend.
#[allow(async_fn_in_trait)]
pub trait WalletDatabase: Clone {
    /// The URL of the underlying store.
    fn url(&self) -> &str;

    /// Applies one signed delta to one account, in a single atomic unit:
    ///
    /// * If a ledger entry with `op.reference` already exists, nothing is written and
    ///   [`ApplyResult::Duplicate`] is returned with the originally recorded balance.
    /// * The account row is created with a zero balance if this account has never been seen.
    /// * A delta that would drive the balance negative aborts the unit with
    ///   [`ApplyResult::InsufficientFunds`]; neither the balance nor the ledger is touched.
    /// * Otherwise the new balance and the ledger entry are committed together and
    ///   [`ApplyResult::Applied`] carries the full entry.
    ///
    /// Concurrent calls for the same account must serialize: no two of them may observe the same
    /// pre-delta balance and both commit.
    async fn apply_operation(&self, op: NewLedgerEntry) -> Result<ApplyResult, WalletStoreError>;

    /// Closes the backend's connections.
    async fn close(&mut self) -> Result<(), WalletStoreError> {
        Ok(())
    }
}
