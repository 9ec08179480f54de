use thiserror::Error;

use crate::db_types::{AccountId, LedgerEntry, WalletAccount};

#[derive(Debug, Clone, Error)]
pub enum LedgerApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for LedgerApiError {
    fn from(e: sqlx::Error) -> Self {
        LedgerApiError::DatabaseError(e.to_string())
    }
}

/// The read path of a wallet engine backend: balances and ledger history.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement: Clone {
    /// Fetches the balance row for the given account. `None` if the account has never been seen.
    async fn fetch_wallet(&self, account_id: &AccountId) -> Result<Option<WalletAccount>, LedgerApiError>;

    /// Fetches the ledger entry recorded under the given idempotency reference, if any.
    async fn fetch_entry(&self, reference: &str) -> Result<Option<LedgerEntry>, LedgerApiError>;

    /// Fetches up to `limit` ledger entries for the account, newest first.
    async fn history_for_account(
        &self,
        account_id: &AccountId,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, LedgerApiError>;
}
