//! Unified read API for balances and ledger history.

use std::fmt::Debug;

use mwe_common::MicroUsd;

use crate::{
    db_types::{AccountId, LedgerEntry, WalletAccount},
    traits::{LedgerApiError, LedgerManagement},
};

pub struct LedgerApi<B> {
    db: B,
}

impl<B: Debug> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?})", self.db)
    }
}

impl<B> LedgerApi<B>
where B: LedgerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The current authoritative balance. An account that has never been through the transaction
    /// engine reports zero, matching its implicit zero-initialized state.
    pub async fn balance(&self, account_id: &AccountId) -> Result<MicroUsd, LedgerApiError> {
        let wallet = self.db.fetch_wallet(account_id).await?;
        Ok(wallet.map(|w| w.balance).unwrap_or_default())
    }

    /// The full balance row, if the account has been seen.
    pub async fn wallet(&self, account_id: &AccountId) -> Result<Option<WalletAccount>, LedgerApiError> {
        self.db.fetch_wallet(account_id).await
    }

    /// Up to `limit` ledger entries for the account, newest first.
    pub async fn history(
        &self,
        account_id: &AccountId,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, LedgerApiError> {
        self.db.history_for_account(account_id, limit).await
    }

    /// The ledger entry recorded under the given idempotency reference, if any.
    pub async fn entry(&self, reference: &str) -> Result<Option<LedgerEntry>, LedgerApiError> {
        self.db.fetch_entry(reference).await
    }
}
