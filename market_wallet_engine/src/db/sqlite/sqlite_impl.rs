//! `SqliteDatabase` is a concrete wallet engine backend.
//!
//! It keeps the primary balance store (`wallet_accounts`) and the ledger store (`ledger_entries`)
//! in one SQLite database, which lets [`WalletDatabase::apply_operation`] run the whole
//! read-validate-write-append sequence inside a single database transaction.
use std::fmt::Debug;

use log::*;
use mwe_common::MicroUsd;
use sqlx::SqlitePool;

use super::{db_url, ledger, new_pool, wallets, SqliteDatabaseError};
use crate::{
    db_types::{AccountId, LedgerEntry, NewLedgerEntry, WalletAccount},
    traits::{ApplyResult, LedgerApiError, LedgerManagement, WalletDatabase, WalletStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl WalletDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Applies one signed delta in a single atomic transaction:
    /// * upserts the zero-balance account row (this is the first write of the transaction, so
    ///   concurrent appliers serialize here for the duration of the busy timeout),
    /// * short-circuits with `Duplicate` if the reference is already in the ledger,
    /// * rejects a delta that would drive the balance negative,
    /// * otherwise writes the new balance and appends the ledger entry, then commits.
    async fn apply_operation(&self, op: NewLedgerEntry) -> Result<ApplyResult, WalletStoreError> {
        if op.delta == MicroUsd::from(0) {
            debug!("🗃️ Rejecting zero delta for account {} (reference {})", op.account_id, op.reference);
            return Ok(ApplyResult::InvalidAmount);
        }
        if op.account_id.as_str().is_empty() {
            debug!("🗃️ Rejecting operation with an empty account id (reference {})", op.reference);
            return Ok(ApplyResult::InvalidAmount);
        }
        if op.reference.is_empty() {
            debug!("🗃️ Rejecting operation with an empty reference for account {}", op.account_id);
            return Ok(ApplyResult::InvalidAmount);
        }

        let mut tx = self.pool.begin().await.map_err(WalletStoreError::from)?;
        wallets::upsert_account(&op.account_id, &op.currency, &mut tx).await?;
        if let Some(existing) = ledger::entry_by_reference(&op.reference, &mut tx).await? {
            tx.rollback().await.map_err(WalletStoreError::from)?;
            debug!(
                "🗃️ Reference [{}] has already been applied to {}. Treating this call as a replay.",
                op.reference, op.account_id
            );
            return Ok(ApplyResult::Duplicate { balance_after: existing.balance_after });
        }
        let account = wallets::wallet_by_account_id(&op.account_id, &mut tx)
            .await?
            .ok_or_else(|| WalletStoreError::BackendError(format!(
                "account row for {} vanished inside an open transaction",
                op.account_id
            )))?;
        let balance_before = account.balance;
        let balance_after = balance_before + op.delta;
        if balance_after.is_negative() {
            tx.rollback().await.map_err(WalletStoreError::from)?;
            debug!(
                "🗃️ {} debit of {} rejected: only {} available",
                op.account_id,
                -op.delta,
                balance_before
            );
            return Ok(ApplyResult::InsufficientFunds { available: balance_before, requested: -op.delta });
        }
        wallets::update_balance(&op.account_id, balance_after, &mut tx).await?;
        let entry = ledger::insert_entry(&op, balance_before, balance_after, &mut tx).await?;
        tx.commit().await.map_err(WalletStoreError::from)?;
        debug!(
            "🗃️ {} [{}] applied to {}: {} -> {}",
            entry.entry_type, entry.reference, entry.account_id, balance_before, balance_after
        );
        Ok(ApplyResult::Applied { entry })
    }

    async fn close(&mut self) -> Result<(), WalletStoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn fetch_wallet(&self, account_id: &AccountId) -> Result<Option<WalletAccount>, LedgerApiError> {
        let mut conn = self.pool.acquire().await.map_err(LedgerApiError::from)?;
        let wallet = wallets::wallet_by_account_id(account_id, &mut conn).await?;
        Ok(wallet)
    }

    async fn fetch_entry(&self, reference: &str) -> Result<Option<LedgerEntry>, LedgerApiError> {
        let mut conn = self.pool.acquire().await.map_err(LedgerApiError::from)?;
        let entry = ledger::entry_by_reference(reference, &mut conn).await?;
        Ok(entry)
    }

    async fn history_for_account(
        &self,
        account_id: &AccountId,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, LedgerApiError> {
        let mut conn = self.pool.acquire().await.map_err(LedgerApiError::from)?;
        let entries = ledger::history_for_account(account_id, limit, &mut conn).await?;
        Ok(entries)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
