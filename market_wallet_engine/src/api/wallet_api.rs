use std::fmt::Debug;

use log::*;
use mwe_common::MicroUsd;

use crate::{
    api::{WalletApiError, WalletOperation},
    db_types::{EntryType, NewLedgerEntry, ADMIN_CHANNEL},
    events::{BalanceChangedEvent, EventProducers},
    helpers::random_reference,
    sync::{SyncDispatcher, SyncJob},
    traits::{ApplyResult, WalletDatabase},
};

/// The wallet facade. Composes the transaction engine (via the backend's atomic
/// `apply_operation`), the multi-sink synchronizer and the notification hooks.
///
/// Callers see exactly four business outcomes — applied, already-processed, insufficient funds,
/// invalid amount — plus the retryable store error on the `Err` arm. Synchronization and
/// notification happen after the commit and never affect the returned result.
pub struct WalletApi<B> {
    db: B,
    sync: SyncDispatcher,
    producers: EventProducers,
}

impl<B: Debug> Debug for WalletApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WalletApi ({:?})", self.db)
    }
}

impl<B> WalletApi<B>
where B: WalletDatabase
{
    pub fn new(db: B, sync: SyncDispatcher, producers: EventProducers) -> Self {
        Self { db, sync, producers }
    }

    /// Adds funds to an account. `InsufficientFunds` cannot occur on this path.
    pub async fn credit(&self, op: WalletOperation) -> Result<ApplyResult, WalletApiError> {
        self.execute(op, EntryType::Credit).await
    }

    /// Removes funds from an account. A debit that would drive the balance negative returns
    /// `InsufficientFunds` and leaves balance and ledger untouched.
    pub async fn debit(&self, op: WalletOperation) -> Result<ApplyResult, WalletApiError> {
        self.execute(op, EntryType::Debit).await
    }

    /// A manual credit performed by an operator. The channel is forced to `admin_manual`
    /// regardless of what the request carries.
    pub async fn admin_credit(&self, op: WalletOperation) -> Result<ApplyResult, WalletApiError> {
        self.execute(op.with_channel(ADMIN_CHANNEL), EntryType::AdminCredit).await
    }

    /// A manual debit performed by an operator. The channel is forced to `admin_manual`.
    pub async fn admin_debit(&self, op: WalletOperation) -> Result<ApplyResult, WalletApiError> {
        self.execute(op.with_channel(ADMIN_CHANNEL), EntryType::AdminDebit).await
    }

    async fn execute(
        &self,
        op: WalletOperation,
        entry_type: EntryType,
    ) -> Result<ApplyResult, WalletApiError> {
        if op.amount <= MicroUsd::from(0) {
            info!("💰️ Rejecting {entry_type} of {} for {}", op.amount, op.account_id);
            return Ok(ApplyResult::InvalidAmount);
        }
        let reference = op.reference.clone().unwrap_or_else(|| random_reference(entry_type.as_str()));
        let delta = if entry_type.is_credit() { op.amount } else { -op.amount };
        let mut entry = NewLedgerEntry::new(op.account_id.clone(), delta, reference, entry_type);
        entry.channel = op.channel;
        entry.description = op.description;
        entry.operator_id = op.operator_id;
        entry.remark = op.remark;
        entry.currency = op.currency;

        let result = self.db.apply_operation(entry).await?;
        match &result {
            ApplyResult::Applied { entry } => {
                info!(
                    "💰️ {} [{}] applied to {}. New balance: {}",
                    entry.entry_type, entry.reference, entry.account_id, entry.balance_after
                );
                let job = SyncJob::new(entry.account_id.clone(), entry.balance_after, entry.currency.clone());
                self.sync.dispatch(job).await;
                self.publish_balance_changed(BalanceChangedEvent::new(entry.clone())).await;
            },
            ApplyResult::Duplicate { balance_after } => {
                info!(
                    "💰️ {} for {} was a replay. Balance stays at {balance_after}; no sync, no \
                     notification.",
                    entry_type, op.account_id
                );
            },
            ApplyResult::InsufficientFunds { available, requested } => {
                info!(
                    "💰️ {} of {requested} rejected for {}: only {available} available",
                    entry_type, op.account_id
                );
            },
            ApplyResult::InvalidAmount => {},
        }
        Ok(result)
    }

    async fn publish_balance_changed(&self, event: BalanceChangedEvent) {
        for producer in &self.producers.balance_changed_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}
