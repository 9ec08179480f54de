use serde::{Deserialize, Serialize};

use crate::db_types::{AccountId, LedgerEntry};

/// Emitted after a balance-changing operation has committed and its sync job has been dispatched.
/// Handlers typically forward this to the user-facing push/notification channel; delivery is
/// best-effort and failures never reach the wallet caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChangedEvent {
    pub account_id: AccountId,
    pub entry: LedgerEntry,
}

impl BalanceChangedEvent {
    pub fn new(entry: LedgerEntry) -> Self {
        let account_id = entry.account_id.clone();
        Self { account_id, entry }
    }
}
