use async_trait::async_trait;
use chrono::Utc;
use mwe_common::MicroUsd;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{SinkError, SyncSink};
use crate::db_types::AccountId;

/// The payload pushed to connected clients when a balance changes. The websocket fan-out layer
/// serializes this as-is, so a client sees its new balance without polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceFrame {
    pub account_id: AccountId,
    pub balance: String,
    pub currency: String,
    pub last_update: i64,
}

/// Hands committed balances to the realtime push layer through an outbound channel. The channel
/// receiver belongs to the websocket fan-out service; this sink knows nothing about connections.
pub struct RealtimePushSink {
    outbound: mpsc::Sender<BalanceFrame>,
}

impl RealtimePushSink {
    pub fn new(outbound: mpsc::Sender<BalanceFrame>) -> Self {
        Self { outbound }
    }

    /// Convenience constructor for wiring: returns the sink and the receiver half to hand to the
    /// push layer.
    pub fn channel(buffer_size: usize) -> (Self, mpsc::Receiver<BalanceFrame>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl SyncSink for RealtimePushSink {
    fn name(&self) -> &str {
        "realtime"
    }

    async fn push(&self, account_id: &AccountId, balance: MicroUsd, currency: &str) -> Result<(), SinkError> {
        let frame = BalanceFrame {
            account_id: account_id.clone(),
            balance: balance.as_decimal_string(),
            currency: currency.to_string(),
            last_update: Utc::now().timestamp(),
        };
        self.outbound
            .send(frame)
            .await
            .map_err(|e| SinkError::Unavailable(format!("Realtime push channel closed: {e}")))
    }
}
