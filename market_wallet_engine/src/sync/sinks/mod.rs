//! Secondary balance sinks.
//!
//! A sink is any store that mirrors the authoritative balance for read scaling or realtime push.
//! Sinks are written to only by the synchronizer, never read back by the transaction engine, and
//! are allowed to lag: the synchronizer retries each push a bounded number of times and then
//! gives up.
mod cache;
mod mirror;
mod realtime;

use async_trait::async_trait;
pub use cache::RedisCacheSink;
use mwe_common::MicroUsd;
pub use mirror::RelationalMirrorSink;
pub use realtime::{BalanceFrame, RealtimePushSink};
use thiserror::Error;

use crate::db_types::AccountId;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink is unavailable: {0}")]
    Unavailable(String),
    #[error("Sink write failed: {0}")]
    WriteFailed(String),
}

impl From<redis::RedisError> for SinkError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_timeout() || e.is_connection_dropped() {
            SinkError::Unavailable(e.to_string())
        } else {
            SinkError::WriteFailed(e.to_string())
        }
    }
}

impl From<sqlx::Error> for SinkError {
    fn from(e: sqlx::Error) -> Self {
        SinkError::WriteFailed(e.to_string())
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(e: serde_json::Error) -> Self {
        SinkError::WriteFailed(e.to_string())
    }
}

/// One mirror target for committed balances.
#[async_trait]
pub trait SyncSink: Send + Sync {
    /// Short name used in sync logs (`cache`, `mirror`, `realtime`).
    fn name(&self) -> &str;

    /// Writes the post-transaction balance for the account to this sink.
    async fn push(&self, account_id: &AccountId, balance: MicroUsd, currency: &str) -> Result<(), SinkError>;
}
