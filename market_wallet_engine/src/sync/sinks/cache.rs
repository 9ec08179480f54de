use std::env;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use mwe_common::{MicroUsd, Secret};
use redis::aio::ConnectionManager;

use super::{SinkError, SyncSink};
use crate::db_types::AccountId;

const DEFAULT_KEY_PREFIX: &str = "mwe:";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Mirrors balances into a Redis hash per account so read-heavy endpoints can serve wallet
/// balances without touching the primary store.
#[derive(Clone)]
pub struct RedisCacheSink {
    conn: ConnectionManager,
    key_prefix: String,
    /// Key TTL in seconds. `None` keeps mirrored balances until the next overwrite.
    ttl: Option<i64>,
}

impl RedisCacheSink {
    /// Connects using `MWE_REDIS_URL`, falling back to a local Redis. The URL may carry
    /// credentials, so it is only ever logged masked.
    pub async fn from_env() -> Result<Self, SinkError> {
        let url = Secret::new(env::var("MWE_REDIS_URL").unwrap_or_else(|_| {
            info!("MWE_REDIS_URL is not set. Using the default.");
            DEFAULT_REDIS_URL.to_string()
        }));
        debug!("🔁️ Connecting cache sink to {url}");
        Self::connect(url.reveal()).await
    }

    pub async fn connect(redis_url: &str) -> Result<Self, SinkError> {
        Self::connect_with(redis_url, DEFAULT_KEY_PREFIX, None).await
    }

    pub async fn connect_with(
        redis_url: &str,
        key_prefix: &str,
        ttl: Option<i64>,
    ) -> Result<Self, SinkError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| SinkError::Unavailable(format!("Invalid Redis URL: {e}")))?;
        let conn = ConnectionManager::new(client).await?;
        debug!("🔁️ Cache sink connected (prefix {key_prefix})");
        Ok(Self { conn, key_prefix: key_prefix.to_string(), ttl })
    }

    fn balance_key(&self, account_id: &AccountId) -> String {
        format!("{}wallet:{}", self.key_prefix, account_id)
    }
}

#[async_trait]
impl SyncSink for RedisCacheSink {
    fn name(&self) -> &str {
        "cache"
    }

    async fn push(&self, account_id: &AccountId, balance: MicroUsd, currency: &str) -> Result<(), SinkError> {
        let key = self.balance_key(account_id);
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.hset(&key, "balance", balance.as_decimal_string())
            .hset(&key, "currency", currency)
            .hset(&key, "updated_at", Utc::now().timestamp());
        if let Some(ttl) = self.ttl {
            pipe.expire(&key, ttl);
        }
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}
