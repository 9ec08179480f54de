use async_trait::async_trait;
use chrono::Utc;
use log::trace;
use mwe_common::MicroUsd;
use serde_json::{json, Value};
use sqlx::{Row, SqlitePool};

use super::{SinkError, SyncSink};
use crate::db_types::AccountId;

/// Keeps the reporting profile row in step with the authoritative balance. The balance is merged
/// into the row's `extra` JSON document rather than written to a dedicated column, so reporting
/// can attach further ad hoc fields to the same document without schema changes.
#[derive(Clone)]
pub struct RelationalMirrorSink {
    pool: SqlitePool,
}

impl RelationalMirrorSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncSink for RelationalMirrorSink {
    fn name(&self) -> &str {
        "mirror"
    }

    async fn push(&self, account_id: &AccountId, balance: MicroUsd, currency: &str) -> Result<(), SinkError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query("SELECT extra FROM account_profiles WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&mut *conn)
            .await?;
        let mut extra: Value = match row {
            Some(row) => {
                let raw: String = row.try_get("extra")?;
                serde_json::from_str(&raw).unwrap_or_else(|_| json!({}))
            },
            None => json!({}),
        };
        extra["balance"] = json!(balance.as_decimal_string());
        extra["currency"] = json!(currency);
        extra["synced_at"] = json!(Utc::now().timestamp());
        let serialized = serde_json::to_string(&extra)?;
        sqlx::query(
            r#"INSERT INTO account_profiles (account_id, extra) VALUES ($1, $2)
               ON CONFLICT (account_id) DO UPDATE SET extra = excluded.extra"#,
        )
        .bind(account_id)
        .bind(serialized)
        .execute(&mut *conn)
        .await?;
        trace!("🔁️ Mirrored balance {balance} for {account_id} into account_profiles");
        Ok(())
    }
}
