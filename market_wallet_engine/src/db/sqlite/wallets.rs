use log::trace;
use mwe_common::MicroUsd;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{AccountId, WalletAccount},
};

const WALLET_COLUMNS: &str = "account_id, balance, currency, created_at, updated_at";

/// Inserts a zero-balance row for the account if none exists yet. Inside an open transaction this
/// is the first write, so it also takes the database write lock up front and serializes concurrent
/// appliers at a single point.
pub async fn upsert_account(
    account_id: &AccountId,
    currency: &str,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        r#"INSERT INTO wallet_accounts (account_id, currency) VALUES ($1, $2)
           ON CONFLICT (account_id) DO NOTHING"#,
    )
    .bind(account_id)
    .bind(currency)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn wallet_by_account_id(
    account_id: &AccountId,
    conn: &mut SqliteConnection,
) -> Result<Option<WalletAccount>, SqliteDatabaseError> {
    let sql = format!("SELECT {WALLET_COLUMNS} FROM wallet_accounts WHERE account_id = $1");
    let result = sqlx::query_as::<_, WalletAccount>(&sql).bind(account_id).fetch_optional(conn).await?;
    Ok(result)
}

pub async fn update_balance(
    account_id: &AccountId,
    balance: MicroUsd,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    trace!("🗃️ Setting balance for {account_id} to {balance}");
    let _ = sqlx::query(
        r#"UPDATE wallet_accounts SET
       balance = $1,
       updated_at = CURRENT_TIMESTAMP
       WHERE account_id = $2
       "#,
    )
    .bind(balance)
    .bind(account_id)
    .execute(conn)
    .await?;
    Ok(())
}
