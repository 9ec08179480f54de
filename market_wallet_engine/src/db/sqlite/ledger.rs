use log::trace;
use mwe_common::MicroUsd;
use sqlx::{Row, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{AccountId, LedgerEntry, NewLedgerEntry},
};

const LEDGER_COLUMNS: &str = "id, reference, account_id, entry_type, channel, amount, balance_before, \
                              balance_after, currency, description, operator_id, remark, created_at";

/// Fetches the ledger entry recorded under `reference`, if any. Called inside the atomic unit as
/// the idempotency check.
pub async fn entry_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, SqliteDatabaseError> {
    let sql = format!("SELECT {LEDGER_COLUMNS} FROM ledger_entries WHERE reference = $1");
    let result = sqlx::query_as::<_, LedgerEntry>(&sql).bind(reference).fetch_optional(conn).await?;
    Ok(result)
}

/// Appends the ledger entry for a committed-in-progress balance transition and returns it in full.
/// The UNIQUE constraint on `reference` backstops the existence check performed earlier in the
/// same transaction.
pub async fn insert_entry(
    op: &NewLedgerEntry,
    balance_before: MicroUsd,
    balance_after: MicroUsd,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, SqliteDatabaseError> {
    let row = sqlx::query(
        r#"INSERT INTO ledger_entries
           (reference, account_id, entry_type, channel, amount, balance_before, balance_after,
            currency, description, operator_id, remark)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
           RETURNING id, created_at"#,
    )
    .bind(&op.reference)
    .bind(&op.account_id)
    .bind(op.entry_type)
    .bind(&op.channel)
    .bind(op.delta)
    .bind(balance_before)
    .bind(balance_after)
    .bind(&op.currency)
    .bind(&op.description)
    .bind(&op.operator_id)
    .bind(&op.remark)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Ledger entry [{}] appended for {}", op.reference, op.account_id);
    Ok(LedgerEntry {
        id: row.try_get("id")?,
        reference: op.reference.clone(),
        account_id: op.account_id.clone(),
        entry_type: op.entry_type,
        channel: op.channel.clone(),
        amount: op.delta,
        balance_before,
        balance_after,
        currency: op.currency.clone(),
        description: op.description.clone(),
        operator_id: op.operator_id.clone(),
        remark: op.remark.clone(),
        created_at: row.try_get("created_at")?,
    })
}

/// Fetches up to `limit` entries for the account, newest first. The rowid order is the commit
/// order, so consecutive entries chain `balance_after` to the next `balance_before`.
pub async fn history_for_account(
    account_id: &AccountId,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerEntry>, SqliteDatabaseError> {
    let sql = format!(
        "SELECT {LEDGER_COLUMNS} FROM ledger_entries WHERE account_id = $1 ORDER BY id DESC LIMIT $2"
    );
    let entries =
        sqlx::query_as::<_, LedgerEntry>(&sql).bind(account_id).bind(limit).fetch_all(conn).await?;
    Ok(entries)
}
