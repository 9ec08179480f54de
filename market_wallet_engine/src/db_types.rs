use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use mwe_common::{MicroUsd, USD_CURRENCY_CODE};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

pub const SYSTEM_CHANNEL: &str = "system";
pub const ADMIN_CHANNEL: &str = "admin_manual";
pub const SYSTEM_OPERATOR: &str = "system";

//--------------------------------------      AccountId      ---------------------------------------------------------
/// Opaque identifier for a wallet account. The engine never interprets it; it is whatever id the
/// surrounding marketplace assigns to a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct AccountId(pub String);

impl<S: Into<String>> From<S> for AccountId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      EntryType      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Funds added to an account through a normal system flow (deposit, refund, restock credit).
    Credit,
    /// Funds removed from an account through a normal system flow (order payment, withdrawal).
    Debit,
    /// A manual balance increase performed by an operator.
    AdminCredit,
    /// A manual balance decrease performed by an operator.
    AdminDebit,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Credit => "credit",
            EntryType::Debit => "debit",
            EntryType::AdminCredit => "admin_credit",
            EntryType::AdminDebit => "admin_debit",
        }
    }

    /// Whether entries of this type add funds to the account.
    pub fn is_credit(&self) -> bool {
        matches!(self, EntryType::Credit | EntryType::AdminCredit)
    }
}

impl Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid ledger entry type: {0}")]
pub struct ConversionError(String);

impl FromStr for EntryType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "admin_credit" => Ok(Self::AdminCredit),
            "admin_debit" => Ok(Self::AdminDebit),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    WalletAccount    ---------------------------------------------------------
/// The authoritative balance row for one account. Created with a zero balance the first time an
/// account id passes through the transaction engine; only ever mutated inside its atomic unit.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WalletAccount {
    pub account_id: AccountId,
    pub balance: MicroUsd,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     LedgerEntry     ---------------------------------------------------------
/// Immutable audit record of one balance transition. The `reference` column is the idempotency
/// token: its presence is the single source of truth for "this operation already happened".
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub reference: String,
    pub account_id: AccountId,
    pub entry_type: EntryType,
    pub channel: String,
    /// Signed delta. Positive for credits, negative for debits.
    pub amount: MicroUsd,
    pub balance_before: MicroUsd,
    pub balance_after: MicroUsd,
    pub currency: String,
    pub description: String,
    pub operator_id: String,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    NewLedgerEntry   ---------------------------------------------------------
/// A fully-resolved request for the transaction engine: one signed delta against one account,
/// identified by a caller-unique reference.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub account_id: AccountId,
    pub reference: String,
    pub entry_type: EntryType,
    /// Signed delta to apply. Positive for credits, negative for debits.
    pub delta: MicroUsd,
    pub channel: String,
    pub description: String,
    pub operator_id: String,
    pub remark: Option<String>,
    pub currency: String,
}

impl NewLedgerEntry {
    pub fn new(account_id: AccountId, delta: MicroUsd, reference: String, entry_type: EntryType) -> Self {
        Self {
            account_id,
            reference,
            entry_type,
            delta,
            channel: SYSTEM_CHANNEL.to_string(),
            description: String::new(),
            operator_id: SYSTEM_OPERATOR.to_string(),
            remark: None,
            currency: USD_CURRENCY_CODE.to_string(),
        }
    }
}
