use mwe_common::{MicroUsd, USD_CURRENCY_CODE};

use crate::db_types::{AccountId, SYSTEM_CHANNEL, SYSTEM_OPERATOR};

/// A balance-changing request as the caller phrases it: an unsigned amount plus metadata. The
/// facade decides the sign and entry type from the operation invoked (`credit`, `debit`, ...).
#[derive(Debug, Clone)]
pub struct WalletOperation {
    pub account_id: AccountId,
    /// Unsigned magnitude of the operation. Must be strictly positive.
    pub amount: MicroUsd,
    /// Idempotency key. When `None`, the facade mints a random one, which means the call is NOT
    /// deduplicated against other reference-less calls; callers that need replay protection must
    /// reuse a stable reference such as `order:{order_id}`.
    pub reference: Option<String>,
    pub channel: String,
    pub description: String,
    pub operator_id: String,
    pub remark: Option<String>,
    pub currency: String,
}

impl WalletOperation {
    pub fn new<A: Into<AccountId>>(account_id: A, amount: MicroUsd) -> Self {
        Self {
            account_id: account_id.into(),
            amount,
            reference: None,
            channel: SYSTEM_CHANNEL.to_string(),
            description: String::new(),
            operator_id: SYSTEM_OPERATOR.to_string(),
            remark: None,
            currency: USD_CURRENCY_CODE.to_string(),
        }
    }

    pub fn with_reference<S: Into<String>>(mut self, reference: S) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_channel<S: Into<String>>(mut self, channel: S) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_operator<S: Into<String>>(mut self, operator_id: S) -> Self {
        self.operator_id = operator_id.into();
        self
    }

    pub fn with_remark<S: Into<String>>(mut self, remark: S) -> Self {
        self.remark = Some(remark.into());
        self
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into();
        self
    }
}
