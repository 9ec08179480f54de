use thiserror::Error;

use crate::traits::{LedgerApiError, WalletStoreError};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database query error: {0}")]
    QueryError(String),
    #[error("Account row missing for {0} inside an open transaction")]
    AccountRowMissing(String),
}

impl From<SqliteDatabaseError> for WalletStoreError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::DriverError(e) => e.into(),
            other => WalletStoreError::BackendError(other.to_string()),
        }
    }
}

impl From<SqliteDatabaseError> for LedgerApiError {
    fn from(e: SqliteDatabaseError) -> Self {
        LedgerApiError::DatabaseError(e.to_string())
    }
}
