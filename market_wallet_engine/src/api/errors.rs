use thiserror::Error;

use crate::traits::WalletStoreError;

#[derive(Debug, Error)]
pub enum WalletApiError {
    /// The primary store could not complete the atomic unit. Nothing was committed; the whole
    /// operation may be retried with the same reference.
    #[error("Wallet store error: {0}")]
    StoreError(#[from] WalletStoreError),
}
