//! The public operation surface of the wallet engine.
//!
//! [`WalletApi`] composes the transaction engine, the synchronizer and the notification hooks
//! into the four balance-changing operations; [`LedgerApi`] is the matching read surface.
mod errors;
mod ledger_api;
mod wallet_api;
mod wallet_objects;

pub use errors::WalletApiError;
pub use ledger_api::LedgerApi;
pub use wallet_api::WalletApi;
pub use wallet_objects::WalletOperation;
