//! Market Wallet Engine
//!
//! The wallet ledger and balance synchronization engine for the marketplace backend. The rest of
//! the marketplace (routing, auth, orders, KYC) talks to this library; nothing here knows about
//! HTTP or request validation.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should
//!    never need to access the database directly; use the public APIs instead. The exception is
//!    the data types used in the database, which are defined in the `db_types` module and are
//!    public.
//! 2. The public operation surface: [`WalletApi`] for the four balance-changing operations
//!    (credit, debit and their admin variants, all idempotent per reference) and [`LedgerApi`]
//!    for balances and history. Backends implement the traits in [`mod@traits`] to plug in here.
//! 3. Balance propagation ([`mod@sync`]): after a commit, the resulting balance is pushed to the
//!    configured secondary sinks (cache, relational mirror, realtime push) with bounded retry.
//!    The primary store is always authoritative; sinks are eventually-consistent mirrors.
//!
//! The engine also emits events. When a balance changes, a `BalanceChangedEvent` is published to
//! any hooks registered via [`events::EventHooks`], which is where user notifications are wired
//! in.
mod api;
mod db;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod sync;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{LedgerApi, WalletApi, WalletApiError, WalletOperation};
#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use traits::{ApplyResult, LedgerApiError, LedgerManagement, WalletDatabase, WalletStoreError};
