//! Interface contracts for wallet engine backends.
//!
//! The engine is written against two seams:
//!
//! * [`WalletDatabase`] is the write path. A backend implementing it owns the primary balance
//!   store and the ledger store, and must execute [`WalletDatabase::apply_operation`] as a single
//!   atomic unit: duplicate check, balance read, balance write and ledger append all succeed or
//!   fail together.
//! * [`LedgerManagement`] is the read path: balance lookups, ledger history and entry lookups for
//!   reporting and reconciliation tooling. It carries no transactional requirements.
//!
//! [`SqliteDatabase`](crate::SqliteDatabase) implements both.

mod ledger_management;
mod wallet_database;

pub use ledger_management::{LedgerApiError, LedgerManagement};
pub use wallet_database::{ApplyResult, WalletDatabase, WalletStoreError};
