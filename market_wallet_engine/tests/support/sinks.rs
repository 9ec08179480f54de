use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use market_wallet_engine::{
    db_types::AccountId,
    sync::sinks::{SinkError, SyncSink},
};
use mwe_common::MicroUsd;

/// An in-process sink standing in for the cache mirror in tests.
pub struct MemorySink {
    label: String,
    store: Mutex<HashMap<AccountId, MicroUsd>>,
    pub attempts: AtomicU32,
}

impl MemorySink {
    pub fn new(label: &str) -> Arc<Self> {
        Arc::new(Self { label: label.to_string(), store: Mutex::new(HashMap::new()), attempts: AtomicU32::new(0) })
    }

    pub fn balance(&self, account_id: &AccountId) -> Option<MicroUsd> {
        self.store.lock().unwrap().get(account_id).copied()
    }
}

#[async_trait]
impl SyncSink for MemorySink {
    fn name(&self) -> &str {
        &self.label
    }

    async fn push(&self, account_id: &AccountId, balance: MicroUsd, _currency: &str) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.store.lock().unwrap().insert(account_id.clone(), balance);
        Ok(())
    }
}

/// A sink that fails a fixed number of pushes before recovering, for exercising the retry budget.
pub struct FlakySink {
    label: String,
    failures_left: AtomicU32,
    store: Mutex<HashMap<AccountId, MicroUsd>>,
    pub attempts: AtomicU32,
}

impl FlakySink {
    pub fn new(label: &str, failures: u32) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            failures_left: AtomicU32::new(failures),
            store: Mutex::new(HashMap::new()),
            attempts: AtomicU32::new(0),
        })
    }

    pub fn balance(&self, account_id: &AccountId) -> Option<MicroUsd> {
        self.store.lock().unwrap().get(account_id).copied()
    }
}

#[async_trait]
impl SyncSink for FlakySink {
    fn name(&self) -> &str {
        &self.label
    }

    async fn push(&self, account_id: &AccountId, balance: MicroUsd, _currency: &str) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(SinkError::Unavailable("injected outage".to_string()));
        }
        self.store.lock().unwrap().insert(account_id.clone(), balance);
        Ok(())
    }
}
