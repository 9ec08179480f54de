//! Multi-sink balance synchronization.
//!
//! After the transaction engine commits, the resulting balance is propagated to every configured
//! secondary sink (cache, relational mirror, realtime push). Jobs travel over a channel to a
//! dedicated worker, which fans each job out to all sinks concurrently and retries each sink
//! independently with a bounded budget. The primary store stays authoritative throughout: a sink
//! that exhausts its retries is logged and abandoned, never rolled back into the caller's result.
pub mod sinks;

use std::{
    env,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use futures_util::future::join_all;
use log::*;
use mwe_common::MicroUsd;
use tokio::sync::mpsc;

use self::sinks::SyncSink;

use crate::db_types::AccountId;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_BUFFER_SIZE: usize = 32;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Total attempts per sink per job, first try included.
    pub max_attempts: u32,
    /// Fixed delay between attempts on the same sink.
    pub retry_delay: Duration,
    /// Capacity of the job channel. Dispatching only waits when this many jobs are backed up.
    pub buffer_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl SyncConfig {
    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let max_attempts = env_u64("MWE_SYNC_MAX_ATTEMPTS", defaults.max_attempts as u64) as u32;
        let retry_delay = Duration::from_millis(env_u64(
            "MWE_SYNC_RETRY_DELAY_MS",
            defaults.retry_delay.as_millis() as u64,
        ));
        let buffer_size = env_u64("MWE_SYNC_BUFFER", defaults.buffer_size as u64) as usize;
        Self { max_attempts: max_attempts.max(1), retry_delay, buffer_size: buffer_size.max(1) }
    }
}

fn env_u64(var: &str, default: u64) -> u64 {
    match env::var(var) {
        Ok(s) => s.parse::<u64>().unwrap_or_else(|e| {
            error!("🔁️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

/// One committed balance to propagate. Ephemeral: lives on the channel for the duration of the
/// fan-out and is dropped afterwards.
#[derive(Debug, Clone)]
pub struct SyncJob {
    pub account_id: AccountId,
    pub balance_after: MicroUsd,
    pub currency: String,
}

impl SyncJob {
    pub fn new(account_id: AccountId, balance_after: MicroUsd, currency: String) -> Self {
        Self { account_id, balance_after, currency }
    }
}

/// Cloneable handle used to enqueue sync jobs. When every dispatcher is dropped the worker drains
/// outstanding jobs and shuts down.
#[derive(Clone)]
pub struct SyncDispatcher {
    sender: mpsc::Sender<SyncJob>,
}

impl SyncDispatcher {
    pub async fn dispatch(&self, job: SyncJob) {
        if let Err(e) = self.sender.send(job).await {
            error!("🔁️ Failed to enqueue sync job: {e}");
        }
    }
}

/// The synchronizer worker. Construct it with the fixed sink set, take dispatchers with
/// [`BalanceSynchronizer::dispatcher`], and drive it with [`BalanceSynchronizer::run`] on its own
/// task.
pub struct BalanceSynchronizer {
    listener: mpsc::Receiver<SyncJob>,
    sender: mpsc::Sender<SyncJob>,
    sinks: Vec<Arc<dyn SyncSink>>,
    config: SyncConfig,
}

impl BalanceSynchronizer {
    pub fn new(config: SyncConfig, sinks: Vec<Arc<dyn SyncSink>>) -> Self {
        let (sender, listener) = mpsc::channel(config.buffer_size);
        Self { listener, sender, sinks, config }
    }

    pub fn dispatcher(&self) -> SyncDispatcher {
        SyncDispatcher { sender: self.sender.clone() }
    }

    /// Consumes jobs until the last dispatcher is dropped. Each job gets its own task, and inside
    /// a job every sink is pushed concurrently, so a sink stuck in its retry loop delays neither
    /// the other sinks nor the jobs behind it.
    pub async fn run(mut self) {
        debug!("🔁️ Balance synchronizer started with {} sink(s)", self.sinks.len());
        drop(self.sender);
        let in_flight = Arc::new(AtomicI64::new(0));
        while let Some(job) = self.listener.recv().await {
            let sinks = self.sinks.clone();
            let config = self.config.clone();
            let counter = Arc::clone(&in_flight);
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                fan_out(&sinks, &config, job).await;
                counter.fetch_sub(1, Ordering::SeqCst);
            });
        }
        while in_flight.load(Ordering::SeqCst) > 0 {
            trace!("🔁️ Waiting for {} sync job(s) to finish", in_flight.load(Ordering::SeqCst));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        debug!("🔁️ Balance synchronizer has shut down");
    }
}

async fn fan_out(sinks: &[Arc<dyn SyncSink>], config: &SyncConfig, job: SyncJob) {
    let tasks = sinks.iter().map(|sink| push_with_retry(Arc::clone(sink), config, job.clone()));
    join_all(tasks).await;
}

/// Pushes one job to one sink, retrying up to the configured budget. Exhausting the budget logs a
/// terminal failure and abandons the job for this sink; the primary store remains authoritative.
async fn push_with_retry(sink: Arc<dyn SyncSink>, config: &SyncConfig, job: SyncJob) {
    let max = config.max_attempts;
    for attempt in 1..=max {
        match sink.push(&job.account_id, job.balance_after, &job.currency).await {
            Ok(()) => {
                trace!(
                    "🔁️ {} sink updated for {} ({}) on attempt {attempt}",
                    sink.name(),
                    job.account_id,
                    job.balance_after
                );
                return;
            },
            Err(e) => {
                warn!(
                    "🔁️ {} sink attempt {attempt}/{max} failed for {}: {e}",
                    sink.name(),
                    job.account_id
                );
                if attempt < max {
                    tokio::time::sleep(config.retry_delay).await;
                }
            },
        }
    }
    error!(
        "🔁️ {} sink is out of retries for {}. The mirrored balance is stale until the next sync.",
        sink.name(),
        job.account_id
    );
}
