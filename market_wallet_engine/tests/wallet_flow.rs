//! End-to-end wallet flows against a real SQLite store: credits, idempotent replays, rejected
//! debits, multi-sink propagation and balance-change notifications.
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

use market_wallet_engine::{
    db_types::AccountId,
    events::{BalanceChangedEvent, EventHandlers, EventHooks},
    sync::{
        sinks::{RealtimePushSink, RelationalMirrorSink, SyncSink},
        BalanceSynchronizer, SyncConfig,
    },
    ApplyResult, LedgerApi, SqliteDatabase, WalletApi, WalletOperation,
};
use mwe_common::MicroUsd;
use sqlx::Row;

use crate::support::{
    prepare_env::prepare_test_db,
    sinks::{FlakySink, MemorySink},
};

mod support;

fn quick_sync_config() -> SyncConfig {
    SyncConfig { max_attempts: 3, retry_delay: Duration::from_millis(5), buffer_size: 16 }
}

fn notification_hooks() -> (EventHooks, Arc<Mutex<Vec<BalanceChangedEvent>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let mut hooks = EventHooks::default();
    hooks.on_balance_changed(move |ev: BalanceChangedEvent| {
        let sink = sink.clone();
        Box::pin(async move {
            sink.lock().unwrap().push(ev);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    (hooks, received)
}

#[tokio::test]
async fn credit_replay_and_debit_flow() {
    let (db, _url) = prepare_test_db().await;
    let u1 = AccountId::from("u1");

    let cache = MemorySink::new("cache");
    let mirror = RelationalMirrorSink::new(db.pool().clone());
    let (realtime, mut frames) = RealtimePushSink::channel(16);
    let sinks: Vec<Arc<dyn SyncSink>> =
        vec![cache.clone(), Arc::new(mirror), Arc::new(realtime)];
    let synchronizer = BalanceSynchronizer::new(quick_sync_config(), sinks);
    let dispatcher = synchronizer.dispatcher();
    let worker = tokio::spawn(synchronizer.run());

    let (hooks, notifications) = notification_hooks();
    let handlers = EventHandlers::new(16, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let api = WalletApi::new(db.clone(), dispatcher, producers);
    let ledger = LedgerApi::new(db.clone());

    // A first credit lands on the implicitly created zero-balance account.
    let result = api
        .credit(
            WalletOperation::new("u1", MicroUsd::from_usd(100))
                .with_reference("r1")
                .with_channel("order")
                .with_description("Order #1001 refund"),
        )
        .await
        .unwrap();
    match &result {
        ApplyResult::Applied { entry } => {
            assert_eq!(entry.balance_before, MicroUsd::from(0));
            assert_eq!(entry.balance_after, MicroUsd::from_usd(100));
            assert_eq!(entry.amount, MicroUsd::from_usd(100));
            assert_eq!(entry.reference, "r1");
            assert_eq!(entry.channel, "order");
        },
        other => panic!("Expected Applied, got {other:?}"),
    }

    // Replaying the exact same reference is benign: no second entry, no balance change.
    let replay = api
        .credit(WalletOperation::new("u1", MicroUsd::from_usd(100)).with_reference("r1"))
        .await
        .unwrap();
    assert!(matches!(replay, ApplyResult::Duplicate { balance_after } if balance_after == MicroUsd::from_usd(100)));

    // A debit beyond the balance is rejected without touching balance or ledger.
    let rejected = api
        .debit(WalletOperation::new("u1", MicroUsd::from_usd(150)).with_reference("r2"))
        .await
        .unwrap();
    assert!(matches!(
        rejected,
        ApplyResult::InsufficientFunds { available, requested }
            if available == MicroUsd::from_usd(100) && requested == MicroUsd::from_usd(150)
    ));
    assert!(ledger.entry("r2").await.unwrap().is_none());

    // A covered debit goes through.
    let debit = api
        .debit(WalletOperation::new("u1", MicroUsd::from_usd(40)).with_reference("r3"))
        .await
        .unwrap();
    assert_eq!(debit.balance_after(), Some(MicroUsd::from_usd(60)));

    // Zero amounts never reach the store.
    let invalid = api.credit(WalletOperation::new("u1", MicroUsd::from(0))).await.unwrap();
    assert!(matches!(invalid, ApplyResult::InvalidAmount));

    assert_eq!(ledger.balance(&u1).await.unwrap(), MicroUsd::from_usd(60));

    // The ledger chains: newest first, each entry's balance_before is the previous balance_after.
    let history = ledger.history(&u1, 50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].reference, "r3");
    assert_eq!(history[0].amount, -MicroUsd::from_usd(40));
    assert_eq!(history[1].reference, "r1");
    assert_eq!(history[0].balance_before, history[1].balance_after);

    // Let the synchronizer drain, then check every sink converged on the final balance.
    drop(api);
    worker.await.unwrap();

    assert_eq!(cache.balance(&u1), Some(MicroUsd::from_usd(60)));

    let row = sqlx::query("SELECT extra FROM account_profiles WHERE account_id = $1")
        .bind(&u1)
        .fetch_one(db.pool())
        .await
        .unwrap();
    let extra: serde_json::Value = serde_json::from_str(&row.get::<String, _>("extra")).unwrap();
    assert_eq!(extra["balance"], "60.000000");
    assert_eq!(extra["currency"], "USD");

    let mut last_frame = None;
    while let Ok(frame) = frames.try_recv() {
        last_frame = Some(frame);
    }
    let last_frame = last_frame.expect("realtime sink never pushed a frame");
    assert_eq!(last_frame.balance, "60.000000");
    assert_eq!(last_frame.account_id, u1);

    // Exactly the two applied operations produced notifications; replays and rejections did not.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if notifications.lock().unwrap().len() >= 2 || tokio::time::Instant::now() > deadline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let received = notifications.lock().unwrap();
    let mut refs: Vec<_> = received.iter().map(|e| e.entry.reference.as_str()).collect();
    refs.sort_unstable();
    assert_eq!(refs, vec!["r1", "r3"]);
}

#[tokio::test]
async fn transient_sink_outage_converges() {
    let (db, _url) = prepare_test_db().await;
    let u9 = AccountId::from("u9");

    // The cache drops the first two pushes and recovers on the third attempt.
    let cache = FlakySink::new("cache", 2);
    let steady = MemorySink::new("mirror");
    let sinks: Vec<Arc<dyn SyncSink>> = vec![cache.clone(), steady.clone()];
    let synchronizer = BalanceSynchronizer::new(quick_sync_config(), sinks);
    let dispatcher = synchronizer.dispatcher();
    let worker = tokio::spawn(synchronizer.run());

    let api = WalletApi::new(db.clone(), dispatcher, Default::default());
    let result = api
        .credit(WalletOperation::new("u9", MicroUsd::from_usd(60)).with_reference("seed"))
        .await
        .unwrap();
    assert!(result.is_applied());

    drop(api);
    worker.await.unwrap();

    assert_eq!(cache.balance(&u9), Some(MicroUsd::from_usd(60)));
    assert_eq!(cache.attempts.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(steady.balance(&u9), Some(MicroUsd::from_usd(60)));
    assert_eq!(steady.attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn admin_operations_mint_references_and_force_the_admin_channel() {
    let (db, _url) = prepare_test_db().await;
    let acc = AccountId::from("merchant-3");

    let sinks: Vec<Arc<dyn SyncSink>> = vec![MemorySink::new("cache")];
    let synchronizer = BalanceSynchronizer::new(quick_sync_config(), sinks);
    let dispatcher = synchronizer.dispatcher();
    let worker = tokio::spawn(synchronizer.run());
    let api = WalletApi::new(db.clone(), dispatcher, Default::default());
    let ledger = LedgerApi::new(db.clone());

    let credited = api
        .admin_credit(
            WalletOperation::new("merchant-3", MicroUsd::from_usd(500))
                .with_operator("ops-1")
                .with_remark("compensation"),
        )
        .await
        .unwrap();
    let entry = match credited {
        ApplyResult::Applied { entry } => entry,
        other => panic!("Expected Applied, got {other:?}"),
    };
    assert_eq!(entry.channel, "admin_manual");
    assert_eq!(entry.operator_id, "ops-1");
    assert!(entry.reference.starts_with("admin_credit:"));
    let token = entry.reference.split_once(':').unwrap().1;
    assert_eq!(token.len(), 16);

    let debited = api
        .admin_debit(
            WalletOperation::new("merchant-3", MicroUsd::from_usd(120)).with_operator("ops-1"),
        )
        .await
        .unwrap();
    let entry = match debited {
        ApplyResult::Applied { entry } => entry,
        other => panic!("Expected Applied, got {other:?}"),
    };
    assert_eq!(entry.channel, "admin_manual");
    assert!(entry.reference.starts_with("admin_debit:"));
    assert_eq!(entry.balance_after, MicroUsd::from_usd(380));

    // Two reference-less admin credits are distinct operations, not replays of each other.
    let again = api
        .admin_credit(WalletOperation::new("merchant-3", MicroUsd::from_usd(500)).with_operator("ops-1"))
        .await
        .unwrap();
    assert!(again.is_applied());
    assert_eq!(ledger.balance(&acc).await.unwrap(), MicroUsd::from_usd(880));

    drop(api);
    worker.await.unwrap();
}
