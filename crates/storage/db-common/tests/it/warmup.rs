use crate::{dump, fill};
use std::{sync::mpsc, thread, time::Duration};
use syncreset_config::WarmupConfig;
use syncreset_db::{test_utils::create_test_rw_db, Database, DbTx, DbTxMut, SchemaVersion, Tables};
use syncreset_db_common::WarmupEngine;
use syncreset_stages_types::StageId;
use tokio_util::sync::CancellationToken;
use tracing::Level;

#[test]
fn warmup_runs_alongside_writer() {
    syncreset_tracing::init_test_tracing();
    let db = create_test_rw_db();
    fill(&db, &[Tables::PlainState], 200);
    let before = dump(&db, Tables::PlainState);

    // writer holds the write lock for the whole warmup
    let writer = db.tx_mut().unwrap();
    writer.put(Tables::Senders, b"sender", b"value").unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let warm_db = db.clone();
    let handle = thread::spawn(move || {
        let engine = WarmupEngine::new(warm_db, WarmupConfig { threads: 2, ..Default::default() });
        let stats = engine.warmup_tables(&[Tables::PlainState], Level::INFO);
        done_tx.send(stats).unwrap();
    });

    let stats = done_rx.recv_timeout(Duration::from_secs(30)).expect("warmup blocked by writer");
    handle.join().unwrap();
    assert_eq!(stats.entries, 200);
    assert_eq!(stats.failures, 0);

    writer.commit().unwrap();
    assert_eq!(dump(&db, Tables::PlainState), before);
    assert_eq!(db.view(|tx| tx.entries(Tables::Senders)).unwrap(), Ok(1));
}

#[test]
fn exec_warmup_covers_state() {
    let db = create_test_rw_db();
    fill(&db, &[Tables::PlainState, Tables::Code, Tables::AccountChangeSet, Tables::Senders], 10);

    let stats = WarmupEngine::new(db, WarmupConfig::default()).warmup_exec();
    assert_eq!(stats.tables, 3);
    assert_eq!(stats.entries, 30);
}

#[test]
fn versioned_exec_warmup_includes_changesets() {
    let db = create_test_rw_db();
    db.update(|tx| SchemaVersion::Versioned.write(tx)).unwrap();
    fill(&db, &[Tables::AccountChangeSet, Tables::AccountHistoryKeys], 10);

    let stats = WarmupEngine::new(db, WarmupConfig::default()).warmup_exec();
    assert_eq!(stats.tables, 2);
    assert_eq!(stats.entries, 20);
    assert_eq!(stats.failures, 0);
}

#[test]
fn cancellation_stops_stage_warmup() {
    let db = create_test_rw_db();
    fill(&db, &[Tables::TxLookup], 50);

    let token = CancellationToken::new();
    let engine =
        WarmupEngine::new(db, WarmupConfig::default()).with_cancellation(token.child_token());
    token.cancel();

    let stats = engine.warmup_stages(&[StageId::TxLookup], Level::DEBUG);
    assert!(stats.cancelled);
    assert_eq!(stats.entries, 0);
}
