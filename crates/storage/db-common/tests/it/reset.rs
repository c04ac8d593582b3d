use crate::{dump, fill};
use assert_matches::assert_matches;
use std::collections::BTreeMap;
use syncreset_db::{
    test_utils::{create_test_rw_db, Fault, FaultyDatabase},
    Database, DatabaseError, DbTx, SchemaVersion, Tables,
};
use syncreset_db_common::{catalog, ChainRegistry, ResetEngine, ResetError};
use syncreset_primitives::{
    keys::plain_storage_key, Account, Address, Bytes, Genesis, GenesisAccount, B256, U256,
};
use syncreset_stages_types::StageId;

fn save_progress<DB: Database>(db: &DB, stages: &[StageId], progress: u64) {
    db.update(|tx| {
        for stage in stages {
            stage.save_progress(tx, progress)?;
            stage.save_prune_progress(tx, progress / 2)?;
        }
        Ok::<_, DatabaseError>(())
    })
    .unwrap();
}

fn progress<DB: Database>(db: &DB, stage: StageId) -> (u64, u64) {
    let tx = db.tx().unwrap();
    (stage.get_progress(&tx).unwrap(), stage.get_prune_progress(&tx).unwrap())
}

#[test]
fn grouped_reset_clears_both_stages() {
    syncreset_tracing::init_test_tracing();
    let db = create_test_rw_db();
    fill(&db, &[Tables::HashedAccounts, Tables::TrieOfAccounts, Tables::PlainState], 10);
    save_progress(&db, &[StageId::HashState, StageId::IntermediateHashes], 12345);

    ResetEngine::new(db.clone())
        .reset(&[StageId::HashState, StageId::IntermediateHashes])
        .unwrap();

    assert!(dump(&db, Tables::HashedAccounts).is_empty());
    assert!(dump(&db, Tables::TrieOfAccounts).is_empty());
    assert_eq!(dump(&db, Tables::PlainState).len(), 10);
    assert_eq!(progress(&db, StageId::HashState), (0, 0));
    assert_eq!(progress(&db, StageId::IntermediateHashes), (0, 0));
}

#[test]
fn reset_is_idempotent() {
    let db = create_test_rw_db();
    fill(&db, &[Tables::CallFromIndex, Tables::CallToIndex], 5);
    save_progress(&db, &[StageId::CallTraces], 99);
    let engine = ResetEngine::new(db.clone());

    engine.reset(&[StageId::CallTraces]).unwrap();
    let once = (dump(&db, Tables::CallFromIndex), dump(&db, Tables::SyncStageProgress));

    engine.reset(&[StageId::CallTraces]).unwrap();
    let twice = (dump(&db, Tables::CallFromIndex), dump(&db, Tables::SyncStageProgress));

    assert_eq!(once, twice);
    assert!(twice.0.is_empty());
    assert_eq!(progress(&db, StageId::CallTraces), (0, 0));
}

#[test]
fn reset_leaves_unrelated_stages() {
    let db = create_test_rw_db();
    fill(&db, &[Tables::LogAddressIndex, Tables::AccountsHistory], 5);
    save_progress(&db, &[StageId::LogIndex, StageId::AccountHistoryIndex], 10);

    ResetEngine::new(db.clone()).reset(&[StageId::LogIndex]).unwrap();

    assert!(dump(&db, Tables::LogAddressIndex).is_empty());
    assert_eq!(dump(&db, Tables::AccountsHistory).len(), 5);
    assert_eq!(progress(&db, StageId::AccountHistoryIndex), (10, 5));
}

#[test]
fn failed_clear_leaves_state_untouched() {
    let db = create_test_rw_db();
    let owned = catalog::tables_for(StageId::HashState, SchemaVersion::Legacy);
    fill(&db, &owned, 8);
    save_progress(&db, &[StageId::HashState], 500);

    let before = owned.iter().map(|table| (*table, dump(&db, *table))).collect::<BTreeMap<_, _>>();

    // the first table clears, the last one fails
    let faulty = FaultyDatabase::new(db.clone(), Fault::Clear(*owned.last().unwrap()));
    let res = ResetEngine::new(faulty).reset(&[StageId::HashState]);
    assert_matches!(res, Err(ResetError::Storage(DatabaseError::Clear { .. })));

    let after = owned.iter().map(|table| (*table, dump(&db, *table))).collect::<BTreeMap<_, _>>();
    assert_eq!(before, after);
    assert_eq!(progress(&db, StageId::HashState), (500, 250));
}

#[test]
fn failed_progress_write_rolls_back_clears() {
    let db = create_test_rw_db();
    fill(&db, &[Tables::TxLookup], 8);

    let faulty = FaultyDatabase::new(db.clone(), Fault::Put(Tables::SyncStagePruneProgress));
    let res = ResetEngine::new(faulty).reset_tx_lookup();
    assert_matches!(res, Err(ResetError::Storage(DatabaseError::Write { .. })));

    assert_eq!(dump(&db, Tables::TxLookup).len(), 8);
}

#[test]
fn failed_history_clear_aborts_exec_reset() {
    let db = create_test_rw_db();
    fill(&db, &[Tables::PlainState, Tables::AccountChangeSet], 4);
    save_progress(&db, &[StageId::Execution], 42);

    let work_dir = tempfile::tempdir().unwrap();
    let faulty = FaultyDatabase::new(db.clone(), Fault::Clear(Tables::AccountChangeSet));
    let res = ResetEngine::new(faulty).reset_exec("dev", work_dir.path());
    assert_matches!(
        res,
        Err(ResetError::Storage(DatabaseError::Clear { table: Tables::AccountChangeSet, .. }))
    );

    assert_eq!(dump(&db, Tables::PlainState).len(), 4);
    assert_eq!(progress(&db, StageId::Execution), (42, 21));
}

fn contract_genesis() -> (Genesis, Address, Address) {
    let eoa = Address::with_last_byte(1);
    let contract = Address::with_last_byte(2);
    let genesis = Genesis::default().extend_accounts([
        (eoa, GenesisAccount::default().with_balance(U256::from(1_000))),
        (
            contract,
            GenesisAccount::default()
                .with_code(Some(Bytes::from_static(&[0x60, 0x01, 0x60, 0x00])))
                .with_storage(Some(BTreeMap::from([(
                    B256::with_last_byte(3),
                    B256::with_last_byte(4),
                )]))),
        ),
    ]);
    (genesis, eoa, contract)
}

#[test]
fn legacy_exec_reset_reseeds_genesis() {
    let db = create_test_rw_db();
    fill(&db, catalog::STATE_TABLES, 6);
    fill(&db, catalog::LEGACY_HISTORY_TABLES, 6);
    save_progress(&db, &[StageId::Execution, StageId::HashState, StageId::IntermediateHashes], 77);

    let (genesis, eoa, contract) = contract_genesis();
    let registry = ChainRegistry::default().with_chain("test", genesis);
    let work_dir = tempfile::tempdir().unwrap();

    ResetEngine::new(db.clone())
        .with_genesis_provider(registry)
        .reset_exec("test", &work_dir.path().join("exec"))
        .unwrap();

    assert!(work_dir.path().join("exec").is_dir());

    let plain = dump(&db, Tables::PlainState);
    let keys = plain.iter().map(|(key, _)| key.clone()).collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec![
            eoa.to_vec(),
            contract.to_vec(),
            plain_storage_key(contract, 1, B256::with_last_byte(3)),
        ]
    );
    let account = Account::decode(&plain[0].1).unwrap();
    assert_eq!(account.balance, U256::from(1_000));
    assert_eq!(account.incarnation, 0);

    assert_eq!(dump(&db, Tables::Code).len(), 1);
    assert_eq!(dump(&db, Tables::PlainContractCode).len(), 1);
    for table in catalog::STATE_TABLES
        .iter()
        .filter(|t| ![Tables::PlainState, Tables::Code, Tables::PlainContractCode].contains(*t))
    {
        assert!(dump(&db, *table).is_empty(), "{table} not empty");
    }
    for table in catalog::LEGACY_HISTORY_TABLES {
        assert!(dump(&db, *table).is_empty(), "{table} not empty");
    }
    for stage in [StageId::Execution, StageId::HashState, StageId::IntermediateHashes] {
        assert_eq!(progress(&db, stage), (0, 0));
    }
}

#[test]
fn versioned_exec_reset_skips_reseed() {
    let db = create_test_rw_db();
    db.update(|tx| SchemaVersion::Versioned.write(tx)).unwrap();
    fill(&db, catalog::STATE_TABLES, 3);
    fill(&db, catalog::LEGACY_HISTORY_TABLES, 3);
    fill(&db, catalog::VERSIONED_HISTORY_TABLES, 3);

    let work_dir = tempfile::tempdir().unwrap();
    ResetEngine::new(db.clone()).reset_exec("dev", work_dir.path()).unwrap();

    // changesets left over from the legacy layout go with the columnar history
    for table in catalog::STATE_TABLES
        .iter()
        .chain(catalog::LEGACY_HISTORY_TABLES)
        .chain(catalog::VERSIONED_HISTORY_TABLES)
    {
        assert!(dump(&db, *table).is_empty(), "{table} not empty");
    }
}

#[test]
fn extended_exec_reset_clears_commitment_history() {
    let db = create_test_rw_db();
    db.update(|tx| SchemaVersion::Extended.write(tx)).unwrap();
    fill(&db, catalog::EXTENDED_HISTORY_TABLES, 3);

    let work_dir = tempfile::tempdir().unwrap();
    ResetEngine::new(db.clone()).reset_exec("dev", work_dir.path()).unwrap();

    for table in catalog::EXTENDED_HISTORY_TABLES {
        assert!(dump(&db, *table).is_empty(), "{table} not empty");
    }
}

#[test]
fn versioned_index_reset_keeps_execution_history() {
    let db = create_test_rw_db();
    db.update(|tx| SchemaVersion::Versioned.write(tx)).unwrap();
    fill(&db, &[Tables::AccountsHistory, Tables::CallFromIndex], 3);
    fill(&db, catalog::VERSIONED_HISTORY_TABLES, 3);
    save_progress(&db, &[StageId::Execution], 500);

    let engine = ResetEngine::new(db.clone());
    engine.reset(&[StageId::AccountHistoryIndex]).unwrap();
    engine.reset(&[StageId::CallTraces]).unwrap();

    assert!(dump(&db, Tables::AccountsHistory).is_empty());
    assert!(dump(&db, Tables::CallFromIndex).is_empty());
    for table in catalog::VERSIONED_HISTORY_TABLES {
        assert_eq!(dump(&db, *table).len(), 3, "{table} was cleared");
    }
    assert_eq!(progress(&db, StageId::Execution), (500, 250));
}

#[test]
fn reset_state_is_one_transaction() {
    let db = create_test_rw_db();
    fill(&db, &[Tables::HashedAccounts, Tables::TxLookup, Tables::Senders], 4);
    save_progress(&db, &[StageId::HashState, StageId::TxLookup], 9);

    let work_dir = tempfile::tempdir().unwrap();
    let faulty = FaultyDatabase::new(db.clone(), Fault::Put(Tables::PlainState));
    let res = ResetEngine::new(faulty).reset_state("dev", work_dir.path());
    assert_matches!(
        res,
        Err(ResetError::Storage(DatabaseError::Write { table: Tables::PlainState, .. }))
    );

    assert_eq!(dump(&db, Tables::HashedAccounts).len(), 4);
    assert_eq!(dump(&db, Tables::TxLookup).len(), 4);
    assert_eq!(progress(&db, StageId::HashState), (9, 4));
    assert_eq!(db.view(|tx| tx.entries(Tables::Senders)).unwrap(), Ok(4));
}
