use crate::dump;
use std::sync::Arc;
use syncreset_db::{test_utils::create_test_rw_db, Database, DatabaseError, DbTx, DbTxMut, Tables};
use syncreset_db_common::{blocks, DatabaseArchive, ResetEngine, SnapshotArchive};
use syncreset_primitives::{
    keys::{block_hash_key, encode_block_number, HEAD_HEADER_KEY},
    BlockNumber, B256,
};
use syncreset_stages_types::StageId;

fn block_hash(number: BlockNumber) -> B256 {
    B256::left_padding_from(&(number + 1).to_be_bytes())
}

fn populate_blocks<DB: Database>(db: &DB, blocks: BlockNumber) {
    db.update(|tx| {
        for number in 0..=blocks {
            let hash = block_hash(number);
            let key = encode_block_number(number);
            tx.put(Tables::CanonicalHeaders, &key, hash.as_slice())?;
            tx.put(Tables::HeadersTotalDifficulty, &block_hash_key(number, hash), &[1])?;
            tx.put(Tables::Headers, &block_hash_key(number, hash), b"header")?;
            tx.put(Tables::BlockBody, &block_hash_key(number, hash), b"body")?;
            tx.put(Tables::HeaderNumbers, hash.as_slice(), &key)?;
        }
        tx.put(Tables::HeadHeader, HEAD_HEADER_KEY, block_hash(blocks).as_slice())?;
        tx.put(Tables::EthTx, b"tx", b"payload")?;
        tx.put(Tables::NonCanonicalTxs, b"tx", b"payload")?;
        tx.put(Tables::MaxTxNum, &encode_block_number(blocks), &[0])?;
        for stage in [StageId::Headers, StageId::Bodies, StageId::Snapshots] {
            stage.save_progress(tx, blocks)?;
        }
        Ok::<_, DatabaseError>(())
    })
    .unwrap();
}

fn block_numbers(entries: &[(Vec<u8>, Vec<u8>)]) -> Vec<BlockNumber> {
    entries
        .iter()
        .map(|(key, _)| BlockNumber::from_be_bytes(key[..8].try_into().unwrap()))
        .collect()
}

#[test]
fn truncation_keeps_only_genesis() {
    syncreset_tracing::init_test_tracing();
    let db = create_test_rw_db();
    populate_blocks(&db, 100);

    let refilled = ResetEngine::new(db.clone()).reset_blocks().unwrap();
    assert_eq!(refilled, None);

    let tx = db.tx().unwrap();
    assert_eq!(blocks::canonical_head(&tx), Ok(Some(0)));
    assert_eq!(StageId::Bodies.get_progress(&tx), Ok(1));
    assert_eq!(StageId::Headers.get_progress(&tx), Ok(1));
    assert_eq!(StageId::Snapshots.get_progress(&tx), Ok(0));
    assert_eq!(
        tx.get(Tables::HeadHeader, HEAD_HEADER_KEY),
        Ok(Some(block_hash(0).to_vec()))
    );
    assert_eq!(blocks::read_canonical_hash(&tx, 0), Ok(Some(block_hash(0))));
    drop(tx);

    assert_eq!(block_numbers(&dump(&db, Tables::BlockBody)), vec![0]);
    assert_eq!(block_numbers(&dump(&db, Tables::HeadersTotalDifficulty)), vec![0]);
    assert!(dump(&db, Tables::EthTx).is_empty());
    assert!(dump(&db, Tables::NonCanonicalTxs).is_empty());
    assert!(dump(&db, Tables::MaxTxNum).is_empty());
}

#[test]
fn truncation_is_idempotent() {
    let db = create_test_rw_db();
    populate_blocks(&db, 10);
    let engine = ResetEngine::new(db.clone());

    engine.reset_blocks().unwrap();
    let once = dump(&db, Tables::BlockBody);
    engine.reset_blocks().unwrap();
    assert_eq!(dump(&db, Tables::BlockBody), once);
}

#[test]
fn orphaned_bodies_are_removed() {
    let db = create_test_rw_db();
    db.update(|tx| {
        for number in [0u64, 5, 9] {
            tx.put(Tables::BlockBody, &encode_block_number(number), b"body")?;
        }
        Ok::<_, DatabaseError>(())
    })
    .unwrap();

    let removed = db.update(|tx| blocks::remove_orphaned_bodies(tx, 2)).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(block_numbers(&dump(&db, Tables::BlockBody)), vec![0]);
}

#[test]
fn refill_from_archive() {
    let archive_db = create_test_rw_db();
    populate_blocks(&archive_db, 50);
    let archive: Arc<dyn SnapshotArchive> = Arc::new(DatabaseArchive::new(archive_db));

    let db = create_test_rw_db();
    populate_blocks(&db, 100);

    let refilled =
        ResetEngine::new(db.clone()).with_archive(Some(archive)).reset_blocks().unwrap();
    assert_eq!(refilled, Some(50));

    let tx = db.tx().unwrap();
    assert_eq!(blocks::canonical_head(&tx), Ok(Some(50)));
    for stage in [StageId::Snapshots, StageId::Headers, StageId::Bodies, StageId::Senders] {
        assert_eq!(stage.get_progress(&tx), Ok(50), "{stage}");
    }
    assert_eq!(
        tx.get(Tables::HeadHeader, HEAD_HEADER_KEY),
        Ok(Some(block_hash(50).to_vec()))
    );
    drop(tx);

    assert_eq!(block_numbers(&dump(&db, Tables::BlockBody)), (0..=50).collect::<Vec<_>>());
}

#[test]
fn empty_archive_skips_refill() {
    let archive: Arc<dyn SnapshotArchive> = Arc::new(DatabaseArchive::new(create_test_rw_db()));
    let db = create_test_rw_db();
    populate_blocks(&db, 5);

    let refilled =
        ResetEngine::new(db.clone()).with_archive(Some(archive)).reset_blocks().unwrap();
    assert_eq!(refilled, None);
    assert_eq!(db.view(|tx| StageId::Bodies.get_progress(tx)).unwrap(), Ok(1));
}
