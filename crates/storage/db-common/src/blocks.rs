//! Truncation of canonical block data and recovery from a snapshot archive.

use crate::{archive::SnapshotArchive, reset::clear_tables, ResetError};
use syncreset_db::{
    sequence::reset_sequence, DatabaseError, DbTx, DbTxMut, Tables, TransactionLayout,
};
use syncreset_primitives::{
    keys::{decode_block_number, encode_block_number, HEAD_HEADER_KEY},
    BlockHash, BlockNumber,
};
use syncreset_stages_types::StageId;
use tracing::{debug, info, warn};

/// Deletes block bodies from height `from` onwards.
pub fn truncate_blocks<TX>(tx: &TX, from: BlockNumber) -> Result<usize, DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    tx.delete_from(Tables::BlockBody, &encode_block_number(from))
}

/// Deletes canonical hash markers from height `from` onwards.
pub fn truncate_canonical_hash<TX>(tx: &TX, from: BlockNumber) -> Result<usize, DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    tx.delete_from(Tables::CanonicalHeaders, &encode_block_number(from))
}

/// Deletes total difficulty records from height `from` onwards.
pub fn truncate_td<TX>(tx: &TX, from: BlockNumber) -> Result<usize, DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    tx.delete_from(Tables::HeadersTotalDifficulty, &encode_block_number(from))
}

/// Reads the canonical hash at `number`.
pub fn read_canonical_hash<TX>(
    tx: &TX,
    number: BlockNumber,
) -> Result<Option<BlockHash>, DatabaseError>
where
    TX: DbTx + ?Sized,
{
    tx.get(Tables::CanonicalHeaders, &encode_block_number(number))?
        .map(|raw| {
            BlockHash::try_from(raw.as_slice())
                .map_err(|_| DatabaseError::Decode { table: Tables::CanonicalHeaders })
        })
        .transpose()
}

/// Height of the highest canonical hash marker, if any.
pub fn canonical_head<TX>(tx: &TX) -> Result<Option<BlockNumber>, DatabaseError>
where
    TX: DbTx + ?Sized,
{
    Ok(tx.last(Tables::CanonicalHeaders)?.and_then(|(key, _)| decode_block_number(&key)))
}

/// Points the head header at `hash`.
pub fn write_head_header_hash<TX>(tx: &TX, hash: BlockHash) -> Result<(), DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    tx.put(Tables::HeadHeader, HEAD_HEADER_KEY, hash.as_slice())
}

/// Deletes body records at height `from` or above one key at a time.
///
/// Covers databases where a previous truncation left records behind.
pub fn remove_orphaned_bodies<TX>(tx: &TX, from: BlockNumber) -> Result<usize, DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    let mut keys = Vec::new();
    tx.walk(Tables::BlockBody, &encode_block_number(from), &mut |key, _| {
        keys.push(key.to_vec());
        Ok(true)
    })?;
    for key in &keys {
        tx.delete(Tables::BlockBody, key)?;
    }
    if !keys.is_empty() {
        warn!(target: "reset::blocks", removed = keys.len(), from, "Removed orphaned block bodies");
    }
    Ok(keys.len())
}

/// Truncates block data down to genesis and optionally refills it from `archive`.
///
/// Steps, all inside `tx`:
/// 1. bodies, canonical markers and total difficulty above genesis are deleted
/// 2. Bodies and Headers progress is set to 1, Snapshots progress to 0
/// 3. the head header is pointed at the canonical genesis hash
/// 4. orphaned bodies at height 2 and above are removed
/// 5. non-canonical and canonical transactions and their sequences are cleared, using the
///    active [`TransactionLayout`]
/// 6. if `archive` holds blocks, they are copied in and the Snapshots, Headers, Bodies and
///    Senders watermarks are set to its height
///
/// Returns the refilled height, if any.
pub fn reset_blocks<TX>(
    tx: &TX,
    archive: Option<&dyn SnapshotArchive>,
) -> Result<Option<BlockNumber>, ResetError>
where
    TX: DbTxMut,
{
    let bodies = truncate_blocks(tx, 1)?;
    StageId::Bodies.save_progress(tx, 1)?;
    StageId::Headers.save_progress(tx, 1)?;
    StageId::Snapshots.save_progress(tx, 0)?;

    let canonical = truncate_canonical_hash(tx, 1)?;
    let td = truncate_td(tx, 1)?;
    debug!(target: "reset::blocks", bodies, canonical, td, "Truncated blocks above genesis");

    let genesis = read_canonical_hash(tx, 0)?.ok_or(ResetError::MissingCanonicalHash(0))?;
    write_head_header_hash(tx, genesis)?;

    remove_orphaned_bodies(tx, 2)?;

    let eth_tx = TransactionLayout::resolve(tx)?.table();
    clear_tables(tx, &[Tables::NonCanonicalTxs, eth_tx, Tables::MaxTxNum])?;
    reset_sequence(tx, eth_tx, 0)?;
    reset_sequence(tx, Tables::NonCanonicalTxs, 0)?;

    let Some(archive) = archive else { return Ok(None) };
    let available = archive.blocks_available()?;
    if available == 0 {
        return Ok(None)
    }

    archive.fill(tx, available)?;
    for stage in [StageId::Snapshots, StageId::Headers, StageId::Bodies, StageId::Senders] {
        stage.save_progress(tx, available)?;
    }
    info!(target: "reset::blocks", available, "Recovered blocks from snapshot archive");

    Ok(Some(available))
}
