//! Persisted per-stage watermarks.

use crate::StageId;
use syncreset_db::{
    codecs::{decode_u64, encode_u64},
    DatabaseError, DbTx, DbTxMut, Tables,
};
use syncreset_primitives::BlockNumber;

impl StageId {
    /// Get the last committed progress of this stage. A stage that never ran reads as `0`.
    pub fn get_progress<TX>(&self, tx: &TX) -> Result<BlockNumber, DatabaseError>
    where
        TX: DbTx + ?Sized,
    {
        read_watermark(tx, Tables::SyncStageProgress, *self)
    }

    /// Save the progress of this stage.
    pub fn save_progress<TX>(&self, tx: &TX, block: BlockNumber) -> Result<(), DatabaseError>
    where
        TX: DbTxMut + ?Sized,
    {
        tx.put(Tables::SyncStageProgress, self.as_str().as_bytes(), &encode_u64(block))
    }

    /// Get the last committed prune progress of this stage.
    pub fn get_prune_progress<TX>(&self, tx: &TX) -> Result<BlockNumber, DatabaseError>
    where
        TX: DbTx + ?Sized,
    {
        read_watermark(tx, Tables::SyncStagePruneProgress, *self)
    }

    /// Save the prune progress of this stage.
    pub fn save_prune_progress<TX>(&self, tx: &TX, block: BlockNumber) -> Result<(), DatabaseError>
    where
        TX: DbTxMut + ?Sized,
    {
        tx.put(Tables::SyncStagePruneProgress, self.as_str().as_bytes(), &encode_u64(block))
    }

    /// Sets both the progress and the prune progress of this stage to `0`.
    pub fn clear_progress<TX>(&self, tx: &TX) -> Result<(), DatabaseError>
    where
        TX: DbTxMut + ?Sized,
    {
        self.save_progress(tx, 0)?;
        self.save_prune_progress(tx, 0)
    }
}

fn read_watermark<TX>(tx: &TX, table: Tables, stage: StageId) -> Result<BlockNumber, DatabaseError>
where
    TX: DbTx + ?Sized,
{
    tx.get(table, stage.as_str().as_bytes())?.map_or(Ok(0), |value| decode_u64(table, &value))
}
