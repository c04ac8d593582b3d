//! Atomic reset of stage tables and watermarks.
//!
//! The free functions operate on an open write transaction and compose freely. [`ResetEngine`]
//! wraps each operation in exactly one write transaction that commits only if every step
//! succeeds.

use crate::{
    archive::{DatabaseArchive, SnapshotArchive},
    blocks,
    catalog::StageTableCatalog,
    genesis::{insert_genesis_state, ChainRegistry, GenesisProvider},
    ResetError,
};
use std::{fs, path::Path, sync::Arc};
use syncreset_config::{Config, ResetConfig};
use syncreset_db::{Database, DatabaseError, DbTxMut, SchemaVersion, Tables};
use syncreset_primitives::BlockNumber;
use syncreset_stages_types::StageId;
use tracing::{debug, info};

/// Derived stages reset by [`ResetEngine::reset_state`] before the execution reset.
///
/// Senders are recovered from canonical data only and are deliberately kept.
pub const STATE_DERIVED_STAGES: &[StageId] = &[
    StageId::HashState,
    StageId::IntermediateHashes,
    StageId::AccountHistoryIndex,
    StageId::StorageHistoryIndex,
    StageId::LogIndex,
    StageId::CallTraces,
    StageId::Finish,
];

/// Watermarks zeroed by the execution reset.
const EXEC_STAGES: &[StageId] =
    &[StageId::Execution, StageId::HashState, StageId::IntermediateHashes];

/// Clears `tables`, logging how many entries each one held.
pub fn clear_tables<TX>(tx: &TX, tables: &[Tables]) -> Result<(), DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    for table in tables {
        let entries = tx.entries(*table)?;
        tx.clear(*table)?;
        info!(target: "reset::stages", %table, entries, "Cleared table");
    }
    Ok(())
}

/// Sets progress and prune progress of every stage in `stages` to zero.
pub fn clear_stage_progress<TX>(tx: &TX, stages: &[StageId]) -> Result<(), DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    for stage in stages {
        stage.clear_progress(tx)?;
        debug!(target: "reset::stages", %stage, "Cleared stage progress");
    }
    Ok(())
}

/// Clears every table owned by any of `stages`, then zeroes the watermarks of every named stage,
/// whether or not its tables held data.
pub fn reset_stages<TX>(
    tx: &TX,
    catalog: &StageTableCatalog,
    stages: &[StageId],
) -> Result<(), DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    clear_tables(tx, &catalog.tables_for_stages(stages))?;
    clear_stage_progress(tx, stages)
}

/// Clears the transaction lookup index and zeroes its watermarks.
pub fn reset_tx_lookup<TX>(tx: &TX) -> Result<(), DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    clear_tables(tx, &[Tables::TxLookup])?;
    clear_stage_progress(tx, &[StageId::TxLookup])
}

/// Clears recovered senders and zeroes the senders watermarks.
pub fn reset_senders<TX>(tx: &TX) -> Result<(), DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    clear_tables(tx, &[Tables::Senders])?;
    clear_stage_progress(tx, &[StageId::Senders])
}

/// Clears all state and state history and zeroes the execution watermarks.
///
/// Under [`SchemaVersion::Legacy`] the genesis state of `chain` is written back into the emptied
/// state tables. Other versions rebuild state from history and get no reseed.
pub fn reset_exec<TX>(
    tx: &TX,
    catalog: &StageTableCatalog,
    genesis: &dyn GenesisProvider,
    chain: &str,
) -> Result<(), ResetError>
where
    TX: DbTxMut + ?Sized,
{
    clear_stage_progress(tx, EXEC_STAGES)?;
    clear_tables(tx, catalog.state_tables())?;
    clear_tables(tx, &catalog.state_history_tables())?;

    if catalog.version().is_legacy() {
        let genesis = genesis.genesis(chain)?;
        insert_genesis_state(tx, &genesis)?;
    } else {
        debug!(target: "reset::genesis", version = %catalog.version(), "Skipping genesis reseed");
    }
    Ok(())
}

/// Runs the reset operations against a database, one write transaction per call.
#[derive(Debug)]
pub struct ResetEngine<DB> {
    db: DB,
    genesis: Arc<dyn GenesisProvider>,
    archive: Option<Arc<dyn SnapshotArchive>>,
    defaults: ResetConfig,
}

impl<DB: Database> ResetEngine<DB> {
    /// Creates an engine resolving genesis from the default [`ChainRegistry`] and without a
    /// snapshot archive.
    pub fn new(db: DB) -> Self {
        Self {
            db,
            genesis: Arc::new(ChainRegistry::default()),
            archive: None,
            defaults: ResetConfig::default(),
        }
    }

    /// Creates an engine from `config`.
    ///
    /// Genesis files are loaded from `reset.genesis_dir`, the snapshot archive is opened when
    /// enabled, and `reset.chain` and `reset.work_dir` become the targets of
    /// [`ResetEngine::reset_configured_exec`] and [`ResetEngine::reset_configured_state`].
    pub fn from_config(db: DB, config: &Config) -> Result<Self, ResetError> {
        let archive = DatabaseArchive::from_config(&config.snapshots)?
            .map(|archive| Arc::new(archive) as Arc<dyn SnapshotArchive>);
        Ok(Self {
            db,
            genesis: Arc::new(ChainRegistry::from_config(&config.reset)?),
            archive,
            defaults: config.reset.clone(),
        })
    }

    /// Sets the genesis provider used by the execution reset.
    pub fn with_genesis_provider(mut self, genesis: impl GenesisProvider + 'static) -> Self {
        self.genesis = Arc::new(genesis);
        self
    }

    /// Sets the archive used to refill blocks after [`ResetEngine::reset_blocks`].
    pub fn with_archive(mut self, archive: Option<Arc<dyn SnapshotArchive>>) -> Self {
        self.archive = archive;
        self
    }

    /// Returns the underlying database.
    pub const fn db(&self) -> &DB {
        &self.db
    }

    /// Resets `stages` as one unit: their tables are cleared and all their watermarks zeroed.
    pub fn reset(&self, stages: &[StageId]) -> Result<(), ResetError> {
        info!(target: "reset::stages", ?stages, "Resetting stages");
        self.db.update(|tx| {
            let catalog = StageTableCatalog::new(SchemaVersion::resolve(tx)?);
            reset_stages(tx, &catalog, stages)?;
            Ok(())
        })
    }

    /// Clears state and state history, reseeding the genesis of `chain` under the legacy layout.
    pub fn reset_exec(&self, chain: &str, work_dir: &Path) -> Result<(), ResetError> {
        prepare_work_dir(work_dir)?;
        info!(target: "reset::stages", chain, "Resetting execution state");
        self.db.update(|tx| {
            let catalog = StageTableCatalog::new(SchemaVersion::resolve(tx)?);
            reset_exec(tx, &catalog, self.genesis.as_ref(), chain)
        })
    }

    /// Resets every stage derived from execution, the transaction lookup and the execution
    /// state, in a single transaction. Senders are kept.
    pub fn reset_state(&self, chain: &str, work_dir: &Path) -> Result<(), ResetError> {
        prepare_work_dir(work_dir)?;
        info!(target: "reset::stages", chain, "Resetting state");
        self.db.update(|tx| {
            let catalog = StageTableCatalog::new(SchemaVersion::resolve(tx)?);
            reset_stages(tx, &catalog, STATE_DERIVED_STAGES)?;
            reset_tx_lookup(tx)?;
            reset_exec(tx, &catalog, self.genesis.as_ref(), chain)
        })
    }

    /// [`ResetEngine::reset_exec`] for the configured chain and work directory.
    pub fn reset_configured_exec(&self) -> Result<(), ResetError> {
        self.reset_exec(&self.defaults.chain, &self.defaults.work_dir)
    }

    /// [`ResetEngine::reset_state`] for the configured chain and work directory.
    pub fn reset_configured_state(&self) -> Result<(), ResetError> {
        self.reset_state(&self.defaults.chain, &self.defaults.work_dir)
    }

    /// Clears recovered senders.
    pub fn reset_senders(&self) -> Result<(), ResetError> {
        self.db.update(|tx| reset_senders(tx).map_err(ResetError::from))
    }

    /// Clears the transaction lookup index.
    pub fn reset_tx_lookup(&self) -> Result<(), ResetError> {
        self.db.update(|tx| reset_tx_lookup(tx).map_err(ResetError::from))
    }

    /// Truncates block data to genesis and refills it from the configured archive, if any.
    ///
    /// Returns the height refilled from the archive.
    pub fn reset_blocks(&self) -> Result<Option<BlockNumber>, ResetError> {
        info!(target: "reset::blocks", archive = self.archive.is_some(), "Resetting blocks");
        self.db.update(|tx| blocks::reset_blocks(tx, self.archive.as_deref()))
    }
}

fn prepare_work_dir(work_dir: &Path) -> Result<(), ResetError> {
    fs::create_dir_all(work_dir)
        .map_err(|source| ResetError::Io { path: work_dir.to_path_buf(), source })
}
