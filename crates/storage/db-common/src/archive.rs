//! Immutable block archives used to refill a truncated database.

use std::{fmt, path::Path};
use syncreset_config::SnapshotsConfig;
use syncreset_db::{
    Database, DatabaseEnv, DatabaseEnvKind, DatabaseError, DbTx, DbTxMut, Tables, DATABASE_FILE,
};
use syncreset_primitives::{
    keys::{decode_block_number, encode_block_number, HEAD_HEADER_KEY},
    BlockNumber,
};
use tracing::{debug, info};

/// Block-keyed tables copied by a refill.
const BLOCK_TABLES: &[Tables] = &[
    Tables::Headers,
    Tables::CanonicalHeaders,
    Tables::HeadersTotalDifficulty,
    Tables::BlockBody,
    Tables::Senders,
];

/// Errors raised while reading a snapshot archive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
    /// The archive could not be opened.
    #[error("failed to open snapshot archive {path}: {source}")]
    Open {
        /// Archive location.
        path: String,
        /// Underlying error.
        source: DatabaseError,
    },
    /// Reading the archive or writing into the target database failed.
    #[error("snapshot refill failed: {0}")]
    Storage(#[from] DatabaseError),
    /// The archive has no canonical hash for a block it claims to hold.
    #[error("snapshot archive has no canonical hash for block {0}")]
    MissingBlock(BlockNumber),
}

/// A local, immutable store of finalized blocks.
pub trait SnapshotArchive: Send + Sync + fmt::Debug {
    /// Highest block number available in the archive, `0` if it holds no blocks.
    fn blocks_available(&self) -> Result<BlockNumber, ArchiveError>;

    /// Copies headers, bodies and senders of blocks `0..=up_to` into `tx`.
    fn fill(&self, tx: &dyn DbTxMut, up_to: BlockNumber) -> Result<(), ArchiveError>;
}

/// [`SnapshotArchive`] backed by a read-only database holding finalized blocks.
#[derive(Debug)]
pub struct DatabaseArchive<DB = DatabaseEnv> {
    db: DB,
}

impl DatabaseArchive {
    /// Opens the archive described by `config`.
    ///
    /// Returns `None` when snapshots are disabled or no archive path is configured.
    pub fn from_config(config: &SnapshotsConfig) -> Result<Option<Self>, ArchiveError> {
        match (&config.archive_path, config.enabled) {
            (Some(path), true) => Self::open(path).map(Some),
            _ => Ok(None),
        }
    }

    /// Opens the archive stored in directory `path`.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let db = DatabaseEnv::open(&path.join(DATABASE_FILE), DatabaseEnvKind::RO).map_err(
            |source| ArchiveError::Open { path: path.display().to_string(), source },
        )?;
        debug!(target: "reset::blocks", path = %path.display(), "Opened snapshot archive");
        Ok(Self { db })
    }
}

impl<DB: Database> DatabaseArchive<DB> {
    /// Wraps an already opened archive database.
    pub const fn new(db: DB) -> Self {
        Self { db }
    }
}

impl<DB: Database> SnapshotArchive for DatabaseArchive<DB> {
    fn blocks_available(&self) -> Result<BlockNumber, ArchiveError> {
        let tx = self.db.tx()?;
        let last = tx.last(Tables::CanonicalHeaders)?;
        Ok(last.and_then(|(key, _)| decode_block_number(&key)).unwrap_or_default())
    }

    fn fill(&self, tx: &dyn DbTxMut, up_to: BlockNumber) -> Result<(), ArchiveError> {
        let archive = self.db.tx()?;

        for table in BLOCK_TABLES {
            let mut copied = 0usize;
            archive.walk(*table, &[], &mut |key, value| {
                match decode_block_number(key) {
                    Some(number) if number <= up_to => {}
                    _ => return Ok(false),
                }
                tx.put(*table, key, value)?;
                copied += 1;
                Ok(true)
            })?;
            debug!(target: "reset::blocks", %table, copied, "Copied snapshot rows");
        }

        // hash -> number, not ordered by block
        archive.walk(Tables::HeaderNumbers, &[], &mut |key, value| {
            if decode_block_number(value).is_some_and(|number| number <= up_to) {
                tx.put(Tables::HeaderNumbers, key, value)?;
            }
            Ok(true)
        })?;

        let head = archive
            .get(Tables::CanonicalHeaders, &encode_block_number(up_to))?
            .ok_or(ArchiveError::MissingBlock(up_to))?;
        tx.put(Tables::HeadHeader, HEAD_HEADER_KEY, &head)?;

        info!(target: "reset::blocks", up_to, "Filled database from snapshot archive");
        Ok(())
    }
}
