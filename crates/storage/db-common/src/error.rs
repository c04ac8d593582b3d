use crate::archive::ArchiveError;
use std::path::PathBuf;
use syncreset_db::DatabaseError;

/// Error returned by the reset and recovery operations.
///
/// Every variant aborts the enclosing transaction. Warmup failures are never reported through
/// this type.
#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    /// Clear, read or write failure against the store.
    #[error(transparent)]
    Storage(#[from] DatabaseError),
    /// No genesis is registered for the chain.
    #[error("no genesis known for chain {chain}")]
    UnknownGenesis {
        /// Requested chain name.
        chain: String,
    },
    /// A genesis definition could not be parsed.
    #[error("invalid genesis for chain {chain}: {message}")]
    InvalidGenesis {
        /// Chain the definition belongs to.
        chain: String,
        /// Parser error.
        message: String,
    },
    /// The canonical hash of a block that must exist is missing.
    #[error("canonical hash of block {0} is missing")]
    MissingCanonicalHash(u64),
    /// Snapshot archive failure during a refill.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    /// Filesystem failure on a working or chain directory.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
