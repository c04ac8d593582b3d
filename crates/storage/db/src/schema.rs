//! Persisted storage flags and the schema versions they select.
//!
//! The flags live in [`Tables::DatabaseInfo`]. They are written once when a database is created
//! and read by every operation that needs to know which history and transaction tables exist.

use crate::{Database, DatabaseError, DbTx, DbTxMut, Tables};
use std::fmt;

const ENABLED: &[u8] = &[1];
const DISABLED: &[u8] = &[0];

/// A boolean storage flag persisted in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageFlag {
    /// Columnar history and index tables are maintained.
    HistoryV3,
    /// Commitment history is maintained on top of [`StorageFlag::HistoryV3`].
    CommitmentHistory,
    /// Canonical transactions are stored in [`Tables::EthTxV3`].
    TransactionsV3,
}

impl StorageFlag {
    /// Key of the flag in [`Tables::DatabaseInfo`].
    pub const fn key(&self) -> &'static str {
        match self {
            Self::HistoryV3 => "history.v3",
            Self::CommitmentHistory => "commitment.history",
            Self::TransactionsV3 => "transactions.v3",
        }
    }

    /// Returns whether the flag is set. A missing flag is disabled.
    pub fn is_enabled<TX>(&self, tx: &TX) -> Result<bool, DatabaseError>
    where
        TX: DbTx + ?Sized,
    {
        Ok(tx.get(Tables::DatabaseInfo, self.key().as_bytes())?.as_deref() == Some(ENABLED))
    }

    /// Persists the flag.
    pub fn write<TX>(&self, tx: &TX, enabled: bool) -> Result<(), DatabaseError>
    where
        TX: DbTxMut + ?Sized,
    {
        tx.put(
            Tables::DatabaseInfo,
            self.key().as_bytes(),
            if enabled { ENABLED } else { DISABLED },
        )
    }
}

/// Generation of the history tables in use.
///
/// Versioned and Extended layouts are additive over Legacy: the legacy changeset tables may
/// coexist with the versioned ones and are warmed and cleared together with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SchemaVersion {
    /// Per-block changesets only.
    #[default]
    Legacy,
    /// Columnar history and indices.
    Versioned,
    /// Versioned plus commitment history.
    Extended,
}

impl SchemaVersion {
    /// All versions, oldest first.
    pub const ALL: [Self; 3] = [Self::Legacy, Self::Versioned, Self::Extended];

    /// Resolves the active version from the persisted flags.
    pub fn resolve<TX>(tx: &TX) -> Result<Self, DatabaseError>
    where
        TX: DbTx + ?Sized,
    {
        if !StorageFlag::HistoryV3.is_enabled(tx)? {
            return Ok(Self::Legacy)
        }
        if StorageFlag::CommitmentHistory.is_enabled(tx)? {
            Ok(Self::Extended)
        } else {
            Ok(Self::Versioned)
        }
    }

    /// Resolves the active version in a fresh read transaction.
    pub fn from_db<DB: Database>(db: &DB) -> Result<Self, DatabaseError> {
        db.view(|tx| Self::resolve(tx))?
    }

    /// Persists the flags that select this version.
    pub fn write<TX>(&self, tx: &TX) -> Result<(), DatabaseError>
    where
        TX: DbTxMut + ?Sized,
    {
        StorageFlag::HistoryV3.write(tx, self.has_versioned_history())?;
        StorageFlag::CommitmentHistory.write(tx, self.has_commitment_history())
    }

    /// Returns `true` if only the legacy changeset tables are in use.
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy)
    }

    /// Returns `true` if the columnar history tables are in use.
    pub const fn has_versioned_history(&self) -> bool {
        matches!(self, Self::Versioned | Self::Extended)
    }

    /// Returns `true` if the commitment history tables are in use.
    pub const fn has_commitment_history(&self) -> bool {
        matches!(self, Self::Extended)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Versioned => f.write_str("versioned"),
            Self::Extended => f.write_str("extended"),
        }
    }
}

/// Layout of the canonical transaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionLayout {
    /// Transactions in [`Tables::EthTx`].
    #[default]
    Legacy,
    /// Transactions in [`Tables::EthTxV3`].
    Versioned,
}

impl TransactionLayout {
    /// Resolves the active layout from [`StorageFlag::TransactionsV3`].
    pub fn resolve<TX>(tx: &TX) -> Result<Self, DatabaseError>
    where
        TX: DbTx + ?Sized,
    {
        if StorageFlag::TransactionsV3.is_enabled(tx)? {
            Ok(Self::Versioned)
        } else {
            Ok(Self::Legacy)
        }
    }

    /// The table holding canonical transactions under this layout.
    pub const fn table(&self) -> Tables {
        match self {
            Self::Legacy => Tables::EthTx,
            Self::Versioned => Tables::EthTxV3,
        }
    }
}
