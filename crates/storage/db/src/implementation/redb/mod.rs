//! Module that interacts with [redb](https://docs.rs/redb).
//!
//! Each logical table is a redb table of raw byte keys and values named after
//! [`Tables::name`].

use crate::{Database, DatabaseError, Tables};
use redb::TableDefinition;
use std::{fmt, path::Path};
use tracing::debug;

mod tx;
pub use tx::{RoTx, RwTx};

/// Name of the database file inside the data directory.
pub const DATABASE_FILE: &str = "chaindata.redb";

/// Raw table layout: every table maps bytes to bytes.
pub(crate) type RawTableDefinition = TableDefinition<'static, &'static [u8], &'static [u8]>;

/// Returns the redb definition of the given table.
pub(crate) const fn definition(table: Tables) -> RawTableDefinition {
    TableDefinition::new(table.name())
}

/// Environment used when opening a database. RO/RW.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEnvKind {
    /// Read-only environment. Requesting a write transaction fails.
    RO,
    /// Read-write environment.
    RW,
}

/// Wrapper for the redb database: [`redb::Database`]
pub struct DatabaseEnv {
    inner: redb::Database,
    kind: DatabaseEnvKind,
}

impl fmt::Debug for DatabaseEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseEnv").field("kind", &self.kind).finish_non_exhaustive()
    }
}

impl Database for DatabaseEnv {
    type TX = RoTx;
    type TXMut = RwTx;

    fn tx(&self) -> Result<Self::TX, DatabaseError> {
        Ok(RoTx::new(self.inner.begin_read().map_err(|e| DatabaseError::InitTx(e.to_string()))?))
    }

    fn tx_mut(&self) -> Result<Self::TXMut, DatabaseError> {
        if self.kind == DatabaseEnvKind::RO {
            return Err(DatabaseError::ReadOnly)
        }
        Ok(RwTx::new(self.inner.begin_write().map_err(|e| DatabaseError::InitTx(e.to_string()))?))
    }
}

impl DatabaseEnv {
    /// Opens the database file at the specified path with the given `EnvKind`.
    ///
    /// A read-write environment creates the file if it does not exist. It does not create the
    /// tables, for that call [`DatabaseEnv::create_tables`].
    pub fn open(path: &Path, kind: DatabaseEnvKind) -> Result<Self, DatabaseError> {
        let inner = match kind {
            DatabaseEnvKind::RO => redb::Database::open(path),
            DatabaseEnvKind::RW => redb::Database::create(path),
        }
        .map_err(|e| DatabaseError::Open(format!("{}: {e}", path.display())))?;

        Ok(Self { inner, kind })
    }

    /// Returns the kind this environment was opened with.
    pub const fn kind(&self) -> DatabaseEnvKind {
        self.kind
    }

    /// Creates all the tables defined in [`Tables`], if necessary.
    pub fn create_tables(&self) -> Result<(), DatabaseError> {
        let tx = self.inner.begin_write().map_err(|e| DatabaseError::InitTx(e.to_string()))?;

        for table in Tables::ALL {
            tx.open_table(definition(*table))
                .map_err(|e| DatabaseError::CreateTable { table: *table, message: e.to_string() })?;
        }

        tx.commit().map_err(|e| DatabaseError::Commit(e.to_string()))?;

        Ok(())
    }
}

/// Opens up an existing database or creates a new one inside the given data directory. Creates
/// the tables defined in [`Tables`] if necessary. Read/Write mode.
pub fn init_db<P: AsRef<Path>>(path: P) -> Result<DatabaseEnv, DatabaseError> {
    let dir = path.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| {
        DatabaseError::Open(format!("could not create database directory {}: {e}", dir.display()))
    })?;

    let file = dir.join(DATABASE_FILE);
    debug!(target: "storage::db", path = %file.display(), "Opening database");

    let db = DatabaseEnv::open(&file, DatabaseEnvKind::RW)?;
    db.create_tables()?;
    Ok(db)
}
