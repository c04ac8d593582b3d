//! Utilities for testing against a real on-disk database.

use crate::{
    abstraction::transaction::RawEntry, init_db, Database, DatabaseEnv, DatabaseError, DbTx,
    DbTxMut, RoTx, RwTx, Tables,
};
use std::{fmt, ops::Deref, sync::Arc};
use tempfile::TempDir;

/// A database living in a temporary directory that is removed on drop.
pub struct TempDatabase {
    db: DatabaseEnv,
    // dropped after `db`
    dir: TempDir,
}

impl TempDatabase {
    /// Returns the directory holding the database file.
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl fmt::Debug for TempDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempDatabase").field("path", &self.dir.path()).finish_non_exhaustive()
    }
}

impl Deref for TempDatabase {
    type Target = DatabaseEnv;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

impl Database for TempDatabase {
    type TX = RoTx;
    type TXMut = RwTx;

    fn tx(&self) -> Result<Self::TX, DatabaseError> {
        self.db.tx()
    }

    fn tx_mut(&self) -> Result<Self::TXMut, DatabaseError> {
        self.db.tx_mut()
    }
}

/// Create read/write database for testing
pub fn create_test_rw_db() -> Arc<TempDatabase> {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db = init_db(dir.path()).expect("failed to open test database");
    Arc::new(TempDatabase { db, dir })
}

/// Operation a [`FaultyDatabase`] fails on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail [`DbTxMut::clear`] on the table.
    Clear(Tables),
    /// Fail [`DbTxMut::put`] on the table.
    Put(Tables),
}

/// Wraps a database and injects a failure into its write transactions.
#[derive(Debug)]
pub struct FaultyDatabase<DB> {
    inner: DB,
    fault: Fault,
}

impl<DB> FaultyDatabase<DB> {
    /// Wraps `inner`, failing every write transaction on `fault`.
    pub const fn new(inner: DB, fault: Fault) -> Self {
        Self { inner, fault }
    }
}

impl<DB: Database> Database for FaultyDatabase<DB> {
    type TX = DB::TX;
    type TXMut = FaultyTx<DB::TXMut>;

    fn tx(&self) -> Result<Self::TX, DatabaseError> {
        self.inner.tx()
    }

    fn tx_mut(&self) -> Result<Self::TXMut, DatabaseError> {
        Ok(FaultyTx { inner: self.inner.tx_mut()?, fault: self.fault })
    }
}

/// Write transaction of a [`FaultyDatabase`].
#[derive(Debug)]
pub struct FaultyTx<TX> {
    inner: TX,
    fault: Fault,
}

impl<TX> FaultyTx<TX> {
    fn injected(&self) -> String {
        format!("injected fault: {:?}", self.fault)
    }
}

impl<TX: DbTx> DbTx for FaultyTx<TX> {
    fn get(&self, table: Tables, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError> {
        self.inner.get(table, key)
    }

    fn first(&self, table: Tables) -> Result<Option<RawEntry>, DatabaseError> {
        self.inner.first(table)
    }

    fn last(&self, table: Tables) -> Result<Option<RawEntry>, DatabaseError> {
        self.inner.last(table)
    }

    fn entries(&self, table: Tables) -> Result<usize, DatabaseError> {
        self.inner.entries(table)
    }

    fn walk(
        &self,
        table: Tables,
        start: &[u8],
        visitor: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, DatabaseError>,
    ) -> Result<(), DatabaseError> {
        self.inner.walk(table, start, visitor)
    }

    fn commit(self) -> Result<(), DatabaseError> {
        self.inner.commit()
    }

    fn abort(self) {
        self.inner.abort()
    }
}

impl<TX: DbTxMut> DbTxMut for FaultyTx<TX> {
    fn put(&self, table: Tables, key: &[u8], value: &[u8]) -> Result<(), DatabaseError> {
        if self.fault == Fault::Put(table) {
            return Err(DatabaseError::Write { table, message: self.injected() })
        }
        self.inner.put(table, key, value)
    }

    fn delete(&self, table: Tables, key: &[u8]) -> Result<bool, DatabaseError> {
        self.inner.delete(table, key)
    }

    fn clear(&self, table: Tables) -> Result<(), DatabaseError> {
        if self.fault == Fault::Clear(table) {
            return Err(DatabaseError::Clear { table, message: self.injected() })
        }
        self.inner.clear(table)
    }

    fn delete_from(&self, table: Tables, start: &[u8]) -> Result<usize, DatabaseError> {
        self.inner.delete_from(table, start)
    }
}
