//! Transaction wrappers for redb.

use super::definition;
use crate::{abstraction::transaction::RawEntry, DatabaseError, DbTx, DbTxMut, Tables};
use redb::{ReadTransaction, ReadableTable, TableError, WriteTransaction};
use std::fmt;
use tracing::warn;

type RawKey = &'static [u8];

/// Read only transaction over a consistent snapshot of the database.
pub struct RoTx {
    inner: ReadTransaction,
}

impl RoTx {
    pub(crate) const fn new(inner: ReadTransaction) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for RoTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoTx").finish_non_exhaustive()
    }
}

/// Opens `$table` for reading inside a [`RoTx`], evaluating `$missing` if the table was never
/// created and `$body` with the opened table otherwise.
macro_rules! with_ro_table {
    ($tx:expr, $table:expr, $missing:expr, |$t:ident| $body:expr) => {
        match $tx.inner.open_table(definition($table)) {
            Ok($t) => $body,
            Err(TableError::TableDoesNotExist(_)) => Ok($missing),
            Err(e) => Err(DatabaseError::Read { table: $table, message: e.to_string() }),
        }
    };
}

impl DbTx for RoTx {
    fn get(&self, table: Tables, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError> {
        with_ro_table!(self, table, None, |t| get(&t, table, key))
    }

    fn first(&self, table: Tables) -> Result<Option<RawEntry>, DatabaseError> {
        with_ro_table!(self, table, None, |t| first(&t, table))
    }

    fn last(&self, table: Tables) -> Result<Option<RawEntry>, DatabaseError> {
        with_ro_table!(self, table, None, |t| last(&t, table))
    }

    fn entries(&self, table: Tables) -> Result<usize, DatabaseError> {
        with_ro_table!(self, table, 0, |t| entries(&t, table))
    }

    fn walk(
        &self,
        table: Tables,
        start: &[u8],
        visitor: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, DatabaseError>,
    ) -> Result<(), DatabaseError> {
        with_ro_table!(self, table, (), |t| walk(&t, table, start, visitor))
    }

    fn commit(self) -> Result<(), DatabaseError> {
        // releasing the snapshot is all a read transaction has to do
        drop(self.inner);
        Ok(())
    }

    fn abort(self) {}
}

/// Read write transaction. Only one can be open at a time.
pub struct RwTx {
    inner: WriteTransaction,
}

impl RwTx {
    pub(crate) const fn new(inner: WriteTransaction) -> Self {
        Self { inner }
    }

    fn open_table(
        &self,
        table: Tables,
    ) -> Result<redb::Table<'_, RawKey, RawKey>, DatabaseError> {
        self.inner
            .open_table(definition(table))
            .map_err(|e| DatabaseError::Read { table, message: e.to_string() })
    }
}

impl fmt::Debug for RwTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RwTx").finish_non_exhaustive()
    }
}

impl DbTx for RwTx {
    fn get(&self, table: Tables, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError> {
        get(&self.open_table(table)?, table, key)
    }

    fn first(&self, table: Tables) -> Result<Option<RawEntry>, DatabaseError> {
        first(&self.open_table(table)?, table)
    }

    fn last(&self, table: Tables) -> Result<Option<RawEntry>, DatabaseError> {
        last(&self.open_table(table)?, table)
    }

    fn entries(&self, table: Tables) -> Result<usize, DatabaseError> {
        entries(&self.open_table(table)?, table)
    }

    fn walk(
        &self,
        table: Tables,
        start: &[u8],
        visitor: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, DatabaseError>,
    ) -> Result<(), DatabaseError> {
        walk(&self.open_table(table)?, table, start, visitor)
    }

    fn commit(self) -> Result<(), DatabaseError> {
        self.inner.commit().map_err(|e| DatabaseError::Commit(e.to_string()))
    }

    fn abort(self) {
        if let Err(err) = self.inner.abort() {
            warn!(target: "storage::db", %err, "Failed to abort write transaction");
        }
    }
}

impl DbTxMut for RwTx {
    fn put(&self, table: Tables, key: &[u8], value: &[u8]) -> Result<(), DatabaseError> {
        let mut t = self.open_table(table)?;
        t.insert(key, value).map_err(|e| DatabaseError::Write { table, message: e.to_string() })?;
        Ok(())
    }

    fn delete(&self, table: Tables, key: &[u8]) -> Result<bool, DatabaseError> {
        let mut t = self.open_table(table)?;
        let removed = t
            .remove(key)
            .map_err(|e| DatabaseError::Delete { table, message: e.to_string() })?
            .is_some();
        Ok(removed)
    }

    fn clear(&self, table: Tables) -> Result<(), DatabaseError> {
        let clear_err = |message: String| DatabaseError::Clear { table, message };

        self.inner.delete_table(definition(table)).map_err(|e| clear_err(e.to_string()))?;
        self.inner.open_table(definition(table)).map_err(|e| clear_err(e.to_string()))?;
        Ok(())
    }

    fn delete_from(&self, table: Tables, start: &[u8]) -> Result<usize, DatabaseError> {
        let mut t = self.open_table(table)?;

        let mut keys = Vec::new();
        walk(&t, table, start, &mut |key, _| {
            keys.push(key.to_vec());
            Ok(true)
        })?;

        for key in &keys {
            t.remove(key.as_slice())
                .map_err(|e| DatabaseError::Delete { table, message: e.to_string() })?;
        }

        Ok(keys.len())
    }
}

fn get<T>(t: &T, table: Tables, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError>
where
    T: ReadableTable<RawKey, RawKey>,
{
    let value = t.get(key).map_err(|e| DatabaseError::Read { table, message: e.to_string() })?;
    Ok(value.map(|v| v.value().to_vec()))
}

fn first<T>(t: &T, table: Tables) -> Result<Option<RawEntry>, DatabaseError>
where
    T: ReadableTable<RawKey, RawKey>,
{
    let entry = t.first().map_err(|e| DatabaseError::Read { table, message: e.to_string() })?;
    Ok(entry.map(|(k, v)| (k.value().to_vec(), v.value().to_vec())))
}

fn last<T>(t: &T, table: Tables) -> Result<Option<RawEntry>, DatabaseError>
where
    T: ReadableTable<RawKey, RawKey>,
{
    let entry = t.last().map_err(|e| DatabaseError::Read { table, message: e.to_string() })?;
    Ok(entry.map(|(k, v)| (k.value().to_vec(), v.value().to_vec())))
}

fn entries<T>(t: &T, table: Tables) -> Result<usize, DatabaseError>
where
    T: ReadableTable<RawKey, RawKey>,
{
    let len = t.len().map_err(|e| DatabaseError::Read { table, message: e.to_string() })?;
    Ok(len as usize)
}

fn walk<T>(
    t: &T,
    table: Tables,
    start: &[u8],
    visitor: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, DatabaseError>,
) -> Result<(), DatabaseError>
where
    T: ReadableTable<RawKey, RawKey>,
{
    let read_err = |message: String| DatabaseError::Read { table, message };

    for entry in t.range::<&[u8]>(start..).map_err(|e| read_err(e.to_string()))? {
        let (key, value) = entry.map_err(|e| read_err(e.to_string()))?;
        if !visitor(key.value(), value.value())? {
            break
        }
    }

    Ok(())
}
