use crate::{DatabaseError, Tables};
use std::fmt::Debug;

/// A `(key, value)` pair as stored.
pub type RawEntry = (Vec<u8>, Vec<u8>);

/// Read only transaction.
///
/// Reading a table that was never created behaves as reading an empty table.
pub trait DbTx: Debug {
    /// Get value by key.
    fn get(&self, table: Tables, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError>;
    /// First entry of the table in key order.
    fn first(&self, table: Tables) -> Result<Option<RawEntry>, DatabaseError>;
    /// Last entry of the table in key order.
    fn last(&self, table: Tables) -> Result<Option<RawEntry>, DatabaseError>;
    /// Returns number of entries in the table.
    fn entries(&self, table: Tables) -> Result<usize, DatabaseError>;
    /// Walks the table in key order starting at `start` (inclusive).
    ///
    /// The visitor returns `Ok(false)` to stop the walk early. It must not write to the table
    /// being walked.
    fn walk(
        &self,
        table: Tables,
        start: &[u8],
        visitor: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, DatabaseError>,
    ) -> Result<(), DatabaseError>;
    /// Commit for read only transaction will consume and free transaction.
    fn commit(self) -> Result<(), DatabaseError>
    where
        Self: Sized;
    /// Aborts transaction
    fn abort(self)
    where
        Self: Sized;

    /// Returns `true` if the table holds no entries.
    fn is_empty(&self, table: Tables) -> Result<bool, DatabaseError> {
        Ok(self.first(table)?.is_none())
    }
}

/// Read write transaction that allows writing to database
pub trait DbTxMut: DbTx {
    /// Put value to database
    fn put(&self, table: Tables, key: &[u8], value: &[u8]) -> Result<(), DatabaseError>;
    /// Delete value from database. Returns `true` if the key existed.
    fn delete(&self, table: Tables, key: &[u8]) -> Result<bool, DatabaseError>;
    /// Clears the table. Semantically a drop-and-recreate: the table exists and is empty
    /// afterwards.
    fn clear(&self, table: Tables) -> Result<(), DatabaseError>;
    /// Deletes every entry with a key greater than or equal to `start`, returning how many entries
    /// were removed.
    fn delete_from(&self, table: Tables, start: &[u8]) -> Result<usize, DatabaseError>;
}
