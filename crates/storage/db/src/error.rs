use crate::Tables;

/// Database error type.
///
/// Every variant raised by a table operation names the table it failed on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to open the database.
    #[error("failed to open the database: {0}")]
    Open(String),
    /// Failed to create a table in the database.
    #[error("failed to create table {table}: {message}")]
    CreateTable {
        /// The table that could not be created.
        table: Tables,
        /// Backend error message.
        message: String,
    },
    /// Failed to initiate a transaction.
    #[error("failed to initialize a transaction: {0}")]
    InitTx(String),
    /// A write transaction was requested from a read-only environment.
    #[error("database was opened read-only")]
    ReadOnly,
    /// Failed to read a value from a table.
    #[error("failed to read from table {table}: {message}")]
    Read {
        /// The table being read.
        table: Tables,
        /// Backend error message.
        message: String,
    },
    /// Failed to write a value into a table.
    #[error("failed to write into table {table}: {message}")]
    Write {
        /// The table being written.
        table: Tables,
        /// Backend error message.
        message: String,
    },
    /// Failed to delete a `(key, value)` pair from a table.
    #[error("failed to delete from table {table}: {message}")]
    Delete {
        /// The table being deleted from.
        table: Tables,
        /// Backend error message.
        message: String,
    },
    /// Failed to clear a table.
    #[error("failed to clear table {table}: {message}")]
    Clear {
        /// The table being cleared.
        table: Tables,
        /// Backend error message.
        message: String,
    },
    /// Failed to commit transaction changes into the database.
    #[error("failed to commit transaction changes: {0}")]
    Commit(String),
    /// Failed to decode a value read from a table.
    #[error("failed to decode a value from table {table}")]
    Decode {
        /// The table the value was read from.
        table: Tables,
    },
    /// Other unspecified error.
    #[error("{0}")]
    Other(String),
}
