use crate::{
    abstraction::transaction::{DbTx, DbTxMut},
    DatabaseError,
};
use std::{fmt::Debug, sync::Arc};

/// Main Database trait that can open read-only and read-write transactions.
pub trait Database: Send + Sync + Debug {
    /// Read-Only database transaction
    type TX: DbTx;
    /// Read-Write database transaction
    type TXMut: DbTxMut;

    /// Create read only transaction.
    fn tx(&self) -> Result<Self::TX, DatabaseError>;

    /// Create read write transaction only possible if database is open with write access.
    ///
    /// Blocks while another read write transaction is open.
    fn tx_mut(&self) -> Result<Self::TXMut, DatabaseError>;

    /// Takes a function and passes a read-only transaction into it, making sure it's closed in the
    /// end of the execution.
    fn view<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Self::TX) -> T,
    {
        let tx = self.tx()?;

        let res = f(&tx);
        tx.commit()?;

        Ok(res)
    }

    /// Takes a function and passes a write-read transaction into it.
    ///
    /// The transaction is committed only if the function returns `Ok`. On `Err` it is aborted and
    /// none of its writes become visible.
    fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self::TXMut) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let tx = self.tx_mut()?;

        match f(&tx) {
            Ok(res) => {
                tx.commit()?;
                Ok(res)
            }
            Err(err) => {
                tx.abort();
                Err(err)
            }
        }
    }
}

impl<DB: Database> Database for Arc<DB> {
    type TX = <DB as Database>::TX;
    type TXMut = <DB as Database>::TXMut;

    fn tx(&self) -> Result<Self::TX, DatabaseError> {
        <DB as Database>::tx(self)
    }

    fn tx_mut(&self) -> Result<Self::TXMut, DatabaseError> {
        <DB as Database>::tx_mut(self)
    }
}

impl<DB: Database> Database for &DB {
    type TX = <DB as Database>::TX;
    type TXMut = <DB as Database>::TXMut;

    fn tx(&self) -> Result<Self::TX, DatabaseError> {
        <DB as Database>::tx(self)
    }

    fn tx_mut(&self) -> Result<Self::TXMut, DatabaseError> {
        <DB as Database>::tx_mut(self)
    }
}
