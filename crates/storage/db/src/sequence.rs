//! Per-table id sequences, stored in [`Tables::Sequence`] keyed by table name.

use crate::{
    codecs::{decode_u64, encode_u64},
    DatabaseError, DbTx, DbTxMut, Tables,
};

/// Reads the next id that [`increment_sequence`] would hand out for `table`.
pub fn read_sequence<TX>(tx: &TX, table: Tables) -> Result<u64, DatabaseError>
where
    TX: DbTx + ?Sized,
{
    tx.get(Tables::Sequence, table.name().as_bytes())?
        .map_or(Ok(0), |value| decode_u64(Tables::Sequence, &value))
}

/// Reserves `amount` ids for `table`, returning the first reserved id.
pub fn increment_sequence<TX>(tx: &TX, table: Tables, amount: u64) -> Result<u64, DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    let current = read_sequence(tx, table)?;
    tx.put(Tables::Sequence, table.name().as_bytes(), &encode_u64(current + amount))?;
    Ok(current)
}

/// Resets the sequence of `table` so the next reserved id is `next`.
pub fn reset_sequence<TX>(tx: &TX, table: Tables, next: u64) -> Result<(), DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    tx.put(Tables::Sequence, table.name().as_bytes(), &encode_u64(next))
}
