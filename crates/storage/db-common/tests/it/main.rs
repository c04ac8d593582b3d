#![allow(missing_docs)]

mod blocks;
mod reset;
mod warmup;

use syncreset_db::{Database, DatabaseError, DbTx, DbTxMut, Tables};

/// Reads every entry of `table`.
pub(crate) fn dump<DB: Database>(db: &DB, table: Tables) -> Vec<(Vec<u8>, Vec<u8>)> {
    db.view(|tx| {
        let mut entries = Vec::new();
        tx.walk(table, &[], &mut |key, value| {
            entries.push((key.to_vec(), value.to_vec()));
            Ok(true)
        })
        .map(|_| entries)
    })
    .unwrap()
    .unwrap()
}

/// Writes `count` distinct entries into each of `tables`.
pub(crate) fn fill<DB: Database>(db: &DB, tables: &[Tables], count: u8) {
    db.update(|tx| {
        for table in tables {
            for i in 0..count {
                tx.put(*table, &[i], table.name().as_bytes())?;
            }
        }
        Ok::<_, DatabaseError>(())
    })
    .unwrap();
}
