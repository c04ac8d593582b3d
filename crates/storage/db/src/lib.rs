//! Database abstraction layer of the stage reset tooling, with a concrete [redb] implementation.
//!
//! The database abstraction assumes that the underlying store is a KV store subdivided into
//! tables. Keys and values are raw bytes; the [`tables`] module documents the layout of each
//! table.
//!
//! One or more changes are tied to a transaction that is atomically committed to the data store
//! at the same time. The store admits a single writer at a time while readers keep observing the
//! snapshot they started on, so it is not possible to observe half of a transaction.
//!
//! Good starting points for this crate are:
//!
//! - [`Database`] for the main database abstraction
//! - [`DbTx`] (RO) and [`DbTxMut`] (RW) for the transaction abstractions.
//! - [`SchemaVersion`] for the persisted flags that select the active history layout.
//!
//! [redb]: https://docs.rs/redb

#![doc(
    html_logo_url = "https://raw.githubusercontent.com/paradigmxyz/reth/main/assets/reth-docs.png",
    html_favicon_url = "https://avatars0.githubusercontent.com/u/97369466?s=256",
    issue_tracker_base_url = "https://github.com/paradigmxyz/reth/issues/"
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

/// Traits defining the database abstractions, such as transactions.
pub mod abstraction;

pub mod codecs;
mod error;
mod implementation;
pub mod schema;
pub mod sequence;
pub mod tables;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use abstraction::{
    database::Database,
    transaction::{DbTx, DbTxMut},
};
pub use error::DatabaseError;
pub use implementation::redb::{init_db, DatabaseEnv, DatabaseEnvKind, RoTx, RwTx, DATABASE_FILE};
pub use schema::{SchemaVersion, StorageFlag, TransactionLayout};
pub use tables::{TableKind, Tables};
