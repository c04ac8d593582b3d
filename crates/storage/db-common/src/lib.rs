//! Reset, recovery and warmup of stage data.
//!
//! Every mutating operation runs inside exactly one write transaction of the underlying
//! [`Database`](syncreset_db::Database) and either fully applies or leaves the database as it was.
//! The building blocks are:
//!
//! - [`catalog`]: which tables each stage owns, per [`SchemaVersion`](syncreset_db::SchemaVersion)
//! - [`ResetEngine`]: stage, execution, state, senders and lookup resets
//! - [`blocks`]: truncation of canonical block data and recovery from a [`SnapshotArchive`]
//! - [`genesis`]: genesis definitions by chain name and the genesis state reseed
//! - [`WarmupEngine`]: best-effort concurrent read-ahead that never blocks writers

#![doc(
    html_logo_url = "https://raw.githubusercontent.com/paradigmxyz/reth/main/assets/reth-docs.png",
    html_favicon_url = "https://avatars0.githubusercontent.com/u/97369466?s=256",
    issue_tracker_base_url = "https://github.com/paradigmxyz/reth/issues/"
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod archive;
pub mod blocks;
pub mod catalog;
mod error;
pub mod genesis;
pub mod reset;
pub mod warmup;

pub use archive::{ArchiveError, DatabaseArchive, SnapshotArchive};
pub use catalog::StageTableCatalog;
pub use error::ResetError;
pub use genesis::{ChainRegistry, GenesisProvider};
pub use reset::ResetEngine;
pub use warmup::{WarmupEngine, WarmupStats};
