//! Tables and their classification.
//!
//! # Overview
//!
//! Every table is a keyed byte-range collection. Tables are grouped by [`TableKind`]:
//!
//! - [`TableKind::Canonical`] tables are the source of truth for the chain: headers, bodies,
//!   canonical hash markers and total difficulty. Only the block truncation path mutates them.
//! - [`TableKind::Derived`] tables are recomputable from canonical data and are owned by stages.
//! - [`TableKind::History`] tables are append-only per-block change logs, in the legacy changeset
//!   layout or in the versioned columnar layout.
//! - [`TableKind::Meta`] tables hold stage watermarks, sequences and storage flags.
//!
//! # Key layouts
//!
//! | table | key | value |
//! |---|---|---|
//! | `CanonicalHeaders` | block number | block hash |
//! | `Headers`, `HeadersTotalDifficulty`, `BlockBody`, `Senders` | block number ‖ hash | payload |
//! | `HeaderNumbers` | block hash | block number |
//! | `HeadHeader` | `LastHeader` | block hash |
//! | `PlainState` | address, or address ‖ incarnation ‖ slot | account or slot value |
//! | `Code` | code hash | bytecode |
//! | `PlainContractCode` | address ‖ incarnation | code hash |
//! | `SyncStageProgress`, `SyncStagePruneProgress` | stage name | block number |
//! | `Sequence` | table name | next id |
//! | `DatabaseInfo` | flag name | `0x01` when enabled |
//!
//! Block numbers and counters are big-endian `u64`.

use std::{fmt, str::FromStr};

/// Classification of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Authoritative chain data.
    Canonical,
    /// Recomputable index or materialization owned by a stage.
    Derived,
    /// Append-only per-block change log.
    History,
    /// Bookkeeping: watermarks, sequences and flags.
    Meta,
}

/// Returned when a string does not name a known table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown table: {0}")]
pub struct UnknownTable(pub String);

macro_rules! tables {
    ($($kind:ident => [$($table:ident),* $(,)?]),* $(,)?) => {
        /// Default tables that should be present inside database.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Tables {
            $($(
                #[doc = concat!("Represents the `", stringify!($table), "` table")]
                $table,
            )*)*
        }

        impl Tables {
            /// Array of all tables in database
            pub const ALL: &'static [Self] = &[$($(Self::$table,)*)*];

            /// The name of the given table in database
            pub const fn name(&self) -> &'static str {
                match self {
                    $($(Self::$table => stringify!($table),)*)*
                }
            }

            /// The classification of the given table
            pub const fn kind(&self) -> TableKind {
                match self {
                    $($(Self::$table => TableKind::$kind,)*)*
                }
            }
        }

        impl FromStr for Tables {
            type Err = UnknownTable;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($(stringify!($table) => Ok(Self::$table),)*)*
                    _ => Err(UnknownTable(s.to_string())),
                }
            }
        }
    };
}

tables! {
    Canonical => [
        Headers,
        HeaderNumbers,
        CanonicalHeaders,
        HeadersTotalDifficulty,
        HeadHeader,
        BlockBody,
        EthTx,
        EthTxV3,
        NonCanonicalTxs,
        MaxTxNum,
    ],
    Derived => [
        Senders,
        TxLookup,
        PlainState,
        HashedAccounts,
        HashedStorage,
        TrieOfAccounts,
        TrieOfStorage,
        Code,
        PlainContractCode,
        ContractCode,
        IncarnationMap,
        Epoch,
        PendingEpoch,
        BorReceipts,
        CallFromIndex,
        CallToIndex,
        LogAddressIndex,
        LogTopicIndex,
        AccountsHistory,
        StorageHistory,
    ],
    History => [
        AccountChangeSet,
        StorageChangeSet,
        Receipts,
        Log,
        CallTraceSet,
        AccountKeys,
        AccountHistoryKeys,
        AccountHistoryVals,
        AccountIdx,
        StorageKeys,
        StorageVals,
        StorageHistoryKeys,
        StorageHistoryVals,
        StorageIdx,
        CodeKeys,
        CodeVals,
        CodeHistoryKeys,
        CodeHistoryVals,
        CodeIdx,
        LogAddressKeys,
        LogAddressIdx,
        LogTopicsKeys,
        LogTopicsIdx,
        TracesFromKeys,
        TracesFromIdx,
        TracesToKeys,
        TracesToIdx,
        CommitmentKeys,
        CommitmentVals,
        CommitmentHistoryKeys,
        CommitmentHistoryVals,
        CommitmentIdx,
    ],
    Meta => [
        SyncStageProgress,
        SyncStagePruneProgress,
        Sequence,
        DatabaseInfo,
    ],
}

impl fmt::Display for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parse_table_from_str() {
        for table in Tables::ALL {
            assert_eq!(Tables::from_str(table.name()), Ok(*table));
        }
        assert_eq!(Tables::from_str("Nope"), Err(UnknownTable("Nope".to_string())));
    }

    #[test]
    fn table_names_are_unique() {
        let names = Tables::ALL.iter().map(Tables::name).collect::<HashSet<_>>();
        assert_eq!(names.len(), Tables::ALL.len());
    }

    #[test]
    fn table_kinds() {
        assert_eq!(Tables::CanonicalHeaders.kind(), TableKind::Canonical);
        assert_eq!(Tables::HashedAccounts.kind(), TableKind::Derived);
        assert_eq!(Tables::AccountChangeSet.kind(), TableKind::History);
        assert_eq!(Tables::SyncStageProgress.kind(), TableKind::Meta);
    }
}
