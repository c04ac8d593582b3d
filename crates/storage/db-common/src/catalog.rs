//! Mapping from stages to the tables they own, for a given [`SchemaVersion`].
//!
//! Every function here is pure: table sets are computed per call and never accumulated into
//! shared state.

use syncreset_db::{SchemaVersion, Tables};
use syncreset_stages_types::StageId;

/// Plain and hashed state, trie nodes, code, contract metadata and consensus bookkeeping.
pub const STATE_TABLES: &[Tables] = &[
    Tables::PlainState,
    Tables::HashedAccounts,
    Tables::HashedStorage,
    Tables::TrieOfAccounts,
    Tables::TrieOfStorage,
    Tables::Epoch,
    Tables::PendingEpoch,
    Tables::BorReceipts,
    Tables::Code,
    Tables::PlainContractCode,
    Tables::ContractCode,
    Tables::IncarnationMap,
];

/// Per-block changesets of the legacy history layout.
pub const LEGACY_HISTORY_TABLES: &[Tables] = &[
    Tables::AccountChangeSet,
    Tables::StorageChangeSet,
    Tables::Receipts,
    Tables::Log,
    Tables::CallTraceSet,
];

/// Columnar history and index tables of the versioned layout.
pub const VERSIONED_HISTORY_TABLES: &[Tables] = &[
    Tables::AccountHistoryKeys,
    Tables::AccountIdx,
    Tables::AccountHistoryVals,
    Tables::StorageKeys,
    Tables::StorageVals,
    Tables::StorageHistoryKeys,
    Tables::StorageHistoryVals,
    Tables::StorageIdx,
    Tables::CodeKeys,
    Tables::CodeVals,
    Tables::CodeHistoryKeys,
    Tables::CodeHistoryVals,
    Tables::CodeIdx,
    Tables::LogAddressKeys,
    Tables::LogAddressIdx,
    Tables::LogTopicsKeys,
    Tables::LogTopicsIdx,
    Tables::TracesFromKeys,
    Tables::TracesFromIdx,
    Tables::TracesToKeys,
    Tables::TracesToIdx,
];

/// Tables added by the extended layout on top of the versioned one.
pub const EXTENDED_HISTORY_TABLES: &[Tables] = &[
    Tables::AccountKeys,
    Tables::StorageKeys,
    Tables::CodeKeys,
    Tables::CommitmentKeys,
    Tables::CommitmentVals,
    Tables::CommitmentHistoryKeys,
    Tables::CommitmentHistoryVals,
    Tables::CommitmentIdx,
];

/// Returns the tables owned by `stage` under `version`.
///
/// Stages only own derived tables. The columnar history of the versioned layouts is written by
/// execution and belongs to [`state_history_tables`], so ownership is the same under every
/// version. Stages that own no table, such as [`StageId::Execution`] whose output is the state
/// group, or the canonical block stages, return an empty set.
pub fn tables_for(stage: StageId, _version: SchemaVersion) -> Vec<Tables> {
    match stage {
        StageId::HashState => {
            vec![Tables::HashedAccounts, Tables::HashedStorage, Tables::ContractCode]
        }
        StageId::IntermediateHashes => vec![Tables::TrieOfAccounts, Tables::TrieOfStorage],
        StageId::CallTraces => vec![Tables::CallFromIndex, Tables::CallToIndex],
        StageId::LogIndex => vec![Tables::LogAddressIndex, Tables::LogTopicIndex],
        StageId::AccountHistoryIndex => vec![Tables::AccountsHistory],
        StageId::StorageHistoryIndex => vec![Tables::StorageHistory],
        StageId::TxLookup => vec![Tables::TxLookup],
        StageId::Senders => vec![Tables::Senders],
        StageId::Snapshots |
        StageId::Headers |
        StageId::BlockHashes |
        StageId::Bodies |
        StageId::Execution |
        StageId::Finish => Vec::new(),
    }
}

/// Returns the state-history tables active under `version`, in a stable order without
/// duplicates.
///
/// The legacy changesets are always included: a database that switched layouts may still hold
/// them.
pub fn state_history_tables(version: SchemaVersion) -> Vec<Tables> {
    let mut groups = vec![LEGACY_HISTORY_TABLES];
    if version.has_versioned_history() {
        groups.push(VERSIONED_HISTORY_TABLES);
    }
    if version.has_commitment_history() {
        groups.push(EXTENDED_HISTORY_TABLES);
    }
    dedup(groups.into_iter().flatten().copied())
}

fn dedup(tables: impl IntoIterator<Item = Tables>) -> Vec<Tables> {
    let mut out = Vec::new();
    for table in tables {
        if !out.contains(&table) {
            out.push(table);
        }
    }
    out
}

/// Stage to table mapping bound to one resolved [`SchemaVersion`].
///
/// Built once per operation from the version read inside that operation's transaction and
/// passed down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTableCatalog {
    version: SchemaVersion,
}

impl StageTableCatalog {
    /// Creates a catalog for the given schema version.
    pub const fn new(version: SchemaVersion) -> Self {
        Self { version }
    }

    /// The schema version this catalog was built for.
    pub const fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Tables owned by `stage`.
    pub fn tables_for(&self, stage: StageId) -> Vec<Tables> {
        tables_for(stage, self.version)
    }

    /// Union of the tables owned by `stages`, in stage order without duplicates.
    pub fn tables_for_stages(&self, stages: &[StageId]) -> Vec<Tables> {
        dedup(stages.iter().flat_map(|stage| self.tables_for(*stage)))
    }

    /// The state group.
    pub const fn state_tables(&self) -> &'static [Tables] {
        STATE_TABLES
    }

    /// The state-history group for this version.
    pub fn state_history_tables(&self) -> Vec<Tables> {
        state_history_tables(self.version)
    }

    /// Tables warmed before execution: the state group followed by the state-history group of
    /// this version.
    pub fn exec_warmup_tables(&self) -> Vec<Tables> {
        dedup(STATE_TABLES.iter().copied().chain(self.state_history_tables()))
    }
}
