use std::{fmt, str::FromStr};

/// Stage IDs for all known stages, in pipeline order.
///
/// Each stage ID must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageId {
    /// Fills canonical data from pre-built archives.
    Snapshots,
    /// Downloads headers.
    Headers,
    /// Indexes header hashes to block numbers.
    BlockHashes,
    /// Downloads block bodies.
    Bodies,
    /// Recovers transaction senders.
    Senders,
    /// Executes blocks and writes plain state and changesets.
    Execution,
    /// Hashes plain state into the hashed tables.
    HashState,
    /// Builds the state trie.
    IntermediateHashes,
    /// Indexes account history.
    AccountHistoryIndex,
    /// Indexes storage history.
    StorageHistoryIndex,
    /// Indexes logs by address and topic.
    LogIndex,
    /// Indexes call traces by sender and recipient.
    CallTraces,
    /// Indexes transaction hashes to block numbers.
    TxLookup,
    /// Marks the end of the pipeline.
    Finish,
}

impl StageId {
    /// All supported Stages
    pub const ALL: [Self; 14] = [
        Self::Snapshots,
        Self::Headers,
        Self::BlockHashes,
        Self::Bodies,
        Self::Senders,
        Self::Execution,
        Self::HashState,
        Self::IntermediateHashes,
        Self::AccountHistoryIndex,
        Self::StorageHistoryIndex,
        Self::LogIndex,
        Self::CallTraces,
        Self::TxLookup,
        Self::Finish,
    ];

    /// Return stage id formatted as string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Snapshots => "Snapshots",
            Self::Headers => "Headers",
            Self::BlockHashes => "BlockHashes",
            Self::Bodies => "Bodies",
            Self::Senders => "Senders",
            Self::Execution => "Execution",
            Self::HashState => "HashState",
            Self::IntermediateHashes => "IntermediateHashes",
            Self::AccountHistoryIndex => "AccountHistoryIndex",
            Self::StorageHistoryIndex => "StorageHistoryIndex",
            Self::LogIndex => "LogIndex",
            Self::CallTraces => "CallTraces",
            Self::TxLookup => "TxLookup",
            Self::Finish => "Finish",
        }
    }

    /// Position of the stage in the pipeline.
    pub const fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a stage name that is not a [`StageId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for StageId {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}
