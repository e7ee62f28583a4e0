pub mod pipeline;
pub mod protocol;

use crate::config::LogConfig;

/// Parameters the ingestion engine needs, derived from [`crate::config::Config`].
#[derive(Clone, Debug)]
pub struct IndexingConfig {
    pub jubilee_height: u64,
    pub first_inscription_height: u64,
    pub logs: LogConfig,
}

/// Outcome of a single ordinal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    Applied,
    /// The materialized state already matches the operation's target.
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub blocks_applied: u64,
    pub blocks_rolled_back: u64,
    pub inscriptions_revealed: u64,
    pub inscriptions_transferred: u64,
    pub reveals_rolled_back: u64,
    pub transfers_rolled_back: u64,
    pub operations_skipped: u64,
}

impl IngestionReport {
    pub fn has_changes(&self) -> bool {
        self.inscriptions_revealed
            + self.inscriptions_transferred
            + self.reveals_rolled_back
            + self.transfers_rolled_back
            > 0
    }
}
