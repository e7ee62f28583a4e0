use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    /// Incoming events disagree with the materialized state. Fatal for the
    /// whole payload; never repaired locally.
    #[error("chain continuity violated at block #{block_height}: {message}")]
    ChainContinuity { block_height: u64, message: String },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("ingestion worker unavailable: {0}")]
    Worker(String),
}

impl IndexerError {
    pub fn continuity(block_height: u64, message: impl Into<String>) -> Self {
        IndexerError::ChainContinuity {
            block_height,
            message: message.into(),
        }
    }

    pub fn is_chain_continuity(&self) -> bool {
        matches!(self, IndexerError::ChainContinuity { .. })
    }
}
