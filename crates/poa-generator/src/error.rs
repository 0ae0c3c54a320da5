//! Error types for the PoA generator

use poa_lock::PoaError;
use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur while planning a subblock
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Indexer communication error
    #[error("Indexer error: {0}")]
    Indexer(String),

    /// A PoA cell could not be found by its reference
    #[error("PoA {kind} cell not found")]
    CellMissing {
        /// Which cell: "setup" or "state"
        kind: &'static str,
    },

    /// A record or script failed to decode
    #[error("Decode error: {0}")]
    Decode(#[from] PoaError),

    /// This node is not an aggregator of the current setup
    #[error("Aggregator {index} not in setup of {aggregators}")]
    NotAggregator {
        /// Configured own index
        index: u16,
        /// Aggregator count in the setup
        aggregators: u8,
    },

    /// Nothing to issue at this time
    #[error("Not our turn")]
    NotOurTurn,

    /// The validator rejected the planned transaction
    #[error("Plan rejected by lock: {0}")]
    DryRunRejected(PoaError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
