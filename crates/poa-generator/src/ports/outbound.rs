//! Outbound ports (driven side - SPI)

use crate::error::Result;
use async_trait::async_trait;
use poa_lock::CellRef;
use serde::{Deserialize, Serialize};

/// Location of a live cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_hash: [u8; 32],
    pub index: u32,
}

/// A live cell as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedCell {
    pub out_point: OutPoint,
    pub capacity: u64,
    /// Hash of the cell's lock script
    pub lock_hash: [u8; 32],
    pub data: Vec<u8>,
}

/// Port: Query live PoA cells and the chain clock
#[async_trait]
pub trait PoaIndexer: Send + Sync {
    /// Live cell whose type script is the TYPE_ID script for `setup_ref`
    async fn fetch_setup_cell(&self, setup_ref: &CellRef) -> Result<IndexedCell>;

    /// Live cell whose type script is the TYPE_ID script for `state_ref`
    async fn fetch_state_cell(&self, state_ref: &CellRef) -> Result<IndexedCell>;

    /// Median time of the recent blocks, in seconds
    async fn median_time(&self) -> Result<u64>;

    /// Number of the current tip block
    async fn tip_block_number(&self) -> Result<u64>;
}
