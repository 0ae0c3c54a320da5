//! In-memory indexer
//!
//! Implements [`PoaIndexer`] over a map of live cells keyed by reference.
//! Used by tests and by the CLI when records are passed on the command line.

use crate::error::{GeneratorError, Result};
use crate::ports::{IndexedCell, PoaIndexer};
use async_trait::async_trait;
use parking_lot::RwLock;
use poa_lock::CellRef;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct ChainView {
    cells: HashMap<CellRef, IndexedCell>,
    median_time: u64,
    tip_block_number: u64,
}

/// Indexer backed by an in-process map.
#[derive(Debug, Default)]
pub struct InMemoryIndexer {
    view: RwLock<ChainView>,
}

impl InMemoryIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the live cell carrying `reference`.
    pub fn insert_cell(&self, reference: CellRef, cell: IndexedCell) {
        self.view.write().cells.insert(reference, cell);
    }

    /// Mark the cell carrying `reference` as spent.
    pub fn remove_cell(&self, reference: &CellRef) -> Option<IndexedCell> {
        self.view.write().cells.remove(reference)
    }

    pub fn set_median_time(&self, seconds: u64) {
        self.view.write().median_time = seconds;
    }

    pub fn set_tip_block_number(&self, number: u64) {
        self.view.write().tip_block_number = number;
    }

    fn cell(&self, reference: &CellRef, kind: &'static str) -> Result<IndexedCell> {
        self.view
            .read()
            .cells
            .get(reference)
            .cloned()
            .ok_or(GeneratorError::CellMissing { kind })
    }
}

#[async_trait]
impl PoaIndexer for InMemoryIndexer {
    async fn fetch_setup_cell(&self, setup_ref: &CellRef) -> Result<IndexedCell> {
        self.cell(setup_ref, "setup")
    }

    async fn fetch_state_cell(&self, state_ref: &CellRef) -> Result<IndexedCell> {
        self.cell(state_ref, "state")
    }

    async fn median_time(&self) -> Result<u64> {
        Ok(self.view.read().median_time)
    }

    async fn tip_block_number(&self) -> Result<u64> {
        Ok(self.view.read().tip_block_number)
    }
}
