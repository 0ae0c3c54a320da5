//! In-memory transaction
//!
//! Implements [`TransactionReader`] over owned cell fixtures. Used by tests,
//! the fuzz harness and the generator's dry run before a plan is handed out.

use crate::ports::{Source, SysError, TransactionReader};

/// One cell as the reader sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFixture {
    pub capacity: u64,
    pub lock_hash: Result<[u8; 32], SysError>,
    pub type_script: Result<Vec<u8>, SysError>,
    pub data: Vec<u8>,
    /// Only meaningful for inputs
    pub since: u64,
    /// Guarded by the running script
    pub in_group: bool,
}

impl Default for CellFixture {
    fn default() -> Self {
        Self {
            capacity: 0,
            lock_hash: Ok([0u8; 32]),
            type_script: Err(SysError::ItemMissing),
            data: Vec::new(),
            since: 0,
            in_group: false,
        }
    }
}

impl CellFixture {
    pub fn with_type(mut self, script: Vec<u8>) -> Self {
        self.type_script = Ok(script);
        self
    }

    pub fn with_type_error(mut self, err: SysError) -> Self {
        self.type_script = Err(err);
        self
    }

    pub fn with_lock_hash(mut self, hash: [u8; 32]) -> Self {
        self.lock_hash = Ok(hash);
        self
    }

    pub fn with_lock_hash_error(mut self, err: SysError) -> Self {
        self.lock_hash = Err(err);
        self
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn with_since(mut self, since: u64) -> Self {
        self.since = since;
        self
    }

    /// Mark the cell as guarded by the running script.
    pub fn in_group(mut self) -> Self {
        self.in_group = true;
        self
    }
}

/// Transaction assembled from fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryTransaction {
    pub script: Vec<u8>,
    pub inputs: Vec<CellFixture>,
    pub outputs: Vec<CellFixture>,
    pub cell_deps: Vec<CellFixture>,
}

impl InMemoryTransaction {
    pub fn with_script(mut self, script: Vec<u8>) -> Self {
        self.script = script;
        self
    }

    pub fn with_input(mut self, cell: CellFixture) -> Self {
        self.inputs.push(cell);
        self
    }

    pub fn with_output(mut self, cell: CellFixture) -> Self {
        self.outputs.push(cell);
        self
    }

    pub fn with_cell_dep(mut self, cell: CellFixture) -> Self {
        self.cell_deps.push(cell);
        self
    }

    fn cell(&self, index: usize, source: Source) -> Result<&CellFixture, SysError> {
        let cell = match source {
            Source::Input => self.inputs.get(index),
            Source::Output => self.outputs.get(index),
            Source::CellDep => self.cell_deps.get(index),
            Source::GroupInput => group_members(&self.inputs).nth(index),
            Source::GroupOutput => group_members(&self.outputs).nth(index),
        };
        cell.ok_or(SysError::IndexOutOfBound)
    }
}

fn group_members(cells: &[CellFixture]) -> impl Iterator<Item = &CellFixture> {
    cells.iter().filter(|c| c.in_group)
}

fn copy_partial(buf: &mut [u8], bytes: &[u8]) -> usize {
    let n = buf.len().min(bytes.len());
    buf[..n].copy_from_slice(&bytes[..n]);
    bytes.len()
}

impl TransactionReader for InMemoryTransaction {
    fn load_script(&self, buf: &mut [u8]) -> Result<usize, SysError> {
        Ok(copy_partial(buf, &self.script))
    }

    fn load_cell_type(
        &self,
        buf: &mut [u8],
        index: usize,
        source: Source,
    ) -> Result<usize, SysError> {
        let cell = self.cell(index, source)?;
        let script = cell.type_script.as_ref().map_err(|e| *e)?;
        Ok(copy_partial(buf, script))
    }

    fn load_cell_data(
        &self,
        buf: &mut [u8],
        index: usize,
        source: Source,
    ) -> Result<usize, SysError> {
        Ok(copy_partial(buf, &self.cell(index, source)?.data))
    }

    fn load_cell_lock_hash(&self, index: usize, source: Source) -> Result<[u8; 32], SysError> {
        self.cell(index, source)?.lock_hash
    }

    fn load_input_since(&self, index: usize, source: Source) -> Result<u64, SysError> {
        match source {
            Source::Input | Source::GroupInput => Ok(self.cell(index, source)?.since),
            _ => Err(SysError::IndexOutOfBound),
        }
    }

    fn load_cell_capacity(&self, index: usize, source: Source) -> Result<u64, SysError> {
        Ok(self.cell(index, source)?.capacity)
    }
}
