//! Cell locator
//!
//! Finds the single cell on one transaction side whose type script is the
//! TYPE_ID script for a given reference.

use super::error::{PoaError, PoaResult};
use super::script::{is_type_id_for, CellRef, TYPE_ID_SCRIPT_SIZE};
use crate::ports::{Source, SysError, TransactionReader};

/// Outcome of inspecting one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    /// The cell carries the reference
    Found,
    /// No type script, or a different one
    Skip,
    /// Past the last cell
    EndOfCollection,
    /// Host failure; aborts the scan
    Fatal(SysError),
}

/// Inspect the cell at `index`.
pub fn scan_step<R: TransactionReader + ?Sized>(
    reader: &R,
    reference: &CellRef,
    index: usize,
    source: Source,
) -> ScanStep {
    let mut script = [0u8; TYPE_ID_SCRIPT_SIZE];
    match reader.load_cell_type(&mut script, index, source) {
        Ok(len) if is_type_id_for(&script, len, reference) => ScanStep::Found,
        Ok(_) | Err(SysError::ItemMissing) => ScanStep::Skip,
        Err(SysError::IndexOutOfBound) => ScanStep::EndOfCollection,
        Err(err) => ScanStep::Fatal(err),
    }
}

/// Locate the unique cell carrying `reference` on `source`.
///
/// Returns `Ok(None)` when no cell matches; the caller decides whether that
/// is an error. Two matches are always an error.
pub fn locate<R: TransactionReader + ?Sized>(
    reader: &R,
    reference: &CellRef,
    source: Source,
) -> PoaResult<Option<usize>> {
    let mut found = None;
    let mut index = 0usize;
    loop {
        match scan_step(reader, reference, index, source) {
            ScanStep::Found => {
                if found.is_some() {
                    tracing::debug!(%source, index, "Duplicate PoA cell");
                    return Err(PoaError::DuplicateCell { side: source });
                }
                found = Some(index);
            }
            ScanStep::Skip => {}
            ScanStep::EndOfCollection => return Ok(found),
            ScanStep::Fatal(err) => return Err(err.into()),
        }
        index += 1;
    }
}

/// Like [`locate`], but a missing cell is an error.
pub fn locate_required<R: TransactionReader + ?Sized>(
    reader: &R,
    reference: &CellRef,
    source: Source,
) -> PoaResult<usize> {
    locate(reader, reference, source)?.ok_or_else(|| {
        tracing::debug!(%source, "PoA cell not found");
        PoaError::CellNotFound { side: source }
    })
}
