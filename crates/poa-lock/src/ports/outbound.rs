//! Driven ports (host transaction access)
//!
//! The validator never owns transaction data. Everything it reads comes from
//! the host execution environment through [`TransactionReader`], whose methods
//! mirror the host's load syscalls.

use crate::domain::{PoaError, PoaResult};
use std::fmt;

/// Which side of the transaction a load addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// All consumed cells
    Input,
    /// All created cells
    Output,
    /// Read-only dependency cells
    CellDep,
    /// Consumed cells guarded by the running script
    GroupInput,
    /// Created cells guarded by the running script
    GroupOutput,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Input => "input",
            Source::Output => "output",
            Source::CellDep => "cell_dep",
            Source::GroupInput => "group_input",
            Source::GroupOutput => "group_output",
        };
        f.write_str(name)
    }
}

/// Host load failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SysError {
    /// Index is past the last item of the requested source
    #[error("index out of bound")]
    IndexOutOfBound,

    /// The item exists but the requested field is absent (e.g. no type script)
    #[error("item missing")]
    ItemMissing,

    /// The host could not encode the requested field
    #[error("host encoding error")]
    Encoding,

    /// Any other host error code
    #[error("unknown host error {0}")]
    Unknown(u64),
}

impl SysError {
    /// Host error code as returned by the syscall layer.
    pub fn code(&self) -> i8 {
        match self {
            SysError::IndexOutOfBound => 1,
            SysError::ItemMissing => 2,
            SysError::Encoding => 4,
            SysError::Unknown(code) => i8::try_from(*code)
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(i8::MAX),
        }
    }
}

/// Read access to the transaction being validated.
///
/// Buffer-filling loads use partial-read semantics: they copy at most
/// `buf.len()` bytes and return the full length of the item, so callers can
/// detect truncation. Use [`load_bounded`] rather than inspecting the length
/// by hand.
pub trait TransactionReader {
    /// Load the running script (molecule `Script`).
    fn load_script(&self, buf: &mut [u8]) -> Result<usize, SysError>;

    /// Load the type script of a cell.
    ///
    /// Returns [`SysError::ItemMissing`] for cells without a type script.
    fn load_cell_type(&self, buf: &mut [u8], index: usize, source: Source)
        -> Result<usize, SysError>;

    /// Load the data payload of a cell.
    fn load_cell_data(&self, buf: &mut [u8], index: usize, source: Source)
        -> Result<usize, SysError>;

    /// Load the hash of a cell's lock script.
    fn load_cell_lock_hash(&self, index: usize, source: Source) -> Result<[u8; 32], SysError>;

    /// Load the since field of an input.
    fn load_input_since(&self, index: usize, source: Source) -> Result<u64, SysError>;

    /// Load the capacity of a cell. Used as an existence probe.
    fn load_cell_capacity(&self, index: usize, source: Source) -> Result<u64, SysError>;
}

impl<T: TransactionReader + ?Sized> TransactionReader for &T {
    fn load_script(&self, buf: &mut [u8]) -> Result<usize, SysError> {
        (**self).load_script(buf)
    }

    fn load_cell_type(
        &self,
        buf: &mut [u8],
        index: usize,
        source: Source,
    ) -> Result<usize, SysError> {
        (**self).load_cell_type(buf, index, source)
    }

    fn load_cell_data(
        &self,
        buf: &mut [u8],
        index: usize,
        source: Source,
    ) -> Result<usize, SysError> {
        (**self).load_cell_data(buf, index, source)
    }

    fn load_cell_lock_hash(&self, index: usize, source: Source) -> Result<[u8; 32], SysError> {
        (**self).load_cell_lock_hash(index, source)
    }

    fn load_input_since(&self, index: usize, source: Source) -> Result<u64, SysError> {
        (**self).load_input_since(index, source)
    }

    fn load_cell_capacity(&self, index: usize, source: Source) -> Result<u64, SysError> {
        (**self).load_cell_capacity(index, source)
    }
}

/// Run a partial-read load and reject it if the item did not fit.
///
/// Returns the number of valid bytes in `buf`.
pub fn load_bounded<F>(buf: &mut [u8], load: F) -> PoaResult<usize>
where
    F: FnOnce(&mut [u8]) -> Result<usize, SysError>,
{
    let capacity = buf.len();
    let actual = load(buf)?;
    if actual > capacity {
        return Err(PoaError::LengthExceeded { actual, capacity });
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bounded_accepts_exact_fit() {
        let mut buf = [0u8; 4];
        let len = load_bounded(&mut buf, |b| {
            b.copy_from_slice(&[1, 2, 3, 4]);
            Ok(4)
        })
        .unwrap();
        assert_eq!(len, 4);
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_load_bounded_rejects_truncation() {
        let mut buf = [0u8; 4];
        let err = load_bounded(&mut buf, |_| Ok(9)).unwrap_err();
        assert_eq!(
            err,
            PoaError::LengthExceeded {
                actual: 9,
                capacity: 4
            }
        );
    }

    #[test]
    fn test_load_bounded_propagates_host_error() {
        let mut buf = [0u8; 4];
        let err = load_bounded(&mut buf, |_| Err(SysError::Encoding)).unwrap_err();
        assert_eq!(err, PoaError::Syscall(SysError::Encoding));
    }

    #[test]
    fn test_unknown_code_passthrough() {
        assert_eq!(SysError::Unknown(7).code(), 7);
        assert_eq!(SysError::Unknown(1000).code(), i8::MAX);
        // Never mistaken for success
        assert_eq!(SysError::Unknown(0).code(), i8::MAX);
    }
}
