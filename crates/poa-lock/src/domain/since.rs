//! Input since (time lock) values
//!
//! The top byte carries flags, the low 56 bits the magnitude. The PoA lock
//! only accepts absolute locks: `0x40` for timestamps, `0x00` for block
//! numbers.

use super::error::{PoaError, PoaResult};
use serde::{Deserialize, Serialize};

/// Flags of an absolute timestamp lock.
pub const SINCE_ABSOLUTE_TIMESTAMP: u8 = 0x40;

/// Flags of an absolute block number lock.
pub const SINCE_ABSOLUTE_BLOCK_NUMBER: u8 = 0x00;

const VALUE_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;

/// Raw since field of a transaction input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Since(pub u64);

impl Since {
    /// Absolute timestamp lock at `seconds`.
    pub fn absolute_timestamp(seconds: u64) -> PoaResult<Self> {
        Self::with_flags(SINCE_ABSOLUTE_TIMESTAMP, seconds)
    }

    /// Absolute block number lock at `number`.
    pub fn absolute_block_number(number: u64) -> PoaResult<Self> {
        Self::with_flags(SINCE_ABSOLUTE_BLOCK_NUMBER, number)
    }

    /// Lock matching the subtime unit of a setup.
    pub fn for_subtime(uses_seconds: bool, subtime: u64) -> PoaResult<Self> {
        if uses_seconds {
            Self::absolute_timestamp(subtime)
        } else {
            Self::absolute_block_number(subtime)
        }
    }

    fn with_flags(flags: u8, value: u64) -> PoaResult<Self> {
        if value & !VALUE_MASK != 0 {
            return Err(PoaError::SinceOverflow(value));
        }
        Ok(Self(((flags as u64) << 56) | value))
    }

    /// Flag byte.
    pub fn flags(&self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// Magnitude (low 56 bits).
    pub fn value(&self) -> u64 {
        self.0 & VALUE_MASK
    }

    /// Check this since is the absolute lock kind a setup requires and
    /// return its magnitude.
    pub fn expect_absolute(&self, uses_seconds: bool) -> PoaResult<u64> {
        let expected = if uses_seconds {
            SINCE_ABSOLUTE_TIMESTAMP
        } else {
            SINCE_ABSOLUTE_BLOCK_NUMBER
        };
        if self.flags() != expected {
            return Err(PoaError::SinceModeMismatch {
                expected,
                actual: self.flags(),
            });
        }
        Ok(self.value())
    }
}
