//! Round state record (position in the rotation)
//!
//! Fixed 22 bytes, little-endian:
//!
//! ```text
//! offset  size  field
//! 0       8     round_initial_subtime
//! 8       8     subblock_subtime
//! 16      4     subblock_index
//! 20      2     aggregator_index
//! ```

use super::error::{PoaError, PoaResult};
use serde::{Deserialize, Serialize};

/// Wire length of a round state.
pub const ROUND_STATE_SIZE: usize = 22;

/// Where the rotation stands after a given subblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundState {
    /// Subtime at which the current aggregator's round began
    pub round_initial_subtime: u64,
    /// Subtime of this subblock
    pub subblock_subtime: u64,
    /// Position of this subblock inside its round (0-based)
    pub subblock_index: u32,
    /// Index of the producing aggregator in the setup's identity list
    pub aggregator_index: u16,
}

impl RoundState {
    /// Decode a round state; the buffer must be exactly 22 bytes.
    pub fn decode(data: &[u8]) -> PoaResult<Self> {
        let data: &[u8; ROUND_STATE_SIZE] = data
            .try_into()
            .map_err(|_| PoaError::RoundStateLength { actual: data.len() })?;

        let mut u64_bytes = [0u8; 8];
        u64_bytes.copy_from_slice(&data[0..8]);
        let round_initial_subtime = u64::from_le_bytes(u64_bytes);
        u64_bytes.copy_from_slice(&data[8..16]);
        let subblock_subtime = u64::from_le_bytes(u64_bytes);

        Ok(Self {
            round_initial_subtime,
            subblock_subtime,
            subblock_index: u32::from_le_bytes([data[16], data[17], data[18], data[19]]),
            aggregator_index: u16::from_le_bytes([data[20], data[21]]),
        })
    }

    /// Encode to the wire layout.
    pub fn to_bytes(&self) -> [u8; ROUND_STATE_SIZE] {
        let mut out = [0u8; ROUND_STATE_SIZE];
        out[0..8].copy_from_slice(&self.round_initial_subtime.to_le_bytes());
        out[8..16].copy_from_slice(&self.subblock_subtime.to_le_bytes());
        out[16..20].copy_from_slice(&self.subblock_index.to_le_bytes());
        out[20..22].copy_from_slice(&self.aggregator_index.to_le_bytes());
        out
    }
}
