//! PoA setup record (aggregator set and timing policy)
//!
//! Wire layout, little-endian:
//!
//! ```text
//! offset  size  field
//! 0       1     flags (bit 0: interval uses seconds)
//! 1       1     identity_size (<= 32)
//! 2       1     aggregator_number
//! 3       1     aggregator_change_threshold (<= aggregator_number)
//! 4       4     subblock_intervals
//! 8       4     subblocks_per_interval
//! 12      N*S   identities
//! ```

use super::error::{PoaError, PoaResult};

/// Length of the fixed header preceding the identity list.
pub const SETUP_HEADER_SIZE: usize = 12;

/// Largest identity fingerprint the lock understands.
pub const MAX_IDENTITY_SIZE: u8 = 32;

/// Capacity of the buffer a setup cell is loaded into.
pub const SETUP_BUFFER_SIZE: usize = 16384;

/// Decoded PoA setup. Identities borrow from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoaSetup<'a> {
    /// Round timing measured in seconds (true) or block numbers (false)
    pub interval_uses_seconds: bool,
    /// Byte length of each identity fingerprint
    pub identity_size: u8,
    /// Number of aggregators
    pub aggregator_number: u8,
    /// Co-signatures required to replace this setup
    pub aggregator_change_threshold: u8,
    /// Minimum subtime units per round
    pub subblock_intervals: u32,
    /// Maximum subblocks one aggregator may issue per round
    pub subblocks_per_interval: u32,
    identities: &'a [u8],
}

impl<'a> PoaSetup<'a> {
    /// Decode a setup record, enforcing every length and range invariant.
    pub fn decode(data: &'a [u8]) -> PoaResult<Self> {
        if data.len() < SETUP_HEADER_SIZE {
            return Err(PoaError::SetupTooShort { actual: data.len() });
        }

        let identity_size = data[1];
        let aggregator_number = data[2];
        let aggregator_change_threshold = data[3];

        if identity_size > MAX_IDENTITY_SIZE {
            return Err(PoaError::IdentitySizeTooLarge {
                size: identity_size,
                max: MAX_IDENTITY_SIZE,
            });
        }
        if aggregator_change_threshold > aggregator_number {
            return Err(PoaError::ThresholdTooLarge {
                threshold: aggregator_change_threshold,
                aggregators: aggregator_number,
            });
        }

        let expected = Self::encoded_len(identity_size, aggregator_number);
        if data.len() != expected {
            return Err(PoaError::SetupLengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            interval_uses_seconds: data[0] & 1 == 1,
            identity_size,
            aggregator_number,
            aggregator_change_threshold,
            subblock_intervals: read_u32(data, 4),
            subblocks_per_interval: read_u32(data, 8),
            identities: &data[SETUP_HEADER_SIZE..],
        })
    }

    /// Build a setup from parts, applying the same checks as [`Self::decode`].
    ///
    /// `identities` is the concatenation of all fingerprints.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        interval_uses_seconds: bool,
        identity_size: u8,
        aggregator_number: u8,
        aggregator_change_threshold: u8,
        subblock_intervals: u32,
        subblocks_per_interval: u32,
        identities: &'a [u8],
    ) -> PoaResult<Self> {
        if identity_size > MAX_IDENTITY_SIZE {
            return Err(PoaError::IdentitySizeTooLarge {
                size: identity_size,
                max: MAX_IDENTITY_SIZE,
            });
        }
        if aggregator_change_threshold > aggregator_number {
            return Err(PoaError::ThresholdTooLarge {
                threshold: aggregator_change_threshold,
                aggregators: aggregator_number,
            });
        }
        let expected = Self::encoded_len(identity_size, aggregator_number);
        if SETUP_HEADER_SIZE + identities.len() != expected {
            return Err(PoaError::SetupLengthMismatch {
                expected,
                actual: SETUP_HEADER_SIZE + identities.len(),
            });
        }
        Ok(Self {
            interval_uses_seconds,
            identity_size,
            aggregator_number,
            aggregator_change_threshold,
            subblock_intervals,
            subblocks_per_interval,
            identities,
        })
    }

    /// Total wire length for the given identity size and count.
    pub fn encoded_len(identity_size: u8, aggregator_number: u8) -> usize {
        SETUP_HEADER_SIZE + identity_size as usize * aggregator_number as usize
    }

    /// Fingerprint of the aggregator at `index`, if it exists.
    pub fn identity(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.aggregator_number as usize {
            return None;
        }
        let size = self.identity_size as usize;
        self.identities.get(index * size..(index + 1) * size)
    }

    /// All fingerprints in aggregator order.
    pub fn identities(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let size = self.identity_size as usize;
        let identities = self.identities;
        (0..self.aggregator_number as usize).map(move |i| &identities[i * size..(i + 1) * size])
    }

    /// Encode to the wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::encoded_len(
            self.identity_size,
            self.aggregator_number,
        ));
        out.push(u8::from(self.interval_uses_seconds));
        out.push(self.identity_size);
        out.push(self.aggregator_number);
        out.push(self.aggregator_change_threshold);
        out.extend_from_slice(&self.subblock_intervals.to_le_bytes());
        out.extend_from_slice(&self.subblocks_per_interval.to_le_bytes());
        out.extend_from_slice(self.identities);
        out
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}
