//! Signing policy checks
//!
//! A transaction is "signed" by an identity when one of its inputs is locked
//! by a script whose hash starts with that identity's fingerprint. The lock
//! hash check itself is enforced by the host when the input is unlocked; here
//! we only look for the fingerprints.

use super::error::{PoaError, PoaResult};
use super::setup::PoaSetup;
use crate::ports::{Source, SysError, TransactionReader};

/// Fixed-capacity set of credited aggregator indices.
///
/// 256 bits cover every index an 8-bit aggregator count can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreditSet {
    words: [u64; 4],
}

impl CreditSet {
    /// Whether `index` has been credited.
    pub fn contains(&self, index: u8) -> bool {
        let (word, bit) = Self::position(index);
        self.words[word] & (1u64 << bit) != 0
    }

    /// Credit `index`. Returns true if it was not credited before.
    pub fn mark(&mut self, index: u8) -> bool {
        let (word, bit) = Self::position(index);
        let newly = self.words[word] & (1u64 << bit) == 0;
        self.words[word] |= 1u64 << bit;
        newly
    }

    /// Number of credited indices.
    pub fn len(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Whether nothing has been credited.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    fn position(index: u8) -> (usize, u32) {
        ((index / 64) as usize, (index % 64) as u32)
    }
}

/// Walk input lock hashes in order until `visit` returns true or inputs
/// run out. Returns whether `visit` stopped the walk.
fn scan_input_lock_hashes<R, F>(reader: &R, mut visit: F) -> PoaResult<bool>
where
    R: TransactionReader + ?Sized,
    F: FnMut(&[u8; 32]) -> bool,
{
    let mut index = 0usize;
    loop {
        let hash = match reader.load_cell_lock_hash(index, Source::Input) {
            Ok(hash) => hash,
            Err(SysError::IndexOutOfBound) => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        if visit(&hash) {
            return Ok(true);
        }
        index += 1;
    }
}

/// Accept if any input's lock hash starts with `identity`.
pub fn validate_single_signing<R: TransactionReader + ?Sized>(
    reader: &R,
    identity: &[u8],
) -> PoaResult<()> {
    let size = identity.len();
    if scan_input_lock_hashes(reader, |hash| hash.get(..size) == Some(identity))? {
        return Ok(());
    }
    tracing::debug!("No matching identity found");
    Err(PoaError::SignerNotFound)
}

/// Accept once `setup.aggregator_change_threshold` distinct aggregators have
/// a matching input.
///
/// Each input credits at most one aggregator, the first not-yet-credited one
/// it matches, and each aggregator is credited at most once. A zero threshold
/// is never met.
pub fn validate_threshold_signing<R: TransactionReader + ?Sized>(
    reader: &R,
    setup: &PoaSetup<'_>,
) -> PoaResult<CreditSet> {
    let required = setup.aggregator_change_threshold;
    let size = setup.identity_size as usize;
    let mut credited = CreditSet::default();
    let mut found: u8 = 0;

    let met = scan_input_lock_hashes(reader, |hash| {
        let prefix = &hash[..size];
        let matched = setup
            .identities()
            .enumerate()
            .find(|(i, identity)| !credited.contains(*i as u8) && *identity == prefix);
        if let Some((i, _)) = matched {
            credited.mark(i as u8);
            found += 1;
            return found == required;
        }
        false
    })?;

    if met {
        return Ok(credited);
    }
    tracing::debug!(found, required, "Not enough matching identities found");
    Err(PoaError::ThresholdNotMet { found, required })
}
