//! Validation modes and their outcomes

use super::signing::CreditSet;
use super::transition::TransitionKind;

/// How a transaction interacts with the PoA cells, decided once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// The setup cell is a read-only dependency; the round state advances.
    BlockProduction {
        /// Index of the setup cell among the cell deps
        setup_dep_index: usize,
    },
    /// The setup cell itself is consumed and replaced.
    AuthoritySetChange,
}

/// What an accepted transaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// A subblock issued by `aggregator_index`
    Subblock {
        aggregator_index: u16,
        subblock_index: u32,
        kind: TransitionKind,
    },
    /// The setup was replaced with enough co-signers
    AuthoritySetChange { signers: CreditSet },
}
