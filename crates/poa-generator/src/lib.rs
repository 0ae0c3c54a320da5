//! # poa-generator
//!
//! Off-chain helper for aggregators running the round-robin PoA lock.
//!
//! The generator watches the PoA setup and round state cells, decides when
//! this aggregator may issue, and produces the transaction mutation for the
//! next subblock: a new 22-byte round state for the state output and the
//! matching absolute since for the state input.
//!
//! ## Decisions
//!
//! | Situation | Decision |
//! |-----------|----------|
//! | Our round is open and has slots left | `IssueOnlyIfRoundFull` |
//! | Enough intervals passed for our slot | `IssueNow` |
//! | Anything else | `Wait` |
//!
//! Every plan is dry-run through [`poa_lock::PoaLockService`] before it is
//! returned.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryIndexer;
pub use config::GeneratorConfig;
pub use domain::{decide, next_round_state, plan, IssuanceDecision, SubblockPlan};
pub use error::{GeneratorError, Result};
pub use ports::{IndexedCell, OutPoint, PoaIndexer};
pub use service::PoaGenerator;
