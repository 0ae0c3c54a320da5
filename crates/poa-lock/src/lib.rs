//! # poa-lock
//!
//! Round-robin Proof-of-Authority lock for cell-based transactions.
//!
//! ## Architecture
//!
//! Several aggregators take turns producing subblocks against a shared
//! round-state cell. The lock guarding that cell checks, for every
//! transaction that spends it, that the aggregator whose turn it is signed
//! it, that rounds advance strictly in time and index order, and that
//! replacing the aggregator set is co-signed by a threshold of the current
//! aggregators.
//!
//! ```text
//!            ┌──────────────┐
//!  host ───▶ │ PoaLockApi   │  (ports::inbound)
//!            └──────┬───────┘
//!                   ▼
//!            ┌──────────────┐      ┌────────────────────┐
//!            │ PoaLockService│ ──▶ │ TransactionReader  │ (ports::outbound)
//!            └──────┬───────┘      └────────────────────┘
//!                   ▼
//!   domain: setup/round-state codecs, locator, signing, transition rules
//! ```
//!
//! ## Modes
//!
//! - **Block production**: the setup cell is a cell dep. The round state
//!   moves from the consumed cell to the created one; the input since pins
//!   the subblock time.
//! - **Authority-set change**: the setup cell is consumed. The old setup's
//!   change threshold of distinct aggregators must co-sign.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use poa_lock::{PoaLockApi, PoaLockService};
//!
//! let service = PoaLockService::new(host_reader);
//! std::process::exit(service.run() as i32);
//! ```
//!
//! ## Security
//!
//! - Every buffer read from the transaction is bounded by a fixed capacity
//! - Duplicate PoA cells on any side reject the transaction
//! - Each aggregator is credited at most once toward a threshold
//! - All time arithmetic is overflow-checked

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{CellFixture, InMemoryTransaction};
pub use domain::{
    Authorization, CellRef, CreditSet, ErrorCategory, LockArgs, PoaError, PoaResult, PoaSetup,
    RoundState, Since, TransitionKind, ValidationMode,
};
pub use ports::{PoaLockApi, Source, SysError, TransactionReader};
pub use service::PoaLockService;
