//! Domain layer for the PoA lock
//!
//! Pure logic: record codecs, since and script encodings, cell lookup,
//! signing policies and round transition rules. Host access goes through
//! [`crate::ports::TransactionReader`] only.

mod error;
mod locator;
mod mode;
mod round_state;
mod script;
mod setup;
mod signing;
mod since;
mod transition;

pub use error::*;
pub use locator::*;
pub use mode::*;
pub use round_state::*;
pub use script::*;
pub use setup::*;
pub use signing::*;
pub use since::*;
pub use transition::*;
