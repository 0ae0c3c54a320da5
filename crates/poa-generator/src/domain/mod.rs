//! Generator domain: issuance decisions and subblock plans

mod decision;
mod plan;

pub use decision::*;
pub use plan::*;
