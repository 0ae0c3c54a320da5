//! Ports: the generator's view of the chain indexer

mod outbound;

pub use outbound::*;
