//! Fuzz target for PoA setup decoding.
//!
//! ## Running
//!
//! ```bash
//! cd crates/poa-lock
//! cargo +nightly fuzz run fuzz_setup_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use poa_lock::PoaSetup;

fuzz_target!(|data: &[u8]| {
    // Decode must never panic, regardless of input
    if let Ok(setup) = PoaSetup::decode(data) {
        assert_eq!(setup.to_bytes().len(), data.len());
        assert!(setup.aggregator_change_threshold <= setup.aggregator_number);
        assert_eq!(setup.identities().count(), setup.aggregator_number as usize);
    }
});
