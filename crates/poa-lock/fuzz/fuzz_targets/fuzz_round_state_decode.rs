//! Fuzz target for round state decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use poa_lock::RoundState;

fuzz_target!(|data: &[u8]| {
    match RoundState::decode(data) {
        Ok(state) => assert_eq!(&state.to_bytes()[..], data),
        Err(_) => assert_ne!(data.len(), poa_lock::domain::ROUND_STATE_SIZE),
    }
});
