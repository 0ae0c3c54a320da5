//! Fuzz target for the full lock validation flow.
//!
//! Builds a transaction around fuzzed setup, round state and since values
//! and checks the validator never panics and always reports an exit code.

#![no_main]

use libfuzzer_sys::fuzz_target;
use poa_lock::domain::{encode_script, type_id_script};
use poa_lock::{CellFixture, InMemoryTransaction, LockArgs, PoaLockApi, PoaLockService};

/// Fuzz input structure for one validation run.
#[derive(Debug, arbitrary::Arbitrary)]
struct VerifyFuzzInput {
    setup_ref: [u8; 32],
    state_ref: [u8; 32],
    setup: Vec<u8>,
    setup_as_dep: bool,
    prev_state: Vec<u8>,
    next_state: Vec<u8>,
    since: u64,
    signer_hashes: Vec<[u8; 32]>,
}

fuzz_target!(|input: VerifyFuzzInput| {
    let args = LockArgs {
        setup_ref: input.setup_ref,
        state_ref: input.state_ref,
    };
    let setup_cell = CellFixture::default()
        .with_type(type_id_script(&input.setup_ref).to_vec())
        .with_data(input.setup);

    let mut tx = InMemoryTransaction::default()
        .with_script(encode_script(&[0u8; 32], 1, &args.to_bytes()))
        .with_input(
            CellFixture::default()
                .with_type(type_id_script(&input.state_ref).to_vec())
                .with_data(input.prev_state)
                .with_since(input.since)
                .in_group(),
        )
        .with_output(
            CellFixture::default()
                .with_type(type_id_script(&input.state_ref).to_vec())
                .with_data(input.next_state)
                .in_group(),
        );
    tx = if input.setup_as_dep {
        tx.with_cell_dep(setup_cell)
    } else {
        tx.with_input(setup_cell.clone()).with_output(setup_cell)
    };
    for hash in input.signer_hashes {
        tx = tx.with_input(CellFixture::default().with_lock_hash(hash));
    }

    let service = PoaLockService::new(tx);
    let first = service.verify();
    // Deterministic: same transaction, same outcome
    assert_eq!(first, service.verify());
    match first {
        Ok(_) => assert_eq!(service.run(), 0),
        Err(err) => assert_ne!(err.exit_code(), 0),
    }
});
