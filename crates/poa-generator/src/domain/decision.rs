//! Issuance decision
//!
//! Mirrors the read-only half of the lock's round rules so the generator
//! only builds transactions the lock would accept. The lock stays the sole
//! judge; a decision here is advice.

use poa_lock::domain::{in_current_round, rollover_deadline, rotation_steps};
use poa_lock::{PoaSetup, RoundState};
use serde::{Deserialize, Serialize};

/// What the generator should do at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceDecision {
    /// Open a new round now
    IssueNow,
    /// Continue our open round, but only with a full batch
    IssueOnlyIfRoundFull,
    /// Not our turn
    Wait,
}

impl IssuanceDecision {
    /// Whether a subblock may be produced under this decision.
    pub fn may_issue(&self) -> bool {
        !matches!(self, IssuanceDecision::Wait)
    }
}

/// Decide whether aggregator `own_index` may issue at subtime `now`.
pub fn decide(
    setup: &PoaSetup<'_>,
    state: &RoundState,
    own_index: u16,
    now: u64,
) -> IssuanceDecision {
    if own_index as usize >= setup.aggregator_number as usize {
        return IssuanceDecision::Wait;
    }

    if in_current_round(setup, state.round_initial_subtime, now) {
        let has_slot = state
            .subblock_index
            .checked_add(1)
            .is_some_and(|next| next < setup.subblocks_per_interval);
        if state.aggregator_index == own_index
            && has_slot
            && now >= state.subblock_subtime
        {
            return IssuanceDecision::IssueOnlyIfRoundFull;
        }
        return IssuanceDecision::Wait;
    }

    let steps = rotation_steps(setup.aggregator_number, state.aggregator_index, own_index);
    match rollover_deadline(setup, state.round_initial_subtime, steps) {
        Some(deadline) if now >= deadline => IssuanceDecision::IssueNow,
        _ => IssuanceDecision::Wait,
    }
}

/// Successor round state for a decision, or `None` when waiting.
pub fn next_round_state(
    state: &RoundState,
    decision: IssuanceDecision,
    own_index: u16,
    now: u64,
) -> Option<RoundState> {
    match decision {
        IssuanceDecision::IssueNow => Some(RoundState {
            round_initial_subtime: now,
            subblock_subtime: now,
            subblock_index: 0,
            aggregator_index: own_index,
        }),
        IssuanceDecision::IssueOnlyIfRoundFull => Some(RoundState {
            round_initial_subtime: state.round_initial_subtime,
            subblock_subtime: now,
            subblock_index: state.subblock_index.checked_add(1)?,
            aggregator_index: state.aggregator_index,
        }),
        IssuanceDecision::Wait => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poa_lock::domain::validate_transition;
    use proptest::prelude::*;

    const IDS: [u8; 60] = [0u8; 60];

    fn setup() -> PoaSetup<'static> {
        // 3 aggregators, 100-unit rounds, 5 subblocks per round
        PoaSetup::new(true, 20, 3, 2, 100, 5, &IDS).unwrap()
    }

    fn state(initial: u64, time: u64, index: u32, aggregator: u16) -> RoundState {
        RoundState {
            round_initial_subtime: initial,
            subblock_subtime: time,
            subblock_index: index,
            aggregator_index: aggregator,
        }
    }

    #[test]
    fn test_continue_own_round() {
        let current = state(1000, 1000, 0, 0);
        assert_eq!(
            decide(&setup(), &current, 0, 1050),
            IssuanceDecision::IssueOnlyIfRoundFull
        );
        assert_eq!(decide(&setup(), &current, 1, 1050), IssuanceDecision::Wait);
    }

    #[test]
    fn test_round_out_of_slots() {
        let current = state(1000, 1040, 4, 0);
        assert_eq!(decide(&setup(), &current, 0, 1050), IssuanceDecision::Wait);
    }

    #[test]
    fn test_clock_behind_last_subblock() {
        let current = state(1000, 1060, 1, 0);
        assert_eq!(decide(&setup(), &current, 0, 1050), IssuanceDecision::Wait);
    }

    #[test]
    fn test_rollover_windows() {
        let s = setup();
        let current = state(1000, 1000, 0, 0);
        assert_eq!(decide(&s, &current, 1, 1100), IssuanceDecision::IssueNow);
        assert_eq!(decide(&s, &current, 2, 1150), IssuanceDecision::Wait);
        assert_eq!(decide(&s, &current, 2, 1200), IssuanceDecision::IssueNow);
        assert_eq!(decide(&s, &current, 0, 1299), IssuanceDecision::Wait);
        assert_eq!(decide(&s, &current, 0, 1300), IssuanceDecision::IssueNow);
    }

    #[test]
    fn test_not_an_aggregator() {
        let current = state(1000, 1000, 0, 0);
        assert_eq!(decide(&setup(), &current, 3, 5000), IssuanceDecision::Wait);
    }

    #[test]
    fn test_may_issue() {
        assert!(IssuanceDecision::IssueNow.may_issue());
        assert!(IssuanceDecision::IssueOnlyIfRoundFull.may_issue());
        assert!(!IssuanceDecision::Wait.may_issue());
    }

    #[test]
    fn test_wait_has_no_successor() {
        assert_eq!(
            next_round_state(&state(0, 0, 0, 0), IssuanceDecision::Wait, 0, 10),
            None
        );
    }

    #[test]
    fn test_new_round_anchored_at_now() {
        let current = state(1000, 1000, 3, 0);
        let next = next_round_state(&current, IssuanceDecision::IssueNow, 1, 1123).unwrap();
        assert_eq!(next, state(1123, 1123, 0, 1));
    }

    proptest! {
        /// Any state the generator proposes is one the lock accepts.
        #[test]
        fn prop_decisions_pass_transition_rules(
            initial in 0u64..1_000_000,
            offset in 0u64..50,
            index in 0u32..5,
            aggregator in 0u16..3,
            own in 0u16..3,
            elapsed in 0u64..400,
        ) {
            let s = setup();
            let current = state(initial, initial + offset, index, aggregator);
            let now = initial + elapsed;
            let decision = decide(&s, &current, own, now);
            if let Some(next) = next_round_state(&current, decision, own, now) {
                prop_assert!(validate_transition(&s, &current, &next, now).is_ok());
            }
        }
    }
}
