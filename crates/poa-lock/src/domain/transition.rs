//! Round-robin state transition rules
//!
//! Pure checks over decoded records; no host access. An aggregator may keep
//! issuing subblocks while its round is open (`since < round start +
//! interval`), up to `subblocks_per_interval` of them. Once the round has
//! elapsed, a new round may be opened by the aggregator `steps` positions
//! further along, but only after `steps` full intervals have passed since the
//! previous round started.

use super::error::{PoaError, PoaResult};
use super::round_state::RoundState;
use super::setup::PoaSetup;

/// Which rule accepted a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Same aggregator, same round, next subblock
    SameRound,
    /// A new round opened by the aggregator `steps` positions ahead
    Rollover { steps: u64 },
}

/// Whether `since` still falls in the round that started at
/// `round_initial_subtime`.
///
/// The round end saturates at `u64::MAX`, so a round that starts within one
/// interval of the end of time stays open for every `since` below it.
pub fn in_current_round(setup: &PoaSetup<'_>, round_initial_subtime: u64, since: u64) -> bool {
    since < round_initial_subtime.saturating_add(setup.subblock_intervals as u64)
}

/// Rotation distance from `from` to `to`.
///
/// Zero distance counts as a full cycle: an aggregator can only open a new
/// round of its own after every other slot has had a chance to elapse.
pub fn rotation_steps(aggregator_number: u8, from: u16, to: u16) -> u64 {
    let n = aggregator_number as u64;
    if n == 0 {
        return 0;
    }
    let steps = (to as u64 + n - from as u64 % n) % n;
    if steps == 0 { n } else { steps }
}

/// Earliest subtime at which the aggregator `steps` positions ahead may open
/// a round. `None` if that point is past the end of time.
pub fn rollover_deadline(
    setup: &PoaSetup<'_>,
    round_initial_subtime: u64,
    steps: u64,
) -> Option<u64> {
    steps
        .checked_mul(setup.subblock_intervals as u64)
        .and_then(|duration| duration.checked_add(round_initial_subtime))
}

/// Check that `next.aggregator_index` names an aggregator.
pub fn check_aggregator_index(setup: &PoaSetup<'_>, next: &RoundState) -> PoaResult<()> {
    if next.aggregator_index as usize >= setup.aggregator_number as usize {
        tracing::debug!(
            index = next.aggregator_index,
            aggregators = setup.aggregator_number,
            "Invalid aggregator index"
        );
        return Err(PoaError::AggregatorIndexOutOfRange {
            index: next.aggregator_index,
            aggregators: setup.aggregator_number,
        });
    }
    Ok(())
}

/// Validate the step from `prev` to `next` at subtime `since`.
///
/// `since` must already have been checked against `next.subblock_subtime`.
pub fn validate_transition(
    setup: &PoaSetup<'_>,
    prev: &RoundState,
    next: &RoundState,
    since: u64,
) -> PoaResult<TransitionKind> {
    if in_current_round(setup, prev.round_initial_subtime, since) {
        validate_same_round(setup, prev, next)?;
        return Ok(TransitionKind::SameRound);
    }
    validate_rollover(setup, prev, next, since)
        .map(|steps| TransitionKind::Rollover { steps })
}

fn validate_same_round(
    setup: &PoaSetup<'_>,
    prev: &RoundState,
    next: &RoundState,
) -> PoaResult<()> {
    if next.round_initial_subtime != prev.round_initial_subtime {
        tracing::debug!("Invalid current round first timestamp");
        return Err(PoaError::RoundInitialTimeMismatch {
            expected: prev.round_initial_subtime,
            actual: next.round_initial_subtime,
        });
    }
    if next.subblock_subtime < prev.subblock_subtime {
        tracing::debug!("Invalid current timestamp");
        return Err(PoaError::SubblockTimeRegressed {
            previous: prev.subblock_subtime,
            current: next.subblock_subtime,
        });
    }
    if next.aggregator_index != prev.aggregator_index {
        tracing::debug!("Invalid aggregator");
        return Err(PoaError::AggregatorChanged {
            previous: prev.aggregator_index,
            current: next.aggregator_index,
        });
    }
    let expected_index = prev.subblock_index.checked_add(1);
    if expected_index != Some(next.subblock_index)
        || next.subblock_index >= setup.subblocks_per_interval
    {
        tracing::debug!(
            index = next.subblock_index,
            limit = setup.subblocks_per_interval,
            "Invalid block index"
        );
        return Err(PoaError::InvalidSubblockIndex {
            actual: next.subblock_index,
        });
    }
    Ok(())
}

fn validate_rollover(
    setup: &PoaSetup<'_>,
    prev: &RoundState,
    next: &RoundState,
    since: u64,
) -> PoaResult<u64> {
    if next.round_initial_subtime != next.subblock_subtime {
        tracing::debug!("Invalid current round first timestamp");
        return Err(PoaError::RoundInitialTimeMismatch {
            expected: next.subblock_subtime,
            actual: next.round_initial_subtime,
        });
    }
    if next.subblock_index != 0 {
        tracing::debug!("Invalid block index");
        return Err(PoaError::InvalidSubblockIndex {
            actual: next.subblock_index,
        });
    }

    let steps = rotation_steps(
        setup.aggregator_number,
        prev.aggregator_index,
        next.aggregator_index,
    );
    match rollover_deadline(setup, prev.round_initial_subtime, steps) {
        Some(required) if since >= required => Ok(steps),
        deadline => {
            let required = deadline.unwrap_or(u64::MAX);
            tracing::debug!(since, required, steps, "Invalid time");
            Err(PoaError::RotationTooEarly { since, required })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const IDS: [u8; 96] = [0u8; 96];

    fn setup() -> PoaSetup<'static> {
        PoaSetup::new(true, 32, 3, 2, 100, 5, &IDS).unwrap()
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
    fn test_rotation_full_cycle() {
        assert_eq!(rotation_steps(3, 2, 2), 3);
        assert_eq!(rotation_steps(3, 0, 0), 3);
        assert_eq!(rotation_steps(3, 0, 1), 1);
        assert_eq!(rotation_steps(3, 2, 0), 1);
        assert_eq!(rotation_steps(3, 2, 1), 2);
        assert_eq!(rotation_steps(1, 0, 0), 1);
    }

    #[test]
    fn test_round_near_end_of_time_stays_open() {
        let start = u64::MAX - 10;
        let last = u64::MAX - 1;
        assert!(in_current_round(&setup(), start, start + 5));
        assert!(in_current_round(&setup(), start, last));

        let prev = state(start, start, 0, 0);
        let rotated = state(last, last, 0, 1);
        assert_eq!(
            validate_transition(&setup(), &prev, &rotated, last),
            Err(PoaError::RoundInitialTimeMismatch {
                expected: start,
                actual: last,
            })
        );
    }

    #[test]
    fn test_same_round_accepts() {
        let prev = state(1000, 1000, 0, 0);
        let next = state(1000, 1050, 1, 0);
        assert_eq!(
            validate_transition(&setup(), &prev, &next, 1050),
            Ok(TransitionKind::SameRound)
        );
    }

    #[test]
    fn test_same_round_equal_time_accepts() {
        let prev = state(1000, 1050, 1, 0);
        let next = state(1000, 1050, 2, 0);
        assert!(validate_transition(&setup(), &prev, &next, 1050).is_ok());
    }

    #[test]
    fn test_same_round_rejections() {
        let s = setup();
        let prev = state(1000, 1040, 0, 0);

        assert!(matches!(
            validate_transition(&s, &prev, &state(999, 1050, 1, 0), 1050),
            Err(PoaError::RoundInitialTimeMismatch { .. })
        ));
        assert!(matches!(
            validate_transition(&s, &prev, &state(1000, 1030, 1, 0), 1030),
            Err(PoaError::SubblockTimeRegressed { .. })
        ));
        assert!(matches!(
            validate_transition(&s, &prev, &state(1000, 1050, 1, 1), 1050),
            Err(PoaError::AggregatorChanged { .. })
        ));
        assert!(matches!(
            validate_transition(&s, &prev, &state(1000, 1050, 2, 0), 1050),
            Err(PoaError::InvalidSubblockIndex { actual: 2 })
        ));
    }

    #[test]
    fn test_same_round_slot_limit() {
        let prev = state(1000, 1040, 4, 0);
        let next = state(1000, 1050, 5, 0);
        assert_eq!(
            validate_transition(&setup(), &prev, &next, 1050),
            Err(PoaError::InvalidSubblockIndex { actual: 5 })
        );
    }

    #[test]
    fn test_same_round_index_overflow() {
        let s = PoaSetup::new(true, 32, 3, 2, 100, u32::MAX, &IDS).unwrap();
        let prev = state(1000, 1040, u32::MAX, 0);
        let next = state(1000, 1050, 0, 0);
        assert!(validate_transition(&s, &prev, &next, 1050).is_err());
    }

    #[test]
    fn test_rollover_to_next_aggregator() {
        let prev = state(1000, 1000, 0, 0);
        let next = state(1105, 1105, 0, 1);
        assert_eq!(
            validate_transition(&setup(), &prev, &next, 1105),
            Ok(TransitionKind::Rollover { steps: 1 })
        );
    }

    #[test]
    fn test_rollover_same_aggregator_needs_full_cycle() {
        let prev = state(1000, 1000, 0, 0);
        assert_eq!(
            validate_transition(&setup(), &prev, &state(1105, 1105, 0, 0), 1105),
            Err(PoaError::RotationTooEarly {
                since: 1105,
                required: 1300,
            })
        );
        assert_eq!(
            validate_transition(&setup(), &prev, &state(1300, 1300, 0, 0), 1300),
            Ok(TransitionKind::Rollover { steps: 3 })
        );
    }

    #[test]
    fn test_rollover_skipping_aggregator() {
        let prev = state(1000, 1000, 0, 0);
        let early = state(1150, 1150, 0, 2);
        let due = state(1200, 1200, 0, 2);
        assert!(validate_transition(&setup(), &prev, &early, 1150).is_err());
        assert!(validate_transition(&setup(), &prev, &due, 1200).is_ok());
    }

    #[test]
    fn test_rollover_shape_rejections() {
        let prev = state(1000, 1000, 0, 0);
        assert!(matches!(
            validate_transition(&setup(), &prev, &state(1100, 1105, 0, 1), 1105),
            Err(PoaError::RoundInitialTimeMismatch { .. })
        ));
        assert!(matches!(
            validate_transition(&setup(), &prev, &state(1105, 1105, 1, 1), 1105),
            Err(PoaError::InvalidSubblockIndex { actual: 1 })
        ));
    }

    #[test]
    fn test_rollover_deadline_overflow_rejects() {
        let s = PoaSetup::new(true, 32, 3, 2, u32::MAX, 5, &IDS).unwrap();
        let prev = state(u64::MAX - 10, u64::MAX - 10, 0, 0);
        let next = state(u64::MAX, u64::MAX, 0, 0);
        assert!(matches!(
            validate_transition(&s, &prev, &next, u64::MAX),
            Err(PoaError::RotationTooEarly { .. })
        ));
    }

    #[test]
    fn test_aggregator_index_range() {
        let s = setup();
        assert!(check_aggregator_index(&s, &state(0, 0, 0, 2)).is_ok());
        assert_eq!(
            check_aggregator_index(&s, &state(0, 0, 0, 3)),
            Err(PoaError::AggregatorIndexOutOfRange {
                index: 3,
                aggregators: 3
            })
        );
    }

    proptest! {
        #[test]
        fn prop_steps_in_range(n in 1u8..=255, from_seed in any::<u16>(), to_seed in any::<u16>()) {
            let from = from_seed % n as u16;
            let to = to_seed % n as u16;
            let steps = rotation_steps(n, from, to);
            prop_assert!(steps >= 1 && steps <= n as u64);
            prop_assert_eq!((from as u64 + steps) % n as u64, to as u64);
        }
    }
}
