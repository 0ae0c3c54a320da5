//! Subblock plans
//!
//! A plan is the transaction mutation that issues one subblock: lock the
//! state input at the new subtime and write the successor state into the
//! state output.

use super::decision::{decide, next_round_state, IssuanceDecision};
use crate::error::Result;
use poa_lock::domain::locate_required;
use poa_lock::{CellRef, InMemoryTransaction, PoaSetup, RoundState, Since, Source};
use serde::Serialize;

/// Everything needed to turn a draft into a subblock transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubblockPlan {
    pub decision: IssuanceDecision,
    pub next_state: RoundState,
    pub since: Since,
    /// Reference of the round state cell being advanced
    pub state_ref: CellRef,
}

impl SubblockPlan {
    /// Apply the plan to a draft that already consumes and recreates the
    /// state cell.
    pub fn apply_to(&self, tx: &mut InMemoryTransaction) -> Result<()> {
        let input = locate_required(&*tx, &self.state_ref, Source::Input)?;
        let output = locate_required(&*tx, &self.state_ref, Source::Output)?;
        tx.inputs[input].since = self.since.0;
        tx.outputs[output].data = self.next_state.to_bytes().to_vec();
        Ok(())
    }
}

/// Plan a subblock for `own_index` at subtime `now`, or `None` when it is
/// not our turn.
pub fn plan(
    setup: &PoaSetup<'_>,
    state: &RoundState,
    state_ref: &CellRef,
    own_index: u16,
    now: u64,
) -> Result<Option<SubblockPlan>> {
    let decision = decide(setup, state, own_index, now);
    if !decision.may_issue() {
        return Ok(None);
    }
    let Some(next_state) = next_round_state(state, decision, own_index, now) else {
        return Ok(None);
    };
    let since = Since::for_subtime(setup.interval_uses_seconds, now)?;
    Ok(Some(SubblockPlan {
        decision,
        next_state,
        since,
        state_ref: *state_ref,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use poa_lock::domain::type_id_script;
    use poa_lock::{CellFixture, PoaError};

    const IDS: [u8; 64] = [0u8; 64];
    const STATE_REF: CellRef = [0x21; 32];

    fn setup(uses_seconds: bool) -> PoaSetup<'static> {
        PoaSetup::new(uses_seconds, 32, 2, 1, 10, 3, &IDS).unwrap()
    }

    fn state() -> RoundState {
        RoundState {
            round_initial_subtime: 100,
            subblock_subtime: 100,
            subblock_index: 0,
            aggregator_index: 0,
        }
    }

    #[test]
    fn test_plan_uses_setup_time_unit() {
        let by_time = plan(&setup(true), &state(), &STATE_REF, 1, 110)
            .unwrap()
            .unwrap();
        assert_eq!(by_time.since, Since::absolute_timestamp(110).unwrap());
        assert_eq!(by_time.decision, IssuanceDecision::IssueNow);

        let by_height = plan(&setup(false), &state(), &STATE_REF, 1, 110)
            .unwrap()
            .unwrap();
        assert_eq!(by_height.since, Since::absolute_block_number(110).unwrap());
    }

    #[test]
    fn test_plan_none_when_waiting() {
        assert!(plan(&setup(true), &state(), &STATE_REF, 1, 105)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_plan_rejects_unrepresentable_time() {
        let far = 1u64 << 60;
        assert!(matches!(
            plan(&setup(true), &state(), &STATE_REF, 1, far),
            Err(GeneratorError::Decode(PoaError::SinceOverflow(_)))
        ));
    }

    #[test]
    fn test_apply_to_draft() {
        let typed = || CellFixture::default().with_type(type_id_script(&STATE_REF).to_vec());
        let mut tx = InMemoryTransaction::default()
            .with_input(CellFixture::default())
            .with_input(typed().with_data(state().to_bytes().to_vec()))
            .with_output(typed().with_data(state().to_bytes().to_vec()));

        let p = plan(&setup(true), &state(), &STATE_REF, 1, 120)
            .unwrap()
            .unwrap();
        p.apply_to(&mut tx).unwrap();

        assert_eq!(tx.inputs[1].since, p.since.0);
        assert_eq!(tx.inputs[0].since, 0);
        assert_eq!(
            RoundState::decode(&tx.outputs[0].data).unwrap(),
            p.next_state
        );
    }

    #[test]
    fn test_apply_to_draft_without_state_cell() {
        let p = plan(&setup(true), &state(), &STATE_REF, 1, 120)
            .unwrap()
            .unwrap();
        let mut tx = InMemoryTransaction::default();
        assert!(matches!(
            p.apply_to(&mut tx),
            Err(GeneratorError::Decode(PoaError::CellNotFound { .. }))
        ));
    }
}
