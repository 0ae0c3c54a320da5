//! PoA Lock Service - Core validation flow
//!
//! # Flow
//! 1. Structure: at most one input and one output under this lock
//! 2. Own script args: `setup_ref || state_ref`
//! 3. Mode: setup cell among cell deps means block production, otherwise
//!    the setup itself is being replaced
//! 4. Mode-specific checks, ending in a signing policy

use crate::domain::{
    check_aggregator_index, locate, locate_required, validate_single_signing,
    validate_threshold_signing, validate_transition, Authorization, CellRef, LockArgs, PoaError,
    PoaResult, PoaSetup, RoundState, Since, TransitionKind, ValidationMode, ROUND_STATE_SIZE,
    SCRIPT_BUFFER_SIZE, SETUP_BUFFER_SIZE,
};
use crate::metrics;
use crate::ports::{load_bounded, PoaLockApi, Source, SysError, TransactionReader};


/// PoA lock validator over a host transaction.
pub struct PoaLockService<R: TransactionReader> {
    reader: R,
}

impl<R: TransactionReader> PoaLockService<R> {
    /// Create a validator reading from `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    // === STRUCTURE ===

    /// Reject transactions with a second cell under this lock on `source`.
    fn ensure_single_group_cell(&self, source: Source, err: PoaError) -> PoaResult<()> {
        match self.reader.load_cell_capacity(1, source) {
            Err(SysError::IndexOutOfBound) => Ok(()),
            Ok(_) => {
                tracing::debug!(%source, "Transaction has more than one cell using current lock");
                Err(err)
            }
            Err(other) => Err(other.into()),
        }
    }

    fn load_lock_args(&self) -> PoaResult<LockArgs> {
        let mut script = [0u8; SCRIPT_BUFFER_SIZE];
        let len = load_bounded(&mut script, |buf| self.reader.load_script(buf))?;
        LockArgs::from_script(&script[..len]).inspect_err(|err| {
            tracing::debug!(%err, "Invalid lock script");
        })
    }

    /// Decide the mode once, from where the setup cell lives.
    fn select_mode(&self, setup_ref: &CellRef) -> PoaResult<ValidationMode> {
        Ok(match locate(&self.reader, setup_ref, Source::CellDep)? {
            Some(setup_dep_index) => ValidationMode::BlockProduction { setup_dep_index },
            None => ValidationMode::AuthoritySetChange,
        })
    }

    // === LOADERS ===

    fn load_setup<'b>(
        &self,
        buf: &'b mut [u8; SETUP_BUFFER_SIZE],
        index: usize,
        source: Source,
    ) -> PoaResult<PoaSetup<'b>> {
        let len = match load_bounded(buf, |b| self.reader.load_cell_data(b, index, source)) {
            Ok(len) => len,
            Err(err) => {
                tracing::debug!(%source, "PoA setup cell is too large");
                return Err(err);
            }
        };
        PoaSetup::decode(&buf[..len])
            .inspect_err(|err| tracing::debug!(%source, %err, "Invalid PoA setup"))
    }

    fn load_round_state(&self, reference: &CellRef, source: Source) -> PoaResult<RoundState> {
        let index = locate_required(&self.reader, reference, source)?;
        let mut buf = [0u8; ROUND_STATE_SIZE];
        let len = load_bounded(&mut buf, |b| self.reader.load_cell_data(b, index, source))?;
        RoundState::decode(&buf[..len])
            .inspect_err(|_| tracing::debug!(%source, "Invalid PoA round state cell"))
    }

    // === MODES ===

    fn verify_block_production(
        &self,
        args: &LockArgs,
        setup_dep_index: usize,
    ) -> PoaResult<Authorization> {
        let mut setup_buf = [0u8; SETUP_BUFFER_SIZE];
        let setup = self.load_setup(&mut setup_buf, setup_dep_index, Source::CellDep)?;

        let prev = self.load_round_state(&args.state_ref, Source::Input)?;
        let next = self.load_round_state(&args.state_ref, Source::Output)?;
        check_aggregator_index(&setup, &next)?;

        let since = Since(self.reader.load_input_since(0, Source::GroupInput)?);
        let since = match since.expect_absolute(setup.interval_uses_seconds) {
            Ok(since) => since,
            Err(err) => {
                tracing::debug!(%err, "PoA requires absolute since");
                return Err(err);
            }
        };
        if since != next.subblock_subtime {
            tracing::debug!(
                since,
                subtime = next.subblock_subtime,
                "Invalid current time"
            );
            return Err(PoaError::SinceTimeMismatch {
                since,
                subblock_time: next.subblock_subtime,
            });
        }

        let kind = validate_transition(&setup, &prev, &next, since)?;

        let Some(identity) = setup.identity(next.aggregator_index as usize) else {
            return Err(PoaError::AggregatorIndexOutOfRange {
                index: next.aggregator_index,
                aggregators: setup.aggregator_number,
            });
        };
        validate_single_signing(&self.reader, identity)?;

        tracing::debug!(
            aggregator = next.aggregator_index,
            subblock = next.subblock_index,
            new_round = matches!(kind, TransitionKind::Rollover { .. }),
            "Subblock authorized"
        );
        Ok(Authorization::Subblock {
            aggregator_index: next.aggregator_index,
            subblock_index: next.subblock_index,
            kind,
        })
    }

    fn verify_authority_change(&self, args: &LockArgs) -> PoaResult<Authorization> {
        let input_index = locate_required(&self.reader, &args.setup_ref, Source::Input)?;
        let mut old_buf = [0u8; SETUP_BUFFER_SIZE];
        let old_setup = self.load_setup(&mut old_buf, input_index, Source::Input)?;

        // The replacement only has to be well formed.
        let output_index = locate_required(&self.reader, &args.setup_ref, Source::Output)?;
        let mut new_buf = [0u8; SETUP_BUFFER_SIZE];
        let new_setup = self.load_setup(&mut new_buf, output_index, Source::Output)?;

        let signers = validate_threshold_signing(&self.reader, &old_setup)?;

        tracing::info!(
            signers = signers.len(),
            threshold = old_setup.aggregator_change_threshold,
            new_aggregators = new_setup.aggregator_number,
            "PoA setup replaced"
        );
        Ok(Authorization::AuthoritySetChange { signers })
    }

    fn verify_inner(&self) -> PoaResult<Authorization> {
        self.ensure_single_group_cell(Source::GroupInput, PoaError::MultipleGroupInputs)?;
        self.ensure_single_group_cell(Source::GroupOutput, PoaError::MultipleGroupOutputs)?;

        let args = self.load_lock_args()?;
        match self.select_mode(&args.setup_ref)? {
            ValidationMode::BlockProduction { setup_dep_index } => {
                self.verify_block_production(&args, setup_dep_index)
            }
            ValidationMode::AuthoritySetChange => self.verify_authority_change(&args),
        }
    }
}

impl<R: TransactionReader> PoaLockApi for PoaLockService<R> {
    fn verify(&self) -> PoaResult<Authorization> {
        let result = self.verify_inner();
        match &result {
            Ok(Authorization::Subblock { .. }) => metrics::record_subblock_authorized(),
            Ok(Authorization::AuthoritySetChange { .. }) => metrics::record_authority_change(),
            Err(err) => {
                metrics::record_rejected(err.reason());
                tracing::debug!(
                    reason = err.reason(),
                    code = err.exit_code(),
                    "PoA lock rejected transaction"
                );
            }
        }
        result
    }
}
