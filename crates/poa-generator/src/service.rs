//! PoA Generator Service
//!
//! Fetches the PoA cells through the indexer port, decides whether this
//! aggregator may issue, and hands out plans that the lock has already
//! accepted in a dry run.

use crate::config::GeneratorConfig;
use crate::domain::{plan, SubblockPlan};
use crate::error::{GeneratorError, Result};
use crate::ports::{IndexedCell, PoaIndexer};
use parking_lot::RwLock;
use poa_lock::domain::type_id_script;
use poa_lock::{
    CellFixture, InMemoryTransaction, LockArgs, PoaLockApi, PoaLockService, PoaSetup, RoundState,
};
use std::time::Duration;
use tokio::sync::watch;

/// Cells seen on the last refresh.
#[derive(Debug, Clone)]
struct Snapshot {
    setup: IndexedCell,
    state: IndexedCell,
    round: RoundState,
}

/// Subblock planner for one aggregator.
pub struct PoaGenerator<I: PoaIndexer> {
    indexer: I,
    config: GeneratorConfig,
    lock_script: Vec<u8>,
    args: LockArgs,
    last: RwLock<Option<Snapshot>>,
}

impl<I: PoaIndexer> PoaGenerator<I> {
    /// Create a generator for the PoA lock `lock_script` (a molecule
    /// `Script` whose args name the setup and state cells).
    pub fn new(indexer: I, config: GeneratorConfig, lock_script: Vec<u8>) -> Result<Self> {
        config.validate()?;
        let args = LockArgs::from_script(&lock_script)?;
        Ok(Self {
            indexer,
            config,
            lock_script,
            args,
            last: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Round state seen on the last refresh.
    pub fn last_round_state(&self) -> Option<RoundState> {
        self.last.read().as_ref().map(|s| s.round)
    }

    async fn refresh(&self) -> Result<Snapshot> {
        let setup = self.indexer.fetch_setup_cell(&self.args.setup_ref).await?;
        let state = self.indexer.fetch_state_cell(&self.args.state_ref).await?;
        PoaSetup::decode(&setup.data)?;
        let round = RoundState::decode(&state.data)?;

        let snapshot = Snapshot {
            setup,
            state,
            round,
        };
        *self.last.write() = Some(snapshot.clone());
        Ok(snapshot)
    }

    async fn current_subtime(&self, uses_seconds: bool) -> Result<u64> {
        if uses_seconds {
            self.indexer.median_time().await
        } else {
            self.indexer.tip_block_number().await
        }
    }

    /// Refresh and plan the next subblock, or `None` if it is not our turn.
    pub async fn next_plan(&self) -> Result<Option<SubblockPlan>> {
        let snapshot = self.refresh().await?;
        let setup = PoaSetup::decode(&snapshot.setup.data)?;
        let now = self.current_subtime(setup.interval_uses_seconds).await?;
        let own = self.config.aggregator_index;

        let Some(planned) = plan(&setup, &snapshot.round, &self.args.state_ref, own, now)? else {
            tracing::debug!(aggregator = own, now, "Not our turn");
            return Ok(None);
        };
        self.dry_run(&setup, &snapshot, &planned)?;

        tracing::info!(
            aggregator = own,
            subblock = planned.next_state.subblock_index,
            decision = ?planned.decision,
            "Subblock planned"
        );
        Ok(Some(planned))
    }

    /// Like [`Self::next_plan`], but waiting is an error.
    pub async fn issue(&self) -> Result<SubblockPlan> {
        if let Some(planned) = self.next_plan().await? {
            return Ok(planned);
        }
        let aggregators = {
            let last = self.last.read();
            last.as_ref()
                .and_then(|s| PoaSetup::decode(&s.setup.data).ok())
                .map(|setup| setup.aggregator_number)
        };
        let index = self.config.aggregator_index;
        match aggregators {
            Some(aggregators) if index as usize >= aggregators as usize => {
                Err(GeneratorError::NotAggregator { index, aggregators })
            }
            _ => Err(GeneratorError::NotOurTurn),
        }
    }

    /// Run the plan through the lock against a draft built from the
    /// snapshot, with a placeholder input carrying our fingerprint.
    fn dry_run(
        &self,
        setup: &PoaSetup<'_>,
        snapshot: &Snapshot,
        planned: &SubblockPlan,
    ) -> Result<()> {
        let state_cell = |data: Vec<u8>| {
            CellFixture {
                capacity: snapshot.state.capacity,
                ..Default::default()
            }
            .with_type(type_id_script(&self.args.state_ref).to_vec())
            .with_lock_hash(snapshot.state.lock_hash)
            .with_data(data)
            .in_group()
        };
        let setup_dep = CellFixture {
            capacity: snapshot.setup.capacity,
            ..Default::default()
        }
        .with_type(type_id_script(&self.args.setup_ref).to_vec())
        .with_data(snapshot.setup.data.clone());

        let mut signer = [0u8; 32];
        if let Some(identity) = setup.identity(self.config.aggregator_index as usize) {
            signer[..identity.len()].copy_from_slice(identity);
        }

        let mut draft = InMemoryTransaction::default()
            .with_script(self.lock_script.clone())
            .with_cell_dep(setup_dep)
            .with_input(state_cell(snapshot.state.data.clone()))
            .with_output(state_cell(snapshot.state.data.clone()))
            .with_input(CellFixture::default().with_lock_hash(signer));
        planned.apply_to(&mut draft)?;

        PoaLockService::new(&draft)
            .verify()
            .map(|_| ())
            .map_err(|err| {
                tracing::warn!(%err, "Planned subblock rejected by lock");
                GeneratorError::DryRunRejected(err)
            })
    }

    /// Poll every `poll_interval_secs` and pass each plan to `on_plan`
    /// until `shutdown` flips to true or its sender is dropped.
    pub async fn poll<F>(&self, mut shutdown: watch::Receiver<bool>, mut on_plan: F) -> Result<()>
    where
        F: FnMut(SubblockPlan),
    {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        loop {
            tokio::select! {
                _ = ticker.tick() => match self.next_plan().await {
                    Ok(Some(planned)) => on_plan(planned),
                    Ok(None) => {}
                    Err(err) => tracing::warn!(%err, "Planning failed"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Generator stopped");
                        return Ok(());
                    }
                }
            }
        }
    }
}
