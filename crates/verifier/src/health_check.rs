use std::{
    cmp::min,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use relay_config::HealthCheckConfig;
use relay_rpc_client::StateRootProvider;
use relay_store::{traits::ChainStore, Store};
use relay_types::verifier::DivergenceRecord;
use tokio::sync::broadcast;

use crate::{divergence::locate_first_divergence, metrics::VERIFIER_METRICS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy { height: u64 },
    /// A divergence was located recently; polling resumes after the cooldown.
    Cooling { until: u64 },
    Diverged(DivergenceRecord),
}

/// Compares the latest state roots of the sequencer and a replica.
pub struct HealthChecker {
    store: Store,
    sequencer: Arc<dyn StateRootProvider>,
    replica: Arc<dyn StateRootProvider>,
    config: HealthCheckConfig,
}

impl HealthChecker {
    pub fn new(
        store: Store,
        sequencer: Arc<dyn StateRootProvider>,
        replica: Arc<dyn StateRootProvider>,
        config: HealthCheckConfig,
    ) -> Self {
        HealthChecker {
            store,
            sequencer,
            replica,
            config,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::info!("health checker stopped");
                    return;
                }
                _ = interval.tick() => {}
            }
            let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
                Ok(d) => d.as_secs(),
                Err(err) => {
                    log::error!("system clock before unix epoch: {}", err);
                    continue;
                }
            };
            if let Err(err) = self.check(now).await {
                log::warn!("health checker: {:#}", err);
            }
        }
    }

    async fn mismatch(&self, height: u64) -> Result<bool> {
        let sequencer = self
            .sequencer
            .state_root_at(height)
            .await?
            .with_context(|| format!("sequencer has no block {}", height))?;
        let replica = self
            .replica
            .state_root_at(height)
            .await?
            .with_context(|| format!("replica has no block {}", height))?;
        Ok(sequencer != replica)
    }

    /// One poll at `now` (unix seconds).
    #[tracing::instrument(skip(self))]
    pub async fn check(&self, now: u64) -> Result<HealthStatus> {
        if let Some(last) = self.store.get_latest_divergence()? {
            let until = last.detected_at + self.config.divergence_cooldown_secs;
            if now < until {
                return Ok(HealthStatus::Cooling { until });
            }
        }

        let latest_common = min(
            self.sequencer.latest_height().await?,
            self.replica.latest_height().await?,
        );
        if !self.mismatch(latest_common).await? {
            VERIFIER_METRICS.diverged.set(0);
            return Ok(HealthStatus::Healthy {
                height: latest_common,
            });
        }

        let height = locate_first_divergence(latest_common, |h| self.mismatch(h)).await?;
        // A matching root above the divergence contradicts the search's
        // monotonicity assumption.
        let suspicious = if height < latest_common {
            let probe = height + 1 + (latest_common - height - 1) / 2;
            !self.mismatch(probe).await?
        } else {
            false
        };
        let record = DivergenceRecord {
            height,
            latest_common_height: latest_common,
            detected_at: now,
            suspicious,
        };
        let mut tx = self.store.begin_transaction();
        tx.insert_divergence(&record)?;
        tx.commit()?;

        VERIFIER_METRICS.diverged.set(1);
        VERIFIER_METRICS.first_divergent_height.set(height);
        if suspicious {
            log::error!(
                "sequencer and replica diverge at height {} (latest common {}), but roots match again above it",
                height,
                latest_common
            );
        } else {
            log::error!(
                "sequencer and replica diverge at height {} (latest common {})",
                height,
                latest_common
            );
        }
        Ok(HealthStatus::Diverged(record))
    }
}
