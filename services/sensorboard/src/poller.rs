//! Poller: drives fetch-and-reconcile ticks on fixed intervals
//!
//! Each tick spawns its fetch as a separate task, so a slow or hung request
//! never holds back the next tick. Responses are tagged with a sequence number
//! taken when the request is issued; a response older than the newest one
//! already applied to the same lineage is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::backend::BackendClient;
use crate::config::{PollingConfig, Strategy};
use crate::model::EntityId;
use crate::state::{Lineage, StateHandle};

#[derive(Debug, Clone, Copy)]
enum TickKind {
    Groups,
    Sensors,
}

/// Owns the polling timers and hands fetched data to the reconciler
#[derive(Debug, Clone)]
pub struct Poller {
    backend: Arc<BackendClient>,
    state: StateHandle,
    strategy: Strategy,
    groups_interval: Duration,
    sensors_interval: Duration,
    sequence: Arc<AtomicU64>,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(
        backend: Arc<BackendClient>,
        state: StateHandle,
        config: &PollingConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            backend,
            state,
            strategy: config.strategy,
            groups_interval: config.groups_interval(),
            sensors_interval: config.sensors_interval(),
            sequence: Arc::new(AtomicU64::new(0)),
            cancel,
        }
    }

    /// Start polling. Groups are fetched immediately and then on every groups
    /// interval; the batched strategy also runs a separate sensors timer.
    /// Returns when the cancellation token is triggered.
    pub async fn run(&self) {
        tracing::info!(
            "Polling with {:?} strategy (groups every {:?}, sensors every {:?})",
            self.strategy,
            self.groups_interval,
            self.sensors_interval
        );

        let mut handles = vec![tokio::spawn(
            self.clone().tick_loop(TickKind::Groups, self.groups_interval),
        )];
        if self.strategy == Strategy::Batched {
            handles.push(tokio::spawn(
                self.clone()
                    .tick_loop(TickKind::Sensors, self.sensors_interval),
            ));
        }

        self.cancel.cancelled().await;

        for handle in handles {
            let _ = handle.await;
        }
    }

    async fn tick_loop(self, kind: TickKind, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.cancel.cancelled() => {
                    tracing::debug!("{:?} polling cancelled", kind);
                    break;
                }
            }

            let poller = self.clone();
            tokio::spawn(async move {
                let cancel = poller.cancel.clone();
                let work = async {
                    match kind {
                        TickKind::Groups => poller.poll_groups_once().await,
                        TickKind::Sensors => poller.poll_sensors_once().await,
                    }
                };
                tokio::select! {
                    _ = work => {}
                    _ = cancel.cancelled() => {}
                }
            });
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// One groups tick: fetch the group list and reconcile it. The keyed
    /// strategy then fetches and reconciles every group's sensors.
    pub async fn poll_groups_once(&self) {
        let sequence = self.next_sequence();
        let groups = match self.backend.fetch_groups().await {
            Ok(groups) => groups,
            Err(e) => {
                tracing::warn!("Error fetching groups: {}", e);
                return;
            }
        };

        {
            let mut state = self.state.write().await;
            let strategy = self.strategy;
            let result = state.apply_fresh(Lineage::Groups, sequence, |s| match strategy {
                Strategy::Keyed => s.apply_keyed_groups(&groups),
                Strategy::Batched => s.apply_batched_groups(&groups),
            });
            match result {
                Ok(Some(summary)) => tracing::debug!(
                    "Groups #{}: {} fetched, {}",
                    sequence,
                    groups.len(),
                    summary
                ),
                Ok(None) => {
                    tracing::debug!("Discarding stale groups response #{}", sequence);
                    return;
                }
                Err(e) => {
                    tracing::warn!("Error updating groups: {}", e);
                    return;
                }
            }
        }

        if self.strategy == Strategy::Keyed {
            let group_ids: Vec<EntityId> = groups.into_iter().map(|g| g.group_id).collect();
            self.poll_each_group(&group_ids).await;
        }
    }

    /// One sensors tick. Keyed: re-fetch every rendered group's sensors.
    /// Batched: one request for all known groups, skipped when none are known.
    pub async fn poll_sensors_once(&self) {
        match self.strategy {
            Strategy::Keyed => {
                let group_ids: Vec<EntityId> = {
                    let state = self.state.read().await;
                    state
                        .view()
                        .groups()
                        .iter()
                        .map(|g| g.group_id.clone())
                        .collect()
                };
                self.poll_each_group(&group_ids).await;
            }
            Strategy::Batched => self.poll_sensor_batch().await,
        }
    }

    async fn poll_each_group(&self, group_ids: &[EntityId]) {
        futures::future::join_all(group_ids.iter().map(|id| self.poll_group_sensors(id))).await;
    }

    async fn poll_group_sensors(&self, group_id: &EntityId) {
        let sequence = self.next_sequence();
        let sensors = match self.backend.fetch_group_sensors(group_id).await {
            Ok(sensors) => sensors,
            Err(e) => {
                tracing::warn!("Error fetching sensors for group {}: {}", group_id, e);
                return;
            }
        };

        let mut state = self.state.write().await;
        let lineage = Lineage::GroupSensors(group_id.clone());
        match state.apply_fresh(lineage, sequence, |s| s.apply_keyed_sensors(group_id, &sensors)) {
            Ok(Some(summary)) => {
                tracing::debug!("Sensors #{} for group {}: {}", sequence, group_id, summary)
            }
            Ok(None) => tracing::debug!(
                "Discarding stale sensors response #{} for group {}",
                sequence,
                group_id
            ),
            Err(e) => tracing::warn!("Error updating sensors for group {}: {}", group_id, e),
        }
    }

    async fn poll_sensor_batch(&self) {
        let group_ids = self.state.read().await.known_group_ids().to_vec();
        if group_ids.is_empty() {
            tracing::debug!("No groups known yet, skipping sensor batch");
            return;
        }

        let sequence = self.next_sequence();
        let batch = match self.backend.fetch_sensor_batch(&group_ids).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("Error fetching sensor batch: {}", e);
                return;
            }
        };

        let mut state = self.state.write().await;
        match state.apply_fresh(Lineage::SensorBatch, sequence, |s| s.apply_sensor_batch(&batch)) {
            Ok(Some(outcome)) => {
                for group_id in &outcome.skipped {
                    tracing::debug!("Sensor list for group {} not found, skipping", group_id);
                }
                tracing::debug!("Sensor batch #{}: {}", sequence, outcome.summary);
            }
            Ok(None) => tracing::debug!("Discarding stale sensor batch #{}", sequence),
            Err(e) => tracing::warn!("Error updating sensor batch: {}", e),
        }
    }
}
