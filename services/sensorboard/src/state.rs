//! Shared state: the view tree plus the poller's bookkeeping
//!
//! All reconciliation passes go through the `apply_*` methods here, so the
//! view is only ever mutated while the write lock is held.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::{EntityId, Group, Sensor, SensorBatch};
use crate::reconcile::{batched, keyed, Patch, PatchSummary};
use crate::view::ViewTree;

/// A stream of requests writing the same part of the view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lineage {
    Groups,
    GroupSensors(EntityId),
    SensorBatch,
}

/// Outcome of applying a sensor batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub summary: PatchSummary,
    /// Groups in the batch that were skipped because they are not rendered
    pub skipped: Vec<EntityId>,
}

/// State shared by the poller and the dashboard
#[derive(Debug, Default)]
pub struct SharedState {
    view: ViewTree,
    known_group_ids: Vec<EntityId>,
    applied: HashMap<Lineage, u64>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ViewTree {
        &self.view
    }

    /// Group ids of the latest successful groups fetch
    pub fn known_group_ids(&self) -> &[EntityId] {
        &self.known_group_ids
    }

    /// Run `pass` for a response of `lineage` taken at `sequence`.
    ///
    /// Returns `Ok(None)` without running the pass when a newer response of
    /// the same lineage has already been applied. The sequence is recorded
    /// only when the pass succeeds.
    pub fn apply_fresh<T>(
        &mut self,
        lineage: Lineage,
        sequence: u64,
        pass: impl FnOnce(&mut Self) -> crate::Result<T>,
    ) -> crate::Result<Option<T>> {
        if matches!(self.applied.get(&lineage), Some(&last) if last >= sequence) {
            return Ok(None);
        }
        let outcome = pass(self)?;
        self.applied.insert(lineage, sequence);
        Ok(Some(outcome))
    }

    /// Keyed pass over the group list
    pub fn apply_keyed_groups(&mut self, groups: &[Group]) -> crate::Result<PatchSummary> {
        let patches = keyed::reconcile_groups(&self.view, groups);
        self.commit(&patches)?;
        self.known_group_ids = groups.iter().map(|g| g.group_id.clone()).collect();

        let view = &self.view;
        self.applied.retain(|lineage, _| match lineage {
            Lineage::GroupSensors(id) => view.group(id).is_some(),
            _ => true,
        });
        Ok(PatchSummary::of(&patches))
    }

    /// Keyed pass over one group's sensor list
    pub fn apply_keyed_sensors(
        &mut self,
        group_id: &EntityId,
        sensors: &[Sensor],
    ) -> crate::Result<PatchSummary> {
        let patches = keyed::reconcile_sensors(&self.view, group_id, sensors)?;
        self.commit(&patches)?;
        Ok(PatchSummary::of(&patches))
    }

    /// Batched pass over the group list: adds new groups only
    pub fn apply_batched_groups(&mut self, groups: &[Group]) -> crate::Result<PatchSummary> {
        let patches = batched::reconcile_groups(&self.view, groups);
        self.commit(&patches)?;
        self.known_group_ids = groups.iter().map(|g| g.group_id.clone()).collect();
        Ok(PatchSummary::of(&patches))
    }

    /// Batched pass over sensor lists: replaces every rendered list in `batch`
    pub fn apply_sensor_batch(&mut self, batch: &SensorBatch) -> crate::Result<BatchOutcome> {
        let plan = batched::reconcile_sensor_batch(&self.view, batch);
        self.commit(&plan.patches)?;
        Ok(BatchOutcome {
            summary: PatchSummary::of(&plan.patches),
            skipped: plan.missing,
        })
    }

    fn commit(&mut self, patches: &[Patch]) -> crate::Result<()> {
        for patch in patches {
            if let Err(e) = self.view.apply(patch) {
                tracing::warn!(
                    "Patch for group '{}' could not be applied: {}",
                    patch.group_id(),
                    e
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle() -> StateHandle {
    Arc::new(RwLock::new(SharedState::new()))
}
