//! Batched reconciliation: append-only groups, fully replaced sensor lists
//!
//! Groups are created the first time they are seen and then left alone:
//! renames are not applied and groups missing from later fetches stay
//! rendered. Sensor lists are rebuilt from scratch on every batch.

use std::collections::{HashMap, HashSet};

use crate::model::{EntityId, Group, SensorBatch};
use crate::view::ViewTree;

use super::Patch;

/// Result of planning a sensor batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPlan {
    pub patches: Vec<Patch>,
    /// Group ids in the batch whose sensor list is not rendered
    pub missing: Vec<EntityId>,
}

/// Patches creating the groups of `groups` that are not rendered yet
pub fn reconcile_groups(view: &ViewTree, groups: &[Group]) -> Vec<Patch> {
    let mut seen: HashSet<&EntityId> = HashSet::new();

    groups
        .iter()
        .filter(|g| view.group(&g.group_id).is_none() && seen.insert(&g.group_id))
        .map(|g| Patch::CreateGroup {
            group_id: g.group_id.clone(),
            name: g.name.clone(),
        })
        .collect()
}

/// One replace patch per group id of `batch` whose list is rendered.
///
/// Items keep the array order. A sensor id repeated within one array yields a
/// single item at its first position carrying the last reading.
pub fn reconcile_sensor_batch(view: &ViewTree, batch: &SensorBatch) -> BatchPlan {
    let mut plan = BatchPlan::default();

    for (group_id, sensors) in batch {
        if view.sensor_list(group_id).is_none() {
            plan.missing.push(group_id.clone());
            continue;
        }

        let mut items: Vec<(EntityId, String)> = Vec::with_capacity(sensors.len());
        let mut positions: HashMap<&EntityId, usize> = HashMap::new();
        for sensor in sensors {
            match positions.get(&sensor.sensor_id) {
                Some(&index) => items[index].1 = sensor.display_text(),
                None => {
                    positions.insert(&sensor.sensor_id, items.len());
                    items.push((sensor.sensor_id.clone(), sensor.display_text()));
                }
            }
        }

        plan.patches.push(Patch::ReplaceSensors {
            group_id: group_id.clone(),
            items,
        });
    }

    plan
}
