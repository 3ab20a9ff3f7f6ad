//! Keyed reconciliation: in-place updates with exact 1:1 correspondence
//!
//! After applying the patches of a pass, the set of rendered keys equals the
//! set of keys in the fetched records. Elements that persist across passes
//! keep their identity; new ones are appended in fetch order.

use crate::model::{group_key, sensor_key, sensor_list_key, EntityId, Group, Sensor};
use crate::view::ViewTree;
use crate::{Result, SensorboardError};

use super::{diff_keyed, Change, Patch, Rendered};

/// Patches converging the rendered groups to `groups`
pub fn reconcile_groups(view: &ViewTree, groups: &[Group]) -> Vec<Patch> {
    let rendered = view.groups().iter().map(|g| Rendered {
        id: &g.group_id,
        content: &g.heading,
    });
    let records = groups
        .iter()
        .map(|g| (g.group_id.clone(), g.name.clone()));

    diff_keyed(rendered, records, group_key)
        .into_iter()
        .map(|change| match change {
            Change::Create { id, content } => Patch::CreateGroup {
                group_id: id,
                name: content,
            },
            Change::Update { id, content } => Patch::RenameGroup {
                group_id: id,
                name: content,
            },
            Change::Remove { id } => Patch::RemoveGroup { group_id: id },
        })
        .collect()
}

/// Patches converging the sensor list of `group_id` to `sensors`.
///
/// Fails with [`SensorboardError::MissingTarget`] when the group's list is
/// not rendered.
pub fn reconcile_sensors(
    view: &ViewTree,
    group_id: &EntityId,
    sensors: &[Sensor],
) -> Result<Vec<Patch>> {
    let list = view
        .sensor_list(group_id)
        .ok_or_else(|| SensorboardError::MissingTarget(sensor_list_key(group_id)))?;

    let rendered = list.items.iter().map(|i| Rendered {
        id: &i.sensor_id,
        content: &i.text,
    });
    let records = sensors
        .iter()
        .map(|s| (s.sensor_id.clone(), s.display_text()));

    let patches = diff_keyed(rendered, records, sensor_key)
        .into_iter()
        .map(|change| match change {
            Change::Create { id, content } => Patch::CreateSensor {
                group_id: group_id.clone(),
                sensor_id: id,
                text: content,
            },
            Change::Update { id, content } => Patch::UpdateSensor {
                group_id: group_id.clone(),
                sensor_id: id,
                text: content,
            },
            Change::Remove { id } => Patch::RemoveSensor {
                group_id: group_id.clone(),
                sensor_id: id,
            },
        })
        .collect();

    Ok(patches)
}
