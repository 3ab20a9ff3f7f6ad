//! Patches: the mutations a reconciliation pass asks the view to perform

use std::fmt;

use crate::model::EntityId;

/// A single mutation of the view tree
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Append a group element with an empty sensor list
    CreateGroup { group_id: EntityId, name: String },

    /// Replace a group's heading text
    RenameGroup { group_id: EntityId, name: String },

    /// Remove a group element together with its sensor list
    RemoveGroup { group_id: EntityId },

    /// Append a sensor item to a group's list
    CreateSensor {
        group_id: EntityId,
        sensor_id: EntityId,
        text: String,
    },

    /// Replace a sensor item's text
    UpdateSensor {
        group_id: EntityId,
        sensor_id: EntityId,
        text: String,
    },

    /// Remove a sensor item from a group's list
    RemoveSensor {
        group_id: EntityId,
        sensor_id: EntityId,
    },

    /// Clear a group's list and append fresh items in order
    ReplaceSensors {
        group_id: EntityId,
        items: Vec<(EntityId, String)>,
    },
}

impl Patch {
    /// The group whose subtree this patch touches
    pub fn group_id(&self) -> &EntityId {
        match self {
            Patch::CreateGroup { group_id, .. }
            | Patch::RenameGroup { group_id, .. }
            | Patch::RemoveGroup { group_id }
            | Patch::CreateSensor { group_id, .. }
            | Patch::UpdateSensor { group_id, .. }
            | Patch::RemoveSensor { group_id, .. }
            | Patch::ReplaceSensors { group_id, .. } => group_id,
        }
    }
}

/// Counts of the patches applied by one pass, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub replaced: usize,
}

impl PatchSummary {
    pub fn of(patches: &[Patch]) -> Self {
        let mut summary = Self::default();
        for patch in patches {
            match patch {
                Patch::CreateGroup { .. } | Patch::CreateSensor { .. } => summary.created += 1,
                Patch::RenameGroup { .. } | Patch::UpdateSensor { .. } => summary.updated += 1,
                Patch::RemoveGroup { .. } | Patch::RemoveSensor { .. } => summary.removed += 1,
                Patch::ReplaceSensors { .. } => summary.replaced += 1,
            }
        }
        summary
    }
}

impl fmt::Display for PatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} removed, {} replaced",
            self.created, self.updated, self.removed, self.replaced
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_kind() {
        let g = EntityId::from(1);
        let patches = vec![
            Patch::CreateGroup {
                group_id: g.clone(),
                name: "A".to_string(),
            },
            Patch::CreateSensor {
                group_id: g.clone(),
                sensor_id: EntityId::from(10),
                text: "x".to_string(),
            },
            Patch::RenameGroup {
                group_id: g.clone(),
                name: "B".to_string(),
            },
            Patch::RemoveSensor {
                group_id: g.clone(),
                sensor_id: EntityId::from(11),
            },
            Patch::ReplaceSensors {
                group_id: g,
                items: vec![],
            },
        ];

        let summary = PatchSummary::of(&patches);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.replaced, 1);
        assert_eq!(
            summary.to_string(),
            "2 created, 1 updated, 1 removed, 1 replaced"
        );
    }

    #[test]
    fn empty_summary() {
        assert_eq!(
            PatchSummary::of(&[]).to_string(),
            "0 created, 0 updated, 0 removed, 0 replaced"
        );
    }

    #[test]
    fn group_id_of_sensor_patch() {
        let patch = Patch::UpdateSensor {
            group_id: EntityId::from("g"),
            sensor_id: EntityId::from(1),
            text: String::new(),
        };
        assert_eq!(patch.group_id().as_str(), "g");
    }
}
