//! Reconciliation: pure functions from (current view, fetched records) to patches
//!
//! Nothing in here mutates the view. Callers apply the returned patches with
//! [`ViewTree::apply_all`](crate::view::ViewTree::apply_all), which keeps the
//! diffing testable without any rendering target.
//!
//! Two strategies live side by side:
//!
//! - [`keyed`] joins records to existing elements by key, updates changed
//!   content in place and removes leftovers.
//! - [`batched`] only ever adds groups and replaces whole sensor lists.

pub mod batched;
pub mod keyed;
mod patch;

pub use patch::{Patch, PatchSummary};

use std::collections::HashMap;

use crate::model::EntityId;

/// An element as seen by the keyed diff: its id and current content
#[derive(Debug, Clone)]
pub(crate) struct Rendered<'a> {
    pub id: &'a EntityId,
    pub content: &'a str,
}

/// Outcome of diffing one record set against one parent's children
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Change {
    Create { id: EntityId, content: String },
    Update { id: EntityId, content: String },
    Remove { id: EntityId },
}

/// Keyed diff of `records` against `rendered`, both given as (id, content).
///
/// `key_of` derives the join key. Creations follow record order, removals
/// follow the rendered order, and a key repeated within `records` maps to a
/// single element whose content is the last occurrence's.
pub(crate) fn diff_keyed<'a>(
    rendered: impl IntoIterator<Item = Rendered<'a>>,
    records: impl IntoIterator<Item = (EntityId, String)>,
    key_of: impl Fn(&EntityId) -> String,
) -> Vec<Change> {
    // Collapse repeated keys first so a pass never fights itself
    let mut incoming: Vec<(String, EntityId, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (id, content) in records {
        let key = key_of(&id);
        match positions.get(&key) {
            Some(&index) => incoming[index].2 = content,
            None => {
                positions.insert(key.clone(), incoming.len());
                incoming.push((key, id, content));
            }
        }
    }

    let rendered: Vec<Rendered<'a>> = rendered.into_iter().collect();
    // Snapshot of existing children, by key
    let mut unprocessed: HashMap<String, &Rendered<'a>> =
        rendered.iter().map(|r| (key_of(r.id), r)).collect();
    let mut changes = Vec::new();

    for (key, id, content) in incoming {
        match unprocessed.remove(&key) {
            Some(existing) if existing.content == content => {}
            Some(_) => changes.push(Change::Update { id, content }),
            None => changes.push(Change::Create { id, content }),
        }
    }

    for element in &rendered {
        if unprocessed.contains_key(&key_of(element.id)) {
            changes.push(Change::Remove {
                id: element.id.clone(),
            });
        }
    }

    changes
}
