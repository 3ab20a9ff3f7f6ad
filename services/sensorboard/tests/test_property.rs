#[cfg(not(miri))] // Skip property tests under miri as they're too slow
use proptest::prelude::*;
#[cfg(not(miri))]
use sensorboard::model::{EntityId, Group, Sensor, SensorBatch};
#[cfg(not(miri))]
use sensorboard::reconcile::{batched, keyed};
#[cfg(not(miri))]
use sensorboard::view::ViewTree;
#[cfg(not(miri))]
use std::collections::BTreeSet;

#[cfg(not(miri))]
fn groups_strategy() -> impl Strategy<Value = Vec<Group>> {
    prop::collection::vec((0u64..12, "[A-D]{1,2}"), 0..10)
        .prop_map(|pairs| pairs.into_iter().map(|(id, name)| Group::new(id, name)).collect())
}

#[cfg(not(miri))]
fn sensors_strategy() -> impl Strategy<Value = Vec<Sensor>> {
    prop::collection::vec((0u64..12, 0i64..4), 0..10)
        .prop_map(|pairs| pairs.into_iter().map(|(id, data)| Sensor::new(id, data)).collect())
}

#[cfg(not(miri))]
fn expected_group_keys(groups: &[Group]) -> BTreeSet<String> {
    groups.iter().map(|g| format!("group-{}", g.group_id)).collect()
}

#[cfg(not(miri))]
fn rendered_group_keys(view: &ViewTree) -> BTreeSet<String> {
    view.group_keys().into_iter().map(String::from).collect()
}

#[cfg(not(miri))]
fn keyed_pass(view: &mut ViewTree, groups: &[Group]) -> usize {
    let patches = keyed::reconcile_groups(view, groups);
    view.apply_all(&patches).unwrap();
    patches.len()
}

#[cfg(not(miri))]
fn view_with_group() -> ViewTree {
    let mut view = ViewTree::new();
    keyed_pass(&mut view, &[Group::new(0, "G")]);
    view
}

#[cfg(not(miri))]
proptest! {
    #[test]
    fn keyed_groups_match_latest_fetch(first in groups_strategy(), second in groups_strategy()) {
        let mut view = ViewTree::new();
        keyed_pass(&mut view, &first);
        prop_assert_eq!(rendered_group_keys(&view), expected_group_keys(&first));

        keyed_pass(&mut view, &second);
        prop_assert_eq!(rendered_group_keys(&view), expected_group_keys(&second));
        // No duplicates
        prop_assert_eq!(view.group_keys().len(), expected_group_keys(&second).len());
    }

    #[test]
    fn keyed_sensors_match_latest_fetch(first in sensors_strategy(), second in sensors_strategy()) {
        let group = EntityId::from(0);
        let mut view = view_with_group();

        for sensors in [&first, &second] {
            let patches = keyed::reconcile_sensors(&view, &group, sensors).unwrap();
            view.apply_all(&patches).unwrap();

            let expected: BTreeSet<String> =
                sensors.iter().map(|s| format!("sensor-{}", s.sensor_id)).collect();
            let rendered: Vec<&str> = view.sensor_keys(&group);
            prop_assert_eq!(rendered.len(), expected.len());
            let rendered: BTreeSet<String> = rendered.into_iter().map(String::from).collect();
            prop_assert_eq!(rendered, expected);
        }
    }

    #[test]
    fn keyed_reconcile_is_idempotent(groups in groups_strategy(), sensors in sensors_strategy()) {
        let mut view = ViewTree::new();
        keyed_pass(&mut view, &groups);
        prop_assert_eq!(keyed_pass(&mut view, &groups), 0);

        let mut view = view_with_group();
        let group = EntityId::from(0);
        let patches = keyed::reconcile_sensors(&view, &group, &sensors).unwrap();
        view.apply_all(&patches).unwrap();
        prop_assert!(keyed::reconcile_sensors(&view, &group, &sensors).unwrap().is_empty());
    }

    #[test]
    fn batched_groups_accumulate(first in groups_strategy(), second in groups_strategy()) {
        let mut view = ViewTree::new();
        for groups in [&first, &second] {
            let patches = batched::reconcile_groups(&view, groups);
            view.apply_all(&patches).unwrap();
        }

        let mut expected = expected_group_keys(&first);
        expected.extend(expected_group_keys(&second));
        prop_assert_eq!(rendered_group_keys(&view), expected);
    }

    #[test]
    fn batched_batch_replaces_list(first in sensors_strategy(), second in sensors_strategy()) {
        let group = EntityId::from(0);
        let mut view = view_with_group();

        for sensors in [&first, &second] {
            let mut batch = SensorBatch::new();
            batch.insert(group.clone(), sensors.clone());
            let plan = batched::reconcile_sensor_batch(&view, &batch);
            prop_assert!(plan.missing.is_empty());
            view.apply_all(&plan.patches).unwrap();
        }

        let mut expected: Vec<String> = Vec::new();
        for sensor in &second {
            let key = format!("sensor-{}", sensor.sensor_id);
            if !expected.contains(&key) {
                expected.push(key);
            }
        }
        let rendered: Vec<String> = view.sensor_keys(&group).into_iter().map(String::from).collect();
        prop_assert_eq!(rendered, expected);
    }
}
