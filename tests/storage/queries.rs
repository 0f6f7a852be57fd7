//! Integration tests for select
//!
//! Tests ordering, filtering, exclusion, and projection across archetypes.

use tessera_foundation::{Entity, ID, Patch, Record, Schema, Value};
use tessera_storage::{Comparison, SelectOptions, Store, StoreSchema};

fn schema() -> StoreSchema {
    StoreSchema::new()
        .component("count", Schema::f64())
        .component("order", Schema::f64())
        .component("label", Schema::string())
        .component("hidden", Schema::tag())
}

fn counts(store: &Store) -> Vec<Value> {
    store
        .select(&["count"], &SelectOptions::new().order_by("count", true))
        .into_iter()
        .filter_map(|r| r.get("count").cloned())
        .collect()
}

#[test]
fn ordered_select_sorts_across_rows() {
    let mut store = Store::new(schema()).unwrap();
    let e0 = store.insert(&Record::new().with("order", 1.0)).unwrap();
    let e1 = store.insert(&Record::new().with("order", 2.0)).unwrap();
    let e2 = store
        .insert(&Record::new().with("order", 0.0).with("label", "x"))
        .unwrap();

    let ids = store.select_entities(&["order"], &SelectOptions::new().order_by("order", true));
    assert_eq!(ids, vec![e2, e0, e1]);

    let ids = store.select_entities(&["order"], &SelectOptions::new().order_by("order", false));
    assert_eq!(ids, vec![e1, e0, e2]);
}

#[test]
fn delete_keeps_remaining_rows_ordered() {
    let mut store = Store::new(schema()).unwrap();
    let mut entities = Vec::new();
    for n in [5.0, 1.0, 3.0] {
        entities.push(store.insert(&Record::new().with("count", n)).unwrap());
    }
    assert_eq!(counts(&store), vec![Value::from(1.0), Value::from(3.0), Value::from(5.0)]);

    assert!(store.delete(entities[1]));
    assert_eq!(counts(&store), vec![Value::from(3.0), Value::from(5.0)]);
    assert_eq!(store.archetype_of(entities[0]).unwrap().row_count(), 2);
}

#[test]
fn unordered_select_follows_archetype_then_row() {
    let mut store = Store::new(schema()).unwrap();
    let a = store.insert(&Record::new().with("count", 1.0)).unwrap();
    let b = store
        .insert(&Record::new().with("count", 2.0).with("label", "b"))
        .unwrap();
    let c = store.insert(&Record::new().with("count", 3.0)).unwrap();

    let ids = store.select_entities(&["count"], &SelectOptions::new());
    assert_eq!(ids, vec![a, c, b]);
}

#[test]
fn conditions_and_exclusions() {
    let mut store = Store::new(schema()).unwrap();
    let low = store.insert(&Record::new().with("count", 1.0)).unwrap();
    let high = store.insert(&Record::new().with("count", 10.0)).unwrap();
    store
        .insert(&Record::new().with("count", 20.0).with("hidden", true))
        .unwrap();

    let visible = SelectOptions::new().exclude("hidden");
    assert_eq!(store.select_entities(&["count"], &visible), vec![low, high]);

    let big = visible.clone().filter("count", Comparison::Ge, 5);
    assert_eq!(store.select_entities(&["count"], &big), vec![high]);

    let none = SelectOptions::new().where_eq("count", 7.0);
    assert!(store.select_entities(&["count"], &none).is_empty());
}

#[test]
fn projection_keeps_only_requested_columns() {
    let mut store = Store::new(schema()).unwrap();
    let e = store
        .insert(&Record::new().with("count", 1.0).with("label", "one"))
        .unwrap();
    let rows = store.select(&["label"], &SelectOptions::new().project(["label"]));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entity(), Some(e));
    assert_eq!(rows[0].get("label"), Some(&Value::from("one")));
    assert!(!rows[0].contains("count"));
}

#[test]
fn empty_include_matches_everything() {
    let mut store = Store::new(schema()).unwrap();
    store.insert(&Record::new().with("count", 1.0)).unwrap();
    store.insert(&Record::new().with("label", "x")).unwrap();
    let all: Vec<Entity> = store.select_entities::<&str>(&[], &SelectOptions::new());
    assert_eq!(all.len(), 2);
    assert!(store.select(&[ID], &SelectOptions::new()).len() == 2);
}

#[test]
fn query_archetypes_filters_by_components() {
    let mut store = Store::new(schema()).unwrap();
    store.ensure_archetype(&["count"]).unwrap();
    store.ensure_archetype(&["count", "hidden"]).unwrap();
    store.ensure_archetype(&["label"]).unwrap();

    assert_eq!(store.query_archetypes(&["count"], &[]).len(), 2);
    assert_eq!(store.query_archetypes(&["count"], &["hidden"]).len(), 1);
    assert_eq!(store.query_archetypes(&["label", "count"], &[]).len(), 0);
}

#[test]
fn nan_counts_are_rejected_and_order_holds() {
    let mut store = Store::new(schema()).unwrap();
    let inputs = [7.0, f64::NAN, -2.5, 3.0, f64::NAN, 0.0, 11.0, 3.0, -40.0, 1.25];
    let mut accepted = Vec::new();
    for n in inputs {
        match store.insert(&Record::new().with("count", n)) {
            Ok(entity) => accepted.push(entity),
            Err(error) => {
                assert!(n.is_nan());
                assert!(error.is_validation());
            }
        }
    }
    assert_eq!(accepted.len(), 8);

    let err = store
        .update(accepted[0], &Patch::new().set("count", f64::NAN))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(store.get(accepted[0], "count"), Some(Value::from(7.0)));
    assert!(store.insert(&Record::new().with("count", f64::INFINITY)).is_err());

    let sorted = counts(&store);
    assert_eq!(sorted.len(), 8);
    for pair in sorted.windows(2) {
        assert_ne!(pair[0].sort_cmp(&pair[1]), std::cmp::Ordering::Greater);
    }
    assert_eq!(sorted.first(), Some(&Value::from(-40.0)));
    assert_eq!(sorted.last(), Some(&Value::from(11.0)));
}
