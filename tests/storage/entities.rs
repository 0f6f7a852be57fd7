//! Integration tests for entity lifecycle
//!
//! Tests insert, delete, update, migration, and stale references.

use tessera_foundation::{Entity, ErrorKind, ID, Patch, Record, Schema, Value};
use tessera_storage::{Store, StoreSchema};

fn schema() -> StoreSchema {
    StoreSchema::new()
        .component("name", Schema::string())
        .component("complete", Schema::boolean())
        .component(
            "position",
            Schema::object([("x", Schema::f32()), ("y", Schema::f32())]),
        )
        .component("selected", Schema::tag())
}

fn named(name: &str) -> Record {
    Record::new().with("name", name)
}

// =============================================================================
// Insert and Delete
// =============================================================================

#[test]
fn ids_are_dense_from_zero() {
    let mut store = Store::new(schema()).unwrap();
    let a = store.insert(&named("a")).unwrap();
    let b = store.insert(&named("b")).unwrap();
    let c = store.insert(&named("c")).unwrap();
    assert_eq!((a.id(), b.id(), c.id()), (0, 1, 2));
    assert_eq!(store.entity_count(), 3);
}

#[test]
fn delete_swaps_last_row_into_gap() {
    let mut store = Store::new(schema()).unwrap();
    let a = store.insert(&named("A")).unwrap();
    let b = store.insert(&named("B")).unwrap();
    let c = store.insert(&named("C")).unwrap();

    assert!(store.delete(a));

    let archetype = store.archetype_of(b).unwrap();
    assert_eq!(archetype.row_count(), 2);
    assert_eq!(store.locate(c).unwrap().row, 0);
    assert_eq!(store.locate(b).unwrap().row, 1);
    assert_eq!(archetype.entity_at(0), Some(c));
    assert_eq!(store.get(c, "name"), Some(Value::from("C")));
}

#[test]
fn stale_references_are_no_ops() {
    let mut store = Store::new(schema()).unwrap();
    let a = store.insert(&named("a")).unwrap();
    assert!(store.delete(a));

    assert!(!store.delete(a));
    assert!(!store.contains(a));
    assert_eq!(store.read(a), None);
    assert_eq!(store.get(a, "name"), None);
    assert!(!store.update(a, &Patch::new().set("name", "b")).unwrap());
    assert!(!store.delete(Entity::new(99)));
    assert!(!store.delete(Entity::new(-1)));
}

#[test]
fn insert_as_distant_id_falls_back_to_fresh_id() {
    let mut store = Store::new(schema()).unwrap();
    let a = store.insert(&named("a")).unwrap();
    let far = store.insert_as(Entity::new(i32::MAX - 1), &named("far")).unwrap();
    assert_eq!(far, Entity::new(1));
    assert_eq!(store.get(far, "name"), Some(Value::from("far")));
    assert!(!store.contains(Entity::new(i32::MAX - 1)));

    let near = store.insert_as(Entity::new(5), &named("near")).unwrap();
    assert_eq!(near, Entity::new(5));
    assert_eq!(store.entity_count(), 3);
    assert_ne!(a, far);
}

#[test]
fn read_includes_id() {
    let mut store = Store::new(schema()).unwrap();
    let e = store.insert(&named("milk").with("complete", false)).unwrap();
    let record = store.read(e).unwrap();
    assert_eq!(record.get(ID), Some(&Value::from(e)));
    assert_eq!(record.get("complete"), Some(&Value::Bool(false)));
    assert_eq!(record.len(), 3);
}

#[test]
fn struct_components_round_trip() {
    let mut store = Store::new(schema()).unwrap();
    let pos = Value::object([("x", Value::from(1.5)), ("y", Value::from(-2.0))]);
    let e = store.insert(&Record::new().with("position", pos.clone())).unwrap();
    assert_eq!(store.get(e, "position"), Some(pos));
}

#[test]
fn rejected_insert_leaves_store_unchanged() {
    let mut store = Store::new(schema()).unwrap();
    store.insert(&named("a")).unwrap();

    let err = store
        .insert(&named("b").with("complete", "yes"))
        .unwrap_err();
    assert!(err.is_validation());

    let err = store.insert(&Record::new().with("speed", 3)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownComponent(_)));

    assert_eq!(store.entity_count(), 1);
}

// =============================================================================
// Update and Migration
// =============================================================================

#[test]
fn adding_a_component_migrates_and_keeps_values() {
    let mut store = Store::new(schema()).unwrap();
    let e = store.insert(&named("a").with("complete", true)).unwrap();
    let before = store.locate(e).unwrap().archetype;

    assert!(store.update(e, &Patch::new().set("selected", true)).unwrap());

    let after = store.archetype_of(e).unwrap();
    assert_ne!(after.id(), before);
    assert!(after.components().contains("selected"));
    assert_eq!(store.get(e, "name"), Some(Value::from("a")));
    assert_eq!(store.get(e, "complete"), Some(Value::Bool(true)));
    assert_eq!(store.archetype(before).unwrap().row_count(), 0);
}

#[test]
fn removing_a_component_migrates_back() {
    let mut store = Store::new(schema()).unwrap();
    let plain = store.insert(&named("a")).unwrap();
    let e = store.insert(&named("b").with("selected", true)).unwrap();

    store.update(e, &Patch::new().remove("selected")).unwrap();

    assert_eq!(
        store.locate(e).unwrap().archetype,
        store.locate(plain).unwrap().archetype
    );
    assert_eq!(store.get(e, "selected"), None);
}

#[test]
fn update_ignores_id() {
    let mut store = Store::new(schema()).unwrap();
    let e = store.insert(&named("a")).unwrap();
    store
        .update(e, &Patch::new().set(ID, 40).set("name", "b"))
        .unwrap();
    assert_eq!(store.get(e, ID), Some(Value::from(e)));
    assert_eq!(store.get(e, "name"), Some(Value::from("b")));
}
