//! Integration tests for Record and Patch

use tessera_foundation::{Entity, ID, Patch, Record, Value};

#[test]
fn record_exposes_entity_id() {
    let record = Record::new().with(ID, Entity::new(3)).with("name", "a");
    assert_eq!(record.entity(), Some(Entity::new(3)));
    assert_eq!(record.without_id(), Record::new().with("name", "a"));
}

#[test]
fn patch_removal_and_null_differ() {
    let mut record = Record::new().with("due", 4.0).with("note", "x");
    record.apply(&Patch::new().set("due", Value::Null).remove("note"));
    assert_eq!(record.get("due"), Some(&Value::Null));
    assert!(!record.contains("note"));
}

#[test]
fn patch_from_record_sets_every_field() {
    let patch = Patch::from(Record::new().with("a", 1).with("b", 2));
    assert_eq!(patch.len(), 2);
    assert!(!patch.removes_any());
    assert_eq!(patch.get("a"), Some(Some(&Value::Int(1))));
}

#[test]
fn merged_patches_keep_later_values() {
    let earlier = Patch::new().set("x", 1).remove("y");
    let later = Patch::new().set("y", 5);
    let merged = earlier.merged(&later);
    assert_eq!(merged.get("x"), Some(Some(&Value::Int(1))));
    assert_eq!(merged.get("y"), Some(Some(&Value::Int(5))));
}
