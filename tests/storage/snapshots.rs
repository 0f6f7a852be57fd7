//! Integration tests for store snapshots
//!
//! Tests restoring from plain data and from MessagePack bytes.

use tessera_foundation::{ErrorKind, Patch, Record, Schema, Value};
use tessera_storage::{SelectOptions, Store, StoreSchema, from_bytes, to_bytes};

fn schema() -> StoreSchema {
    StoreSchema::new()
        .component("name", Schema::string())
        .component("order", Schema::f64())
        .component("done", Schema::tag())
        .resource("filter", Schema::string().with_default("all"))
}

fn populated() -> Store {
    let mut store = Store::new(schema()).unwrap();
    let a = store
        .insert(&Record::new().with("name", "a").with("order", 2.0))
        .unwrap();
    store
        .insert(&Record::new().with("name", "b").with("order", 1.0))
        .unwrap();
    store
        .insert(&Record::new().with("name", "c").with("order", 0.5))
        .unwrap();
    store.update(a, &Patch::new().set("done", true)).unwrap();
    store.set_resource("filter", Value::from("done")).unwrap();
    store
}

fn ordered_names(store: &Store) -> Vec<Value> {
    store
        .select(&["name"], &SelectOptions::new().order_by("order", true))
        .into_iter()
        .filter_map(|r| r.get("name").cloned())
        .collect()
}

#[test]
fn restored_store_reads_the_same() {
    let store = populated();
    let restored = Store::from_data(schema(), store.to_data()).unwrap();

    assert_eq!(ordered_names(&restored), ordered_names(&store));
    assert_eq!(restored.resource("filter"), Some(&Value::from("done")));
    for entity in store.entities() {
        assert_eq!(restored.read(entity), store.read(entity));
    }
}

#[test]
fn restored_store_reuses_freed_ids() {
    let mut store = populated();
    let victim = store.entities().next().unwrap();
    store.delete(victim);

    let mut restored = Store::from_data(schema(), store.to_data()).unwrap();
    let mut original = store;
    let a = original.insert(&Record::new().with("name", "z")).unwrap();
    let b = restored.insert(&Record::new().with("name", "z")).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, victim);
}

#[test]
fn snapshot_with_undeclared_resource_is_rejected() {
    let mut data = populated().to_data();
    data.resources.insert("weather".into(), Value::from("rain"));
    let err = Store::from_data(schema(), data).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownResource(_)));
}

#[test]
fn bytes_round_trip() {
    let store = populated();
    let bytes = to_bytes(&store).unwrap();
    let restored = from_bytes(schema(), &bytes).unwrap();
    assert_eq!(restored.to_data(), store.to_data());
}

#[test]
fn garbage_bytes_fail() {
    let err = from_bytes(schema(), &[0xc1, 0x00, 0x13]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SerializationError(_)));
}
