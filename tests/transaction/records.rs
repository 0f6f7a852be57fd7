//! Integration tests for transaction records
//!
//! Tests the forward and inverse logs and change sets a transaction produces.

use tessera_foundation::{Entity, ID, Patch, Record, Schema, Value};
use tessera_storage::{Store, StoreSchema};
use tessera_transaction::{Operation, TransactionOptions, TransactionalStore, Undoable};

fn store() -> TransactionalStore {
    let schema = StoreSchema::new()
        .component("name", Schema::string())
        .component("x", Schema::f64())
        .component("selected", Schema::tag())
        .resource("zoom", Schema::f64().with_default(1.0));
    TransactionalStore::new(Store::new(schema).unwrap())
}

#[test]
fn insert_records_delete_as_inverse() {
    let mut db = store();
    let (e, record) = db.execute(TransactionOptions::default(), |t| {
        t.insert(&Record::new().with("name", "a")).unwrap()
    });
    assert_eq!(
        record.redo,
        vec![Operation::Insert {
            entity: e,
            values: Record::new().with("name", "a"),
        }]
    );
    assert_eq!(record.undo, vec![Operation::Delete { entity: e }]);
    assert!(record.changes.entities.contains(&e));
    assert!(record.changes.touches_any(&[ID, "name"]));
}

#[test]
fn delete_records_full_row_as_inverse() {
    let mut db = store();
    let (e, _) = db.execute(TransactionOptions::default(), |t| {
        t.insert(&Record::new().with("name", "a").with("x", 2.0)).unwrap()
    });
    let (_, record) = db.execute(TransactionOptions::default(), |t| t.delete(e));
    assert_eq!(
        record.undo,
        vec![Operation::Insert {
            entity: e,
            values: Record::new().with("name", "a").with("x", 2.0),
        }]
    );
    assert!(record.changes.touches_any(&["x"]));
}

#[test]
fn unchanged_values_are_not_recorded() {
    let mut db = store();
    let (e, _) = db.execute(TransactionOptions::default(), |t| {
        t.insert(&Record::new().with("x", 1.0)).unwrap()
    });
    let (updated, record) = db.execute(TransactionOptions::default(), |t| {
        t.update(e, &Patch::new().set("x", 1.0)).unwrap()
    });
    assert!(updated);
    assert!(record.is_empty());
    assert!(record.changes.is_empty());
}

#[test]
fn repeated_updates_keep_first_prior_value() {
    let mut db = store();
    let (e, _) = db.execute(TransactionOptions::default(), |t| {
        t.insert(&Record::new().with("x", 0.0)).unwrap()
    });
    let (_, record) = db.execute(TransactionOptions::default(), |t| {
        for x in [1.0, 2.0, 3.0] {
            t.update(e, &Patch::new().set("x", x)).unwrap();
        }
    });
    assert_eq!(
        record.redo,
        vec![Operation::Update {
            entity: e,
            values: Patch::new().set("x", 3.0),
        }]
    );
    assert_eq!(
        record.undo,
        vec![Operation::Update {
            entity: e,
            values: Patch::new().set("x", 0.0),
        }]
    );
}

#[test]
fn migrating_update_inverse_removes_added_component() {
    let mut db = store();
    let (e, _) = db.execute(TransactionOptions::default(), |t| {
        t.insert(&Record::new().with("name", "a")).unwrap()
    });
    let (_, record) = db.execute(TransactionOptions::default(), |t| {
        t.update(e, &Patch::new().set("selected", true)).unwrap()
    });
    assert_eq!(
        record.undo,
        vec![Operation::Update {
            entity: e,
            values: Patch::new().remove("selected"),
        }]
    );
    assert_eq!(record.changes.archetypes.len(), 2);
}

#[test]
fn resource_writes_are_recorded() {
    let mut db = store();
    let ((), record) = db.execute(TransactionOptions::default(), |t| {
        t.set_resource("zoom", Value::from(2.0)).unwrap();
        t.set_resource("zoom", Value::from(4.0)).unwrap();
    });
    assert_eq!(
        record.redo,
        vec![Operation::SetResource {
            name: "zoom".into(),
            value: Value::from(4.0),
        }]
    );
    assert_eq!(
        record.undo,
        vec![Operation::SetResource {
            name: "zoom".into(),
            value: Value::from(1.0),
        }]
    );
    assert!(record.changes.touches_any(&["zoom"]));
}

#[test]
fn undo_runs_in_reverse_recording_order() {
    let mut db = store();
    let ((a, b), record) = db.execute(TransactionOptions::default(), |t| {
        let a = t.insert(&Record::new().with("name", "a")).unwrap();
        let b = t.insert(&Record::new().with("name", "b")).unwrap();
        (a, b)
    });
    assert_eq!(
        record.undo,
        vec![Operation::Delete { entity: b }, Operation::Delete { entity: a }]
    );
}

#[test]
fn options_are_copied_to_the_record() {
    let mut db = store();
    let options = TransactionOptions::undoable(Undoable::coalescing("drag"));
    let ((), record) = db.execute(options, |t| {
        t.insert(&Record::new()).unwrap();
    });
    assert!(record.is_undoable());
    assert_eq!(record.undoable, Some(Undoable::coalescing("drag")));

    let ((), record) = db.execute(TransactionOptions::transient(), |t| {
        t.set_undoable(Some(Undoable::step()));
        t.insert(&Record::new()).unwrap();
    });
    assert!(record.transient);
    assert!(!record.is_undoable());
}

#[test]
fn stale_writes_record_nothing() {
    let mut db = store();
    let ((), record) = db.execute(TransactionOptions::default(), |t| {
        assert!(!t.delete(Entity::new(7)));
        assert!(!t.update(Entity::new(7), &Patch::new().set("x", 1.0)).unwrap());
    });
    assert!(record.is_empty());
}
