//! Integration tests for rollback and replay
//!
//! Applying a record's undo log restores the prior state; applying its redo
//! log afterwards restores the later state.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tessera_foundation::{Entity, Error, Patch, Record, Schema, Value};
use tessera_storage::{Store, StoreSchema};
use tessera_transaction::{ApplyOperations, TransactionOptions, TransactionalStore, apply_all};

fn schema() -> StoreSchema {
    StoreSchema::new()
        .component("n", Schema::i32())
        .component("label", Schema::string())
        .component("marked", Schema::tag())
        .resource("total", Schema::i32())
}

#[derive(Debug, PartialEq)]
struct State {
    rows: BTreeMap<Entity, Record>,
    resources: Vec<(String, Value)>,
}

fn state(store: &Store) -> State {
    State {
        rows: store
            .entities()
            .filter_map(|e| store.read(e).map(|r| (e, r)))
            .collect(),
        resources: store
            .resources()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    }
}

fn seeded() -> TransactionalStore {
    let mut store = Store::new(schema()).unwrap();
    for n in 0..4 {
        store.insert(&Record::new().with("n", n)).unwrap();
    }
    TransactionalStore::new(store)
}

// =============================================================================
// Rollback
// =============================================================================

#[test]
fn failed_transaction_leaves_store_untouched() {
    let mut db = seeded();
    let before = state(db.store());

    let result = db.execute_fallible::<_, Error, _>(TransactionOptions::default(), |t| {
        let e = t.insert(&Record::new().with("n", 10))?;
        t.update(Entity::new(0), &Patch::new().set("marked", true))?;
        t.delete(Entity::new(1));
        t.set_resource("total", Value::from(9))?;
        t.update(e, &Patch::new().set("n", "not a number"))?;
        Ok(())
    });

    assert!(result.unwrap_err().is_validation());
    assert_eq!(state(db.store()), before);
}

#[test]
fn successful_fallible_transaction_returns_record() {
    let mut db = seeded();
    let (value, record) = db
        .execute_fallible::<_, Error, _>(TransactionOptions::default(), |t| {
            t.delete(Entity::new(2));
            Ok(5)
        })
        .unwrap();
    assert_eq!(value, 5);
    assert_eq!(record.redo.len(), 1);
    assert!(!db.store().contains(Entity::new(2)));
}

// =============================================================================
// Replay
// =============================================================================

#[test]
fn replaying_on_another_store_reproduces_writes() {
    let mut source = seeded();
    let mut target = seeded().into_inner();
    let ((), record) = source.execute(TransactionOptions::default(), |t| {
        t.insert(&Record::new().with("n", 7).with("label", "x")).unwrap();
        t.update(Entity::new(3), &Patch::new().set("n", 30)).unwrap();
        t.delete(Entity::new(0));
    });
    assert_eq!(apply_all(&mut target, &record.redo), 3);
    assert_eq!(state(&target), state(source.store()));
}

#[test]
fn replaying_undo_twice_skips_stale_operations() {
    let mut db = seeded();
    let ((), record) = db.execute(TransactionOptions::default(), |t| {
        t.insert(&Record::new().with("n", 7)).unwrap();
    });
    let first = db.apply_operations(&record.undo);
    assert_eq!(first.redo.len(), 1);
    let second = db.apply_operations(&record.undo);
    assert!(second.is_empty());
}

#[derive(Clone, Debug)]
enum Op {
    Insert(i32),
    Update(usize, i32),
    Mark(usize),
    Delete(usize),
    Total(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::Insert),
        (any::<usize>(), any::<i32>()).prop_map(|(i, n)| Op::Update(i, n)),
        any::<usize>().prop_map(Op::Mark),
        any::<usize>().prop_map(Op::Delete),
        any::<i32>().prop_map(Op::Total),
    ]
}

proptest! {
    #[test]
    fn undo_then_redo_round_trips(ops in prop::collection::vec(op(), 1..30)) {
        let mut db = seeded();
        let before = state(db.store());

        let ((), record) = db.execute(TransactionOptions::default(), |t| {
            for op in &ops {
                let live: Vec<Entity> = t.store().entities().collect();
                let pick = |i: usize| (!live.is_empty()).then(|| live[i % live.len()]);
                match *op {
                    Op::Insert(n) => {
                        t.insert(&Record::new().with("n", n)).unwrap();
                    }
                    Op::Update(i, n) => {
                        if let Some(e) = pick(i) {
                            t.update(e, &Patch::new().set("n", n)).unwrap();
                        }
                    }
                    Op::Mark(i) => {
                        if let Some(e) = pick(i) {
                            let patch = if t.get(e, "marked").is_some() {
                                Patch::new().remove("marked")
                            } else {
                                Patch::new().set("marked", true)
                            };
                            t.update(e, &patch).unwrap();
                        }
                    }
                    Op::Delete(i) => {
                        if let Some(e) = pick(i) {
                            t.delete(e);
                        }
                    }
                    Op::Total(n) => {
                        t.set_resource("total", Value::from(n)).unwrap();
                    }
                }
            }
        });
        let after = state(db.store());

        db.apply_operations(&record.undo);
        prop_assert_eq!(state(db.store()), before);

        db.apply_operations(&record.redo);
        prop_assert_eq!(state(db.store()), after);
    }
}
