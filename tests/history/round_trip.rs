//! Undo/redo round trips over random transaction sequences.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tessera_foundation::{Entity, Patch, Record, Schema, Value};
use tessera_history::UndoableDatabase;
use tessera_storage::{Store, StoreSchema};
use tessera_transaction::{Database, TransactionOptions, Undoable};

fn database() -> UndoableDatabase {
    let schema = StoreSchema::new()
        .component("n", Schema::i32())
        .component("label", Schema::string())
        .component("marked", Schema::tag())
        .resource("count", Schema::i32());
    UndoableDatabase::new(Database::builder(schema).build().unwrap())
}

fn rows(store: &Store) -> (BTreeMap<Entity, Record>, Option<Value>) {
    let rows = store
        .entities()
        .filter_map(|e| store.read(e).map(|r| (e, r)))
        .collect();
    (rows, store.resource("count").cloned())
}

fn step() -> TransactionOptions {
    TransactionOptions::undoable(Undoable::step())
}

#[derive(Clone, Debug)]
enum Step {
    Insert(i32),
    Update(usize, i32),
    Label(usize),
    Mark(usize),
    Delete(usize),
    Count(i32),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        any::<i32>().prop_map(Step::Insert),
        (any::<usize>(), any::<i32>()).prop_map(|(i, n)| Step::Update(i, n)),
        any::<usize>().prop_map(Step::Label),
        any::<usize>().prop_map(Step::Mark),
        any::<usize>().prop_map(Step::Delete),
        any::<i32>().prop_map(Step::Count),
    ]
}

fn undoable_strategy() -> impl Strategy<Value = Undoable> {
    prop_oneof![
        Just(Undoable::step()),
        prop::sample::select(vec!["drag", "other"]).prop_map(Undoable::coalescing),
    ]
}

fn run(db: &mut UndoableDatabase, step: &Step) {
    run_as(db, step, self::step());
}

fn run_as(db: &mut UndoableDatabase, step: &Step, options: TransactionOptions) {
    let live: Vec<Entity> = db.store().entities().collect();
    let pick = |i: usize| (!live.is_empty()).then(|| live[i % live.len()]);
    db.execute(options, |t| match *step {
        Step::Insert(n) => {
            t.insert(&Record::new().with("n", n)).unwrap();
        }
        Step::Update(i, n) => {
            if let Some(e) = pick(i) {
                t.update(e, &Patch::new().set("n", n)).unwrap();
            }
        }
        Step::Label(i) => {
            if let Some(e) = pick(i) {
                let label = format!("item {}", i % 7);
                t.update(e, &Patch::new().set("label", label)).unwrap();
            }
        }
        Step::Mark(i) => {
            if let Some(e) = pick(i) {
                let patch = if t.get(e, "marked").is_some() {
                    Patch::new().remove("marked")
                } else {
                    Patch::new().set("marked", true)
                };
                t.update(e, &patch).unwrap();
            }
        }
        Step::Delete(i) => {
            if let Some(e) = pick(i) {
                t.delete(e);
            }
        }
        Step::Count(n) => {
            t.set_resource("count", Value::from(n)).unwrap();
        }
    });
}

#[test]
fn single_step_undo_and_redo() {
    let mut db = database();
    let initial = rows(db.store());
    let e = db.execute(step(), |t| t.insert(&Record::new().with("n", 1)).unwrap());
    let after = rows(db.store());

    assert!(db.undo());
    assert_eq!(rows(db.store()), initial);
    assert!(!db.store().contains(e));
    assert!(!db.undo());

    assert!(db.redo());
    assert_eq!(rows(db.store()), after);
    assert!(!db.redo());
}

#[test]
fn new_step_after_undo_discards_redo() {
    let mut db = database();
    run(&mut db, &Step::Insert(1));
    run(&mut db, &Step::Insert(2));
    assert!(db.undo());
    run(&mut db, &Step::Count(5));

    assert_eq!(db.history().len(), 2);
    assert!(!db.history().can_redo());
    assert!(!db.redo());
}

#[test]
fn steps_without_changes_are_not_recorded() {
    let mut db = database();
    db.execute(step(), |t| {
        t.delete(Entity::new(3));
    });
    assert!(db.history().is_empty());
}

#[test]
fn non_undoable_transactions_are_not_recorded() {
    let mut db = database();
    db.execute(TransactionOptions::default(), |t| {
        t.insert(&Record::new()).unwrap();
    });
    db.execute(TransactionOptions::transient().with_undoable(Some(Undoable::step())), |t| {
        t.insert(&Record::new()).unwrap();
    });
    assert!(db.history().is_empty());
    assert_eq!(db.store().entity_count(), 2);
}

#[test]
fn coalesced_edits_restore_latest_value() {
    let mut db = database();
    let e = db.execute(step(), |t| t.insert(&Record::new().with("n", 0)).unwrap());
    let drag = || TransactionOptions::undoable(Undoable::coalescing("drag"));
    db.execute(drag(), |t| {
        t.update(e, &Patch::new().set("marked", true)).unwrap();
    });
    db.execute(drag(), |t| {
        t.update(e, &Patch::new().set("n", 1)).unwrap();
    });
    db.execute(drag(), |t| {
        t.update(e, &Patch::new().set("n", 0)).unwrap();
    });
    assert_eq!(db.history().len(), 2);
    let last = rows(db.store());

    assert!(db.undo());
    assert_eq!(db.store().get(e, "n"), Some(Value::from(0)));
    assert_eq!(db.store().get(e, "marked"), None);
    assert!(db.undo());
    assert!(!db.store().contains(e));

    assert!(db.redo());
    assert!(db.redo());
    assert_eq!(db.store().get(e, "n"), Some(Value::from(0)));
    assert_eq!(rows(db.store()), last);
}

proptest! {
    #[test]
    fn undo_all_then_redo_all(steps in prop::collection::vec(step_strategy(), 1..25)) {
        let mut db = database();
        let initial = rows(db.store());
        for step in &steps {
            run(&mut db, step);
        }
        let last = rows(db.store());
        let recorded = db.history().len();

        for _ in 0..recorded {
            prop_assert!(db.undo());
        }
        prop_assert!(!db.undo());
        prop_assert_eq!(rows(db.store()), initial);

        for _ in 0..recorded {
            prop_assert!(db.redo());
        }
        prop_assert!(!db.redo());
        prop_assert_eq!(rows(db.store()), last);
    }

    #[test]
    fn partial_undo_matches_intermediate_state(
        steps in prop::collection::vec(step_strategy(), 2..15),
        back in 1usize..15,
    ) {
        let mut db = database();
        let mut states = vec![rows(db.store())];
        for step in &steps {
            let before = db.history().len();
            run(&mut db, step);
            if db.history().len() > before {
                states.push(rows(db.store()));
            }
        }
        let back = back.min(states.len() - 1);
        for _ in 0..back {
            db.undo();
        }
        prop_assert_eq!(&rows(db.store()), &states[states.len() - 1 - back]);
    }

    #[test]
    fn mixed_coalescing_round_trips(
        steps in prop::collection::vec((step_strategy(), undoable_strategy()), 1..30),
    ) {
        let mut db = database();
        let initial = rows(db.store());
        for (step, undoable) in &steps {
            run_as(&mut db, step, TransactionOptions::undoable(undoable.clone()));
        }
        let last = rows(db.store());
        let recorded = db.history().len();
        prop_assert!(recorded <= steps.len());

        while db.undo() {}
        prop_assert_eq!(rows(db.store()), initial);

        for _ in 0..recorded {
            prop_assert!(db.redo());
        }
        prop_assert!(!db.redo());
        prop_assert_eq!(rows(db.store()), last);
    }
}
