//! Integration tests for history capacity, disabling, and enabled flags.

use std::cell::RefCell;
use std::rc::Rc;

use tessera_foundation::{Record, Schema, Value};
use tessera_history::{DEFAULT_CAPACITY, HistoryConfig, UndoRedoService, UndoableDatabase};
use tessera_storage::StoreSchema;
use tessera_transaction::{Database, TransactionOptions, Undoable};

fn database(config: HistoryConfig) -> UndoableDatabase {
    let schema = StoreSchema::new().component("n", Schema::i32());
    UndoableDatabase::with_config(Database::builder(schema).build().unwrap(), config)
}

fn insert(db: &mut UndoableDatabase, n: i32) {
    db.execute(TransactionOptions::undoable(Undoable::step()), |t| {
        t.insert(&Record::new().with("n", n)).unwrap();
    });
}

#[test]
fn default_capacity() {
    let history = UndoRedoService::new();
    assert_eq!(history.config().capacity, DEFAULT_CAPACITY);
    assert!(history.is_empty());
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert!(!*history.undo_enabled().get());
}

#[test]
fn oldest_steps_are_evicted() {
    let mut db = database(HistoryConfig::new().with_capacity(3));
    for n in 0..5 {
        insert(&mut db, n);
    }
    assert_eq!(db.history().len(), 3);
    assert_eq!(db.history().index(), 3);

    while db.undo() {}
    let left: Vec<Value> = db
        .store()
        .entities()
        .filter_map(|e| db.store().get(e, "n"))
        .collect();
    assert_eq!(left, vec![Value::Int(0), Value::Int(1)]);
}

#[test]
fn disabled_history_records_nothing() {
    let mut db = database(HistoryConfig::disabled());
    insert(&mut db, 1);
    assert!(db.history().is_empty());
    assert!(!db.undo());
    assert_eq!(db.store().entity_count(), 1);
}

#[test]
fn clear_drops_every_step() {
    let mut db = database(HistoryConfig::unbounded());
    insert(&mut db, 1);
    insert(&mut db, 2);
    db.undo();
    db.history_mut().clear();
    assert!(db.history().is_empty());
    assert!(!db.history().can_undo());
    assert!(!db.history().can_redo());
}

#[test]
fn flags_notify_observers() {
    let mut db = database(HistoryConfig::default());
    let undo = Rc::new(RefCell::new(Vec::new()));
    let redo = Rc::new(RefCell::new(Vec::new()));
    let undo_sink = Rc::clone(&undo);
    let redo_sink = Rc::clone(&redo);
    db.history_mut()
        .observe_undo_enabled(move |v| undo_sink.borrow_mut().push(*v));
    let redo_id = db
        .history_mut()
        .observe_redo_enabled(move |v| redo_sink.borrow_mut().push(*v));

    insert(&mut db, 1);
    db.undo();
    db.redo();
    assert!(db.history_mut().unobserve_redo_enabled(redo_id));
    db.undo();

    assert_eq!(*undo.borrow(), vec![false, true, false, true, false]);
    assert_eq!(*redo.borrow(), vec![false, true, false]);
}
