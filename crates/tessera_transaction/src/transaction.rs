//! The handle transaction functions write through.

use tessera_foundation::{ComponentName, Entity, ID, Patch, Record, Result, Value};
use tessera_storage::{EntityLocation, SelectOptions, Store};
use tracing::warn;

use crate::coalesce::compact_operations;
use crate::operation::Operation;
use crate::options::{TransactionOptions, Undoable};
use crate::record::{ChangeSet, TransactionRecord};

/// A recording view of a store for the duration of one transaction.
///
/// Every write goes to the store immediately, so later reads in the same
/// transaction see it. Alongside each write the handle records the forward
/// operation and the inverse computed from the state just before the write.
/// Writes to missing entities are no-ops and record nothing.
pub struct Transaction<'s> {
    store: &'s mut Store,
    options: TransactionOptions,
    redo: Vec<Operation>,
    /// Inverses in recording order; reversed when the record is built.
    undo: Vec<Operation>,
    changes: ChangeSet,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(store: &'s mut Store, options: TransactionOptions) -> Self {
        Self {
            store,
            options,
            redo: Vec::new(),
            undo: Vec::new(),
            changes: ChangeSet::new(),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the underlying store for reads.
    #[must_use]
    pub fn store(&self) -> &Store {
        self.store
    }

    /// See [`Store::read`].
    #[must_use]
    pub fn read(&self, entity: Entity) -> Option<Record> {
        self.store.read(entity)
    }

    /// See [`Store::get`].
    #[must_use]
    pub fn get(&self, entity: Entity, component: &str) -> Option<Value> {
        self.store.get(entity, component)
    }

    /// See [`Store::locate`].
    #[must_use]
    pub fn locate(&self, entity: Entity) -> Option<EntityLocation> {
        self.store.locate(entity)
    }

    /// See [`Store::select`].
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, include: &[S], options: &SelectOptions) -> Vec<Record> {
        self.store.select(include, options)
    }

    /// See [`Store::select_entities`].
    #[must_use]
    pub fn select_entities<S: AsRef<str>>(&self, include: &[S], options: &SelectOptions) -> Vec<Entity> {
        self.store.select_entities(include, options)
    }

    /// See [`Store::resource`].
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&Value> {
        self.store.resource(name)
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Returns the current options.
    #[must_use]
    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    /// Marks the record for undo history, or removes the mark.
    pub fn set_undoable(&mut self, undoable: Option<Undoable>) {
        self.options.undoable = undoable;
    }

    /// Marks the record as an intermediate step.
    pub fn set_transient(&mut self, transient: bool) {
        self.options.transient = transient;
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts an entity.
    ///
    /// # Errors
    ///
    /// See [`Store::insert`]. Nothing is recorded on error.
    pub fn insert(&mut self, values: &Record) -> Result<Entity> {
        let entity = self.store.insert(values)?;
        self.record_insert(entity, values.without_id());
        Ok(entity)
    }

    /// Inserts an entity, reusing `entity` as its id when free.
    ///
    /// # Errors
    ///
    /// See [`Store::insert_as`]. Nothing is recorded on error.
    pub fn insert_as(&mut self, entity: Entity, values: &Record) -> Result<Entity> {
        let assigned = self.store.insert_as(entity, values)?;
        if assigned != entity {
            warn!(requested = %entity, %assigned, "id in use, inserted under a new id");
        }
        self.record_insert(assigned, values.without_id());
        Ok(assigned)
    }

    fn record_insert(&mut self, entity: Entity, values: Record) {
        self.changes.entities.insert(entity);
        self.changes.components.insert(ID.into());
        self.changes.components.extend(values.names().cloned());
        if let Some(location) = self.store.locate(entity) {
            self.changes.archetypes.insert(location.archetype);
        }
        self.redo.push(Operation::Insert { entity, values });
        self.undo.push(Operation::Delete { entity });
    }

    /// Patches an entity. Returns false if it is not live.
    ///
    /// # Errors
    ///
    /// See [`Store::update`]. Nothing is recorded on error.
    pub fn update(&mut self, entity: Entity, patch: &Patch) -> Result<bool> {
        let Some(before) = self.store.read(entity) else {
            return Ok(false);
        };
        let from = self.store.locate(entity).map(|l| l.archetype);
        if !self.store.update(entity, patch)? {
            return Ok(false);
        }

        let mut forward = Patch::new();
        let mut inverse = Patch::new();
        for (name, value) in patch.iter() {
            if &**name == ID {
                continue;
            }
            let previous = before.get(name);
            if previous == value {
                continue;
            }
            forward.insert(name.clone(), value.cloned());
            inverse.insert(name.clone(), previous.cloned());
            self.changes.components.insert(name.clone());
        }
        if forward.is_empty() {
            return Ok(true);
        }

        self.changes.entities.insert(entity);
        self.changes.archetypes.extend(from);
        if let Some(location) = self.store.locate(entity) {
            self.changes.archetypes.insert(location.archetype);
        }
        self.push_update(entity, forward, inverse);
        Ok(true)
    }

    fn push_update(&mut self, entity: Entity, forward: Patch, inverse: Patch) {
        if let (
            Some(Operation::Update {
                entity: redo_entity,
                values: redo,
            }),
            Some(Operation::Update {
                entity: undo_entity,
                values: undo,
            }),
        ) = (self.redo.last_mut(), self.undo.last_mut())
        {
            if *redo_entity == entity && *undo_entity == entity {
                *redo = redo.merged(&forward);
                // the earliest prior value wins
                *undo = inverse.merged(undo);
                return;
            }
        }
        self.redo.push(Operation::Update {
            entity,
            values: forward,
        });
        self.undo.push(Operation::Update {
            entity,
            values: inverse,
        });
    }

    /// Deletes an entity. Returns false if it was not live.
    pub fn delete(&mut self, entity: Entity) -> bool {
        let Some(before) = self.store.read(entity) else {
            return false;
        };
        let location = self.store.locate(entity);
        if !self.store.delete(entity) {
            return false;
        }
        self.changes.entities.insert(entity);
        self.changes.components.extend(before.names().cloned());
        self.changes.archetypes.extend(location.map(|l| l.archetype));
        self.redo.push(Operation::Delete { entity });
        self.undo.push(Operation::Insert {
            entity,
            values: before.without_id(),
        });
        true
    }

    /// Replaces a resource value.
    ///
    /// # Errors
    ///
    /// See [`Store::set_resource`]. Nothing is recorded on error.
    pub fn set_resource(&mut self, name: &str, value: Value) -> Result<()> {
        let previous = self.store.set_resource(name, value.clone())?;
        if previous == value {
            return Ok(());
        }
        let name: ComponentName = name.into();
        self.changes.components.insert(name.clone());
        if let (
            Some(Operation::SetResource {
                name: redo_name,
                value: redo,
            }),
            Some(Operation::SetResource { name: undo_name, .. }),
        ) = (self.redo.last_mut(), self.undo.last())
        {
            if *redo_name == name && *undo_name == name {
                *redo = value;
                return Ok(());
            }
        }
        self.redo.push(Operation::SetResource {
            name: name.clone(),
            value,
        });
        self.undo.push(Operation::SetResource {
            name,
            value: previous,
        });
        Ok(())
    }

    /// Applies a logged operation through the recording path.
    ///
    /// Operations that no longer fit the store are skipped with a warning.
    /// Returns true if the operation applied.
    pub fn apply(&mut self, operation: &Operation) -> bool {
        let applied = match operation {
            Operation::Insert { entity, values } => match self.insert_as(*entity, values) {
                Ok(assigned) => assigned == *entity,
                Err(error) => {
                    warn!(%entity, %error, "skipped insert");
                    false
                }
            },
            Operation::Update { entity, values } => {
                self.update(*entity, values).unwrap_or_else(|error| {
                    warn!(%entity, %error, "skipped update");
                    false
                })
            }
            Operation::Delete { entity } => self.delete(*entity),
            Operation::SetResource { name, value } => {
                match self.set_resource(name, value.clone()) {
                    Ok(()) => true,
                    Err(error) => {
                        warn!(%name, %error, "skipped resource write");
                        false
                    }
                }
            }
        };
        if !applied {
            warn!(operation = operation.kind(), entity = ?operation.entity(), "operation did not apply cleanly");
        }
        applied
    }

    /// Applies operations in order. Returns how many applied cleanly.
    pub fn apply_all(&mut self, operations: &[Operation]) -> usize {
        operations.iter().filter(|op| self.apply(op)).count()
    }

    /// Reverts every write made so far, without recording.
    pub(crate) fn rollback(self) -> usize {
        let Transaction { store, undo, .. } = self;
        undo.iter().rev().filter(|op| op.apply(store)).count()
    }

    pub(crate) fn finish(self) -> TransactionRecord {
        let mut undo = self.undo;
        undo.reverse();
        TransactionRecord {
            transient: self.options.transient,
            undoable: self.options.undoable,
            redo: compact_operations(self.redo),
            undo: compact_operations(undo),
            changes: self.changes,
        }
    }
}
