//! Merging adjacent undo steps.

use tessera_foundation::Entity;
use tracing::debug;

use crate::operation::Operation;
use crate::options::Coalesce;
use crate::record::TransactionRecord;

/// Returns true if `current` should merge into `previous`.
///
/// Both must be undoable with structurally equal [`Coalesce::Key`] values.
#[must_use]
pub fn should_coalesce(previous: &TransactionRecord, current: &TransactionRecord) -> bool {
    match (&previous.undoable, &current.undoable) {
        (Some(p), Some(c)) => match (&p.coalesce, &c.coalesce) {
            (Coalesce::Key(a), Coalesce::Key(b)) => a == b,
            _ => false,
        },
        _ => false,
    }
}

/// Merges two adjacent records into one, `current` applied after
/// `previous`.
#[must_use]
pub fn coalesce_records(previous: &TransactionRecord, current: &TransactionRecord) -> TransactionRecord {
    let redo = previous.redo.iter().chain(&current.redo).cloned().collect();
    let undo = current.undo.iter().chain(&previous.undo).cloned().collect();
    let mut changes = previous.changes.clone();
    changes.extend(&current.changes);
    debug!(
        redo = previous.redo.len() + current.redo.len(),
        undo = previous.undo.len() + current.undo.len(),
        "coalesced transaction records"
    );
    TransactionRecord {
        transient: current.transient,
        undoable: current.undoable.clone(),
        redo: compact_operations(redo),
        undo: compact_operations(undo),
        changes,
    }
}

/// Shortens an operation list without changing its effect.
///
/// Consecutive updates of one entity merge into one update, and updates
/// followed later by a delete of the same entity are dropped.
#[must_use]
pub fn compact_operations(operations: Vec<Operation>) -> Vec<Operation> {
    if operations.len() <= 1 {
        return operations;
    }
    let mut result: Vec<Operation> = Vec::with_capacity(operations.len());
    for operation in operations {
        match operation {
            Operation::Update { entity, values } => {
                if let Some(Operation::Update {
                    entity: last,
                    values: merged,
                }) = result.last_mut()
                {
                    if *last == entity {
                        *merged = merged.merged(&values);
                        continue;
                    }
                }
                result.push(Operation::Update { entity, values });
            }
            Operation::Delete { entity } => {
                result.retain(|op| !is_update_of(op, entity));
                result.push(Operation::Delete { entity });
            }
            other => result.push(other),
        }
    }
    result
}

fn is_update_of(operation: &Operation, target: Entity) -> bool {
    matches!(operation, Operation::Update { entity, .. } if *entity == target)
}
