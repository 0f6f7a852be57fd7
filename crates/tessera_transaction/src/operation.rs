//! Replayable write operations.

use std::fmt;

use tessera_foundation::{ComponentName, Entity, Patch, Record, Value};
use tessera_storage::Store;

use crate::options::TransactionOptions;
use crate::transaction::Transaction;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One recorded write.
///
/// Every operation carries enough data to be applied again to a store in the
/// state it was recorded against.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Operation {
    /// Creates an entity. `entity` is the id it was given, reused on replay.
    Insert {
        /// Assigned id.
        entity: Entity,
        /// Component values, without `id`.
        values: Record,
    },
    /// Patches an entity.
    Update {
        /// Target entity.
        entity: Entity,
        /// Components to set or remove.
        values: Patch,
    },
    /// Deletes an entity.
    Delete {
        /// Target entity.
        entity: Entity,
    },
    /// Replaces a resource value.
    SetResource {
        /// Resource name.
        name: ComponentName,
        /// New value.
        value: Value,
    },
}

impl Operation {
    /// Returns the entity this operation targets, if any.
    #[must_use]
    pub fn entity(&self) -> Option<Entity> {
        match self {
            Self::Insert { entity, .. } | Self::Update { entity, .. } | Self::Delete { entity } => {
                Some(*entity)
            }
            Self::SetResource { .. } => None,
        }
    }

    /// Short name of the operation kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::SetResource { .. } => "set_resource",
        }
    }

    /// Applies the operation directly to a store without recording it.
    ///
    /// Operations that no longer fit the store (a missing entity, an id
    /// already in use, a value the schema rejects) are skipped with a
    /// warning. Returns true if the store changed as recorded.
    pub fn apply(&self, store: &mut Store) -> bool {
        Transaction::new(store, TransactionOptions::default()).apply(self)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert { entity, values } => write!(f, "insert {entity} {values:?}"),
            Self::Update { entity, values } => write!(f, "update {entity} {values:?}"),
            Self::Delete { entity } => write!(f, "delete {entity}"),
            Self::SetResource { name, value } => write!(f, "set {name} = {value:?}"),
        }
    }
}

/// Applies operations in order directly to a store. Returns how many applied
/// cleanly.
pub fn apply_all(store: &mut Store, operations: &[Operation]) -> usize {
    Transaction::new(store, TransactionOptions::default()).apply_all(operations)
}
