//! The result of one transaction.

use std::collections::BTreeSet;

use tessera_foundation::{ComponentName, Entity};
use tessera_storage::ArchetypeId;

use crate::operation::Operation;
use crate::options::Undoable;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a transaction touched.
///
/// Components include resource names, so observers can watch resources the
/// same way as columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeSet {
    /// Entities inserted, updated, or deleted.
    pub entities: BTreeSet<Entity>,
    /// Components and resources written.
    pub components: BTreeSet<ComponentName>,
    /// Archetypes whose rows changed.
    pub archetypes: BTreeSet<ArchetypeId>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.components.is_empty() && self.archetypes.is_empty()
    }

    /// Adds everything in `other`.
    pub fn extend(&mut self, other: &ChangeSet) {
        self.entities.extend(other.entities.iter().copied());
        self.components.extend(other.components.iter().cloned());
        self.archetypes.extend(other.archetypes.iter().copied());
    }

    /// Returns true if any of `components` changed.
    #[must_use]
    pub fn touches_any<S: AsRef<str>>(&self, components: &[S]) -> bool {
        components
            .iter()
            .any(|name| self.components.contains(name.as_ref()))
    }
}

/// Forward and inverse operation logs of one transaction, plus metadata.
///
/// `redo` is in application order. `undo` is also in the order it must be
/// applied, which is the reverse of the order its operations were recorded.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransactionRecord {
    /// Intermediate step; excluded from undo history.
    pub transient: bool,
    /// Present if the record belongs in undo history.
    pub undoable: Option<Undoable>,
    /// Operations that repeat the transaction.
    pub redo: Vec<Operation>,
    /// Operations that revert the transaction.
    pub undo: Vec<Operation>,
    /// What changed.
    pub changes: ChangeSet,
}

impl TransactionRecord {
    /// Returns true if the transaction wrote nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.redo.is_empty() && self.undo.is_empty()
    }

    /// Returns true if the record belongs in undo history.
    #[must_use]
    pub fn is_undoable(&self) -> bool {
        self.undoable.is_some() && !self.transient
    }
}
