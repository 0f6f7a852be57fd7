//! Per-transaction options.

use tessera_foundation::Value;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether consecutive undoable records may merge into one undo step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Coalesce {
    /// Always a separate undo step.
    #[default]
    Never,
    /// Merges with an adjacent record carrying a structurally equal key.
    Key(Value),
}

/// Marks a record for the undo history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Undoable {
    /// Coalescing behaviour.
    pub coalesce: Coalesce,
}

impl Undoable {
    /// An undo step that never merges.
    #[must_use]
    pub fn step() -> Self {
        Self::default()
    }

    /// An undo step that merges with neighbours sharing `key`.
    #[must_use]
    pub fn coalescing(key: impl Into<Value>) -> Self {
        Self {
            coalesce: Coalesce::Key(key.into()),
        }
    }
}

/// Options for one transaction.
///
/// Transaction functions may also change these while running through
/// [`Transaction::set_undoable`](crate::Transaction::set_undoable) and
/// [`Transaction::set_transient`](crate::Transaction::set_transient).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Intermediate step of a longer operation; never enters undo history.
    pub transient: bool,
    /// Present if the record belongs in undo history.
    pub undoable: Option<Undoable>,
}

impl TransactionOptions {
    /// Default options: not transient, not undoable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for an intermediate step.
    #[must_use]
    pub fn transient() -> Self {
        Self {
            transient: true,
            undoable: None,
        }
    }

    /// Options for an undoable step.
    #[must_use]
    pub fn undoable(undoable: Undoable) -> Self {
        Self {
            transient: false,
            undoable: Some(undoable),
        }
    }

    /// Sets the transient flag.
    #[must_use]
    pub fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    /// Sets the undo marker.
    #[must_use]
    pub fn with_undoable(mut self, undoable: Option<Undoable>) -> Self {
        self.undoable = undoable;
        self
    }
}
