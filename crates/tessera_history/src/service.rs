//! The undo/redo stack.

use std::collections::VecDeque;

use tessera_transaction::{
    ApplyOperations, Observable, SubscriptionId, TransactionRecord, coalesce_records,
    should_coalesce,
};
use tracing::debug;

use crate::config::HistoryConfig;

/// A bounded stack of undoable transaction records.
///
/// `index` is the position just after the last applied record: records
/// before it can be undone, records from it on can be redone.
#[derive(Debug)]
pub struct UndoRedoService {
    stack: VecDeque<TransactionRecord>,
    index: usize,
    config: HistoryConfig,
    undo_enabled: Observable<bool>,
    redo_enabled: Observable<bool>,
}

impl Default for UndoRedoService {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoRedoService {
    /// Creates an empty history with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Creates an empty history.
    #[must_use]
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            stack: VecDeque::new(),
            index: 0,
            config,
            undo_enabled: Observable::new(false),
            redo_enabled: Observable::new(false),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Returns the number of records kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns true if no records are kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the stack index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Iterates records from oldest to newest.
    pub fn records(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.stack.iter()
    }

    /// Returns true if [`UndoRedoService::undo`] would apply something.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        *self.undo_enabled.get()
    }

    /// Returns true if [`UndoRedoService::redo`] would apply something.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        *self.redo_enabled.get()
    }

    /// The undo-enabled flag, `index > 0`.
    #[must_use]
    pub fn undo_enabled(&self) -> &Observable<bool> {
        &self.undo_enabled
    }

    /// The redo-enabled flag, `index < len`.
    #[must_use]
    pub fn redo_enabled(&self) -> &Observable<bool> {
        &self.redo_enabled
    }

    /// Subscribes to the undo-enabled flag; the callback runs now and on
    /// every change.
    pub fn observe_undo_enabled<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&bool) + 'static,
    {
        self.undo_enabled.subscribe(callback)
    }

    /// Subscribes to the redo-enabled flag; the callback runs now and on
    /// every change.
    pub fn observe_redo_enabled<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&bool) + 'static,
    {
        self.redo_enabled.subscribe(callback)
    }

    /// Removes an undo-enabled subscriber.
    pub fn unobserve_undo_enabled(&mut self, id: SubscriptionId) -> bool {
        self.undo_enabled.unsubscribe(id)
    }

    /// Removes a redo-enabled subscriber.
    pub fn unobserve_redo_enabled(&mut self, id: SubscriptionId) -> bool {
        self.redo_enabled.unsubscribe(id)
    }

    /// Adds a record to the history.
    ///
    /// Transient, non-undoable, and empty records are ignored. A record
    /// whose coalesce key equals that of the record at the top of the stack
    /// merges into it, unless something was undone since. Otherwise any redo
    /// history is discarded and the record becomes the new top. Returns true
    /// if the history changed.
    pub fn push(&mut self, record: TransactionRecord) -> bool {
        if !self.config.enabled || !record.is_undoable() || record.is_empty() {
            return false;
        }

        if self.index > 0 && self.index == self.stack.len() {
            let top = &mut self.stack[self.index - 1];
            if should_coalesce(top, &record) {
                *top = coalesce_records(top, &record);
                debug!(index = self.index, "coalesced into undo step");
                return true;
            }
        }

        self.stack.truncate(self.index);
        self.stack.push_back(record);
        self.index += 1;
        while self.stack.len() > self.config.capacity {
            self.stack.pop_front();
            self.index = self.index.saturating_sub(1);
            debug!(capacity = self.config.capacity, "evicted oldest undo step");
        }
        debug!(index = self.index, len = self.stack.len(), "pushed undo step");
        self.refresh();
        true
    }

    /// Reverts the record before the index. Returns false if there is none.
    pub fn undo<A: ApplyOperations + ?Sized>(&mut self, target: &mut A) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        let replay = target.apply_operations(&self.stack[self.index].undo);
        debug!(index = self.index, applied = replay.redo.len(), "undo");
        self.refresh();
        true
    }

    /// Reapplies the record at the index. Returns false if there is none.
    pub fn redo<A: ApplyOperations + ?Sized>(&mut self, target: &mut A) -> bool {
        let Some(record) = self.stack.get(self.index) else {
            return false;
        };
        let replay = target.apply_operations(&record.redo);
        self.index += 1;
        debug!(index = self.index, applied = replay.redo.len(), "redo");
        self.refresh();
        true
    }

    /// Forgets every record.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.index = 0;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.undo_enabled.set(self.index > 0);
        self.redo_enabled.set(self.index < self.stack.len());
    }
}
