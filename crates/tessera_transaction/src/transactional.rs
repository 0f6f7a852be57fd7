//! Running transactions against an owned store.

use tessera_storage::Store;
use tracing::debug;

use crate::operation::Operation;
use crate::options::TransactionOptions;
use crate::record::TransactionRecord;
use crate::transaction::Transaction;

/// Something operation logs can be replayed against.
pub trait ApplyOperations {
    /// Applies operations in order through the recording path and returns
    /// the record of the replay.
    fn apply_operations(&mut self, operations: &[Operation]) -> TransactionRecord;
}

/// Exclusive owner of a [`Store`] that records every write.
#[derive(Clone, Debug)]
pub struct TransactionalStore {
    store: Store,
}

impl TransactionalStore {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Returns the store for reads.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Unwraps the store.
    #[must_use]
    pub fn into_inner(self) -> Store {
        self.store
    }

    /// Runs `f` as one transaction and returns its value with the record.
    pub fn execute<T, F>(&mut self, options: TransactionOptions, f: F) -> (T, TransactionRecord)
    where
        F: FnOnce(&mut Transaction<'_>) -> T,
    {
        let mut transaction = Transaction::new(&mut self.store, options);
        let value = f(&mut transaction);
        let record = transaction.finish();
        log_record(&record);
        (value, record)
    }

    /// Runs `f` as one transaction, reverting every write if it fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `f` after the store has been rolled back.
    pub fn execute_fallible<T, E, F>(
        &mut self,
        options: TransactionOptions,
        f: F,
    ) -> Result<(T, TransactionRecord), E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
    {
        let mut transaction = Transaction::new(&mut self.store, options);
        match f(&mut transaction) {
            Ok(value) => {
                let record = transaction.finish();
                log_record(&record);
                Ok((value, record))
            }
            Err(error) => {
                let reverted = transaction.rollback();
                debug!(reverted, "transaction rolled back");
                Err(error)
            }
        }
    }
}

impl ApplyOperations for TransactionalStore {
    fn apply_operations(&mut self, operations: &[Operation]) -> TransactionRecord {
        let ((), record) = self.execute(TransactionOptions::default(), |t| {
            t.apply_all(operations);
        });
        record
    }
}

fn log_record(record: &TransactionRecord) {
    debug!(
        redo = record.redo.len(),
        undo = record.undo.len(),
        entities = record.changes.entities.len(),
        transient = record.transient,
        undoable = record.undoable.is_some(),
        "transaction complete"
    );
}
