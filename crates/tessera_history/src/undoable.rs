//! A database that records undo history automatically.

use tessera_foundation::{Result, Value};
use tessera_storage::Store;
use tessera_transaction::{Database, Transaction, TransactionOptions};

use crate::config::HistoryConfig;
use crate::service::UndoRedoService;

/// A [`Database`] paired with an [`UndoRedoService`].
///
/// Every transaction run through it is offered to the history, and undo and
/// redo replay through the database so its observers see the changes.
#[derive(Debug)]
pub struct UndoableDatabase {
    database: Database,
    history: UndoRedoService,
}

impl UndoableDatabase {
    /// Wraps a database with default history settings.
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self::with_config(database, HistoryConfig::default())
    }

    /// Wraps a database.
    #[must_use]
    pub fn with_config(database: Database, config: HistoryConfig) -> Self {
        Self {
            database,
            history: UndoRedoService::with_config(config),
        }
    }

    /// Returns the store for reads.
    #[must_use]
    pub fn store(&self) -> &Store {
        self.database.store()
    }

    /// Returns the database.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Returns the database for registering observers.
    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    /// Returns the history.
    #[must_use]
    pub fn history(&self) -> &UndoRedoService {
        &self.history
    }

    /// Returns the history for observing its flags.
    pub fn history_mut(&mut self) -> &mut UndoRedoService {
        &mut self.history
    }

    /// Runs a registered transaction with default options.
    ///
    /// # Errors
    ///
    /// See [`Database::transact`].
    pub fn transact(&mut self, name: &str, args: impl Into<Value>) -> Result<Value> {
        self.transact_with(name, &args.into(), TransactionOptions::default())
    }

    /// Runs a registered transaction and offers its record to the history.
    ///
    /// # Errors
    ///
    /// See [`Database::transact`].
    pub fn transact_with(
        &mut self,
        name: &str,
        args: &Value,
        options: TransactionOptions,
    ) -> Result<Value> {
        let (value, record) = self.database.transact_recorded(name, args, options)?;
        self.history.push(record);
        Ok(value)
    }

    /// Runs a transaction closure and offers its record to the history.
    pub fn execute<T, F>(&mut self, options: TransactionOptions, f: F) -> T
    where
        F: FnOnce(&mut Transaction<'_>) -> T,
    {
        let (value, record) = self.database.execute(options, f);
        self.history.push(record);
        value
    }

    /// Undoes one step. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.database)
    }

    /// Redoes one step. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.database)
    }
}
