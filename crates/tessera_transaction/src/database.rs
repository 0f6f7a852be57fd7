//! Named transactions and change observation over a transactional store.

use std::collections::BTreeMap;
use std::fmt;

use tessera_foundation::{ComponentName, ErrorContext, Error, Record, Result, Value};
use tessera_storage::{SelectOptions, Store, StoreConfig, StoreSchema};
use tracing::debug;

use crate::observe::{SubscriptionId, Subscriptions};
use crate::operation::Operation;
use crate::options::TransactionOptions;
use crate::record::TransactionRecord;
use crate::transaction::Transaction;
use crate::transactional::{ApplyOperations, TransactionalStore};

/// A registered transaction function.
///
/// Receives the transaction handle and the caller's argument value. An error
/// rolls back every write the function made.
pub type TransactionFn = Box<dyn Fn(&mut Transaction<'_>, &Value) -> Result<Value>>;

enum Observer {
    Transactions(Box<dyn FnMut(&TransactionRecord)>),
    Select {
        include: Vec<ComponentName>,
        options: SelectOptions,
        callback: Box<dyn FnMut(&[Record])>,
    },
}

/// Collects the schema, configuration, and transaction functions of a
/// [`Database`].
pub struct DatabaseBuilder {
    schema: StoreSchema,
    config: StoreConfig,
    transactions: BTreeMap<String, TransactionFn>,
}

impl DatabaseBuilder {
    /// Starts a builder for `schema`.
    #[must_use]
    pub fn new(schema: StoreSchema) -> Self {
        Self {
            schema,
            config: StoreConfig::default(),
            transactions: BTreeMap::new(),
        }
    }

    /// Sets the store configuration.
    #[must_use]
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a transaction function. A later registration under the
    /// same name replaces the earlier one.
    #[must_use]
    pub fn transaction<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Transaction<'_>, &Value) -> Result<Value> + 'static,
    {
        self.transactions.insert(name.into(), Box::new(f));
        self
    }

    /// Creates the store and the database.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the schema is invalid.
    pub fn build(self) -> Result<Database> {
        let store = Store::with_config(self.schema, self.config)?;
        debug!(transactions = self.transactions.len(), "created database");
        Ok(Database {
            store: TransactionalStore::new(store),
            transactions: self.transactions,
            observers: Subscriptions::new(),
        })
    }
}

/// A transactional store with named transactions and observers.
pub struct Database {
    store: TransactionalStore,
    transactions: BTreeMap<String, TransactionFn>,
    observers: Subscriptions<Observer>,
}

impl Database {
    /// Starts a builder.
    #[must_use]
    pub fn builder(schema: StoreSchema) -> DatabaseBuilder {
        DatabaseBuilder::new(schema)
    }

    /// Returns the store for reads.
    #[must_use]
    pub fn store(&self) -> &Store {
        self.store.store()
    }

    /// Returns the registered transaction names.
    pub fn transaction_names(&self) -> impl Iterator<Item = &str> {
        self.transactions.keys().map(String::as_str)
    }

    /// Runs a registered transaction with default options.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTransaction` for an unregistered name, or the
    /// function's own error after rolling back its writes.
    pub fn transact(&mut self, name: &str, args: impl Into<Value>) -> Result<Value> {
        self.transact_with(name, &args.into(), TransactionOptions::default())
    }

    /// Runs a registered transaction with explicit options.
    ///
    /// # Errors
    ///
    /// Same as [`Database::transact`].
    pub fn transact_with(
        &mut self,
        name: &str,
        args: &Value,
        options: TransactionOptions,
    ) -> Result<Value> {
        self.transact_recorded(name, args, options)
            .map(|(value, _)| value)
    }

    /// Runs a registered transaction and also returns its record.
    ///
    /// # Errors
    ///
    /// Same as [`Database::transact`].
    pub fn transact_recorded(
        &mut self,
        name: &str,
        args: &Value,
        options: TransactionOptions,
    ) -> Result<(Value, TransactionRecord)> {
        let f = self
            .transactions
            .get(name)
            .ok_or_else(|| Error::unknown_transaction(name))?;
        let (value, record) = self
            .store
            .execute_fallible(options, |t| f(t, args))
            .map_err(|error| {
                if error.context.is_some() {
                    error
                } else {
                    error.with_context(ErrorContext::new().with_transaction(name))
                }
            })?;
        debug!(transaction = name, redo = record.redo.len(), "ran transaction");
        self.notify(&record);
        Ok((value, record))
    }

    /// Runs an unregistered transaction closure, notifying observers.
    pub fn execute<T, F>(&mut self, options: TransactionOptions, f: F) -> (T, TransactionRecord)
    where
        F: FnOnce(&mut Transaction<'_>) -> T,
    {
        let (value, record) = self.store.execute(options, f);
        self.notify(&record);
        (value, record)
    }

    /// Calls `callback` after every transaction, including replays.
    pub fn observe_transactions<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&TransactionRecord) + 'static,
    {
        self.observers
            .subscribe(Observer::Transactions(Box::new(callback)))
    }

    /// Calls `callback` with the current select result now, and again after
    /// every transaction that writes one of the `include` components.
    pub fn observe_select<S, F>(
        &mut self,
        include: &[S],
        options: SelectOptions,
        mut callback: F,
    ) -> SubscriptionId
    where
        S: AsRef<str>,
        F: FnMut(&[Record]) + 'static,
    {
        callback(&self.store().select(include, &options));
        let include = include.iter().map(|s| ComponentName::from(s.as_ref())).collect();
        self.observers.subscribe(Observer::Select {
            include,
            options,
            callback: Box::new(callback),
        })
    }

    /// Removes an observer. Returns true if it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn notify(&mut self, record: &TransactionRecord) {
        let store = self.store.store();
        for (_, observer) in self.observers.iter_mut() {
            match observer {
                Observer::Transactions(callback) => callback(record),
                Observer::Select {
                    include,
                    options,
                    callback,
                } => {
                    if record.changes.touches_any(include.as_slice()) {
                        callback(&store.select(include.as_slice(), options));
                    }
                }
            }
        }
    }
}

impl ApplyOperations for Database {
    fn apply_operations(&mut self, operations: &[Operation]) -> TransactionRecord {
        let record = self.store.apply_operations(operations);
        self.notify(&record);
        record
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("store", self.store.store())
            .field("transactions", &self.transactions.keys().collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish()
    }
}
