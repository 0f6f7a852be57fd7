//! Recorded, reversible transactions over a Tessera store.
//!
//! This crate provides:
//! - [`Operation`] - Replayable insert/update/delete/resource writes
//! - [`Transaction`] - The handle transaction functions write through
//! - [`TransactionRecord`] - Forward and inverse logs plus a [`ChangeSet`]
//! - [`TransactionalStore`] - Runs transactions, rolling back failed ones
//! - [`Database`] - Named transaction functions and change observers
//! - [`Observable`] - A value with change subscribers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod coalesce;
pub mod database;
pub mod observe;
pub mod operation;
pub mod options;
pub mod record;
pub mod transaction;
pub mod transactional;

pub use coalesce::{coalesce_records, compact_operations, should_coalesce};
pub use database::{Database, DatabaseBuilder, TransactionFn};
pub use observe::{Callback, Observable, SubscriptionId, Subscriptions};
pub use operation::{Operation, apply_all};
pub use options::{Coalesce, TransactionOptions, Undoable};
pub use record::{ChangeSet, TransactionRecord};
pub use transaction::Transaction;
pub use transactional::{ApplyOperations, TransactionalStore};
