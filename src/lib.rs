//! Tessera - Columnar entity-component store with recorded transactions
//!
//! This crate re-exports all layers of the Tessera system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: tessera_history      - Undo/redo stack, undoable database
//! Layer 2: tessera_transaction  - Operation logs, transactions, named registry, observers
//! Layer 1: tessera_storage      - Typed buffers, archetypes, entity locations, store
//! Layer 0: tessera_foundation   - Core types (Entity, Value, Schema, Error)
//! ```

pub use tessera_foundation as foundation;
pub use tessera_history as history;
pub use tessera_storage as storage;
pub use tessera_transaction as transaction;
