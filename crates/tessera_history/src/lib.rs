//! Undo/redo history for Tessera transactions.
//!
//! This crate provides:
//! - [`UndoRedoService`] - A bounded, coalescing stack of transaction records
//! - [`HistoryConfig`] - Capacity and on/off settings
//! - [`UndoableDatabase`] - A database whose transactions feed the history

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod service;
pub mod undoable;

pub use config::{DEFAULT_CAPACITY, HistoryConfig};
pub use service::UndoRedoService;
pub use undoable::UndoableDatabase;
