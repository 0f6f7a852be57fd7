//! Core types shared by every Tessera layer.
//!
//! This crate provides:
//! - [`Entity`] - Plain 32-bit entity identifiers
//! - [`Value`] - Dynamically typed component values
//! - [`Record`] and [`Patch`] - Component maps used for reads, inserts, and updates
//! - [`Schema`] - Declarative component and resource types
//! - [`Error`] - Error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod record;
pub mod schema;
pub mod value;

pub use entity::Entity;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use record::{ComponentName, ID, Patch, Record};
pub use schema::{Layout, NumberKind, Schema, SchemaKind};
pub use value::Value;
