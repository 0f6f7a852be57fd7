//! Columnar archetype storage for Tessera.
//!
//! This crate provides:
//! - [`TypedBuffer`] - Growable columns for numbers, packed structs, constants, and arbitrary values
//! - [`Table`] - Dense rows over a set of named columns
//! - [`Archetype`] - A table for one exact component set
//! - [`EntityLocationTable`] - Entity id allocation and row lookup
//! - [`Store`] - Inserts, updates with archetype migration, deletes, selects, and resources
//! - [`StoreSnapshot`] - Plain-data export and import

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod archetype;
pub mod buffer;
pub mod config;
pub mod location;
pub mod schema;
pub mod select;
pub mod snapshot;
pub mod store;
pub mod table;

pub use archetype::{Archetype, ArchetypeId, ComponentSet};
pub use buffer::{Buffer, BufferKind, TypedBuffer};
pub use config::{DEFAULT_INITIAL_CAPACITY, StoreConfig};
pub use location::{EntityLocation, EntityLocationTable, LocationSnapshot, MAX_ID_GAP};
pub use schema::StoreSchema;
pub use select::{Comparison, Condition, OrderBy, SelectOptions};
#[cfg(feature = "serde")]
pub use snapshot::{from_bytes, to_bytes};
pub use snapshot::{ArchetypeSnapshot, StoreSnapshot};
pub use store::Store;
pub use table::Table;
