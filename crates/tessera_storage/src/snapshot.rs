//! Plain-data export and import of a whole store.
//!
//! A [`StoreSnapshot`] holds every live row, the location table with its
//! free list, and the resources, so a restored store hands out the same ids
//! a never-exported store would.

use std::collections::BTreeMap;

use tessera_foundation::{ComponentName, Error, ErrorKind, ID, Result, Value};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::archetype::{Archetype, ArchetypeId, ComponentSet};
use crate::buffer::{Buffer, TypedBuffer};
use crate::config::{DEFAULT_INITIAL_CAPACITY, StoreConfig};
use crate::location::{EntityLocationTable, LocationSnapshot};
use crate::schema::StoreSchema;
use crate::store::Store;
use crate::table::Table;

/// The rows of one archetype.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArchetypeSnapshot {
    /// Component names, including the id column.
    pub components: Vec<ComponentName>,
    /// Number of occupied rows.
    pub row_count: usize,
    /// Column values for rows `0..row_count`.
    pub columns: BTreeMap<ComponentName, Vec<Value>>,
}

/// Everything needed to rebuild a store under the same schema.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoreSnapshot {
    /// Entity locations and free list.
    pub locations: LocationSnapshot,
    /// Archetypes in creation order.
    pub archetypes: Vec<ArchetypeSnapshot>,
    /// Resource values.
    pub resources: BTreeMap<ComponentName, Value>,
}

fn corrupt(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::SerializationError(message.into()))
}

impl Archetype {
    /// Exports the occupied rows as plain data.
    #[must_use]
    pub fn to_data(&self) -> ArchetypeSnapshot {
        let table = self.table();
        ArchetypeSnapshot {
            components: self.components().names().to_vec(),
            row_count: table.row_count(),
            columns: table
                .columns()
                .map(|(name, buffer)| (name.clone(), buffer.slice(0, table.row_count())))
                .collect(),
        }
    }

    /// Rebuilds an archetype from exported rows.
    ///
    /// The location table is not touched; the caller points entities at the
    /// restored rows.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponent` for a component the schema lacks, and
    /// `SerializationError` if the id column or a column's rows are missing.
    pub fn from_data(id: ArchetypeId, schema: &StoreSchema, data: ArchetypeSnapshot) -> Result<Self> {
        Self::from_data_with_capacity(id, schema, data, DEFAULT_INITIAL_CAPACITY)
    }

    /// [`Archetype::from_data`] with room for at least `capacity` rows.
    ///
    /// # Errors
    ///
    /// Same as [`Archetype::from_data`].
    pub fn from_data_with_capacity(
        id: ArchetypeId,
        schema: &StoreSchema,
        data: ArchetypeSnapshot,
        capacity: usize,
    ) -> Result<Self> {
        let components = ComponentSet::from_names(&data.components);
        if !components.contains(ID) {
            return Err(corrupt(format!("archetype {id} has no id column")));
        }
        let capacity = data.row_count.max(capacity);
        let mut columns: Vec<(ComponentName, TypedBuffer)> = Vec::with_capacity(components.len());
        for name in components.names() {
            let component = schema
                .component_schema(name)
                .ok_or_else(|| Error::unknown_component(name.to_string()))?;
            let values = data
                .columns
                .get(name)
                .ok_or_else(|| corrupt(format!("archetype {id} is missing column {name}")))?;
            if values.len() != data.row_count {
                return Err(corrupt(format!(
                    "column {name} of archetype {id} has {} rows, expected {}",
                    values.len(),
                    data.row_count
                )));
            }
            let buffer = TypedBuffer::from_values(component, values, capacity)
                .map_err(|reason| Error::invalid_schema(name.to_string(), reason))?;
            columns.push((name.clone(), buffer));
        }
        Ok(Self::new(id, components, Table::with_rows(columns, data.row_count)))
    }
}

impl Store {
    /// Exports the store as plain data.
    #[must_use]
    pub fn to_data(&self) -> StoreSnapshot {
        let archetypes = self.archetypes.iter().map(Archetype::to_data).collect();
        StoreSnapshot {
            locations: self.locations.to_data(),
            archetypes,
            resources: self.resources.clone(),
        }
    }

    /// Rebuilds a store from exported data.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the schema is invalid, and
    /// `SerializationError` if the data does not fit the schema or its
    /// location table disagrees with the archetype rows.
    pub fn from_data(schema: StoreSchema, data: StoreSnapshot) -> Result<Self> {
        Self::from_data_with_config(schema, StoreConfig::default(), data)
    }

    /// Rebuilds a store from exported data with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Store::from_data`].
    pub fn from_data_with_config(
        schema: StoreSchema,
        config: StoreConfig,
        data: StoreSnapshot,
    ) -> Result<Self> {
        let schema = schema.checked()?;

        let mut resources: BTreeMap<ComponentName, Value> = schema
            .resources()
            .map(|(name, s)| (name.clone(), s.default_value()))
            .collect();
        for (name, value) in data.resources {
            let slot = resources
                .get_mut(&name)
                .ok_or_else(|| Error::unknown_resource(name.to_string()))?;
            *slot = value;
        }

        let mut store = Store::empty(schema, config, resources);
        for (index, archetype) in data.archetypes.into_iter().enumerate() {
            let id = ArchetypeId(
                u32::try_from(index).map_err(|_| corrupt("too many archetypes"))?,
            );
            let restored = Archetype::from_data_with_capacity(
                id,
                &store.schema,
                archetype,
                store.config.initial_capacity,
            )?;
            if store.index.contains_key(restored.components()) {
                return Err(corrupt(format!("archetype {} appears twice", restored.components())));
            }
            store.index.insert(restored.components().clone(), id);
            store.archetypes.push(restored);
        }

        store.locations =
            EntityLocationTable::from_data(data.locations).map_err(corrupt)?;
        store.check_locations()?;

        let named: Vec<_> = store
            .schema
            .archetypes()
            .map(|(name, components)| (name.clone(), components.to_vec()))
            .collect();
        for (name, components) in named {
            let id = store.ensure_archetype(&components)?;
            store.named.insert(name, id);
        }

        debug!(
            entities = store.entity_count(),
            archetypes = store.archetypes.len(),
            "restored store"
        );
        Ok(store)
    }

    fn check_locations(&self) -> Result<()> {
        let rows: usize = self.archetypes.iter().map(Archetype::row_count).sum();
        if rows != self.locations.len() {
            return Err(corrupt(format!(
                "{rows} rows stored but {} entities located",
                self.locations.len()
            )));
        }
        for (entity, location) in self.locations.iter() {
            let stored = self
                .archetype(location.archetype)
                .and_then(|archetype| archetype.entity_at(location.row_index()));
            if stored != Some(entity) {
                return Err(corrupt(format!("{entity} is not stored at its location")));
            }
        }
        Ok(())
    }
}

/// Serializes a store to `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if serialization fails.
#[cfg(feature = "serde")]
pub fn to_bytes(store: &Store) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(&store.to_data())
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Restores a store from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails or the data does not fit the
/// schema.
#[cfg(feature = "serde")]
pub fn from_bytes(schema: StoreSchema, bytes: &[u8]) -> Result<Store> {
    let data: StoreSnapshot = rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))?;
    Store::from_data(schema, data)
}
