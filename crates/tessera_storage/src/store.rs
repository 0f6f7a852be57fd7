//! The store: archetypes, resources, and the entity location table.
//!
//! [`Store`] is the only type that mutates archetype tables. Every entity
//! operation goes through the location table first, so operations on
//! unknown or deleted entities are no-ops that report `false`/`None`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tessera_foundation::{
    ComponentName, Entity, Error, ErrorKind, ID, Patch, Record, Result, Value,
};
use tracing::{debug, trace};

use crate::archetype::{Archetype, ArchetypeId, ComponentSet};
use crate::buffer::TypedBuffer;
use crate::config::StoreConfig;
use crate::location::{EntityLocation, EntityLocationTable};
use crate::schema::StoreSchema;
use crate::select::SelectOptions;
use crate::table::Table;

/// Columnar entity storage.
#[derive(Clone, Debug)]
pub struct Store {
    pub(crate) schema: StoreSchema,
    pub(crate) config: StoreConfig,
    pub(crate) archetypes: Vec<Archetype>,
    pub(crate) index: HashMap<ComponentSet, ArchetypeId>,
    pub(crate) named: HashMap<Arc<str>, ArchetypeId>,
    pub(crate) locations: EntityLocationTable,
    pub(crate) resources: BTreeMap<ComponentName, Value>,
}

impl Store {
    /// Creates a store with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any schema cannot be stored or a
    /// named archetype lists an undeclared component.
    pub fn new(schema: StoreSchema) -> Result<Self> {
        Self::with_config(schema, StoreConfig::default())
    }

    /// Creates a store.
    ///
    /// # Errors
    ///
    /// Same as [`Store::new`].
    pub fn with_config(schema: StoreSchema, config: StoreConfig) -> Result<Self> {
        let schema = schema.checked()?;
        let resources = schema
            .resources()
            .map(|(name, s)| (name.clone(), s.default_value()))
            .collect();
        let named: Vec<(Arc<str>, Vec<ComponentName>)> = schema
            .archetypes()
            .map(|(name, components)| (name.clone(), components.to_vec()))
            .collect();
        let mut store = Self::empty(schema, config, resources);
        for (name, components) in named {
            let id = store.ensure_archetype(&components)?;
            store.named.insert(name, id);
        }
        debug!(
            components = store.schema.components().count(),
            resources = store.resources.len(),
            archetypes = store.archetypes.len(),
            "created store"
        );
        Ok(store)
    }

    pub(crate) fn empty(
        schema: StoreSchema,
        config: StoreConfig,
        resources: BTreeMap<ComponentName, Value>,
    ) -> Self {
        Self {
            schema,
            config,
            archetypes: Vec::new(),
            index: HashMap::new(),
            named: HashMap::new(),
            locations: EntityLocationTable::new(),
            resources,
        }
    }

    /// Returns the schema the store was created with.
    #[must_use]
    pub fn schema(&self) -> &StoreSchema {
        &self.schema
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Archetypes
    // =========================================================================

    /// Returns the archetype with exactly these components (plus [`ID`]),
    /// creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponent` if a name was not declared.
    pub fn ensure_archetype<S: AsRef<str>>(&mut self, components: &[S]) -> Result<ArchetypeId> {
        let set = ComponentSet::from_names(
            components.iter().map(AsRef::as_ref).chain(std::iter::once(ID)),
        );
        self.ensure_set(set)
    }

    pub(crate) fn ensure_set(&mut self, set: ComponentSet) -> Result<ArchetypeId> {
        if let Some(id) = self.index.get(&set) {
            return Ok(*id);
        }
        let mut columns = Vec::with_capacity(set.len());
        for name in set.names() {
            let schema = self
                .schema
                .component_schema(name)
                .ok_or_else(|| Error::unknown_component(name.to_string()))?;
            let buffer = TypedBuffer::for_schema(schema, self.config.initial_capacity)
                .map_err(|reason| Error::invalid_schema(name.to_string(), reason))?;
            columns.push((name.clone(), buffer));
        }
        let id = u32::try_from(self.archetypes.len())
            .map(ArchetypeId)
            .map_err(|_| Error::new(ErrorKind::Internal("archetype limit reached".to_string())))?;
        debug!(archetype = id.0, components = %set, "created archetype");
        self.archetypes
            .push(Archetype::new(id, set.clone(), Table::new(columns)));
        self.index.insert(set, id);
        Ok(id)
    }

    /// Returns an archetype by id.
    #[must_use]
    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id.index())
    }

    /// Returns a named archetype declared in the schema.
    #[must_use]
    pub fn archetype_named(&self, name: &str) -> Option<&Archetype> {
        self.named.get(name).and_then(|id| self.archetype(*id))
    }

    /// Returns every archetype in creation order.
    #[must_use]
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Returns archetypes containing every `include` component and none of
    /// the `exclude` components, in creation order.
    #[must_use]
    pub fn query_archetypes<S: AsRef<str>>(&self, include: &[S], exclude: &[S]) -> Vec<&Archetype> {
        self.matching(include, exclude).collect()
    }

    fn matching<'a, S: AsRef<str>, X: AsRef<str>>(
        &'a self,
        include: &[S],
        exclude: &[X],
    ) -> impl Iterator<Item = &'a Archetype> {
        self.archetypes.iter().filter(move |a| {
            a.components().contains_all(include) && !a.components().contains_any(exclude)
        })
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Inserts an entity with the given components and returns its id.
    ///
    /// An [`ID`] entry in `values` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponent` or `Validation` without changing the store.
    pub fn insert(&mut self, values: &Record) -> Result<Entity> {
        let (archetype, values) = self.prepare_insert(values)?;
        let entity = self.archetypes[archetype.index()].insert(&values, &mut self.locations);
        trace!(%entity, archetype = archetype.0, "inserted entity");
        Ok(entity)
    }

    /// Inserts an entity, reusing `entity` as its id when that id is free.
    ///
    /// Used to replay logged inserts so later operations on the id still
    /// apply. Returns the id actually assigned.
    ///
    /// # Errors
    ///
    /// Same as [`Store::insert`].
    pub fn insert_as(&mut self, entity: Entity, values: &Record) -> Result<Entity> {
        let (archetype, values) = self.prepare_insert(values)?;
        let assigned =
            self.archetypes[archetype.index()].insert_as(entity, &values, &mut self.locations);
        trace!(entity = %assigned, requested = %entity, archetype = archetype.0, "inserted entity");
        Ok(assigned)
    }

    fn prepare_insert(&mut self, values: &Record) -> Result<(ArchetypeId, Record)> {
        let values = values.without_id();
        for (name, value) in values.iter() {
            self.check_value(name, value)?;
        }
        let names: Vec<&ComponentName> = values.names().collect();
        let archetype = self.ensure_archetype(&names)?;
        Ok((archetype, values))
    }

    fn check_value(&self, name: &str, value: &Value) -> Result<()> {
        let schema = self
            .schema
            .component_schema(name)
            .ok_or_else(|| Error::unknown_component(name))?;
        if self.config.validate {
            schema
                .validate(value)
                .map_err(|message| Error::validation(name, message))?;
        }
        Ok(())
    }

    /// Returns every column of an entity, including [`ID`].
    #[must_use]
    pub fn read(&self, entity: Entity) -> Option<Record> {
        let location = self.locations.locate(entity)?;
        Some(self.archetypes[location.archetype.index()].row(location.row_index()))
    }

    /// Returns one component of an entity.
    #[must_use]
    pub fn get(&self, entity: Entity, component: &str) -> Option<Value> {
        let location = self.locations.locate(entity)?;
        self.archetypes[location.archetype.index()]
            .table()
            .get(component, location.row_index())
    }

    /// Returns where an entity is stored.
    #[must_use]
    pub fn locate(&self, entity: Entity) -> Option<EntityLocation> {
        self.locations.locate(entity)
    }

    /// Returns true if the entity is live.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.locations.contains(entity)
    }

    /// Returns the archetype currently storing an entity.
    #[must_use]
    pub fn archetype_of(&self, entity: Entity) -> Option<&Archetype> {
        self.locations
            .locate(entity)
            .and_then(|location| self.archetype(location.archetype))
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.locations.len()
    }

    /// Iterates live entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.locations.iter().map(|(entity, _)| entity)
    }

    /// Applies a patch to an entity.
    ///
    /// Writes that keep the component set update the row in place. Adding or
    /// removing components moves the entity to the matching archetype,
    /// keeping every untouched value. Returns false if the entity is not
    /// live. An [`ID`] entry is ignored.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponent` or `Validation` without changing the store.
    pub fn update(&mut self, entity: Entity, patch: &Patch) -> Result<bool> {
        let Some(location) = self.locations.locate(entity) else {
            return Ok(false);
        };
        let mut writes = Record::new();
        let mut removals = Vec::new();
        for (name, value) in patch.iter() {
            if &**name == ID {
                continue;
            }
            match value {
                Some(value) => {
                    self.check_value(name, value)?;
                    writes.insert(name.clone(), value.clone());
                }
                None => removals.push(name.clone()),
            }
        }

        let from = location.archetype;
        let row = location.row_index();
        let current = self.archetypes[from.index()].components().clone();
        let mut target = current.clone();
        for name in writes.names() {
            target = target.with_component(name);
        }
        for name in &removals {
            target = target.without_component(name);
        }

        if target == current {
            self.archetypes[from.index()].update_row(row, &writes);
            return Ok(true);
        }

        let to = self.ensure_set(target)?;
        let mut data = self.archetypes[from.index()].row(row);
        for name in &removals {
            data.remove(name);
        }
        for (name, value) in writes.iter() {
            data.insert(name.clone(), value.clone());
        }
        self.archetypes[from.index()].delete_row(row, &mut self.locations);
        self.archetypes[to.index()].move_in(entity, &data, &mut self.locations);
        trace!(%entity, from = from.0, to = to.0, "migrated entity");
        Ok(true)
    }

    /// Deletes an entity. Returns false if it was not live.
    pub fn delete(&mut self, entity: Entity) -> bool {
        let Some(location) = self.locations.delete(entity) else {
            return false;
        };
        self.archetypes[location.archetype.index()]
            .delete_row(location.row_index(), &mut self.locations);
        trace!(%entity, archetype = location.archetype.0, "deleted entity");
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns rows of every entity having all `include` components.
    ///
    /// Rows are filtered by the option conditions, then stably sorted by the
    /// order keys; ties keep archetype-then-row order.
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, include: &[S], options: &SelectOptions) -> Vec<Record> {
        self.selected_rows(include, options)
            .into_iter()
            .map(|(archetype, row)| options.project_row(archetype, row))
            .collect()
    }

    /// Same as [`Store::select`] but returns ids only.
    #[must_use]
    pub fn select_entities<S: AsRef<str>>(&self, include: &[S], options: &SelectOptions) -> Vec<Entity> {
        self.selected_rows(include, options)
            .into_iter()
            .filter_map(|(archetype, row)| archetype.entity_at(row))
            .collect()
    }

    fn selected_rows<S: AsRef<str>>(
        &self,
        include: &[S],
        options: &SelectOptions,
    ) -> Vec<(&Archetype, usize)> {
        let archetypes = self.matching(include, &options.exclude);
        if options.is_plain() {
            return archetypes
                .flat_map(|a| (0..a.row_count()).map(move |row| (a, row)))
                .collect();
        }
        let mut rows: Vec<(&Archetype, usize, Vec<Value>)> = archetypes
            .flat_map(|a| (0..a.row_count()).map(move |row| (a, row)))
            .filter(|(a, row)| options.matches(a, *row))
            .map(|(a, row)| (a, row, options.sort_keys(a, row)))
            .collect();
        if !options.order.is_empty() {
            rows.sort_by(|x, y| options.compare_keys(&x.2, &y.2));
        }
        rows.into_iter().map(|(a, row, _)| (a, row)).collect()
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// Returns a resource value.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&Value> {
        self.resources.get(name)
    }

    /// Replaces a resource value and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns `UnknownResource` or `Validation` without changing the store.
    pub fn set_resource(&mut self, name: &str, value: Value) -> Result<Value> {
        let schema = self
            .schema
            .resource_schema(name)
            .ok_or_else(|| Error::unknown_resource(name))?;
        if self.config.validate {
            schema
                .validate(&value)
                .map_err(|message| Error::validation(name, message))?;
        }
        let slot = self
            .resources
            .get_mut(name)
            .ok_or_else(|| Error::unknown_resource(name))?;
        Ok(std::mem::replace(slot, value))
    }

    /// Iterates resources in name order.
    pub fn resources(&self) -> impl Iterator<Item = (&ComponentName, &Value)> {
        self.resources.iter()
    }

    /// Shrinks every archetype's capacity to its row count.
    pub fn compact(&mut self) {
        for archetype in &mut self.archetypes {
            archetype.compact();
        }
    }
}
