//! Archetypes: one table per exact set of components.

use std::fmt;

use tessera_foundation::{ComponentName, Entity, ID, Record, Value};
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::location::{EntityLocation, EntityLocationTable};
use crate::table::Table;

/// Index of an archetype in its store, in creation order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ArchetypeId(pub u32);

impl ArchetypeId {
    /// Returns the id as an index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "archetype {}", self.0)
    }
}

/// An unordered set of component names, kept sorted for identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentSet {
    components: Vec<ComponentName>,
}

impl ComponentSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from names in any order.
    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut components: Vec<ComponentName> =
            names.into_iter().map(|n| ComponentName::from(n.as_ref())).collect();
        components.sort();
        components.dedup();
        Self { components }
    }

    /// Returns the names in sorted order.
    #[must_use]
    pub fn names(&self) -> &[ComponentName] {
        &self.components
    }

    /// Returns the number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Checks if this set contains a component.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.components
            .binary_search_by(|c| (**c).cmp(name))
            .is_ok()
    }

    /// Returns a new set with the component added.
    #[must_use]
    pub fn with_component(&self, name: &str) -> Self {
        match self.components.binary_search_by(|c| (**c).cmp(name)) {
            Ok(_) => self.clone(),
            Err(pos) => {
                let mut components = self.components.clone();
                components.insert(pos, name.into());
                Self { components }
            }
        }
    }

    /// Returns a new set with the component removed.
    #[must_use]
    pub fn without_component(&self, name: &str) -> Self {
        let mut components = self.components.clone();
        if let Ok(pos) = components.binary_search_by(|c| (**c).cmp(name)) {
            components.remove(pos);
        }
        Self { components }
    }

    /// Checks if this set contains every named component.
    #[must_use]
    pub fn contains_all<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|n| self.contains(n.as_ref()))
    }

    /// Checks if this set contains any named component.
    #[must_use]
    pub fn contains_any<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.contains(n.as_ref()))
    }
}

impl fmt::Display for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.components.join(", "))
    }
}

/// All entities sharing one exact component set, plus their `id` column.
#[derive(Clone, Debug)]
pub struct Archetype {
    id: ArchetypeId,
    components: ComponentSet,
    table: Table,
}

impl Archetype {
    /// Wraps a table whose columns are `components` (including [`ID`]).
    #[must_use]
    pub fn new(id: ArchetypeId, components: ComponentSet, table: Table) -> Self {
        debug_assert!(components.contains(ID));
        Self {
            id,
            components,
            table,
        }
    }

    /// Returns this archetype's id.
    #[must_use]
    pub const fn id(&self) -> ArchetypeId {
        self.id
    }

    /// Returns the component set, including [`ID`].
    #[must_use]
    pub const fn components(&self) -> &ComponentSet {
        &self.components
    }

    /// Returns the backing table.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the number of entities stored.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Returns the entity stored at `row`.
    #[must_use]
    pub fn entity_at(&self, row: usize) -> Option<Entity> {
        if row >= self.table.row_count() {
            return None;
        }
        self.table.get(ID, row).and_then(|v| v.as_entity())
    }

    /// Iterates stored entities in row order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.row_count()).filter_map(|row| self.entity_at(row))
    }

    /// Reads one row.
    #[must_use]
    pub fn row(&self, row: usize) -> Record {
        self.table.row(row)
    }

    /// Stores a new entity and allocates its id.
    pub fn insert(&mut self, values: &Record, locations: &mut EntityLocationTable) -> Entity {
        let row = self.table.add_row(values);
        let entity = locations.create(self.location(row));
        self.table.set(ID, row, &Value::from(entity));
        entity
    }

    /// Stores a new entity under `entity` if that id is free, otherwise under
    /// a fresh id. Returns the id used.
    pub fn insert_as(
        &mut self,
        entity: Entity,
        values: &Record,
        locations: &mut EntityLocationTable,
    ) -> Entity {
        let row = self.table.add_row(values);
        let location = self.location(row);
        let entity = if locations.create_at(entity, location) {
            entity
        } else {
            locations.create(location)
        };
        self.table.set(ID, row, &Value::from(entity));
        entity
    }

    /// Stores a row for an entity that already has an id, pointing its
    /// location here.
    pub fn move_in(&mut self, entity: Entity, values: &Record, locations: &mut EntityLocationTable) {
        let row = self.table.add_row(values);
        self.table.set(ID, row, &Value::from(entity));
        locations.update(entity, self.location(row));
    }

    /// Removes a row and repoints the entity that was moved into it.
    ///
    /// # Panics
    ///
    /// Panics if the moved row has no live entity, which means the location
    /// table and this archetype disagree.
    pub fn delete_row(&mut self, row: usize, locations: &mut EntityLocationTable) {
        if self.table.delete_row(row) {
            let location = self.location(row);
            let fixed = self
                .entity_at(row)
                .is_some_and(|moved| locations.update(moved, location));
            assert!(fixed, "row {row} of {} holds no live entity", self.id);
            trace!(archetype = self.id.0, row, "moved last row into hole");
        }
    }

    /// Writes the supplied columns of one row.
    pub fn update_row(&mut self, row: usize, values: &Record) {
        self.table.update_row(row, values);
    }

    /// Shrinks capacity to the row count.
    pub fn compact(&mut self) {
        self.table.compact();
    }

    #[allow(clippy::cast_possible_truncation)]
    fn location(&self, row: usize) -> EntityLocation {
        EntityLocation::new(self.id, row as u32)
    }
}
