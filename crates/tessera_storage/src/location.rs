//! Entity location index.
//!
//! The `EntityLocationTable` is the only record of where each live entity is
//! stored. Freed ids go on a free list and are handed out again, most
//! recently freed first, before the id space grows.

use tessera_foundation::Entity;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::archetype::ArchetypeId;

/// Where an entity's row lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityLocation {
    /// The archetype holding the row.
    pub archetype: ArchetypeId,
    /// The row index within the archetype.
    pub row: u32,
}

impl EntityLocation {
    /// Creates a location.
    #[must_use]
    pub const fn new(archetype: ArchetypeId, row: u32) -> Self {
        Self { archetype, row }
    }

    /// Returns the row as an index.
    #[must_use]
    pub const fn row_index(self) -> usize {
        self.row as usize
    }
}

/// Most ids [`EntityLocationTable::create_at`] will skip past the end of the
/// table.
pub const MAX_ID_GAP: usize = 1 << 16;

/// Opaque export of an [`EntityLocationTable`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocationSnapshot {
    /// One slot per id ever allocated; `None` for free ids.
    pub slots: Vec<Option<EntityLocation>>,
    /// Free ids, next to be reused last.
    pub free_list: Vec<u32>,
}

/// Maps entities to their storage location.
#[derive(Clone, Debug, Default)]
pub struct EntityLocationTable {
    slots: Vec<Option<EntityLocation>>,
    free_list: Vec<u32>,
    live_count: usize,
}

impl EntityLocationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id for an entity stored at `location`.
    ///
    /// # Panics
    ///
    /// Panics if every non-negative `i32` id is in use.
    pub fn create(&mut self, location: EntityLocation) -> Entity {
        self.live_count += 1;
        if let Some(index) = self.free_list.pop() {
            self.slots[index as usize] = Some(location);
            return Entity::from_index(index as usize).expect("free list holds valid ids");
        }
        let entity = Entity::from_index(self.slots.len()).expect("entity id space exhausted");
        self.slots.push(Some(location));
        entity
    }

    /// Claims a specific free id. Returns false if it is live, negative, or
    /// more than [`MAX_ID_GAP`] past the end of the table.
    ///
    /// Ids skipped over when growing the table are added to the free list.
    #[allow(clippy::cast_possible_truncation)]
    pub fn create_at(&mut self, entity: Entity, location: EntityLocation) -> bool {
        let Some(index) = entity.index() else {
            return false;
        };
        if index < self.slots.len() {
            if self.slots[index].is_some() {
                return false;
            }
            if let Some(pos) = self.free_list.iter().rposition(|&free| free as usize == index) {
                self.free_list.remove(pos);
            }
        } else {
            if index - self.slots.len() > MAX_ID_GAP {
                return false;
            }
            for gap in self.slots.len()..index {
                self.slots.push(None);
                self.free_list.push(gap as u32);
            }
            self.slots.push(None);
        }
        self.slots[index] = Some(location);
        self.live_count += 1;
        true
    }

    /// Moves a live entity. Returns false if the entity is not live.
    pub fn update(&mut self, entity: Entity, location: EntityLocation) -> bool {
        match self.slot_mut(entity) {
            Some(slot) if slot.is_some() => {
                *slot = Some(location);
                true
            }
            _ => false,
        }
    }

    /// Frees an id, returning its last location.
    ///
    /// Returns `None` for unknown or already deleted entities.
    #[allow(clippy::cast_sign_loss)]
    pub fn delete(&mut self, entity: Entity) -> Option<EntityLocation> {
        let location = self.slot_mut(entity)?.take()?;
        self.free_list.push(entity.id() as u32);
        self.live_count -= 1;
        Some(location)
    }

    /// Returns where the entity is stored, or `None` if it is not live.
    #[must_use]
    pub fn locate(&self, entity: Entity) -> Option<EntityLocation> {
        self.slots.get(entity.index()?).copied().flatten()
    }

    /// Returns true if the entity is live.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.locate(entity).is_some()
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates live entities with their locations, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, EntityLocation)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let location = (*slot)?;
            Entity::from_index(index).map(|e| (e, location))
        })
    }

    /// Exports the table.
    #[must_use]
    pub fn to_data(&self) -> LocationSnapshot {
        LocationSnapshot {
            slots: self.slots.clone(),
            free_list: self.free_list.clone(),
        }
    }

    /// Restores a table from an export.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the free list does not name
    /// exactly the empty slots.
    pub fn from_data(data: LocationSnapshot) -> Result<Self, String> {
        let mut free: Vec<usize> = data.free_list.iter().map(|&i| i as usize).collect();
        free.sort_unstable();
        let empty: Vec<usize> = data
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
            .collect();
        if free != empty {
            return Err("free list does not match empty slots".to_string());
        }
        if i32::try_from(data.slots.len()).is_err() {
            return Err("too many slots".to_string());
        }
        let live_count = data.slots.len() - empty.len();
        Ok(Self {
            slots: data.slots,
            free_list: data.free_list,
            live_count,
        })
    }

    fn slot_mut(&mut self, entity: Entity) -> Option<&mut Option<EntityLocation>> {
        self.slots.get_mut(entity.index()?)
    }
}
