//! Component maps: full rows ([`Record`]) and partial writes ([`Patch`]).

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::value::Value;

/// A component name.
pub type ComponentName = Arc<str>;

/// The name of the mandatory entity id column.
pub const ID: &str = "id";

/// Component values keyed by name.
///
/// Used for inserts (every component the entity should have) and for reads
/// (every column of the entity's row, including [`ID`]).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record(im::OrdMap<ComponentName, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this record with one more component.
    #[must_use]
    pub fn with(mut self, name: impl Into<ComponentName>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Sets a component value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<ComponentName>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Removes a component.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Returns a component value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns true if the component is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the entity stored in the [`ID`] column, if any.
    #[must_use]
    pub fn entity(&self) -> Option<Entity> {
        self.get(ID).and_then(Value::as_entity)
    }

    /// Returns a copy without the [`ID`] column.
    #[must_use]
    pub fn without_id(&self) -> Self {
        Self(self.0.without(ID))
    }

    /// Iterates component names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &ComponentName> {
        self.0.keys()
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentName, &Value)> {
        self.0.iter()
    }

    /// Returns the number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrites components from a patch; `None` entries remove.
    pub fn apply(&mut self, patch: &Patch) {
        for (name, value) in patch.iter() {
            match value {
                Some(v) => {
                    self.0.insert(name.clone(), v.clone());
                }
                None => {
                    self.0.remove(name);
                }
            }
        }
    }
}

impl<K: Into<ComponentName>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// A partial write to an entity.
///
/// `Some(value)` sets or adds a component; `None` removes it. Adding or
/// removing components moves the entity to another archetype.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Patch(im::OrdMap<ComponentName, Option<Value>>);

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this patch with a component set.
    #[must_use]
    pub fn set(mut self, name: impl Into<ComponentName>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), Some(value.into()));
        self
    }

    /// Returns this patch with a component removed.
    #[must_use]
    pub fn remove(mut self, name: impl Into<ComponentName>) -> Self {
        self.0.insert(name.into(), None);
        self
    }

    /// Records a raw entry.
    pub fn insert(&mut self, name: impl Into<ComponentName>, value: Option<Value>) {
        self.0.insert(name.into(), value);
    }

    /// Returns the entry for a component: `None` if untouched,
    /// `Some(None)` if removed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Option<&Value>> {
        self.0.get(name).map(Option::as_ref)
    }

    /// Returns true if the patch touches the component.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentName, Option<&Value>)> {
        self.0.iter().map(|(k, v)| (k, v.as_ref()))
    }

    /// Iterates touched component names.
    pub fn names(&self) -> impl Iterator<Item = &ComponentName> {
        self.0.keys()
    }

    /// Returns the number of touched components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if any entry removes a component.
    #[must_use]
    pub fn removes_any(&self) -> bool {
        self.0.values().any(Option::is_none)
    }

    /// Combines two patches; entries in `later` win.
    #[must_use]
    pub fn merged(&self, later: &Patch) -> Self {
        let mut merged = self.0.clone();
        for (name, value) in &later.0 {
            merged.insert(name.clone(), value.clone());
        }
        Self(merged)
    }
}

impl<K: Into<ComponentName>> FromIterator<(K, Option<Value>)> for Patch {
    fn from_iter<I: IntoIterator<Item = (K, Option<Value>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<Record> for Patch {
    fn from(record: Record) -> Self {
        Self(record.0.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            match value {
                Some(v) => map.entry(name, v),
                None => map.entry(name, &format_args!("<removed>")),
            };
        }
        map.finish()
    }
}
