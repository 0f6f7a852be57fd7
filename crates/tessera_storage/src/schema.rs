//! Store schema: the components, resources, and named archetypes a store
//! is created with.

use std::collections::BTreeMap;
use std::sync::Arc;

use tessera_foundation::{ComponentName, Error, ID, Result, Schema};

use crate::buffer::TypedBuffer;

/// Declarations for a store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreSchema {
    components: BTreeMap<ComponentName, Schema>,
    resources: BTreeMap<ComponentName, Schema>,
    archetypes: Vec<(Arc<str>, Vec<ComponentName>)>,
}

impl StoreSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a component.
    #[must_use]
    pub fn component(mut self, name: impl Into<ComponentName>, schema: Schema) -> Self {
        self.components.insert(name.into(), schema);
        self
    }

    /// Declares a resource. Its schema default is the initial value.
    #[must_use]
    pub fn resource(mut self, name: impl Into<ComponentName>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Declares an archetype created with the store and reachable by name.
    #[must_use]
    pub fn archetype<S: Into<ComponentName>>(
        mut self,
        name: impl Into<Arc<str>>,
        components: impl IntoIterator<Item = S>,
    ) -> Self {
        self.archetypes
            .push((name.into(), components.into_iter().map(Into::into).collect()));
        self
    }

    /// Returns a component schema. [`ID`] is always declared.
    #[must_use]
    pub fn component_schema(&self, name: &str) -> Option<&Schema> {
        self.components.get(name)
    }

    /// Returns a resource schema.
    #[must_use]
    pub fn resource_schema(&self, name: &str) -> Option<&Schema> {
        self.resources.get(name)
    }

    /// Iterates declared components (excluding [`ID`]) in name order.
    pub fn components(&self) -> impl Iterator<Item = (&ComponentName, &Schema)> {
        self.components.iter().filter(|(name, _)| &***name != ID)
    }

    /// Iterates declared resources in name order.
    pub fn resources(&self) -> impl Iterator<Item = (&ComponentName, &Schema)> {
        self.resources.iter()
    }

    /// Iterates named archetypes in declaration order.
    pub fn archetypes(&self) -> impl Iterator<Item = (&Arc<str>, &[ComponentName])> {
        self.archetypes.iter().map(|(n, c)| (n, c.as_slice()))
    }

    /// Checks every declaration and adds the implicit [`ID`] component.
    ///
    /// # Errors
    ///
    /// - `InvalidSchema` if a name is reserved, a default does not conform
    ///   to its schema, or a schema cannot be stored
    /// - `UnknownComponent` if a named archetype lists an undeclared component
    pub(crate) fn checked(mut self) -> Result<Self> {
        if self.components.contains_key(ID) {
            return Err(Error::invalid_schema(ID, "component name is reserved"));
        }
        for (name, schema) in self.components.iter().chain(self.resources.iter()) {
            check(name, schema)?;
        }
        for (_, components) in &self.archetypes {
            if let Some(unknown) = components.iter().find(|c| !self.components.contains_key(*c)) {
                return Err(Error::unknown_component(unknown.to_string()));
            }
        }
        self.components.insert(ID.into(), Schema::entity());
        Ok(self)
    }
}

fn check(name: &str, schema: &Schema) -> Result<()> {
    schema
        .validate(&schema.default_value())
        .map_err(|reason| Error::invalid_schema(name, format!("default value: {reason}")))?;
    TypedBuffer::for_schema(schema, 0)
        .map(|_| ())
        .map_err(|reason| Error::invalid_schema(name, reason))
}
