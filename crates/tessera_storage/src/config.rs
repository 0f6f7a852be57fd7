//! Store configuration.

/// Capacity used for new archetype tables unless configured otherwise.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Configuration for a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Rows allocated when an archetype is created.
    pub initial_capacity: usize,

    /// Check written values against their schemas.
    pub validate: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            validate: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration that skips value validation.
    ///
    /// Values that do not match a column are then stored on a best-effort
    /// basis (numbers coerce, mismatched struct fields are skipped).
    #[must_use]
    pub fn unchecked() -> Self {
        Self {
            validate: false,
            ..Self::default()
        }
    }

    /// Builder method to set the initial table capacity.
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Builder method to toggle validation.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}
