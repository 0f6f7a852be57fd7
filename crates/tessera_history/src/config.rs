//! History configuration.

/// Default number of undo steps kept.
pub const DEFAULT_CAPACITY: usize = 100;

/// Configuration for an [`UndoRedoService`](crate::UndoRedoService).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of undo steps; the oldest is evicted beyond this.
    pub capacity: usize,
    /// Whether records are accepted at all.
    pub enabled: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            enabled: true,
        }
    }
}

impl HistoryConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History that never evicts.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            capacity: usize::MAX,
            enabled: true,
        }
    }

    /// History that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            capacity: 0,
            enabled: false,
        }
    }

    /// Builder method to set the capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder method to enable or disable recording.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
