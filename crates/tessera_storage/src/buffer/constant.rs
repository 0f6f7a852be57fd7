//! Zero-storage columns for tag components.

use tessera_foundation::Value;

use super::Buffer;

/// A column whose every slot is the same value.
///
/// Writes are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstBuffer {
    value: Value,
    capacity: usize,
}

impl ConstBuffer {
    /// Creates a constant column.
    #[must_use]
    pub fn new(value: Value, capacity: usize) -> Self {
        Self { value, capacity }
    }

    /// Returns the constant.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Buffer for ConstBuffer {
    fn get(&self, _index: usize) -> Value {
        self.value.clone()
    }

    fn set(&mut self, _index: usize, _value: &Value) {}

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    fn copy_within(&mut self, _dst: usize, _start: usize, _end: usize) {}
}
