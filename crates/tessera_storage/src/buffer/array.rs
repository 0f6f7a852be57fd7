//! Columns of boxed values for strings, booleans, and anything not packable.

use tessera_foundation::Value;

use super::Buffer;

/// A column storing one [`Value`] per slot.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayBuffer {
    data: Vec<Value>,
    fill: Value,
}

impl ArrayBuffer {
    /// Creates a buffer of `capacity` slots set to `fill`.
    #[must_use]
    pub fn new(capacity: usize, fill: Value) -> Self {
        Self {
            data: vec![fill.clone(); capacity],
            fill,
        }
    }
}

impl Buffer for ArrayBuffer {
    fn get(&self, index: usize) -> Value {
        self.data[index].clone()
    }

    fn set(&mut self, index: usize, value: &Value) {
        self.data[index] = value.clone();
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.data.resize(capacity, self.fill.clone());
        self.data.shrink_to_fit();
    }

    fn copy_within(&mut self, dst: usize, start: usize, end: usize) {
        let moved = self.data[start..end].to_vec();
        self.data[dst..dst + moved.len()].clone_from_slice(&moved);
    }
}
