//! Fixed-width numeric columns.

use std::fmt;

use tessera_foundation::{NumberKind, Value};

use super::Buffer;

/// A numeric element type storable in a [`NumberBuffer`].
pub trait Element: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The schema kind this element stores.
    const KIND: NumberKind;

    /// Converts a value, or `None` if it is not a number.
    fn from_value(value: &Value) -> Option<Self>;

    /// Converts back to a value.
    fn into_value(self) -> Value;
}

#[allow(clippy::cast_possible_truncation)]
impl Element for i32 {
    const KIND: NumberKind = NumberKind::I32;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_number().map(|n| n as i32)
    }

    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
impl Element for u32 {
    const KIND: NumberKind = NumberKind::U32;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_number().map(|n| n as u32)
    }

    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

#[allow(clippy::cast_possible_truncation)]
impl Element for f32 {
    const KIND: NumberKind = NumberKind::F32;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_number().map(|n| n as f32)
    }

    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl Element for f64 {
    const KIND: NumberKind = NumberKind::F64;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_number()
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

/// A flat array of numbers of one element type.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberBuffer<T: Element> {
    data: Vec<T>,
    fill: T,
}

impl<T: Element> NumberBuffer<T> {
    /// Creates a buffer of `capacity` elements set to `fill`.
    #[must_use]
    pub fn new(capacity: usize, fill: T) -> Self {
        Self {
            data: vec![fill; capacity],
            fill,
        }
    }

    /// Returns the raw elements.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Element> Buffer for NumberBuffer<T> {
    fn get(&self, index: usize) -> Value {
        self.data[index].into_value()
    }

    /// Non-numeric values leave the slot unchanged.
    fn set(&mut self, index: usize, value: &Value) {
        if let Some(n) = T::from_value(value) {
            self.data[index] = n;
        }
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.data.resize(capacity, self.fill);
        self.data.shrink_to_fit();
    }

    fn copy_within(&mut self, dst: usize, start: usize, end: usize) {
        self.data.copy_within(start..end, dst);
    }
}
