//! Typed columnar buffers.
//!
//! Every column in a table is a [`TypedBuffer`], a closed set of variants
//! sharing the [`Buffer`] access contract:
//! - numbers of one element kind in a flat array
//! - fixed-layout structs over a shared word array
//! - a constant (tags), which stores nothing
//! - boxed values for everything else
//!
//! The variant is chosen from the column schema once, at creation.

mod array;
mod constant;
pub mod layout;
mod number;
mod structs;

pub use array::ArrayBuffer;
pub use constant::ConstBuffer;
pub use layout::StructLayout;
pub use number::{Element, NumberBuffer};
pub use structs::StructBuffer;

use tessera_foundation::{NumberKind, Schema, SchemaKind, Value};

/// Uniform access to a column.
///
/// Indices are slots, not rows; callers keep them below [`Buffer::capacity`].
/// Reading or writing past capacity panics, except on constant columns.
pub trait Buffer {
    /// Reads the value at `index`.
    fn get(&self, index: usize) -> Value;

    /// Writes the value at `index`.
    fn set(&mut self, index: usize, value: &Value);

    /// Returns the number of slots.
    fn capacity(&self) -> usize;

    /// Grows or shrinks to `capacity` slots, preserving the first
    /// `min(old, new)` slots. New slots hold the schema default.
    fn set_capacity(&mut self, capacity: usize);

    /// Copies slots `start..end` to `dst..`.
    fn copy_within(&mut self, dst: usize, start: usize, end: usize);

    /// Reads slots `start..end`.
    fn slice(&self, start: usize, end: usize) -> Vec<Value> {
        (start..end).map(|i| self.get(i)).collect()
    }
}

/// Which representation a column uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// Flat numbers.
    Number(NumberKind),
    /// Fixed-layout structs.
    Struct,
    /// A single constant.
    Const,
    /// Boxed values.
    Array,
}

/// A column of one schema type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedBuffer {
    /// 32-bit signed integers.
    I32(NumberBuffer<i32>),
    /// 32-bit unsigned integers.
    U32(NumberBuffer<u32>),
    /// 32-bit floats.
    F32(NumberBuffer<f32>),
    /// 64-bit floats.
    F64(NumberBuffer<f64>),
    /// Fixed-layout structs.
    Struct(StructBuffer),
    /// Tag columns.
    Const(ConstBuffer),
    /// Boxed values.
    Array(ArrayBuffer),
}

impl TypedBuffer {
    /// Creates a column for `schema` with `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns the reason if the schema requests an explicit struct layout
    /// that cannot be computed.
    pub fn for_schema(schema: &Schema, capacity: usize) -> Result<Self, String> {
        let fill = schema.default_value();
        Ok(match schema.kind() {
            SchemaKind::Const(value) => Self::Const(ConstBuffer::new(value.clone(), capacity)),
            SchemaKind::Number { kind, .. } => Self::number(*kind, capacity, &fill),
            _ => match StructLayout::of(schema) {
                Ok(layout) => Self::Struct(StructBuffer::new(layout, capacity, fill)),
                Err(reason) if schema.explicit_layout().is_some() => return Err(reason),
                Err(_) => Self::Array(ArrayBuffer::new(capacity, fill)),
            },
        })
    }

    /// Creates a column for `schema` holding `values`, with at least
    /// `capacity` slots.
    ///
    /// # Errors
    ///
    /// Same as [`TypedBuffer::for_schema`].
    pub fn from_values(schema: &Schema, values: &[Value], capacity: usize) -> Result<Self, String> {
        let mut buffer = Self::for_schema(schema, capacity.max(values.len()))?;
        for (i, value) in values.iter().enumerate() {
            buffer.set(i, value);
        }
        Ok(buffer)
    }

    fn number(kind: NumberKind, capacity: usize, fill: &Value) -> Self {
        match kind {
            NumberKind::I32 => {
                Self::I32(NumberBuffer::new(capacity, i32::from_value(fill).unwrap_or_default()))
            }
            NumberKind::U32 => {
                Self::U32(NumberBuffer::new(capacity, u32::from_value(fill).unwrap_or_default()))
            }
            NumberKind::F32 => {
                Self::F32(NumberBuffer::new(capacity, f32::from_value(fill).unwrap_or_default()))
            }
            NumberKind::F64 => {
                Self::F64(NumberBuffer::new(capacity, f64::from_value(fill).unwrap_or_default()))
            }
        }
    }

    /// Returns the representation in use.
    #[must_use]
    pub const fn kind(&self) -> BufferKind {
        match self {
            Self::I32(_) => BufferKind::Number(NumberKind::I32),
            Self::U32(_) => BufferKind::Number(NumberKind::U32),
            Self::F32(_) => BufferKind::Number(NumberKind::F32),
            Self::F64(_) => BufferKind::Number(NumberKind::F64),
            Self::Struct(_) => BufferKind::Struct,
            Self::Const(_) => BufferKind::Const,
            Self::Array(_) => BufferKind::Array,
        }
    }

    /// Returns an independent deep copy.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    fn inner(&self) -> &dyn Buffer {
        match self {
            Self::I32(b) => b,
            Self::U32(b) => b,
            Self::F32(b) => b,
            Self::F64(b) => b,
            Self::Struct(b) => b,
            Self::Const(b) => b,
            Self::Array(b) => b,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Buffer {
        match self {
            Self::I32(b) => b,
            Self::U32(b) => b,
            Self::F32(b) => b,
            Self::F64(b) => b,
            Self::Struct(b) => b,
            Self::Const(b) => b,
            Self::Array(b) => b,
        }
    }
}

impl Buffer for TypedBuffer {
    fn get(&self, index: usize) -> Value {
        self.inner().get(index)
    }

    fn set(&mut self, index: usize, value: &Value) {
        self.inner_mut().set(index, value);
    }

    fn capacity(&self) -> usize {
        self.inner().capacity()
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.inner_mut().set_capacity(capacity);
    }

    fn copy_within(&mut self, dst: usize, start: usize, end: usize) {
        self.inner_mut().copy_within(dst, start, end);
    }
}
