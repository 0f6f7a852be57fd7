//! Static field layouts for struct columns.
//!
//! A layout maps every leaf of an object or fixed-length array schema to a
//! byte offset inside one row. Leaves are 32-bit words read as `f32`, `i32`,
//! or `u32`.
//!
//! Two rule sets are supported:
//! - [`Layout::Std140`]: nested structs and arrays align to 16 bytes, struct
//!   sizes round up to 16, arrays of structs use a 16-byte stride. A
//!   3-element primitive array is 12 bytes.
//! - [`Layout::Packed`]: no padding beyond 4-byte primitives.

use std::sync::Arc;

use tessera_foundation::{Layout, NumberKind, Schema, SchemaKind, Value};

/// A 32-bit lane type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    /// IEEE single precision.
    F32,
    /// Two's complement signed.
    I32,
    /// Unsigned.
    U32,
}

impl Primitive {
    fn of(schema: &Schema) -> Option<Self> {
        match schema.number_kind()? {
            NumberKind::F32 => Some(Self::F32),
            NumberKind::I32 => Some(Self::I32),
            NumberKind::U32 => Some(Self::U32),
            NumberKind::F64 => None,
        }
    }

    /// Decodes a word.
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub fn read(self, word: u32) -> Value {
        match self {
            Self::F32 => Value::Float(f64::from(f32::from_bits(word))),
            Self::I32 => Value::Int(i64::from(word as i32)),
            Self::U32 => Value::Int(i64::from(word)),
        }
    }

    /// Encodes a value, or `None` if it is not a number.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn write(self, value: &Value) -> Option<u32> {
        let n = value.as_number()?;
        Some(match self {
            Self::F32 => (n as f32).to_bits(),
            Self::I32 => (n as i32) as u32,
            Self::U32 => n as u32,
        })
    }
}

/// What a field holds.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
    /// One word.
    Primitive(Primitive),
    /// A nested struct or array.
    Nested(Arc<StructLayout>),
}

impl FieldType {
    fn size(&self) -> usize {
        match self {
            Self::Primitive(_) => 4,
            Self::Nested(layout) => layout.size,
        }
    }
}

/// One field at a byte offset from the start of its parent.
#[derive(Clone, Debug, PartialEq)]
pub struct StructField {
    /// Field name. Array elements are named by index.
    pub name: Arc<str>,
    /// Byte offset.
    pub offset: usize,
    /// Field type.
    pub ty: FieldType,
}

/// Whether a layout decodes to a struct or an array value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Named fields.
    Object,
    /// Positional elements.
    Array,
}

/// A computed layout.
#[derive(Clone, Debug, PartialEq)]
pub struct StructLayout {
    /// Value shape.
    pub shape: Shape,
    /// Bytes per row.
    pub size: usize,
    /// Fields in declaration order.
    pub fields: Vec<StructField>,
    /// Rules the layout was computed with.
    pub layout: Layout,
}

const fn round_up(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

const fn aggregate_align(layout: Layout) -> usize {
    match layout {
        Layout::Std140 => 16,
        Layout::Packed => 1,
    }
}

impl StructLayout {
    /// Computes the layout of `schema` under its own layout rules.
    ///
    /// # Errors
    ///
    /// Returns the reason when the schema is not an object or fixed-length
    /// array built entirely from 32-bit numbers.
    pub fn of(schema: &Schema) -> Result<Self, String> {
        Self::compute(schema, schema.layout())
    }

    fn compute(schema: &Schema, layout: Layout) -> Result<Self, String> {
        match schema.kind() {
            SchemaKind::FixedArray { items, length } => Self::array(items, *length, layout),
            SchemaKind::Object(fields) => Self::object(fields, layout),
            _ => Err(format!("{schema} is not an object or fixed-length array")),
        }
    }

    fn element(schema: &Schema, layout: Layout) -> Result<FieldType, String> {
        match Primitive::of(schema) {
            Some(p) => Ok(FieldType::Primitive(p)),
            None => Self::compute(schema, layout).map(|l| FieldType::Nested(Arc::new(l))),
        }
    }

    fn array(items: &Schema, length: usize, layout: Layout) -> Result<Self, String> {
        if length == 0 {
            return Err("array length must be at least 1".to_string());
        }
        let element = Self::element(items, layout)
            .map_err(|reason| format!("array element: {reason}"))?;

        if length == 3 && matches!(element, FieldType::Primitive(_)) {
            let fields = (0..3)
                .map(|i| StructField {
                    name: i.to_string().into(),
                    offset: i * 4,
                    ty: element.clone(),
                })
                .collect();
            return Ok(Self {
                shape: Shape::Array,
                size: 12,
                fields,
                layout,
            });
        }

        let (align, stride) = match &element {
            FieldType::Primitive(_) => (4, 4),
            FieldType::Nested(nested) => (
                aggregate_align(layout),
                match layout {
                    Layout::Packed => nested.size,
                    Layout::Std140 => round_up(nested.size, 16),
                },
            ),
        };
        let mut offset = 0;
        let mut fields = Vec::with_capacity(length);
        for i in 0..length {
            offset = round_up(offset, align);
            fields.push(StructField {
                name: i.to_string().into(),
                offset,
                ty: element.clone(),
            });
            offset += stride;
        }
        Ok(Self {
            shape: Shape::Array,
            size: round_up(offset, aggregate_align(layout)),
            fields,
            layout,
        })
    }

    fn object(declared: &[(Arc<str>, Schema)], layout: Layout) -> Result<Self, String> {
        if declared.is_empty() {
            return Err("object has no fields".to_string());
        }
        let mut offset = 0;
        let mut fields = Vec::with_capacity(declared.len());
        for (name, schema) in declared {
            let ty = Self::element(schema, layout)
                .map_err(|reason| format!("field {name}: {reason}"))?;
            let align = match ty {
                FieldType::Primitive(_) => 4,
                FieldType::Nested(_) => aggregate_align(layout),
            };
            offset = round_up(offset, align);
            let size = ty.size();
            fields.push(StructField {
                name: name.clone(),
                offset,
                ty,
            });
            offset += size;
        }
        Ok(Self {
            shape: Shape::Object,
            size: round_up(offset, aggregate_align(layout)),
            fields,
            layout,
        })
    }

    /// Returns the row size in 32-bit words.
    #[must_use]
    pub const fn words(&self) -> usize {
        self.size / 4
    }

    /// Returns a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    /// Decodes the row starting at word `base`.
    #[must_use]
    pub fn read(&self, words: &[u32], base: usize) -> Value {
        let decoded = self.fields.iter().map(|field| {
            let at = base + field.offset / 4;
            match &field.ty {
                FieldType::Primitive(p) => p.read(words[at]),
                FieldType::Nested(nested) => nested.read(words, at),
            }
        });
        match self.shape {
            Shape::Object => Value::Struct(
                self.fields
                    .iter()
                    .map(|f| f.name.clone())
                    .zip(decoded)
                    .collect(),
            ),
            Shape::Array => Value::Array(decoded.collect()),
        }
    }

    /// Encodes `value` into the row starting at word `base`.
    ///
    /// Fields missing from `value` keep their previous words.
    pub fn write(&self, words: &mut [u32], base: usize, value: &Value) {
        for (i, field) in self.fields.iter().enumerate() {
            let part = match self.shape {
                Shape::Object => value.field(&field.name),
                Shape::Array => value.as_array().and_then(|items| items.get(i)),
            };
            let Some(part) = part else { continue };
            let at = base + field.offset / 4;
            match &field.ty {
                FieldType::Primitive(p) => {
                    if let Some(word) = p.write(part) {
                        words[at] = word;
                    }
                }
                FieldType::Nested(nested) => nested.write(words, at, part),
            }
        }
    }
}
