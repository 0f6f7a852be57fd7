//! Declarative schemas for components and resources.
//!
//! A [`Schema`] is plain data: a type tag, an optional default value, and for
//! struct-like shapes an optional memory [`Layout`]. Storage picks a column
//! representation from the schema, and writes are validated against it.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Element type of a numeric column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumberKind {
    /// 32-bit signed integer.
    I32,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl NumberKind {
    /// Returns true for integer kinds.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::I32 | Self::U32)
    }

    /// Returns true if values fit in one 32-bit word.
    #[must_use]
    pub const fn is_word(self) -> bool {
        !matches!(self, Self::F64)
    }

    /// Inclusive bounds representable by this kind.
    #[must_use]
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Self::I32 => (f64::from(i32::MIN), f64::from(i32::MAX)),
            Self::U32 => (0.0, f64::from(u32::MAX)),
            Self::F32 => (f64::from(f32::MIN), f64::from(f32::MAX)),
            Self::F64 => (f64::MIN, f64::MAX),
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Memory layout for struct columns.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Layout {
    /// Uniform-buffer rules: 16-byte aligned structs and array elements.
    #[default]
    Std140,
    /// Tight packing with 4-byte primitives.
    Packed,
}

/// The shape of a schema.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SchemaKind {
    /// Accepts any value.
    Any,
    /// `true` or `false`.
    Boolean,
    /// A number of the given element kind, with optional inclusive bounds.
    Number {
        /// Storage element type.
        kind: NumberKind,
        /// Inclusive lower bound.
        minimum: Option<f64>,
        /// Inclusive upper bound.
        maximum: Option<f64>,
    },
    /// A string, optionally bounded in length.
    String {
        /// Maximum length in characters.
        max_length: Option<usize>,
    },
    /// Exactly one value. Tag components are `Const(true)`.
    Const(Value),
    /// Null or the inner schema.
    Nullable(Box<Schema>),
    /// An array of exactly `length` items.
    FixedArray {
        /// Item schema.
        items: Box<Schema>,
        /// Required length.
        length: usize,
    },
    /// An array of any length.
    List(Box<Schema>),
    /// A struct with every listed field present.
    Object(Vec<(Arc<str>, Schema)>),
}

/// A component or resource schema.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schema {
    kind: SchemaKind,
    default: Option<Value>,
    layout: Option<Layout>,
}

impl Schema {
    /// Creates a schema of the given kind.
    #[must_use]
    pub const fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            default: None,
            layout: None,
        }
    }

    /// Any value.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// A boolean.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    /// A number stored as `kind`.
    #[must_use]
    pub const fn number(kind: NumberKind) -> Self {
        Self::new(SchemaKind::Number {
            kind,
            minimum: None,
            maximum: None,
        })
    }

    /// A 32-bit float.
    #[must_use]
    pub const fn f32() -> Self {
        Self::number(NumberKind::F32)
    }

    /// A 64-bit float.
    #[must_use]
    pub const fn f64() -> Self {
        Self::number(NumberKind::F64)
    }

    /// A 32-bit signed integer.
    #[must_use]
    pub const fn i32() -> Self {
        Self::number(NumberKind::I32)
    }

    /// A 32-bit unsigned integer.
    #[must_use]
    pub const fn u32() -> Self {
        Self::number(NumberKind::U32)
    }

    /// An integer in `minimum..=maximum`, stored in the narrowest kind that
    /// holds the range.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn integer(minimum: i64, maximum: i64) -> Self {
        let kind = if minimum >= 0 && maximum <= i64::from(u32::MAX) {
            NumberKind::U32
        } else if minimum >= i64::from(i32::MIN) && maximum <= i64::from(i32::MAX) {
            NumberKind::I32
        } else {
            NumberKind::F64
        };
        Self::new(SchemaKind::Number {
            kind,
            minimum: Some(minimum as f64),
            maximum: Some(maximum as f64),
        })
    }

    /// An entity id column.
    #[must_use]
    pub fn entity() -> Self {
        Self::i32().with_default(-1)
    }

    /// A string.
    #[must_use]
    pub const fn string() -> Self {
        Self::new(SchemaKind::String { max_length: None })
    }

    /// A constant value.
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Const(value.into()))
    }

    /// A zero-size marker component.
    #[must_use]
    pub fn tag() -> Self {
        Self::constant(true)
    }

    /// Null or `inner`.
    #[must_use]
    pub fn nullable(inner: Schema) -> Self {
        Self::new(SchemaKind::Nullable(Box::new(inner)))
    }

    /// An array of exactly `length` items.
    #[must_use]
    pub fn fixed_array(items: Schema, length: usize) -> Self {
        Self::new(SchemaKind::FixedArray {
            items: Box::new(items),
            length,
        })
    }

    /// An array of any length.
    #[must_use]
    pub fn list(items: Schema) -> Self {
        Self::new(SchemaKind::List(Box::new(items)))
    }

    /// A struct with the given fields, in declaration order.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<Arc<str>>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::new(SchemaKind::Object(
            fields.into_iter().map(|(k, s)| (k.into(), s)).collect(),
        ))
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Requests an explicit struct layout.
    ///
    /// A schema with an explicit layout must be representable as a struct
    /// column, or store creation fails.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sets inclusive numeric bounds. No effect on non-numeric schemas.
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        if let SchemaKind::Number {
            minimum, maximum, ..
        } = &mut self.kind
        {
            *minimum = Some(min);
            *maximum = Some(max);
        }
        self
    }

    /// Sets a maximum string length. No effect on non-string schemas.
    #[must_use]
    pub fn with_max_length(mut self, length: usize) -> Self {
        if let SchemaKind::String { max_length } = &mut self.kind {
            *max_length = Some(length);
        }
        self
    }

    /// Returns the shape of this schema.
    #[must_use]
    pub const fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Returns the explicitly requested layout, if any.
    #[must_use]
    pub const fn explicit_layout(&self) -> Option<Layout> {
        self.layout
    }

    /// Returns the layout used for struct columns.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout.unwrap_or_default()
    }

    /// Returns the numeric kind if this is a number schema.
    #[must_use]
    pub const fn number_kind(&self) -> Option<NumberKind> {
        match self.kind {
            SchemaKind::Number { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Returns the default value, deriving one from the shape when none was
    /// set.
    #[must_use]
    pub fn default_value(&self) -> Value {
        if let Some(value) = &self.default {
            return value.clone();
        }
        match &self.kind {
            SchemaKind::Any | SchemaKind::Nullable(_) => Value::Null,
            SchemaKind::Boolean => Value::Bool(false),
            SchemaKind::Number { kind, minimum, .. } => {
                let floor = minimum.filter(|m| *m > 0.0).unwrap_or(0.0);
                number_value(*kind, floor)
            }
            SchemaKind::String { .. } => Value::from(""),
            SchemaKind::Const(value) => value.clone(),
            SchemaKind::FixedArray { items, length } => {
                Value::array(std::iter::repeat_n(items.default_value(), *length))
            }
            SchemaKind::List(_) => Value::Array(im::Vector::new()),
            SchemaKind::Object(fields) => Value::Struct(
                fields
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.default_value()))
                    .collect(),
            ),
        }
    }

    /// Checks a value against this schema.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending path when the value does not
    /// conform.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.validate_at(value, "")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), String> {
        let fail = |message: String| {
            if path.is_empty() {
                Err(message)
            } else {
                Err(format!("{path}: {message}"))
            }
        };
        match &self.kind {
            SchemaKind::Any => Ok(()),
            SchemaKind::Boolean => match value {
                Value::Bool(_) => Ok(()),
                other => fail(format!("expected boolean, got {}", other.type_name())),
            },
            SchemaKind::Number {
                kind,
                minimum,
                maximum,
            } => {
                let Some(n) = value.as_number() else {
                    return fail(format!("expected number, got {}", value.type_name()));
                };
                if !n.is_finite() {
                    return fail(format!("expected finite number, got {n}"));
                }
                if kind.is_integer() && value.as_int().is_none() {
                    return fail(format!("expected integer, got {n}"));
                }
                let (lo, hi) = kind.bounds();
                let lo = minimum.map_or(lo, |m| m.max(lo));
                let hi = maximum.map_or(hi, |m| m.min(hi));
                if n < lo || n > hi {
                    return fail(format!("{n} is outside {lo}..={hi}"));
                }
                Ok(())
            }
            SchemaKind::String { max_length } => match value {
                Value::String(s) => match max_length {
                    Some(max) if s.chars().count() > *max => {
                        fail(format!("string longer than {max} characters"))
                    }
                    _ => Ok(()),
                },
                other => fail(format!("expected string, got {}", other.type_name())),
            },
            SchemaKind::Const(expected) => {
                if value == expected {
                    Ok(())
                } else {
                    fail(format!("expected constant {expected}, got {value}"))
                }
            }
            SchemaKind::Nullable(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate_at(value, path)
                }
            }
            SchemaKind::FixedArray { items, length } => {
                let Some(values) = value.as_array() else {
                    return fail(format!("expected array, got {}", value.type_name()));
                };
                if values.len() != *length {
                    return fail(format!("expected {length} items, got {}", values.len()));
                }
                validate_items(items, values, path)
            }
            SchemaKind::List(items) => match value.as_array() {
                Some(values) => validate_items(items, values, path),
                None => fail(format!("expected array, got {}", value.type_name())),
            },
            SchemaKind::Object(fields) => {
                let Some(present) = value.as_struct() else {
                    return fail(format!("expected object, got {}", value.type_name()));
                };
                for (name, schema) in fields {
                    let child = join(path, name);
                    match present.get(name) {
                        Some(v) => schema.validate_at(v, &child)?,
                        None => return Err(format!("{child}: missing field")),
                    }
                }
                if let Some(extra) = present
                    .keys()
                    .find(|key| !fields.iter().any(|(name, _)| name == *key))
                {
                    return fail(format!("unexpected field {extra}"));
                }
                Ok(())
            }
        }
    }
}

fn validate_items(items: &Schema, values: &im::Vector<Value>, path: &str) -> Result<(), String> {
    values
        .iter()
        .enumerate()
        .try_for_each(|(i, v)| items.validate_at(v, &format!("{path}[{i}]")))
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

/// Builds the value a number column of `kind` reads back for `n`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(kind: NumberKind, n: f64) -> Value {
    match kind {
        NumberKind::I32 | NumberKind::U32 => Value::Int(n as i64),
        NumberKind::F32 => Value::Float(f64::from(n as f32)),
        NumberKind::F64 => Value::Float(n),
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SchemaKind::Any => write!(f, "any"),
            SchemaKind::Boolean => write!(f, "boolean"),
            SchemaKind::Number { kind, .. } => write!(f, "{kind}"),
            SchemaKind::String { .. } => write!(f, "string"),
            SchemaKind::Const(value) => write!(f, "const {value}"),
            SchemaKind::Nullable(inner) => write!(f, "{inner}?"),
            SchemaKind::FixedArray { items, length } => write!(f, "[{items}; {length}]"),
            SchemaKind::List(items) => write!(f, "[{items}]"),
            SchemaKind::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, schema)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {schema}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
