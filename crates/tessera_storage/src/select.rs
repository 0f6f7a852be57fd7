//! Query options for [`Store::select`](crate::Store::select).

use std::cmp::Ordering;
use std::fmt;

use tessera_foundation::{ComponentName, ID, Record, Value};

use crate::archetype::Archetype;

/// A comparison operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparison {
    /// Applies the operator. Numbers compare across int and float.
    ///
    /// Ordered operators are false for incomparable values.
    #[must_use]
    pub fn test(self, left: &Value, right: &Value) -> bool {
        let ordering = left.partial_cmp(right);
        let equal = left == right || ordering == Some(Ordering::Equal);
        match self {
            Self::Eq => equal,
            Self::Ne => !equal,
            Self::Lt => ordering == Some(Ordering::Less),
            Self::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            Self::Gt => ordering == Some(Ordering::Greater),
            Self::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        })
    }
}

/// One `where` clause: `component <op> value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// Column to test.
    pub component: ComponentName,
    /// Operator.
    pub op: Comparison,
    /// Right-hand side.
    pub value: Value,
}

/// One sort key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    /// Column to sort by.
    pub component: ComponentName,
    /// Ascending if true.
    pub ascending: bool,
}

/// Options for a select.
///
/// With no conditions and no order, rows come back in archetype creation
/// order, then row order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectOptions {
    /// Archetypes containing any of these components are skipped.
    pub exclude: Vec<ComponentName>,
    /// Every condition must hold.
    pub conditions: Vec<Condition>,
    /// Sort keys, most significant first.
    pub order: Vec<OrderBy>,
    /// Columns to return besides [`ID`]; `None` returns every column.
    pub projection: Option<Vec<ComponentName>>,
}

impl SelectOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips archetypes with this component.
    #[must_use]
    pub fn exclude(mut self, component: impl Into<ComponentName>) -> Self {
        self.exclude.push(component.into());
        self
    }

    /// Adds a condition.
    #[must_use]
    pub fn filter(
        mut self,
        component: impl Into<ComponentName>,
        op: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push(Condition {
            component: component.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn where_eq(self, component: impl Into<ComponentName>, value: impl Into<Value>) -> Self {
        self.filter(component, Comparison::Eq, value)
    }

    /// Adds a sort key.
    #[must_use]
    pub fn order_by(mut self, component: impl Into<ComponentName>, ascending: bool) -> Self {
        self.order.push(OrderBy {
            component: component.into(),
            ascending,
        });
        self
    }

    /// Restricts returned columns.
    #[must_use]
    pub fn project<S: Into<ComponentName>>(mut self, components: impl IntoIterator<Item = S>) -> Self {
        self.projection = Some(components.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if rows can be read straight from storage order.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.conditions.is_empty() && self.order.is_empty()
    }

    pub(crate) fn matches(&self, archetype: &Archetype, row: usize) -> bool {
        self.conditions.iter().all(|c| {
            archetype
                .table()
                .get(&c.component, row)
                .is_some_and(|v| c.op.test(&v, &c.value))
        })
    }

    pub(crate) fn sort_keys(&self, archetype: &Archetype, row: usize) -> Vec<Value> {
        self.order
            .iter()
            .map(|o| archetype.table().get(&o.component, row).unwrap_or(Value::Null))
            .collect()
    }

    pub(crate) fn compare_keys(&self, a: &[Value], b: &[Value]) -> Ordering {
        for ((order, x), y) in self.order.iter().zip(a).zip(b) {
            let ordering = x.sort_cmp(y);
            let ordering = if order.ascending { ordering } else { ordering.reverse() };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    pub(crate) fn project_row(&self, archetype: &Archetype, row: usize) -> Record {
        match &self.projection {
            None => archetype.row(row),
            Some(columns) => {
                let mut record: Record = columns
                    .iter()
                    .filter_map(|name| archetype.table().get(name, row).map(|v| (name.clone(), v)))
                    .collect();
                if let Some(id) = archetype.table().get(ID, row) {
                    record.insert(ID, id);
                }
                record
            }
        }
    }
}
