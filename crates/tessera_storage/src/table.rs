//! Dense row tables built from typed columns.
//!
//! Rows `0..row_count` are always occupied. Deleting a row moves the last
//! row into the hole; the table reports when that happens but does not know
//! about entities, so callers must fix up the moved entity's location.

use tessera_foundation::{ComponentName, Record, Value};
use tracing::trace;

use crate::buffer::{Buffer, TypedBuffer};

/// A named column.
#[derive(Clone, Debug)]
struct Column {
    name: ComponentName,
    buffer: TypedBuffer,
}

/// Columns sharing one row index.
#[derive(Clone, Debug)]
pub struct Table {
    /// Sorted by name.
    columns: Vec<Column>,
    row_count: usize,
    row_capacity: usize,
}

impl Table {
    /// Creates an empty table from columns.
    ///
    /// Row capacity is the smallest column capacity.
    pub fn new(columns: impl IntoIterator<Item = (ComponentName, TypedBuffer)>) -> Self {
        Self::with_rows(columns, 0)
    }

    /// Creates a table whose first `row_count` rows are already filled in.
    ///
    /// # Panics
    ///
    /// Panics if any column holds fewer than `row_count` slots.
    pub fn with_rows(
        columns: impl IntoIterator<Item = (ComponentName, TypedBuffer)>,
        row_count: usize,
    ) -> Self {
        let mut columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, buffer)| Column { name, buffer })
            .collect();
        columns.sort_by(|a, b| a.name.cmp(&b.name));
        columns.dedup_by(|a, b| a.name == b.name);
        let row_capacity = columns
            .iter()
            .map(|c| c.buffer.capacity())
            .min()
            .unwrap_or(0);
        assert!(row_capacity >= row_count, "table rows exceed column capacity");
        Self {
            columns,
            row_count,
            row_capacity,
        }
    }

    /// Returns the number of occupied rows.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of allocated rows.
    #[must_use]
    pub const fn row_capacity(&self) -> usize {
        self.row_capacity
    }

    /// Returns true if the table has a column with this name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&TypedBuffer> {
        self.position(name).map(|i| &self.columns[i].buffer)
    }

    /// Iterates columns in name order.
    pub fn columns(&self) -> impl Iterator<Item = (&ComponentName, &TypedBuffer)> {
        self.columns.iter().map(|c| (&c.name, &c.buffer))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .binary_search_by(|c| (*c.name).cmp(name))
            .ok()
    }

    /// Grows every column so at least `rows` rows fit, doubling capacity.
    pub fn ensure_capacity(&mut self, rows: usize) {
        if rows <= self.row_capacity {
            return;
        }
        let capacity = (self.row_capacity * 2).max(rows);
        trace!(from = self.row_capacity, to = capacity, "growing table");
        for column in &mut self.columns {
            column.buffer.set_capacity(capacity);
        }
        self.row_capacity = capacity;
    }

    /// Appends a row and returns its index.
    ///
    /// Columns missing from `values` keep whatever the slot held before.
    pub fn add_row(&mut self, values: &Record) -> usize {
        let row = self.row_count;
        self.ensure_capacity(row + 1);
        self.row_count += 1;
        self.update_row(row, values);
        row
    }

    /// Removes a row by moving the last row into it.
    ///
    /// Returns true if a row was moved into `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not occupied.
    pub fn delete_row(&mut self, row: usize) -> bool {
        assert!(row < self.row_count, "row {row} out of bounds");
        let last = self.row_count - 1;
        let moved = row != last;
        if moved {
            for column in &mut self.columns {
                column.buffer.copy_within(row, last, last + 1);
            }
        }
        self.row_count = last;
        moved
    }

    /// Writes the supplied columns of one row. Unknown names are skipped.
    pub fn update_row(&mut self, row: usize, values: &Record) {
        for (name, value) in values.iter() {
            self.set(name, row, value);
        }
    }

    /// Writes one cell. Returns false if the column does not exist.
    pub fn set(&mut self, name: &str, row: usize, value: &Value) -> bool {
        match self.position(name) {
            Some(i) => {
                self.columns[i].buffer.set(row, value);
                true
            }
            None => false,
        }
    }

    /// Reads one cell.
    #[must_use]
    pub fn get(&self, name: &str, row: usize) -> Option<Value> {
        self.column(name).map(|buffer| buffer.get(row))
    }

    /// Reads every column of one row.
    #[must_use]
    pub fn row(&self, row: usize) -> Record {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.buffer.get(row)))
            .collect()
    }

    /// Shrinks capacity to exactly `row_count`.
    pub fn compact(&mut self) {
        if self.row_capacity > self.row_count {
            for column in &mut self.columns {
                column.buffer.set_capacity(self.row_count);
            }
            self.row_capacity = self.row_count;
        }
    }
}
