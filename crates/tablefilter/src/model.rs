//! # Data Source Boundary
//!
//! The filters never own the data. They read it through [`TableModel`], which
//! exposes exactly what the coordinator and the choice extraction need: row and
//! column counts, a value accessor and the declared column type.
//!
//! Data mutations are described by [`TableEvent`]s. The host forwards every
//! event it produces to [`crate::FilterCoordinator::table_changed`], after the
//! model borrow has been released.
//!
//! [`MemTable`] is an in-memory model used by the CLI and the tests. Its
//! mutators return the event the caller must forward.

use crate::error::{FilterError, Result};
use crate::value::{format_value, ColumnType, FormatRef, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Read access to tabular data.
pub trait TableModel {
    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;
    fn value_at(&self, row: usize, column: usize) -> Value;
    fn column_type(&self, column: usize) -> ColumnType;

    fn column_name(&self, column: usize) -> String {
        format!("column {}", column)
    }
}

/// The model as shared between the host, the view and the coordinator.
pub type SharedModel = Rc<RefCell<dyn TableModel>>;

/// A single row as seen by a filter predicate.
pub trait RowEntry {
    /// Model index of the row.
    fn row(&self) -> usize;
    fn value_count(&self) -> usize;
    fn value(&self, column: usize) -> Value;
    /// The value rendered with the column editor's format, if any.
    fn string_value(&self, column: usize) -> String;
}

/// Row entry backed by a [`TableModel`].
pub struct ModelRow<'a> {
    model: &'a dyn TableModel,
    formats: &'a [Option<FormatRef>],
    row: usize,
}

impl<'a> ModelRow<'a> {
    pub fn new(model: &'a dyn TableModel, formats: &'a [Option<FormatRef>], row: usize) -> Self {
        Self {
            model,
            formats,
            row,
        }
    }
}

impl RowEntry for ModelRow<'_> {
    fn row(&self) -> usize {
        self.row
    }

    fn value_count(&self) -> usize {
        self.model.column_count()
    }

    fn value(&self, column: usize) -> Value {
        self.model.value_at(self.row, column)
    }

    fn string_value(&self, column: usize) -> String {
        let format = self.formats.get(column).and_then(Option::as_ref);
        format_value(format, &self.value(column))
    }
}

/// Reusable helper that walks the rows of a model with a fixed set of
/// per-column formats. Rebuilt whenever the set of editors changes.
#[derive(Clone, Default)]
pub struct RowCursor {
    formats: Vec<Option<FormatRef>>,
}

impl RowCursor {
    pub fn new(formats: Vec<Option<FormatRef>>) -> Self {
        Self { formats }
    }

    pub fn at<'a>(&'a self, model: &'a dyn TableModel, row: usize) -> ModelRow<'a> {
        ModelRow::new(model, &self.formats, row)
    }

    /// Returns true as soon as one row of `model` satisfies `accept`.
    pub fn any_row(&self, model: &dyn TableModel, mut accept: impl FnMut(&dyn RowEntry) -> bool) -> bool {
        (0..model.row_count()).rev().any(|row| accept(&self.at(model, row)))
    }
}

/// What happened to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Insert,
    Update,
    Delete,
    /// Columns were added, removed or replaced.
    StructureChanged,
}

/// A data mutation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEvent {
    pub kind: EventKind,
    pub first_row: usize,
    pub last_row: usize,
    /// The affected column, `None` when every column is affected.
    pub column: Option<usize>,
}

impl TableEvent {
    pub fn inserted(first_row: usize, last_row: usize) -> Self {
        Self {
            kind: EventKind::Insert,
            first_row,
            last_row,
            column: None,
        }
    }

    pub fn updated(first_row: usize, last_row: usize) -> Self {
        Self {
            kind: EventKind::Update,
            first_row,
            last_row,
            column: None,
        }
    }

    pub fn cell_updated(row: usize, column: usize) -> Self {
        Self {
            kind: EventKind::Update,
            first_row: row,
            last_row: row,
            column: Some(column),
        }
    }

    pub fn deleted(first_row: usize, last_row: usize) -> Self {
        Self {
            kind: EventKind::Delete,
            first_row,
            last_row,
            column: None,
        }
    }

    pub fn structure_changed() -> Self {
        Self {
            kind: EventKind::StructureChanged,
            first_row: 0,
            last_row: usize::MAX,
            column: None,
        }
    }
}

#[derive(Debug, Clone)]
struct MemColumn {
    name: String,
    kind: ColumnType,
}

/// In-memory table model.
///
/// Rows shorter than the column count read as `Value::Null` in the missing
/// cells.
#[derive(Debug, Clone, Default)]
pub struct MemTable {
    columns: Vec<MemColumn>,
    rows: Vec<Vec<Value>>,
}

impl MemTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = (S, ColumnType)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, kind)| MemColumn {
                    name: name.into(),
                    kind,
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    /// Wraps the table for sharing with a coordinator and a view.
    pub fn into_shared(self) -> Rc<RefCell<MemTable>> {
        Rc::new(RefCell::new(self))
    }

    /// Builds a table out of a JSON array of objects.
    ///
    /// Columns are taken from the keys of all objects, in first-seen order;
    /// each column's type is inferred from its first non-null value.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let records = json.as_array().ok_or_else(|| {
            FilterError::Serialization(serde::de::Error::custom("expected a JSON array of objects"))
        })?;
        let mut names: Vec<String> = Vec::new();
        for record in records {
            let object = record.as_object().ok_or_else(|| {
                FilterError::Serialization(serde::de::Error::custom("expected a JSON object per row"))
            })?;
            for key in object.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let rows: Vec<Vec<Value>> = records
            .iter()
            .map(|record| {
                names
                    .iter()
                    .map(|name| record.get(name).cloned().map(Value::from).unwrap_or_default())
                    .collect()
            })
            .collect();

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let kind = rows
                    .iter()
                    .map(|row| &row[index])
                    .find(|value| !value.is_null())
                    .map(ColumnType::infer)
                    .unwrap_or_default();
                MemColumn { name, kind }
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> TableEvent {
        self.insert_rows(vec![row])
    }

    pub fn insert_rows(&mut self, rows: Vec<Vec<Value>>) -> TableEvent {
        let first = self.rows.len();
        let count = rows.len();
        self.rows.extend(rows);
        TableEvent::inserted(first, (first + count).saturating_sub(1))
    }

    /// Replaces one cell. Returns `None` when the cell does not exist.
    pub fn set_value(&mut self, row: usize, column: usize, value: Value) -> Option<TableEvent> {
        if column >= self.columns.len() {
            return None;
        }
        let cells = self.rows.get_mut(row)?;
        if cells.len() <= column {
            cells.resize(column + 1, Value::Null);
        }
        cells[column] = value;
        Some(TableEvent::cell_updated(row, column))
    }

    /// Removes one row. Returns `None` when the row does not exist.
    pub fn remove_row(&mut self, row: usize) -> Option<TableEvent> {
        if row >= self.rows.len() {
            return None;
        }
        self.rows.remove(row);
        Some(TableEvent::deleted(row, row))
    }

    /// Replaces columns and rows wholesale.
    pub fn replace<S: Into<String>>(
        &mut self,
        columns: impl IntoIterator<Item = (S, ColumnType)>,
        rows: Vec<Vec<Value>>,
    ) -> TableEvent {
        *self = MemTable::new(columns).with_rows(rows);
        TableEvent::structure_changed()
    }

    /// Changes the declared type of a column, leaving the data untouched.
    pub fn set_column_type(&mut self, column: usize, kind: ColumnType) -> Option<TableEvent> {
        let col = self.columns.get_mut(column)?;
        col.kind = kind;
        Some(TableEvent::updated(0, self.rows.len().saturating_sub(1)))
    }
}

impl TableModel for MemTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn value_at(&self, row: usize, column: usize) -> Value {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .cloned()
            .unwrap_or_default()
    }

    fn column_type(&self, column: usize) -> ColumnType {
        self.columns
            .get(column)
            .map(|c| c.kind.clone())
            .unwrap_or_default()
    }

    fn column_name(&self, column: usize) -> String {
        self.columns
            .get(column)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("column {}", column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> MemTable {
        MemTable::new([("name", ColumnType::Text), ("age", ColumnType::Int)]).with_rows(vec![
            vec!["ann".into(), 31.into()],
            vec!["bob".into(), 42.into()],
        ])
    }

    #[test]
    fn push_row_reports_insert_range() {
        let mut table = people();
        let event = table.push_row(vec!["cid".into(), 7.into()]);
        assert_eq!(event, TableEvent::inserted(2, 2));
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn missing_cells_read_as_null() {
        let table = people().with_rows(vec![vec!["solo".into()]]);
        assert_eq!(table.value_at(0, 1), Value::Null);
        assert_eq!(table.value_at(5, 0), Value::Null);
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut table = people();
        assert!(table.remove_row(9).is_none());
        assert_eq!(table.remove_row(0), Some(TableEvent::deleted(0, 0)));
        assert_eq!(table.value_at(0, 0), Value::from("bob"));
    }

    #[test]
    fn set_value_emits_cell_event() {
        let mut table = people();
        assert_eq!(
            table.set_value(1, 1, 43.into()),
            Some(TableEvent::cell_updated(1, 1))
        );
        assert_eq!(table.value_at(1, 1), Value::Int(43));
        assert!(table.set_value(1, 5, 1.into()).is_none());
    }

    #[test]
    fn from_json_infers_columns() {
        let json = serde_json::json!([
            {"name": "ann", "active": true},
            {"name": "bob", "age": 42},
        ]);
        let table = MemTable::from_json(&json).unwrap();
        assert_eq!(table.column_count(), 3);
        let active = table.column_index("active").unwrap();
        let age = table.column_index("age").unwrap();
        assert_eq!(table.column_type(active), ColumnType::Bool);
        assert_eq!(table.column_type(age), ColumnType::Int);
        assert_eq!(table.value_at(0, age), Value::Null);
    }

    #[test]
    fn from_json_rejects_non_arrays() {
        let json = serde_json::json!({"name": "ann"});
        assert!(MemTable::from_json(&json).is_err());
    }

    #[test]
    fn cursor_formats_string_values() {
        let table = people();
        let fmt: FormatRef = Rc::new(|v: &Value| format!("{} years", v));
        let cursor = RowCursor::new(vec![None, Some(fmt)]);
        let row = cursor.at(&table, 1);
        assert_eq!(row.string_value(0), "bob");
        assert_eq!(row.string_value(1), "42 years");
        assert!(cursor.any_row(&table, |r| r.value(0) == Value::from("ann")));
        assert!(!cursor.any_row(&table, |r| r.value(0) == Value::from("zed")));
    }
}
