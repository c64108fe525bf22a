use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{GleanError, Result};

/// An ordered set of same-shaped rows, addressable by column name.
///
/// Built from any record type that serializes to a flat JSON object; the
/// column order is the record's field order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Table> {
        let mut table = Table::default();
        for (i, record) in records.iter().enumerate() {
            let value = serde_json::to_value(record)
                .map_err(|e| GleanError::shape(format!("record {i} failed to serialize: {e}")))?;
            let map = match value {
                Value::Object(map) => map,
                other => {
                    return Err(GleanError::shape(format!(
                        "record {i} is not a flat object: {other}"
                    )));
                }
            };
            if i == 0 {
                table.columns = map.keys().cloned().collect();
            }
            table.push_object(i, map)?;
        }
        Ok(table)
    }

    fn push_object(&mut self, i: usize, mut map: Map<String, Value>) -> Result<()> {
        if map.len() != self.columns.len() {
            return Err(GleanError::shape(format!(
                "record {i} has {} fields, table has {} columns",
                map.len(),
                self.columns.len()
            )));
        }
        let mut row = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let cell = map
                .remove(column)
                .ok_or_else(|| GleanError::shape(format!("record {i} lacks column {column:?}")))?;
            row.push(cell);
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(GleanError::shape(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Rows as JSON objects, one per record.
    pub fn to_json(&self) -> Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(obj)
            })
            .collect();
        Value::Array(records)
    }
}

/// Strings without their JSON quotes, everything else as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "Empty table")?;
            return write!(f, "Columns: [{}]", self.columns.join(", "));
        }

        let index_width = (self.rows.len() - 1).to_string().len();
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                rendered
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {column:>width$}")?;
        }
        for (i, row) in rendered.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{i:<index_width$}")?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {cell:>width$}")?;
            }
        }
        Ok(())
    }
}
