use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

pub const UNIQUE_ID: &str = "unique_id";
pub const DS: &str = "ds";
pub const Y: &str = "y";
pub const AVAILABLE_MASK: &str = "available_mask";
pub const SAMPLE_MASK: &str = "sample_mask";

/// A single named column of a [`Frame`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Column {
    Str(Vec<String>),
    Int(Vec<i64>),
    Float(Vec<f32>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Str(values) => values.len(),
            Column::Int(values) => values.len(),
            Column::Float(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Column::Str(values)
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Column::Str(values.into_iter().map(String::from).collect())
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Column::Int(values)
    }
}

impl From<Vec<f32>> for Column {
    fn from(values: Vec<f32>) -> Self {
        Column::Float(values)
    }
}

/// Column-named table used for the target, exogenous, static and mask inputs.
///
/// Keys are `unique_id` (string) and `ds` (integer timestamp in whatever unit
/// the caller uses); every other column is numeric. Column order is kept, it
/// defines the order of exogenous and static features.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<(String, Column)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, replacing any existing column with the same name.
    pub fn with_column(mut self, name: impl Into<String>, column: impl Into<Column>) -> Self {
        self.set_column(name, column);
        self
    }

    pub fn set_column(&mut self, name: impl Into<String>, column: impl Into<Column>) {
        let name = name.into();
        let column = column.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Names of every column that is not a key column, in table order.
    pub fn value_names(&self) -> Vec<String> {
        self.names()
            .filter(|n| *n != UNIQUE_ID && *n != DS)
            .map(String::from)
            .collect()
    }

    /// Checks that `required` columns exist and every column has the same length.
    pub fn validate(&self, table: &str, required: &[&str]) -> Result<()> {
        if let Some(column) = required.iter().find(|c| !self.contains(c)) {
            return Err(DatasetError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }

        let expected = self.len();
        for (name, column) in self.columns.iter() {
            if column.len() != expected {
                return Err(DatasetError::ColumnLength {
                    column: format!("{table}.{name}"),
                    expected,
                    actual: column.len(),
                });
            }
        }

        Ok(())
    }

    pub fn ids(&self, table: &str) -> Result<&[String]> {
        match self.required(table, UNIQUE_ID)? {
            Column::Str(values) => Ok(values),
            _ => Err(column_type(table, UNIQUE_ID, "strings")),
        }
    }

    pub fn timestamps(&self, table: &str) -> Result<&[i64]> {
        match self.required(table, DS)? {
            Column::Int(values) => Ok(values),
            _ => Err(column_type(table, DS, "integer timestamps")),
        }
    }

    /// Numeric values of a column, integer columns are widened to `f32`.
    pub fn values(&self, table: &str, name: &str) -> Result<Vec<f32>> {
        match self.required(table, name)? {
            Column::Float(values) => Ok(values.clone()),
            Column::Int(values) => Ok(values.iter().map(|v| *v as f32).collect()),
            Column::Str(_) => Err(column_type(table, name, "numbers")),
        }
    }

    /// Row order sorting the table by `(unique_id, ds)`.
    pub fn sorted_order(&self, table: &str) -> Result<Vec<usize>> {
        let ids = self.ids(table)?;
        let ds = self.timestamps(table)?;
        let mut order: Vec<usize> = (0..ids.len()).collect();
        order.sort_by(|a, b| ids[*a].cmp(&ids[*b]).then(ds[*a].cmp(&ds[*b])));
        Ok(order)
    }

    fn required(&self, table: &str, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| DatasetError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
    }
}

fn column_type(table: &str, column: &str, expected: &'static str) -> DatasetError {
    DatasetError::ColumnType {
        table: table.to_string(),
        column: column.to_string(),
        expected,
    }
}
