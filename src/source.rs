//! Named columnar data container shared between figures and callbacks.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{FigureError, Result};

/// One column of a data source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Column {
    /// Plain numbers
    Number(Vec<f64>),
    /// Numbers with gaps (rolling-window warm-up, missing metrics)
    Nullable(Vec<Option<f64>>),
    /// Packed little-endian RGBA pixels
    Packed(Vec<u32>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Number(v) => v.len(),
            Column::Nullable(v) => v.len(),
            Column::Packed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric value at a row; gaps and packed pixels yield `None`
    pub fn value(&self, row: usize) -> Option<f64> {
        match self {
            Column::Number(v) => v.get(row).copied(),
            Column::Nullable(v) => v.get(row).copied().flatten(),
            Column::Packed(_) => None,
        }
    }

    /// Packed pixels, if this is an image column
    pub fn as_packed(&self) -> Option<&[u32]> {
        match self {
            Column::Packed(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Number(values)
    }
}

impl From<Vec<Option<f64>>> for Column {
    fn from(values: Vec<Option<f64>>) -> Self {
        Column::Nullable(values)
    }
}

impl From<Vec<u32>> for Column {
    fn from(values: Vec<u32>) -> Self {
        Column::Packed(values)
    }
}

impl From<Vec<u64>> for Column {
    fn from(values: Vec<u64>) -> Self {
        Column::Number(values.into_iter().map(|v| v as f64).collect())
    }
}

/// Ordered mapping from column name to values, consumed by glyph renderers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnDataSource {
    data: BTreeMap<String, Column>,
    #[serde(skip)]
    revision: u64,
}

impl ColumnDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from `(name, column)` pairs
    pub fn from_columns<I, K, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<Column>,
    {
        let mut source = Self::new();
        source.update(columns);
        source
    }

    /// Insert or replace one column
    pub fn insert(&mut self, name: impl Into<String>, column: impl Into<Column>) -> Option<Column> {
        self.revision += 1;
        self.data.insert(name.into(), column.into())
    }

    /// Insert or replace several columns at once, leaving the others untouched
    pub fn update<I, K, C>(&mut self, columns: I)
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<Column>,
    {
        for (name, column) in columns {
            self.data.insert(name.into(), column.into());
        }
        self.revision += 1;
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.data.get(name)
    }

    /// Column lookup that reports the missing name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get(name)
            .ok_or_else(|| FigureError::MissingColumn(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Numeric value of a column at a row
    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.get(name).and_then(|column| column.value(row))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.data.iter().map(|(name, column)| (name.as_str(), column))
    }

    /// Number of rows every column can serve (shortest column)
    pub fn row_count(&self) -> usize {
        self.data.values().map(Column::len).min().unwrap_or(0)
    }

    /// Number of rows the named columns can serve together.
    ///
    /// Columns outside `fields` do not limit the count; a missing column
    /// serves no rows. With no fields this is [`row_count`](Self::row_count).
    pub fn row_count_of<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> usize {
        let mut fields = fields.into_iter().peekable();
        if fields.peek().is_none() {
            return self.row_count();
        }
        fields
            .map(|name| self.data.get(name).map_or(0, Column::len))
            .min()
            .unwrap_or(0)
    }

    /// Check that all columns have the same length
    pub fn validate(&self) -> Result<()> {
        let mut columns = self.data.iter();
        let Some((_, first)) = columns.next() else {
            return Ok(());
        };
        let expected = first.len();
        for (name, column) in columns {
            if column.len() != expected {
                return Err(FigureError::LengthMismatch {
                    name: name.clone(),
                    expected,
                    actual: column.len(),
                });
            }
        }
        Ok(())
    }

    /// Mutation counter, bumped on every insert/update
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// JSON view of the columns, with gaps as `null`
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A data source shared between a figure and whatever feeds it
pub type SharedSource = Arc<RwLock<ColumnDataSource>>;

/// Wrap a source so it can be shared
pub fn shared(source: ColumnDataSource) -> SharedSource {
    Arc::new(RwLock::new(source))
}

/// Read-lock a shared source
pub fn read_source(source: &SharedSource) -> Result<RwLockReadGuard<'_, ColumnDataSource>> {
    source.read().map_err(|_| FigureError::SourcePoisoned)
}

/// Write-lock a shared source
pub fn write_source(source: &SharedSource) -> Result<RwLockWriteGuard<'_, ColumnDataSource>> {
    source.write().map_err(|_| FigureError::SourcePoisoned)
}
