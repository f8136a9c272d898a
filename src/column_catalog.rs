use tracing::trace;

use crate::{
    error::ResultError,
    raw::{Oid, RawResult},
};

/// Metadata of one result column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub type_oid: Oid,
    /// `None` when the column is not read from a table, e.g. an expression.
    pub table: Option<Oid>,
    /// 0-based column number within `table`.
    pub table_column: Option<usize>,
}

#[derive(Debug, Default)]
pub struct ColumnCatalog {
    columns: Vec<ColumnInfo>,
}

impl ColumnCatalog {
    pub(crate) const fn empty() -> Self {
        Self { columns: Vec::new() }
    }

    pub(crate) fn resolve(raw: &dyn RawResult) -> Self {
        let columns: Vec<_> = (0..raw.column_count())
            .map(|column| {
                let table_column = match raw.table_column(column) {
                    0 => None,
                    number => Some(number as usize - 1),
                };
                ColumnInfo {
                    name: raw.column_name(column).to_string(),
                    type_oid: raw.column_type(column),
                    table: raw.column_table(column).valid(),
                    table_column,
                }
            })
            .collect();
        trace!(columns = columns.len(), "resolved column catalog");
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&ColumnInfo> {
        self.columns.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter()
    }

    /// Index of the first column named exactly `name`.
    pub fn column_number(&self, name: &str) -> Result<usize, ResultError> {
        self.columns
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| ResultError::NoSuchColumn(name.to_string()))
    }
}
