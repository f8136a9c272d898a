use std::{
    fmt::Debug,
    iter::FusedIterator,
    sync::{Arc, OnceLock},
};

use tracing::{debug, trace};

use crate::{
    column_catalog::{ColumnCatalog, ColumnInfo},
    command_tag::CommandSummary,
    error::{ResultError, SqlError},
    raw::{ExecStatus, Oid, RawResult},
    row::RowView,
    status::check_status,
};

static EMPTY_CATALOG: ColumnCatalog = ColumnCatalog::empty();

struct SharedResult {
    raw: Box<dyn RawResult>,
    query: String,
    summary: CommandSummary,
    catalog: OnceLock<ColumnCatalog>,
}

impl Drop for SharedResult {
    fn drop(&mut self) {
        trace!(rows = self.raw.row_count(), "releasing result buffer");
    }
}

/// Rows and columns returned by one statement.
///
/// A `ResultBuffer` is a cheap handle: cloning it shares the engine buffer
/// and never copies row data. The buffer is released when the last handle
/// is dropped or cleared.
///
/// Rows and fields are borrowed views ([`RowView`], [`crate::field::FieldView`]),
/// valid for as long as the handle they came from is neither dropped nor
/// cleared. The borrow checker enforces this.
#[derive(Clone, Default)]
pub struct ResultBuffer {
    shared: Option<Arc<SharedResult>>,
}

/// Something that designates a column: its number or its name.
pub trait ColumnRef {
    fn resolve(&self, results: &ResultBuffer) -> Result<usize, ResultError>;
}

impl ColumnRef for usize {
    fn resolve(&self, results: &ResultBuffer) -> Result<usize, ResultError> {
        if *self < results.columns() {
            Ok(*self)
        } else {
            Err(ResultError::column_index_out_of_range(
                *self,
                results.columns(),
            ))
        }
    }
}

impl ColumnRef for i32 {
    fn resolve(&self, results: &ResultBuffer) -> Result<usize, ResultError> {
        match usize::try_from(*self) {
            Ok(column) => column.resolve(results),
            Err(_) => Err(ResultError::column_out_of_range(
                i64::from(*self),
                results.columns(),
            )),
        }
    }
}

impl ColumnRef for &str {
    fn resolve(&self, results: &ResultBuffer) -> Result<usize, ResultError> {
        results.column_number(self)
    }
}

impl ColumnRef for String {
    fn resolve(&self, results: &ResultBuffer) -> Result<usize, ResultError> {
        results.column_number(self)
    }
}

impl ColumnRef for &String {
    fn resolve(&self, results: &ResultBuffer) -> Result<usize, ResultError> {
        results.column_number(self)
    }
}

impl ResultBuffer {
    /// Runs the status check and, if the statement succeeded, takes over
    /// `raw`. On failure `raw` is released before returning.
    pub(crate) fn from_raw(raw: Box<dyn RawResult>, query: String) -> Result<Self, SqlError> {
        let summary = check_status(raw.as_ref(), &query)?;
        debug!(
            status = %raw.status(),
            rows = raw.row_count(),
            columns = raw.column_count(),
            affected_rows = summary.affected_rows,
            "created result"
        );
        let shared = SharedResult {
            raw,
            query,
            summary,
            catalog: OnceLock::new(),
        };
        Ok(Self {
            shared: Some(Arc::new(shared)),
        })
    }

    fn raw(&self) -> Option<&dyn RawResult> {
        self.shared.as_ref().map(|shared| shared.raw.as_ref())
    }

    pub(crate) fn status(&self) -> Option<ExecStatus> {
        self.raw().map(|raw| raw.status())
    }

    pub(crate) fn command_tag(&self) -> Option<&str> {
        self.raw().map(|raw| raw.command_tag())
    }

    /// # Panics
    ///
    /// If the field is outside the result.
    pub(crate) fn value_bytes(&self, row: usize, column: usize) -> Option<&[u8]> {
        match self.raw() {
            Some(raw) => raw.value(row, column),
            None => panic!("field ({row}, {column}) read from an empty result"),
        }
    }

    pub fn size(&self) -> usize {
        self.raw().map(|raw| raw.row_count()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn columns(&self) -> usize {
        self.raw().map(|raw| raw.column_count()).unwrap_or_default()
    }

    /// Row `row`, without a range check. Reading fields of a row past the
    /// end panics; use [`ResultBuffer::at`] for a checked lookup.
    pub fn row(&self, row: usize) -> RowView<'_> {
        RowView::new(self, row)
    }

    pub fn at(&self, row: usize) -> Result<RowView<'_>, ResultError> {
        if row < self.size() {
            Ok(self.row(row))
        } else {
            Err(ResultError::row_out_of_range(row, self.size()))
        }
    }

    pub fn front(&self) -> Option<RowView<'_>> {
        self.at(0).ok()
    }

    pub fn back(&self) -> Option<RowView<'_>> {
        self.size().checked_sub(1).map(|row| self.row(row))
    }

    pub fn iter(&self) -> Rows<'_> {
        Rows {
            results: self,
            next: 0,
            end: self.size(),
        }
    }

    /// Column metadata, resolved on first use.
    pub fn catalog(&self) -> &ColumnCatalog {
        match &self.shared {
            Some(shared) => shared
                .catalog
                .get_or_init(|| ColumnCatalog::resolve(shared.raw.as_ref())),
            None => &EMPTY_CATALOG,
        }
    }

    pub fn column_number(&self, name: &str) -> Result<usize, ResultError> {
        self.catalog().column_number(name)
    }

    pub fn column_info(&self, column: impl ColumnRef) -> Result<&ColumnInfo, ResultError> {
        let column = column.resolve(self)?;
        self.catalog()
            .get(column)
            .ok_or_else(|| ResultError::column_index_out_of_range(column, self.columns()))
    }

    pub fn column_name(&self, column: impl ColumnRef) -> Result<&str, ResultError> {
        self.column_info(column).map(|info| info.name.as_str())
    }

    pub fn column_type(&self, column: impl ColumnRef) -> Result<Oid, ResultError> {
        self.column_info(column).map(|info| info.type_oid)
    }

    /// Table the column was read from; `None` for computed columns.
    pub fn column_table(&self, column: impl ColumnRef) -> Result<Option<Oid>, ResultError> {
        self.column_info(column).map(|info| info.table)
    }

    /// 0-based position of the column in its table; `None` for computed
    /// columns.
    pub fn table_column(&self, column: impl ColumnRef) -> Result<Option<usize>, ResultError> {
        self.column_info(column).map(|info| info.table_column)
    }

    /// Statement that produced this result; empty for a default or cleared
    /// result.
    pub fn query(&self) -> &str {
        self.shared
            .as_ref()
            .map(|shared| shared.query.as_str())
            .unwrap_or_default()
    }

    /// Identifier of the inserted row, if the command was an `INSERT` of
    /// exactly one row into a table with oids.
    pub fn inserted_oid(&self) -> Option<Oid> {
        self.shared
            .as_ref()
            .and_then(|shared| shared.summary.inserted_oid)
    }

    /// Rows touched by an `INSERT`, `UPDATE` or `DELETE`, or the number of
    /// rows returned. Zero for any other command.
    pub fn affected_rows(&self) -> usize {
        self.shared
            .as_ref()
            .map(|shared| shared.summary.affected_rows)
            .unwrap_or_default()
    }

    /// Drops this handle's share of the buffer. Idempotent.
    pub fn clear(&mut self) {
        self.shared = None;
    }

    pub fn swap(&mut self, other: &mut ResultBuffer) {
        std::mem::swap(self, other);
    }

    pub(crate) fn same_buffer(&self, other: &ResultBuffer) -> bool {
        match (&self.shared, &other.shared) {
            (Some(me), Some(other)) => Arc::ptr_eq(me, other),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Equal when both results have the same number of rows and columns and
/// the same field contents. Column names and types are not compared.
impl PartialEq for ResultBuffer {
    fn eq(&self, other: &Self) -> bool {
        if self.same_buffer(other) {
            return true;
        }
        self.size() == other.size()
            && self.columns() == other.columns()
            && self.iter().zip(other.iter()).all(|(me, other)| me == other)
    }
}

impl Eq for ResultBuffer {}

impl Debug for ResultBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultBuffer")
            .field("query", &self.query())
            .field("rows", &self.size())
            .field("columns", &self.columns())
            .finish()
    }
}

pub struct Rows<'r> {
    results: &'r ResultBuffer,
    next: usize,
    end: usize,
}

impl<'r> Iterator for Rows<'r> {
    type Item = RowView<'r>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.end {
            let row = self.results.row(self.next);
            self.next += 1;
            Some(row)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.next;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Rows<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next < self.end {
            self.end -= 1;
            Some(self.results.row(self.end))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Rows<'_> {}

impl FusedIterator for Rows<'_> {}

impl<'r> IntoIterator for &'r ResultBuffer {
    type Item = RowView<'r>;
    type IntoIter = Rows<'r>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
