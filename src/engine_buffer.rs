use std::fmt::Debug;

use thiserror::Error;

use crate::raw::{ExecStatus, Oid, RawResult};

type ReleaseHook = Box<dyn FnOnce() + Send + Sync>;

/// Description of one result column, as sent by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_oid: Oid,
    pub table: Oid,
    /// 1-based attribute number in `table`, 0 if not a table column.
    pub table_column: u32,
}

impl ColumnDescriptor {
    pub fn new(name: &str, type_oid: Oid) -> Self {
        Self {
            name: name.to_string(),
            type_oid,
            table: Oid::NONE,
            table_column: 0,
        }
    }

    pub fn from_table(mut self, table: Oid, table_column: u32) -> Self {
        self.table = table;
        self.table_column = table_column;
        self
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Row has {found} values but the result has {expected} columns")]
pub struct ShapeError {
    pub expected: usize,
    pub found: usize,
}

/// A fully materialized result buffer.
///
/// All field bytes live in one arena; each cell is an offset range into it,
/// or nothing for NULL. The release hook, if any, runs when the buffer is
/// dropped.
pub struct EngineBuffer {
    status: ExecStatus,
    command_tag: String,
    error_message: String,
    error_position: Option<usize>,
    sqlstate: Option<String>,
    columns: Vec<ColumnDescriptor>,
    data: Vec<u8>,
    cells: Vec<Option<(usize, usize)>>,
    rows: usize,
    on_release: Option<ReleaseHook>,
}

impl EngineBuffer {
    fn with_status(status: ExecStatus) -> Self {
        Self {
            status,
            command_tag: String::new(),
            error_message: String::new(),
            error_position: None,
            sqlstate: None,
            columns: vec![],
            data: vec![],
            cells: vec![],
            rows: 0,
            on_release: None,
        }
    }

    /// Rows are added with [`EngineBuffer::push_row`].
    pub fn tuples(columns: Vec<ColumnDescriptor>) -> Self {
        let mut buffer = Self::with_status(ExecStatus::TuplesOk);
        buffer.columns = columns;
        buffer
    }

    pub fn command(tag: &str) -> Self {
        Self::with_status(ExecStatus::CommandOk).with_command_tag(tag)
    }

    pub fn empty_query() -> Self {
        Self::with_status(ExecStatus::EmptyQuery)
    }

    pub fn failed(status: ExecStatus, message: &str) -> Self {
        let mut buffer = Self::with_status(status);
        buffer.error_message = message.to_string();
        buffer
    }

    pub fn with_status_code(mut self, status: ExecStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_command_tag(mut self, tag: &str) -> Self {
        self.command_tag = tag.to_string();
        self
    }

    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    pub fn with_error_position(mut self, position: usize) -> Self {
        self.error_position = Some(position);
        self
    }

    pub fn with_sqlstate(mut self, sqlstate: &str) -> Self {
        self.sqlstate = Some(sqlstate.to_string());
        self
    }

    pub fn on_release(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    pub fn push_row<V: AsRef<[u8]>>(
        &mut self,
        values: impl IntoIterator<Item = Option<V>>,
    ) -> Result<(), ShapeError> {
        let start = self.cells.len();
        let data_start = self.data.len();
        for value in values {
            let cell = value.map(|value| {
                let value = value.as_ref();
                let offset = self.data.len();
                self.data.extend_from_slice(value);
                (offset, offset + value.len())
            });
            self.cells.push(cell);
        }
        let found = self.cells.len() - start;
        if found != self.columns.len() {
            self.cells.truncate(start);
            self.data.truncate(data_start);
            return Err(ShapeError {
                expected: self.columns.len(),
                found,
            });
        }
        self.rows += 1;
        Ok(())
    }

    pub fn with_row<V: AsRef<[u8]>>(
        mut self,
        values: impl IntoIterator<Item = Option<V>>,
    ) -> Result<Self, ShapeError> {
        self.push_row(values)?;
        Ok(self)
    }
}

impl RawResult for EngineBuffer {
    fn status(&self) -> ExecStatus {
        self.status
    }

    fn command_tag(&self) -> &str {
        &self.command_tag
    }

    fn error_message(&self) -> &str {
        &self.error_message
    }

    fn error_position(&self) -> Option<usize> {
        self.error_position
    }

    fn sqlstate(&self) -> Option<&str> {
        self.sqlstate.as_deref()
    }

    fn row_count(&self) -> usize {
        self.rows
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, column: usize) -> &str {
        &self.columns[column].name
    }

    fn column_type(&self, column: usize) -> Oid {
        self.columns[column].type_oid
    }

    fn column_table(&self, column: usize) -> Oid {
        self.columns[column].table
    }

    fn table_column(&self, column: usize) -> u32 {
        self.columns[column].table_column
    }

    fn value(&self, row: usize, column: usize) -> Option<&[u8]> {
        let width = self.columns.len();
        assert!(
            row < self.rows && column < width,
            "field ({row}, {column}) outside a {}x{width} result",
            self.rows
        );
        self.cells[row * width + column].map(|(start, end)| &self.data[start..end])
    }
}

impl Drop for EngineBuffer {
    fn drop(&mut self) {
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }
}

impl Debug for EngineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuffer")
            .field("status", &self.status)
            .field("command_tag", &self.command_tag)
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    fn two_columns() -> EngineBuffer {
        EngineBuffer::tuples(vec![
            ColumnDescriptor::new("a", Oid::INT4),
            ColumnDescriptor::new("b", Oid::TEXT),
        ])
    }

    #[test]
    fn cells_point_into_arena() -> Result<(), ShapeError> {
        let mut buffer = two_columns();
        buffer.push_row([Some("1"), Some("x")])?;
        buffer.push_row([None, Some("")])?;

        assert_eq!(buffer.row_count(), 2);
        assert_eq!(buffer.value(0, 0), Some(b"1".as_slice()));
        assert_eq!(buffer.value(0, 1), Some(b"x".as_slice()));
        assert_eq!(buffer.value(1, 0), None);
        assert_eq!(buffer.value(1, 1), Some(b"".as_slice()));
        Ok(())
    }

    #[test]
    fn wrong_width_row_is_rejected() -> Result<(), ShapeError> {
        let mut buffer = two_columns();
        buffer.push_row([Some("1"), Some("x")])?;

        let err = buffer.push_row([Some("2")]).unwrap_err();

        assert_eq!(
            err,
            ShapeError {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(buffer.row_count(), 1);
        assert_eq!(buffer.value(0, 1), Some(b"x".as_slice()));
        Ok(())
    }

    #[test]
    #[should_panic]
    fn column_outside_row_panics() {
        let buffer = two_columns().with_row([Some("1"), Some("x")]).unwrap();

        buffer.value(0, 2);
    }

    #[test]
    fn release_hook_runs_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let buffer = EngineBuffer::command("UPDATE 1").on_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(released.load(Ordering::SeqCst), 0);

        drop(buffer);

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn table_origin() {
        let column = ColumnDescriptor::new("id", Oid::INT8).from_table(Oid(16384), 1);

        assert_eq!(column.table, Oid(16384));
        assert_eq!(column.table_column, 1);
    }
}
