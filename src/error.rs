use std::{fmt::Display, io::Error as IoError};

use thiserror::Error;

use crate::{
    conversion::ConversionError, engine_buffer::ShapeError, snapshot::SnapshotError,
    writer::WriterError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Row,
    Column,
}

impl Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Row => write!(f, "Row"),
            IndexKind::Column => write!(f, "Column"),
        }
    }
}

/// Failures of a single call on a live result. None of them affect the
/// result itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResultError {
    #[error("{kind} number {index} is out of range (size {size})")]
    OutOfRange {
        kind: IndexKind,
        index: i64,
        size: usize,
    },
    #[error("No such column: `{0}`")]
    NoSuchColumn(String),
    #[error("{0}")]
    Conversion(#[from] ConversionError),
}

fn saturating_index(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

impl ResultError {
    pub(crate) fn row_out_of_range(index: usize, size: usize) -> Self {
        ResultError::OutOfRange {
            kind: IndexKind::Row,
            index: saturating_index(index),
            size,
        }
    }

    pub(crate) fn column_index_out_of_range(index: usize, size: usize) -> Self {
        Self::column_out_of_range(saturating_index(index), size)
    }

    pub(crate) fn column_out_of_range(index: i64, size: usize) -> Self {
        ResultError::OutOfRange {
            kind: IndexKind::Column,
            index,
            size,
        }
    }
}

/// Coarse classification of a failed statement, from its SQLSTATE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    NotNullViolation,
    CheckViolation,
    IntegrityConstraintViolation,
    SerializationFailure,
    DeadlockDetected,
    TransactionRollback,
    SyntaxError,
    UndefinedTable,
    UndefinedColumn,
    UndefinedFunction,
    InsufficientPrivilege,
    SyntaxOrAccessRule,
    DataException,
    BrokenConnection,
    InsufficientResources,
    QueryCanceled,
    Other,
}

impl SqlErrorKind {
    pub fn from_sqlstate(sqlstate: &str) -> Self {
        match sqlstate {
            "23505" => SqlErrorKind::UniqueViolation,
            "23503" => SqlErrorKind::ForeignKeyViolation,
            "23502" => SqlErrorKind::NotNullViolation,
            "23514" => SqlErrorKind::CheckViolation,
            "40001" => SqlErrorKind::SerializationFailure,
            "40P01" => SqlErrorKind::DeadlockDetected,
            "42601" => SqlErrorKind::SyntaxError,
            "42P01" => SqlErrorKind::UndefinedTable,
            "42703" => SqlErrorKind::UndefinedColumn,
            "42883" => SqlErrorKind::UndefinedFunction,
            "42501" => SqlErrorKind::InsufficientPrivilege,
            "57014" => SqlErrorKind::QueryCanceled,
            _ => match sqlstate.get(..2) {
                Some("23") => SqlErrorKind::IntegrityConstraintViolation,
                Some("40") => SqlErrorKind::TransactionRollback,
                Some("42") => SqlErrorKind::SyntaxOrAccessRule,
                Some("22") => SqlErrorKind::DataException,
                Some("08") => SqlErrorKind::BrokenConnection,
                Some("53") => SqlErrorKind::InsufficientResources,
                _ => SqlErrorKind::Other,
            },
        }
    }
}

/// The engine rejected the statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("SQL error: `{message}`")]
pub struct SqlError {
    pub message: String,
    pub query: String,
    /// 1-based character position within `query`.
    pub position: Option<usize>,
    pub sqlstate: Option<String>,
}

impl SqlError {
    pub fn kind(&self) -> SqlErrorKind {
        self.sqlstate
            .as_deref()
            .map(SqlErrorKind::from_sqlstate)
            .unwrap_or(SqlErrorKind::Other)
    }

    /// The message, the query line holding the error and a caret under the
    /// failing character.
    pub fn annotated(&self) -> String {
        let mut out = self.message.trim_end().to_string();
        if self.query.is_empty() {
            return out;
        }
        let Some(position) = self.position.filter(|p| *p > 0) else {
            out.push_str("\nQuery: ");
            out.push_str(&self.query);
            return out;
        };
        let mut line_start = 0;
        let mut column = 0;
        for (index, (offset, chr)) in self.query.char_indices().enumerate() {
            if index + 1 == position {
                break;
            }
            if chr == '\n' {
                line_start = offset + 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        let line = self.query[line_start..].lines().next().unwrap_or_default();
        out.push_str("\nQuery: ");
        out.push_str(line);
        out.push_str("\n       ");
        out.push_str(&" ".repeat(column));
        out.push('^');
        out
    }
}

#[derive(Error, Debug)]
pub enum PgResultError {
    #[error("{0}")]
    Sql(#[from] SqlError),
    #[error("Result error: `{0}`")]
    Result(#[from] ResultError),
    #[error("Buffer error: `{0}`")]
    Shape(#[from] ShapeError),
    #[error("Snapshot error: `{0}`")]
    Snapshot(#[from] SnapshotError),
    #[error("Write error: `{0}`")]
    Writer(#[from] WriterError),
    #[error("IO Error: `{0}`")]
    Io(#[from] IoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(query: &str, position: Option<usize>) -> SqlError {
        SqlError {
            message: "ERROR:  syntax error at or near \"FORM\"\n".into(),
            query: query.into(),
            position,
            sqlstate: Some("42601".into()),
        }
    }

    #[test]
    fn kind_from_exact_code() {
        assert_eq!(
            SqlErrorKind::from_sqlstate("23505"),
            SqlErrorKind::UniqueViolation
        );
        assert_eq!(
            SqlErrorKind::from_sqlstate("40P01"),
            SqlErrorKind::DeadlockDetected
        );
    }

    #[test]
    fn kind_from_class() {
        assert_eq!(
            SqlErrorKind::from_sqlstate("23P01"),
            SqlErrorKind::IntegrityConstraintViolation
        );
        assert_eq!(
            SqlErrorKind::from_sqlstate("08006"),
            SqlErrorKind::BrokenConnection
        );
        assert_eq!(SqlErrorKind::from_sqlstate("XX000"), SqlErrorKind::Other);
        assert_eq!(SqlErrorKind::from_sqlstate(""), SqlErrorKind::Other);
    }

    #[test]
    fn error_without_sqlstate_is_other() {
        let mut err = error("SELECT", None);
        err.sqlstate = None;

        assert_eq!(err.kind(), SqlErrorKind::Other);
    }

    #[test]
    fn annotated_points_at_position() {
        let err = error("SELECT * FORM t", Some(10));

        assert_eq!(
            err.annotated(),
            "ERROR:  syntax error at or near \"FORM\"\nQuery: SELECT * FORM t\n                ^"
        );
    }

    #[test]
    fn annotated_uses_the_failing_line() {
        let err = error("SELECT *\nFORM t", Some(10));

        assert_eq!(
            err.annotated(),
            "ERROR:  syntax error at or near \"FORM\"\nQuery: FORM t\n       ^"
        );
    }

    #[test]
    fn annotated_without_position() {
        let err = error("SELECT * FORM t", None);

        assert_eq!(
            err.annotated(),
            "ERROR:  syntax error at or near \"FORM\"\nQuery: SELECT * FORM t"
        );
    }

    #[test]
    fn huge_row_index_saturates() {
        let err = ResultError::row_out_of_range(usize::MAX, 3);

        assert_eq!(
            err.to_string(),
            format!("Row number {} is out of range (size 3)", i64::MAX)
        );
    }

    #[test]
    fn out_of_range_message() {
        let err = ResultError::row_out_of_range(3, 3);

        assert_eq!(err.to_string(), "Row number 3 is out of range (size 3)");
    }
}
