use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// Object identifier the engine uses for types and tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Oid(pub u32);

impl Oid {
    /// The invalid identifier: "not a table", "no inserted row".
    pub const NONE: Oid = Oid(0);

    pub const BOOL: Oid = Oid(16);
    pub const BYTEA: Oid = Oid(17);
    pub const CHAR: Oid = Oid(18);
    pub const NAME: Oid = Oid(19);
    pub const INT8: Oid = Oid(20);
    pub const INT2: Oid = Oid(21);
    pub const INT4: Oid = Oid(23);
    pub const TEXT: Oid = Oid(25);
    pub const OID: Oid = Oid(26);
    pub const FLOAT4: Oid = Oid(700);
    pub const FLOAT8: Oid = Oid(701);
    pub const BPCHAR: Oid = Oid(1042);
    pub const VARCHAR: Oid = Oid(1043);
    pub const DATE: Oid = Oid(1082);
    pub const TIME: Oid = Oid(1083);
    pub const TIMESTAMP: Oid = Oid(1114);
    pub const NUMERIC: Oid = Oid(1700);

    pub fn is_none(&self) -> bool {
        *self == Oid::NONE
    }

    /// `None` for the invalid identifier.
    pub fn valid(self) -> Option<Oid> {
        if self.is_none() { None } else { Some(self) }
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of a statement as reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecStatus {
    EmptyQuery,
    CommandOk,
    TuplesOk,
    CopyOut,
    CopyIn,
    BadResponse,
    NonfatalError,
    FatalError,
}

impl ExecStatus {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ExecStatus::BadResponse | ExecStatus::NonfatalError | ExecStatus::FatalError
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExecStatus::EmptyQuery => "EMPTY_QUERY",
            ExecStatus::CommandOk => "COMMAND_OK",
            ExecStatus::TuplesOk => "TUPLES_OK",
            ExecStatus::CopyOut => "COPY_OUT",
            ExecStatus::CopyIn => "COPY_IN",
            ExecStatus::BadResponse => "BAD_RESPONSE",
            ExecStatus::NonfatalError => "NONFATAL_ERROR",
            ExecStatus::FatalError => "FATAL_ERROR",
        }
    }
}

impl Display for ExecStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown execution status: `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for ExecStatus {
    type Err = UnknownStatus;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        let name = name.strip_prefix("PGRES_").unwrap_or(&name);
        match name {
            "EMPTY_QUERY" => Ok(ExecStatus::EmptyQuery),
            "COMMAND_OK" => Ok(ExecStatus::CommandOk),
            "TUPLES_OK" => Ok(ExecStatus::TuplesOk),
            "COPY_OUT" => Ok(ExecStatus::CopyOut),
            "COPY_IN" => Ok(ExecStatus::CopyIn),
            "BAD_RESPONSE" => Ok(ExecStatus::BadResponse),
            "NONFATAL_ERROR" => Ok(ExecStatus::NonfatalError),
            "FATAL_ERROR" => Ok(ExecStatus::FatalError),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// The engine's materialized result buffer, as handed over by the
/// execution layer.
///
/// Implementations are immutable once handed over. Releasing the buffer
/// is the implementation's `Drop`; a [`crate::results::ResultBuffer`]
/// drops it exactly once, when the last handle sharing it goes away.
///
/// Index arguments are trusted: callers only pass `row < row_count()` and
/// `column < column_count()`. Implementations may panic otherwise.
pub trait RawResult: Send + Sync {
    fn status(&self) -> ExecStatus;

    /// Command tag such as `INSERT 0 1` or `SELECT 3`. Empty if none.
    fn command_tag(&self) -> &str;

    /// Primary error message; empty when the statement succeeded.
    fn error_message(&self) -> &str;

    /// 1-based character position of the error in the statement.
    fn error_position(&self) -> Option<usize> {
        None
    }

    /// Five character SQLSTATE code of the failure.
    fn sqlstate(&self) -> Option<&str> {
        None
    }

    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;

    fn column_name(&self, column: usize) -> &str;
    fn column_type(&self, column: usize) -> Oid;

    /// Table the column was read from, [`Oid::NONE`] for computed columns.
    fn column_table(&self, column: usize) -> Oid;

    /// 1-based attribute number within [`RawResult::column_table`], 0 when
    /// the column is not a plain table column.
    fn table_column(&self, column: usize) -> u32;

    /// Field content, `None` for SQL NULL.
    fn value(&self, row: usize, column: usize) -> Option<&[u8]>;
}
