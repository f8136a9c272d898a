//! Reads a recorded statement execution from JSON.
//!
//! ```json
//! {
//!   "query": "SELECT id, name FROM people",
//!   "status": "TUPLES_OK",
//!   "command_tag": "SELECT 2",
//!   "columns": [{"name": "id", "type": 20, "table": 16384, "table_column": 1}, "name"],
//!   "rows": [[1, "Ada"], [2, null]]
//! }
//! ```
//!
//! A failed execution has an `error` object with `message`, and optionally
//! `position` and `sqlstate`.

use std::io::Read;

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::debug;

use crate::{
    engine_buffer::{ColumnDescriptor, EngineBuffer, ShapeError},
    raw::{ExecStatus, Oid, RawResult, UnknownStatus},
};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("JSON error: `{0}`")]
    Json(#[from] serde_json::Error),
    #[error("`{0}`")]
    Status(#[from] UnknownStatus),
    #[error("`{0}`")]
    Shape(#[from] ShapeError),
    #[error("Invalid `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> SnapshotError {
    SnapshotError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// A recorded execution: what the engine returned for `query`.
#[derive(Debug)]
pub struct Snapshot {
    pub query: String,
    pub buffer: EngineBuffer,
}

pub fn read_snapshot(reader: impl Read) -> Result<Snapshot, SnapshotError> {
    let json: JsonValue = serde_json::from_reader(reader)?;
    parse_snapshot(&json)
}

pub fn parse_snapshot(json: &JsonValue) -> Result<Snapshot, SnapshotError> {
    let JsonValue::Object(root) = json else {
        return Err(invalid("snapshot", "expected an object"));
    };
    let query = optional_str(root, "query")?.unwrap_or_default().to_string();

    let mut buffer = match root.get("error") {
        Some(JsonValue::Object(error)) => read_error(root, error)?,
        Some(JsonValue::Null) | None => read_success(root)?,
        Some(_) => return Err(invalid("error", "expected an object")),
    };
    if let Some(tag) = optional_str(root, "command_tag")? {
        buffer = buffer.with_command_tag(tag);
    }
    debug!(
        query = %query,
        status = %buffer.status(),
        rows = buffer.row_count(),
        "read snapshot"
    );
    Ok(Snapshot { query, buffer })
}

fn read_status(root: &Map<String, JsonValue>) -> Result<Option<ExecStatus>, SnapshotError> {
    match optional_str(root, "status")? {
        Some(status) => Ok(Some(status.parse()?)),
        None => Ok(None),
    }
}

fn read_error(
    root: &Map<String, JsonValue>,
    error: &Map<String, JsonValue>,
) -> Result<EngineBuffer, SnapshotError> {
    let status = read_status(root)?.unwrap_or(ExecStatus::FatalError);
    if !status.is_error() {
        return Err(invalid("status", "an execution with an error must have a failing status"));
    }
    let message = optional_str(error, "message")?.unwrap_or_default();
    let mut buffer = EngineBuffer::failed(status, message);
    if let Some(position) = error.get("position").filter(|p| !p.is_null()) {
        let position = position
            .as_u64()
            .ok_or_else(|| invalid("error.position", "expected a positive number"))?;
        buffer = buffer.with_error_position(position as usize);
    }
    if let Some(sqlstate) = optional_str(error, "sqlstate")? {
        buffer = buffer.with_sqlstate(sqlstate);
    }
    Ok(buffer)
}

fn read_success(root: &Map<String, JsonValue>) -> Result<EngineBuffer, SnapshotError> {
    let columns = match root.get("columns") {
        Some(JsonValue::Array(columns)) => columns
            .iter()
            .map(read_column)
            .collect::<Result<Vec<_>, _>>()?,
        Some(JsonValue::Null) | None => vec![],
        Some(_) => return Err(invalid("columns", "expected an array")),
    };
    let rows: &[JsonValue] = match root.get("rows") {
        Some(JsonValue::Array(rows)) => rows,
        Some(JsonValue::Null) | None => &[],
        Some(_) => return Err(invalid("rows", "expected an array")),
    };
    let status = match read_status(root)? {
        Some(status) => status,
        None if columns.is_empty() && rows.is_empty() => ExecStatus::CommandOk,
        None => ExecStatus::TuplesOk,
    };

    let mut buffer = EngineBuffer::tuples(columns).with_status_code(status);
    for row in rows {
        let JsonValue::Array(values) = row else {
            return Err(invalid("rows", "expected an array of arrays"));
        };
        buffer.push_row(values.iter().map(field_text))?;
    }
    Ok(buffer)
}

fn read_column(json: &JsonValue) -> Result<ColumnDescriptor, SnapshotError> {
    match json {
        JsonValue::String(name) => Ok(ColumnDescriptor::new(name, Oid::TEXT)),
        JsonValue::Object(column) => {
            let name = optional_str(column, "name")?
                .ok_or_else(|| invalid("columns.name", "missing column name"))?;
            let type_oid = optional_u32(column, "type")?.map(Oid).unwrap_or(Oid::TEXT);
            let table = optional_u32(column, "table")?.map(Oid).unwrap_or(Oid::NONE);
            let table_column = optional_u32(column, "table_column")?.unwrap_or_default();
            Ok(ColumnDescriptor::new(name, type_oid).from_table(table, table_column))
        }
        _ => Err(invalid("columns", "expected a name or an object")),
    }
}

fn field_text(json: &JsonValue) -> Option<String> {
    match json {
        JsonValue::Null => None,
        JsonValue::String(str) => Some(str.clone()),
        other => Some(other.to_string()),
    }
}

fn optional_str<'a>(
    map: &'a Map<String, JsonValue>,
    field: &str,
) -> Result<Option<&'a str>, SnapshotError> {
    match map.get(field) {
        Some(JsonValue::String(str)) => Ok(Some(str)),
        Some(JsonValue::Null) | None => Ok(None),
        Some(_) => Err(invalid(field, "expected a string")),
    }
}

fn optional_u32(map: &Map<String, JsonValue>, field: &str) -> Result<Option<u32>, SnapshotError> {
    match map.get(field) {
        Some(JsonValue::Null) | None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .map(Some)
            .ok_or_else(|| invalid(field, "expected an unsigned 32 bit number")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_rows_and_columns() -> Result<(), SnapshotError> {
        let json = json!({
            "query": "SELECT id, name FROM people",
            "command_tag": "SELECT 2",
            "columns": [{"name": "id", "type": 20, "table": 16384, "table_column": 1}, "name"],
            "rows": [[1, "Ada"], [2, null]]
        });

        let snapshot = parse_snapshot(&json)?;
        let buffer = &snapshot.buffer;

        assert_eq!(snapshot.query, "SELECT id, name FROM people");
        assert_eq!(buffer.status(), ExecStatus::TuplesOk);
        assert_eq!(buffer.command_tag(), "SELECT 2");
        assert_eq!(buffer.column_count(), 2);
        assert_eq!(buffer.column_type(0), Oid::INT8);
        assert_eq!(buffer.column_table(0), Oid(16384));
        assert_eq!(buffer.column_type(1), Oid::TEXT);
        assert_eq!(buffer.value(0, 0), Some(b"1".as_slice()));
        assert_eq!(buffer.value(1, 1), None);
        Ok(())
    }

    #[test]
    fn command_without_rows() -> Result<(), SnapshotError> {
        let json = json!({"query": "UPDATE t SET a = 1", "command_tag": "UPDATE 3"});

        let snapshot = parse_snapshot(&json)?;

        assert_eq!(snapshot.buffer.status(), ExecStatus::CommandOk);
        assert_eq!(snapshot.buffer.row_count(), 0);
        Ok(())
    }

    #[test]
    fn reads_error() -> Result<(), SnapshotError> {
        let json = json!({
            "query": "SELECT * FORM t",
            "error": {"message": "ERROR:  syntax error", "position": 10, "sqlstate": "42601"}
        });

        let snapshot = parse_snapshot(&json)?;

        assert_eq!(snapshot.buffer.status(), ExecStatus::FatalError);
        assert_eq!(snapshot.buffer.error_message(), "ERROR:  syntax error");
        assert_eq!(snapshot.buffer.error_position(), Some(10));
        assert_eq!(snapshot.buffer.sqlstate(), Some("42601"));
        Ok(())
    }

    #[test]
    fn error_with_success_status_is_rejected() {
        let json = json!({
            "status": "TUPLES_OK",
            "error": {"message": "ERROR:  boom"}
        });

        assert!(matches!(
            parse_snapshot(&json),
            Err(SnapshotError::Invalid { field, .. }) if field == "status"
        ));
    }

    #[test]
    fn error_with_nonfatal_status() -> Result<(), SnapshotError> {
        let json = json!({
            "status": "PGRES_NONFATAL_ERROR",
            "error": {"message": "WARNING:  careful"}
        });

        let snapshot = parse_snapshot(&json)?;

        assert_eq!(snapshot.buffer.status(), ExecStatus::NonfatalError);
        Ok(())
    }

    #[test]
    fn ragged_row_is_rejected() {
        let json = json!({"columns": ["a", "b"], "rows": [["1"]]});

        let err = parse_snapshot(&json).unwrap_err();

        assert!(matches!(
            err,
            SnapshotError::Shape(ShapeError {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let json = json!({"status": "SINGLE_TUPLE", "columns": ["a"]});

        assert!(matches!(
            parse_snapshot(&json),
            Err(SnapshotError::Status(_))
        ));
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(matches!(
            parse_snapshot(&json!({"columns": [{"name": "a", "type": -1}]})),
            Err(SnapshotError::Invalid { .. })
        ));
        assert!(matches!(
            parse_snapshot(&json!([1, 2])),
            Err(SnapshotError::Invalid { .. })
        ));
    }

    #[test]
    fn reads_from_text() -> Result<(), SnapshotError> {
        let text = r#"{"query": "SELECT 1", "columns": [{"name": "?column?", "type": 23}], "rows": [["1"]]}"#;

        let snapshot = read_snapshot(text.as_bytes())?;

        assert_eq!(snapshot.buffer.row_count(), 1);
        Ok(())
    }
}
