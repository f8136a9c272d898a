use tracing::debug;

use crate::{
    command_tag::{CommandSummary, parse_command_tag},
    error::SqlError,
    raw::{ExecStatus, RawResult},
};

/// Checks what the engine reported for `query`.
///
/// Failing statuses become a [`SqlError`]; anything else yields what the
/// command did to the database.
pub(crate) fn check_status(raw: &dyn RawResult, query: &str) -> Result<CommandSummary, SqlError> {
    match raw.status() {
        ExecStatus::EmptyQuery | ExecStatus::CopyOut | ExecStatus::CopyIn => {
            Ok(CommandSummary::default())
        }
        ExecStatus::CommandOk => Ok(parse_command_tag(raw.command_tag())),
        ExecStatus::TuplesOk => Ok(CommandSummary {
            affected_rows: raw.row_count(),
            inserted_oid: None,
        }),
        status @ (ExecStatus::BadResponse | ExecStatus::NonfatalError | ExecStatus::FatalError) => {
            let error = sql_error(raw, status, query);
            debug!(
                %status,
                sqlstate = error.sqlstate.as_deref().unwrap_or_default(),
                message = error.message.trim_end(),
                "statement failed"
            );
            Err(error)
        }
    }
}

fn sql_error(raw: &dyn RawResult, status: ExecStatus, query: &str) -> SqlError {
    let message = match raw.error_message() {
        "" => format!("Statement failed with status {status}"),
        message => message.to_string(),
    };
    SqlError {
        message,
        query: query.to_string(),
        position: raw.error_position(),
        sqlstate: raw.sqlstate().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine_buffer::{ColumnDescriptor, EngineBuffer},
        error::SqlErrorKind,
        raw::Oid,
    };

    #[test]
    fn fatal_error_carries_context() {
        let buffer = EngineBuffer::failed(
            ExecStatus::FatalError,
            "ERROR:  duplicate key value violates unique constraint \"t_pkey\"\n",
        )
        .with_sqlstate("23505");

        let err = check_status(&buffer, "INSERT INTO t VALUES (1)").unwrap_err();

        assert_eq!(err.query, "INSERT INTO t VALUES (1)");
        assert!(err.message.contains("duplicate key"));
        assert_eq!(err.kind(), SqlErrorKind::UniqueViolation);
        assert_eq!(err.position, None);
    }

    #[test]
    fn error_position_is_kept() {
        let buffer = EngineBuffer::failed(ExecStatus::FatalError, "ERROR:  syntax error")
            .with_error_position(10);

        let err = check_status(&buffer, "SELECT * FORM t").unwrap_err();

        assert_eq!(err.position, Some(10));
    }

    #[test]
    fn bad_response_without_message() {
        let buffer = EngineBuffer::failed(ExecStatus::BadResponse, "");

        let err = check_status(&buffer, "SELECT 1").unwrap_err();

        assert_eq!(err.message, "Statement failed with status BAD_RESPONSE");
    }

    #[test]
    fn nonfatal_error_fails_too() {
        let buffer = EngineBuffer::failed(ExecStatus::NonfatalError, "WARNING: odd");

        assert!(check_status(&buffer, "SELECT 1").is_err());
    }

    #[test]
    fn command_ok_parses_tag() {
        let buffer = EngineBuffer::command("INSERT 16401 1");

        let summary = check_status(&buffer, "INSERT INTO t VALUES (1)").unwrap();

        assert_eq!(summary.affected_rows, 1);
        assert_eq!(summary.inserted_oid, Some(Oid(16401)));
    }

    #[test]
    fn tuples_ok_counts_rows() {
        let buffer = EngineBuffer::tuples(vec![ColumnDescriptor::new("a", Oid::INT4)])
            .with_command_tag("INSERT 16401 1")
            .with_row([Some("1")])
            .unwrap()
            .with_row([Some("2")])
            .unwrap();

        let summary = check_status(&buffer, "SELECT a FROM t").unwrap();

        assert_eq!(summary.affected_rows, 2);
        assert_eq!(summary.inserted_oid, None);
    }

    #[test]
    fn empty_query_succeeds() {
        let summary = check_status(&EngineBuffer::empty_query(), "").unwrap();

        assert_eq!(summary, CommandSummary::default());
    }
}
