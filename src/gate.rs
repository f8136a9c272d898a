//! Narrow entry points for the layers around the result core.
//!
//! Only the execution layer creates results, and only a cursor layer needs
//! to look at the raw status and command tag again.

pub mod creation {
    use crate::{error::SqlError, raw::RawResult, results::ResultBuffer};

    /// Takes over the engine's buffer for `query`.
    ///
    /// If the engine reports a failure the buffer is released and the
    /// failure returned; no result is created.
    pub fn create_result(
        raw: impl RawResult + 'static,
        query: impl Into<String>,
    ) -> Result<ResultBuffer, SqlError> {
        ResultBuffer::from_raw(Box::new(raw), query.into())
    }
}

pub mod cursor {
    use crate::{raw::ExecStatus, results::ResultBuffer};

    pub fn status(results: &ResultBuffer) -> Option<ExecStatus> {
        results.status()
    }

    pub fn command_tag(results: &ResultBuffer) -> Option<&str> {
        results.command_tag()
    }
}
