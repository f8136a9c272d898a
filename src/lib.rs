//! Client-side query results: an immutable, cheaply shared snapshot of the
//! rows a statement returned, with checked access, column metadata, typed
//! field conversion and structured statement errors.
//!
//! Results are created by the execution layer through
//! [`gate::creation::create_result`] from the engine's buffer and the
//! statement text.

pub mod args;
pub mod column_catalog;
pub mod command_tag;
pub mod conversion;
pub mod engine_buffer;
pub mod error;
pub mod field;
pub mod gate;
pub mod raw;
pub mod results;
pub mod row;
pub mod snapshot;
mod status;
pub mod type_registry;
pub mod value;
pub mod writer;
