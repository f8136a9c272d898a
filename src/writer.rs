use std::io::{self, Write};

use csv::WriterBuilder;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::{error::ResultError, results::ResultBuffer};

pub trait Writer {
    fn write(&mut self, results: &ResultBuffer) -> Result<(), WriterError>;
}

struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
    headers: bool,
}

impl<W: Write> Writer for CsvWriter<W> {
    fn write(&mut self, results: &ResultBuffer) -> Result<(), WriterError> {
        if self.headers && results.columns() > 0 {
            let headers: Vec<_> = results.catalog().iter().map(|c| c.name.as_str()).collect();
            self.writer.write_record(&headers)?;
        }
        for row in results {
            let line: Vec<_> = row.iter().map(|field| field.raw_bytes()).collect();
            self.writer.write_record(line)?
        }
        self.writer.flush()?;
        Ok(())
    }
}

pub fn new_csv_writer<W: Write>(w: W, headers: bool) -> impl Writer {
    CsvWriter {
        writer: WriterBuilder::new().flexible(true).from_writer(w),
        headers,
    }
}

/// Writes the rows as a JSON array of objects, decoding each field by its
/// column type.
struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> Writer for JsonWriter<W> {
    fn write(&mut self, results: &ResultBuffer) -> Result<(), WriterError> {
        let mut data_to_write = vec![];
        for row in results {
            let mut line = Map::new();
            for field in row {
                let key = json_key(&line, field.name()?, field.column_number());
                line.insert(key, field.value()?.to_json());
            }
            data_to_write.push(JsonValue::Object(line));
        }
        serde_json::to_writer_pretty(&mut self.writer, &JsonValue::Array(data_to_write))?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// The column name, or for a repeated name (e.g. two `?column?`), the name
/// suffixed with the column number.
fn json_key(line: &Map<String, JsonValue>, name: &str, column: usize) -> String {
    let mut key = name.to_string();
    while line.contains_key(&key) {
        key = format!("{key}_{column}");
    }
    key
}

pub fn new_json_writer<W: Write>(w: W) -> impl Writer {
    JsonWriter { writer: w }
}

/// Writes one line per column: name, type, table and table column.
struct ColumnsWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> Writer for ColumnsWriter<W> {
    fn write(&mut self, results: &ResultBuffer) -> Result<(), WriterError> {
        self.writer
            .write_record(["name", "type", "table", "table_column"])?;
        for column in results.catalog().iter() {
            let table = column.table.map(|t| t.to_string()).unwrap_or_default();
            let table_column = column
                .table_column
                .map(|c| c.to_string())
                .unwrap_or_default();
            self.writer.write_record([
                column.name.clone(),
                column.type_oid.to_string(),
                table,
                table_column,
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

pub fn new_columns_writer<W: Write>(w: W) -> impl Writer {
    ColumnsWriter {
        writer: WriterBuilder::new().from_writer(w),
    }
}

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("IO Error: `{0}`")]
    IoError(#[from] io::Error),
    #[error("CSV Error: `{0}`")]
    CsvError(#[from] csv::Error),
    #[error("JSON Error: `{0}`")]
    JsonError(#[from] serde_json::Error),
    #[error("`{0}`")]
    ResultError(#[from] ResultError),
}
