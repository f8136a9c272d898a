use std::fmt::Display;

use crate::{
    column_catalog::ColumnInfo,
    conversion::{ConversionError, SqlText},
    error::ResultError,
    raw::Oid,
    results::ResultBuffer,
    type_registry::TypeRegistry,
    value::Value,
};

/// One field of a [`ResultBuffer`]: a view on the engine's bytes.
#[derive(Clone, Copy)]
pub struct FieldView<'r> {
    results: &'r ResultBuffer,
    row: usize,
    column: usize,
}

impl<'r> FieldView<'r> {
    pub(crate) fn new(results: &'r ResultBuffer, row: usize, column: usize) -> Self {
        Self {
            results,
            row,
            column,
        }
    }

    pub fn row_number(&self) -> usize {
        self.row
    }

    pub fn column_number(&self) -> usize {
        self.column
    }

    pub fn info(&self) -> Result<&'r ColumnInfo, ResultError> {
        self.results.column_info(self.column)
    }

    pub fn name(&self) -> Result<&'r str, ResultError> {
        self.results.column_name(self.column)
    }

    pub fn type_oid(&self) -> Result<Oid, ResultError> {
        self.results.column_type(self.column)
    }

    pub fn table(&self) -> Result<Option<Oid>, ResultError> {
        self.results.column_table(self.column)
    }

    pub fn is_null(&self) -> bool {
        self.results.value_bytes(self.row, self.column).is_none()
    }

    /// The field's bytes, empty for NULL. No terminator is included.
    pub fn raw_bytes(&self) -> &'r [u8] {
        self.results
            .value_bytes(self.row, self.column)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.raw_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_str(&self) -> Result<&'r str, ResultError> {
        std::str::from_utf8(self.raw_bytes()).map_err(|_| {
            ConversionError::Malformed {
                target: "str",
                text: String::from_utf8_lossy(self.raw_bytes()).into_owned(),
            }
            .into()
        })
    }

    /// Parses the field; NULL is an error.
    pub fn get<T: SqlText>(&self) -> Result<T, ResultError> {
        match self.results.value_bytes(self.row, self.column) {
            Some(text) => Ok(T::from_sql_text(text)?),
            None => Err(ConversionError::Null {
                target: T::TYPE_NAME,
            }
            .into()),
        }
    }

    /// Parses the field; NULL is `None`.
    pub fn get_opt<T: SqlText>(&self) -> Result<Option<T>, ResultError> {
        match self.results.value_bytes(self.row, self.column) {
            Some(text) => Ok(Some(T::from_sql_text(text)?)),
            None => Ok(None),
        }
    }

    /// Parses the field; NULL is `default`.
    pub fn get_or<T: SqlText>(&self, default: T) -> Result<T, ResultError> {
        self.get_opt().map(|value| value.unwrap_or(default))
    }

    /// The field as a [`Value`] of its column's type.
    pub fn value(&self) -> Result<Value, ResultError> {
        self.value_with(TypeRegistry::builtin())
    }

    pub fn value_with(&self, registry: &TypeRegistry) -> Result<Value, ResultError> {
        let type_oid = self.type_oid()?;
        let text = self.results.value_bytes(self.row, self.column);
        Ok(registry.parse(type_oid, text)?)
    }
}

/// Fields are equal when both are NULL, or both hold the same bytes.
impl PartialEq for FieldView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.results.value_bytes(self.row, self.column)
            == other.results.value_bytes(other.row, other.column)
    }
}

impl Eq for FieldView<'_> {}

/// Writes the field's text; NULL writes nothing.
impl Display for FieldView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        String::from_utf8_lossy(self.raw_bytes()).fmt(f)
    }
}

impl std::fmt::Debug for FieldView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.results.value_bytes(self.row, self.column) {
            Some(text) => write!(f, "{:?}", String::from_utf8_lossy(text)),
            None => write!(f, "NULL"),
        }
    }
}
