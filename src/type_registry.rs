use std::{collections::HashMap, sync::LazyLock};

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    conversion::{ConversionError, SqlText},
    raw::Oid,
    value::Value,
};

/// Decodes a non-null field of one column type.
pub type ParseFn = fn(&[u8]) -> Result<Value, ConversionError>;

static BUILTIN: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::default);

/// Parse functions keyed by column type.
///
/// Types without an entry decode as text.
#[derive(Clone)]
pub struct TypeRegistry {
    parsers: HashMap<Oid, ParseFn>,
}

fn parse_bool(text: &[u8]) -> Result<Value, ConversionError> {
    bool::from_sql_text(text).map(Value::Bool)
}

fn parse_int(text: &[u8]) -> Result<Value, ConversionError> {
    i64::from_sql_text(text).map(Value::Int)
}

fn parse_float(text: &[u8]) -> Result<Value, ConversionError> {
    f64::from_sql_text(text).map(Value::Float)
}

fn parse_numeric(text: &[u8]) -> Result<Value, ConversionError> {
    BigDecimal::from_sql_text(text).map(Value::Numeric)
}

fn parse_date(text: &[u8]) -> Result<Value, ConversionError> {
    NaiveDate::from_sql_text(text).map(Value::Date)
}

fn parse_time(text: &[u8]) -> Result<Value, ConversionError> {
    NaiveTime::from_sql_text(text).map(Value::Time)
}

fn parse_timestamp(text: &[u8]) -> Result<Value, ConversionError> {
    NaiveDateTime::from_sql_text(text).map(Value::Timestamp)
}

fn parse_text(text: &[u8]) -> Result<Value, ConversionError> {
    String::from_sql_text(text).map(Value::Str)
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Oid::BOOL, parse_bool);
        for oid in [Oid::INT2, Oid::INT4, Oid::INT8, Oid::OID] {
            registry.register(oid, parse_int);
        }
        for oid in [Oid::FLOAT4, Oid::FLOAT8] {
            registry.register(oid, parse_float);
        }
        registry.register(Oid::NUMERIC, parse_numeric);
        registry.register(Oid::DATE, parse_date);
        registry.register(Oid::TIME, parse_time);
        registry.register(Oid::TIMESTAMP, parse_timestamp);
        for oid in [Oid::TEXT, Oid::VARCHAR, Oid::BPCHAR, Oid::CHAR, Oid::NAME] {
            registry.register(oid, parse_text);
        }
        registry
    }
}

impl TypeRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// The registry for the engine's built-in types.
    pub fn builtin() -> &'static TypeRegistry {
        &BUILTIN
    }

    /// Returns the parser previously registered for `oid`, if any.
    pub fn register(&mut self, oid: Oid, parser: ParseFn) -> Option<ParseFn> {
        self.parsers.insert(oid, parser)
    }

    pub fn get(&self, oid: Oid) -> Option<ParseFn> {
        self.parsers.get(&oid).copied()
    }

    pub fn parse(&self, oid: Oid, text: Option<&[u8]>) -> Result<Value, ConversionError> {
        let Some(text) = text else {
            return Ok(Value::Null);
        };
        match self.get(oid) {
            Some(parser) => parser(text),
            None => parse_text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types() {
        let registry = TypeRegistry::builtin();

        assert_eq!(registry.parse(Oid::INT2, Some(b"-7")), Ok(Value::Int(-7)));
        assert_eq!(registry.parse(Oid::BOOL, Some(b"t")), Ok(Value::Bool(true)));
        assert_eq!(
            registry.parse(Oid::FLOAT4, Some(b"1.5")),
            Ok(Value::Float(1.5))
        );
        assert_eq!(
            registry.parse(Oid::TIME, Some(b"10:12:40")),
            Ok(Value::Time(NaiveTime::from_hms_opt(10, 12, 40).unwrap()))
        );
        assert_eq!(
            registry.parse(Oid::VARCHAR, Some(b"hello")),
            Ok(Value::Str("hello".into()))
        );
    }

    #[test]
    fn null_is_null_for_every_type() {
        let registry = TypeRegistry::builtin();

        assert_eq!(registry.parse(Oid::INT4, None), Ok(Value::Null));
        assert_eq!(registry.parse(Oid(99999), None), Ok(Value::Null));
    }

    #[test]
    fn unknown_type_is_text() {
        let registry = TypeRegistry::builtin();

        assert_eq!(
            registry.parse(Oid(3802), Some(b"{\"a\": 1}")),
            Ok(Value::Str("{\"a\": 1}".into()))
        );
    }

    #[test]
    fn malformed_value_fails() {
        let registry = TypeRegistry::builtin();

        assert!(registry.parse(Oid::DATE, Some(b"yesterday")).is_err());
    }

    #[test]
    fn custom_parser_replaces_builtin() {
        fn date_as_text(text: &[u8]) -> Result<Value, ConversionError> {
            String::from_sql_text(text).map(Value::Str)
        }
        let mut registry = TypeRegistry::default();

        let previous = registry.register(Oid::DATE, date_as_text);

        assert!(previous.is_some());
        assert_eq!(
            registry.parse(Oid::DATE, Some(b"2024-01-22")),
            Ok(Value::Str("2024-01-22".into()))
        );
        assert_eq!(
            TypeRegistry::builtin().parse(Oid::DATE, Some(b"2024-01-22")),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 22).unwrap()))
        );
    }
}
