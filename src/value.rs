use std::fmt::Display;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Number, Value as JsonValue};

use crate::conversion::SqlText;

/// A field decoded according to its column type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Float(f64),
    Int(i64),
    Numeric(BigDecimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Bool(bool),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number(Number::from(*i)),
            Value::Float(f) => match Number::from_f64(*f) {
                Some(num) => JsonValue::Number(num),
                None => JsonValue::String(self.to_string()),
            },
            Value::Numeric(num) => match num.to_f64().and_then(Number::from_f64) {
                Some(json) if json.to_string() == num.to_string() => JsonValue::Number(json),
                _ => JsonValue::String(num.to_string()),
            },
            _ => JsonValue::String(self.to_string()),
        }
    }
}

/// Writes the value the way the engine would send it.
impl Display for Value {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => i.fmt(formatter),
            Value::Float(f) => f.to_sql_text().fmt(formatter),
            Value::Numeric(b) => b.fmt(formatter),
            Value::Date(d) => d.to_sql_text().fmt(formatter),
            Value::Time(t) => t.to_sql_text().fmt(formatter),
            Value::Timestamp(d) => d.to_sql_text().fmt(formatter),
            Value::Str(str) => str.fmt(formatter),
            Value::Bool(b) => b.to_sql_text().fmt(formatter),
            Value::Null => write!(formatter, ""),
        }
    }
}
