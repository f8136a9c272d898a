use std::str::{self, FromStr};

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::raw::Oid;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Could not convert `{text}` to {target}")]
    Malformed { target: &'static str, text: String },
    #[error("Attempt to convert null to {target}")]
    Null { target: &'static str },
}

impl ConversionError {
    fn malformed(target: &'static str, text: &[u8]) -> Self {
        ConversionError::Malformed {
            target,
            text: String::from_utf8_lossy(text).into_owned(),
        }
    }
}

/// Conversion between a type and the engine's text representation.
///
/// `to_sql_text` is the exact inverse of `from_sql_text`: formatting a value
/// and parsing it back gives the same value.
pub trait SqlText: Sized {
    const TYPE_NAME: &'static str;

    fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError>;

    fn to_sql_text(&self) -> String;
}

pub fn parse<T: SqlText>(text: &[u8]) -> Result<T, ConversionError> {
    T::from_sql_text(text)
}

pub fn format<T: SqlText>(value: &T) -> String {
    value.to_sql_text()
}

fn as_str<'a>(target: &'static str, text: &'a [u8]) -> Result<&'a str, ConversionError> {
    str::from_utf8(text).map_err(|_| ConversionError::malformed(target, text))
}

fn parse_with<T: FromStr>(target: &'static str, text: &[u8]) -> Result<T, ConversionError> {
    as_str(target, text)?
        .parse()
        .map_err(|_| ConversionError::malformed(target, text))
}

macro_rules! integer_text {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl SqlText for $t {
                const TYPE_NAME: &'static str = $name;

                fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
                    parse_with(Self::TYPE_NAME, text)
                }

                fn to_sql_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_text!(
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
);

macro_rules! float_text {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl SqlText for $t {
                const TYPE_NAME: &'static str = $name;

                fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
                    let str = as_str(Self::TYPE_NAME, text)?;
                    if str.eq_ignore_ascii_case("nan") {
                        Ok(<$t>::NAN)
                    } else if str.eq_ignore_ascii_case("infinity") {
                        Ok(<$t>::INFINITY)
                    } else if str.eq_ignore_ascii_case("-infinity") {
                        Ok(<$t>::NEG_INFINITY)
                    } else {
                        parse_with(Self::TYPE_NAME, text)
                    }
                }

                fn to_sql_text(&self) -> String {
                    if self.is_nan() {
                        "NaN".into()
                    } else if self.is_infinite() && self.is_sign_positive() {
                        "Infinity".into()
                    } else if self.is_infinite() {
                        "-Infinity".into()
                    } else {
                        self.to_string()
                    }
                }
            }
        )*
    };
}

float_text!(f32 => "f32", f64 => "f64");

impl SqlText for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
        let str = as_str(Self::TYPE_NAME, text)?;
        match str {
            "t" | "1" => Ok(true),
            "f" | "0" => Ok(false),
            _ if str.eq_ignore_ascii_case("true") => Ok(true),
            _ if str.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(ConversionError::malformed(Self::TYPE_NAME, text)),
        }
    }

    fn to_sql_text(&self) -> String {
        if *self { "true".into() } else { "false".into() }
    }
}

impl SqlText for String {
    const TYPE_NAME: &'static str = "string";

    fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
        as_str(Self::TYPE_NAME, text).map(String::from)
    }

    fn to_sql_text(&self) -> String {
        self.clone()
    }
}

impl SqlText for Oid {
    const TYPE_NAME: &'static str = "oid";

    fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
        parse_with(Self::TYPE_NAME, text).map(Oid)
    }

    fn to_sql_text(&self) -> String {
        self.0.to_string()
    }
}

impl SqlText for BigDecimal {
    const TYPE_NAME: &'static str = "numeric";

    fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
        parse_with(Self::TYPE_NAME, text)
    }

    fn to_sql_text(&self) -> String {
        self.to_string()
    }
}

impl SqlText for NaiveDate {
    const TYPE_NAME: &'static str = "date";

    fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
        let str = as_str(Self::TYPE_NAME, text)?;
        NaiveDate::parse_from_str(str, DATE_FORMAT)
            .map_err(|_| ConversionError::malformed(Self::TYPE_NAME, text))
    }

    fn to_sql_text(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }
}

impl SqlText for NaiveTime {
    const TYPE_NAME: &'static str = "time";

    fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
        let str = as_str(Self::TYPE_NAME, text)?;
        NaiveTime::parse_from_str(str, TIME_FORMAT)
            .map_err(|_| ConversionError::malformed(Self::TYPE_NAME, text))
    }

    fn to_sql_text(&self) -> String {
        self.format(TIME_FORMAT).to_string()
    }
}

impl SqlText for NaiveDateTime {
    const TYPE_NAME: &'static str = "timestamp";

    fn from_sql_text(text: &[u8]) -> Result<Self, ConversionError> {
        let str = as_str(Self::TYPE_NAME, text)?;
        NaiveDateTime::parse_from_str(str, TIMESTAMP_FORMAT)
            .map_err(|_| ConversionError::malformed(Self::TYPE_NAME, text))
    }

    fn to_sql_text(&self) -> String {
        self.format(TIMESTAMP_FORMAT).to_string()
    }
}
