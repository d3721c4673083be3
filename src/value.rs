//! Dynamic values passed into generators and read back from result rows.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{ThingError, ThingResult};
use crate::schema::Field;

/// A single value of one of the field kinds a thing can store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    String(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
}

/// A decoded result row, keyed by column alias.
pub type Row = HashMap<String, Value>;

impl Value {
    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl Field {
    fn row_value<'r>(&self, row: &'r Row) -> &'r Value {
        const NULL: &Value = &Value::Null;
        row.get(&self.name)
            .or_else(|| row.get(&self.column_name()))
            .unwrap_or(NULL)
    }

    fn mismatch(&self, expected: &'static str, found: &Value) -> ThingError {
        ThingError::TypeMismatch {
            field: self.name.clone(),
            expected,
            found: found.kind(),
        }
    }

    /// Read this field from `row` as a boolean.
    pub fn get_bool(&self, row: &Row) -> ThingResult<bool> {
        match self.row_value(row) {
            Value::Boolean(b) => Ok(*b),
            other => Err(self.mismatch("boolean", other)),
        }
    }

    /// Read this field from `row` as a string.
    pub fn get_string(&self, row: &Row) -> ThingResult<String> {
        match self.row_value(row) {
            Value::String(s) => Ok(s.clone()),
            other => Err(self.mismatch("string", other)),
        }
    }

    /// Read this field from `row` as a number.
    pub fn get_float64(&self, row: &Row) -> ThingResult<f64> {
        match self.row_value(row) {
            Value::Number(n) => Ok(*n),
            other => Err(self.mismatch("number", other)),
        }
    }

    /// Read this field from `row` as a date.
    pub fn get_date(&self, row: &Row) -> ThingResult<NaiveDate> {
        match self.row_value(row) {
            Value::Date(d) => Ok(*d),
            other => Err(self.mismatch("date", other)),
        }
    }
}

// Implement From traits for Value
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
