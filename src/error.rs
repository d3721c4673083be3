//! Error types for thingsql.

use std::fmt;

use thiserror::Error;

/// A single failure encountered while resolving schemas or generating SQL.
#[derive(Debug, Error)]
pub enum ThingError {
    /// No thing with this name is registered in the schema store.
    #[error("thing: {0} doesn't exist")]
    SchemaNotFound(String),

    /// The thing has no field under this key.
    #[error("field: {field} not in thing: {thing}")]
    FieldNotFound { thing: String, field: String },

    /// A field type (or relation kind) that cannot be turned into a column.
    #[error("field type: {0} is not supported")]
    UnsupportedFieldType(String),

    /// Primary keys are generated by the database, never inserted.
    #[error("cannot insert primary key: {thing}.{field}")]
    InvalidPrimaryKeyInsert { thing: String, field: String },

    /// The `_where` entry of a field selection is unusable.
    #[error("{0}")]
    InvalidWhereClause(String),

    /// A typed accessor was applied to a value of another kind.
    #[error("field: {field} expected {expected} value, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Pages are numbered from 1.
    #[error("page must be >= 1 when count is set (page: {page}, count: {count})")]
    InvalidPagination { page: u32, count: u32 },

    /// Malformed schema document.
    #[error("Schema document error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThingError {
    /// Create a field-not-found error.
    pub fn field_not_found(thing: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            thing: thing.into(),
            field: field.into(),
        }
    }

    /// Create an invalid `_where` error.
    pub fn invalid_where(reason: impl Into<String>) -> Self {
        Self::InvalidWhereClause(reason.into())
    }
}

/// Result type alias for thingsql operations.
pub type ThingResult<T> = Result<T, ThingError>;

/// Every error collected during one generation run.
///
/// Generators keep going after a failure and report all of them at the end,
/// so callers get the whole picture in one pass. Displays as the individual
/// messages joined by newlines.
#[derive(Debug, Default)]
pub struct ThingErrors(Vec<ThingError>);

impl ThingErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: ThingError) {
        self.0.push(err);
    }

    /// Record the error of `result`, if any, and hand back the success value.
    pub fn collect<T>(&mut self, result: ThingResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(err);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ThingError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, ThingErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ThingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ThingErrors {}

impl From<ThingError> for ThingErrors {
    fn from(err: ThingError) -> Self {
        Self(vec![err])
    }
}

impl Extend<ThingError> for ThingErrors {
    fn extend<I: IntoIterator<Item = ThingError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ThingErrors {
    type Item = ThingError;
    type IntoIter = std::vec::IntoIter<ThingError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ThingErrors {
    type Item = &'a ThingError;
    type IntoIter = std::slice::Iter<'a, ThingError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
