//! SQL generators.
//!
//! Each generator names a thing plus its own inputs, resolves the thing
//! from a [`SchemaStore`] and produces SQL text. Generation never stops at
//! the first problem: whatever could be resolved is still emitted, and every
//! error is collected into the returned [`Generated`]. Check
//! [`Generated::is_ok`] (or use [`Generated::into_result`]) before executing
//! anything.

mod create_table;
mod insert_into;
mod select_from;

pub use create_table::CreateTable;
pub use insert_into::{InsertIntoTable, InsertQuery};
pub use select_from::{SelectFromTable, SelectQuery, WHERE_KEY};

use crate::error::ThingErrors;
use crate::registry::SchemaStore;

/// Alias of the main table in generated SELECTs.
pub const MAIN_TABLE_ALIAS: &str = "t";

/// Trait for generators that turn a thing into SQL.
pub trait GenerateSql {
    type Output;

    /// Generate SQL against the things registered in `store`.
    fn generate(&self, store: &SchemaStore) -> Generated<Self::Output>;
}

/// Output of a generator, possibly partial, with every error hit on the way.
#[derive(Debug)]
pub struct Generated<T> {
    output: T,
    errors: ThingErrors,
}

impl<T> Generated<T> {
    pub(crate) fn new(output: T, errors: ThingErrors) -> Self {
        Self { output, errors }
    }

    /// Whether generation finished without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The generated output, complete or not.
    pub fn output(&self) -> &T {
        &self.output
    }

    pub fn errors(&self) -> &ThingErrors {
        &self.errors
    }

    /// Split into the (possibly partial) output and the collected errors.
    pub fn into_parts(self) -> (T, ThingErrors) {
        (self.output, self.errors)
    }

    /// The output if nothing went wrong, otherwise every collected error.
    pub fn into_result(self) -> Result<T, ThingErrors> {
        self.errors.into_result(self.output)
    }
}

/// Quote an identifier the way every generator does.
pub(crate) fn quote(ident: &str) -> String {
    format!("\"{}\"", ident)
}

/// Log the outcome of a generation run.
pub(crate) fn trace_outcome(kind: &'static str, thing: &str, errors: &ThingErrors) {
    if errors.is_empty() {
        tracing::debug!(kind, thing, "generated sql");
    } else {
        tracing::warn!(kind, thing, errors = errors.len(), "generated sql with errors");
        for err in errors {
            tracing::debug!(kind, thing, error = %err);
        }
    }
}
