//! # thingsql — Schema-driven SQL generation
//!
//! > **Describe your Things. Get your SQL.**
//!
//! thingsql turns declarative entity definitions ("Things") into
//! parameterized PostgreSQL statements: `CREATE TABLE` for a thing and
//! everything it references, `INSERT` with named parameters, and `SELECT`
//! with aliased columns, a small filter language and pagination.
//!
//! ## Quick Example
//!
//! ```
//! use thingsql::prelude::*;
//!
//! let mut store = SchemaStore::new();
//! store.register(
//!     Thing::new("blogPost")
//!         .field(Field::primary_key("id"))
//!         .field(Field::string("title"))
//!         .field(Field::boolean("published")),
//! );
//!
//! let query = SelectFromTable::new("blogPost")
//!     .field("title")
//!     .filter("published = true")
//!     .paginate(1, 10)
//!     .generate(&store)
//!     .into_result()
//!     .unwrap();
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT t.\"title\" as \"title\"\nFROM \"blog_post\" t\nWHERE t.\"published\" = $1\nLIMIT 10\nOFFSET 0"
//! );
//! assert_eq!(query.where_values, vec!["true"]);
//! ```
//!
//! ## Field types
//!
//! | Type         | Column                     |
//! |--------------|----------------------------|
//! | `PrimaryKey` | `SERIAL PRIMARY KEY`       |
//! | `String`     | `TEXT`                     |
//! | `Number`     | `NUMERIC(18, 4)`           |
//! | `Boolean`    | `BOOLEAN`                  |
//! | `Date`       | `DATE`                     |
//! | `ThingRef`   | `<name>_id SERIAL`         |
//! | `Relation`   | `<name>_id SERIAL` on the many-to-one side only |
//!
//! Generators collect every error instead of stopping at the first one;
//! always check [`Generated::is_ok`](generator::Generated::is_ok) before
//! executing the output.

pub mod config;
pub mod error;
pub mod generator;
pub mod registry;
pub mod schema;
pub mod tokenizer;
pub mod value;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::generator::{
        CreateTable, GenerateSql, Generated, InsertIntoTable, InsertQuery, SelectFromTable,
        SelectQuery,
    };
    pub use crate::registry::SchemaStore;
    pub use crate::schema::{Field, FieldType, Relation, RelationKind, Thing, ThingConstraints};
    pub use crate::value::{Row, Value};
}

/// Tokenize a filter expression.
///
/// # Example
///
/// ```
/// let tokens = thingsql::tokenize("name = 'Ada Lovelace'");
/// assert_eq!(tokens, vec!["name", "=", "Ada Lovelace"]);
/// ```
pub fn tokenize(input: &str) -> Vec<String> {
    tokenizer::tokenize(input)
}
