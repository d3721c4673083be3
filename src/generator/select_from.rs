//! SELECT generation with filters and pagination.

use std::collections::BTreeMap;

use super::{quote, trace_outcome, GenerateSql, Generated, MAIN_TABLE_ALIAS};
use crate::error::{ThingError, ThingErrors, ThingResult};
use crate::registry::SchemaStore;
use crate::schema::{FieldType, Thing};
use crate::tokenizer::{is_comparison, is_logical, tokenize};
use crate::value::Value;

/// Reserved field-selection key carrying the filter expression.
pub const WHERE_KEY: &str = "_where";

/// Generates a SELECT over one thing.
///
/// `fields` maps field keys to ignored values, except for [`WHERE_KEY`],
/// whose string value is a filter such as `name = 'Ada Lovelace' AND age > 30`.
/// Literals in the filter become positional parameters `$1, $2, ...`; their
/// raw text is returned in [`SelectQuery::where_values`].
///
/// With `count > 0` the result is paginated: `page` starts at 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectFromTable {
    pub thing_name: String,
    pub fields: BTreeMap<String, Value>,
    pub page: u32,
    pub count: u32,
}

/// A generated SELECT and its positional parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub sql: String,
    /// Bound values for `$1, $2, ...`, in order, as written in the filter.
    pub where_values: Vec<String>,
}

impl SelectQuery {
    pub fn where_values(&self) -> &[String] {
        &self.where_values
    }
}

impl SelectFromTable {
    pub fn new(thing_name: impl Into<String>) -> Self {
        Self {
            thing_name: thing_name.into(),
            ..Default::default()
        }
    }

    /// Select a field; it comes back aliased by its key.
    pub fn field(mut self, key: impl Into<String>) -> Self {
        self.fields.insert(key.into(), Value::Null);
        self
    }

    /// Set the filter expression.
    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.fields.insert(WHERE_KEY.to_string(), Value::String(expr.into()));
        self
    }

    pub fn paginate(mut self, page: u32, count: u32) -> Self {
        self.page = page;
        self.count = count;
        self
    }

    fn columns_sql(&self, thing: &Thing, errors: &mut ThingErrors) -> String {
        let mut columns = Vec::new();
        for key in self.fields.keys().filter(|k| k.as_str() != WHERE_KEY) {
            if let Some(field) = errors.collect(thing.get_field(key)) {
                columns.push(format!(
                    "{}.{} as {}",
                    MAIN_TABLE_ALIAS,
                    quote(&field.column_name()),
                    quote(key)
                ));
            }
        }
        columns.join(", ")
    }

    fn where_sql(
        &self,
        thing: &Thing,
        where_values: &mut Vec<String>,
    ) -> ThingResult<Option<String>> {
        let Some(filter) = self.fields.get(WHERE_KEY) else {
            return Ok(None);
        };
        let Some(expr) = filter.as_str() else {
            return Err(ThingError::invalid_where("_where must be string"));
        };

        let tokens = tokenize(expr);
        if tokens.is_empty() {
            return Err(ThingError::invalid_where("_where is empty"));
        }

        Ok(Some(compile_where(thing, &tokens, where_values)))
    }

    fn pagination_sql(&self) -> ThingResult<Option<String>> {
        if self.count == 0 {
            return Ok(None);
        }
        if self.page == 0 {
            return Err(ThingError::InvalidPagination {
                page: self.page,
                count: self.count,
            });
        }

        let offset = (u64::from(self.page) - 1) * u64::from(self.count);
        Ok(Some(format!("LIMIT {}\nOFFSET {}", self.count, offset)))
    }
}

/// Compile filter tokens into a WHERE clause, binding literals as `$n`.
///
/// Tokens are emitted in order without precedence handling; the expression
/// must already be a valid chain of comparisons.
pub fn compile_where(thing: &Thing, tokens: &[String], where_values: &mut Vec<String>) -> String {
    let mut clause = String::new();

    for token in tokens {
        if let Some(field) = thing.fields.get(token.as_str()) {
            let column = format!("{}.{}", MAIN_TABLE_ALIAS, quote(&field.column_name()));
            if field.field_type == FieldType::Number {
                clause.push_str(&format!("COALESCE({}, 0) ", column));
            } else {
                clause.push_str(&column);
                clause.push(' ');
            }
        } else if is_comparison(token) {
            clause.push_str(token);
            clause.push(' ');
        } else if is_logical(token) {
            clause.push(' ');
            clause.push_str(token);
            clause.push(' ');
        } else {
            where_values.push(token.clone());
            clause.push_str(&format!("${}", where_values.len()));
        }
    }

    clause.trim_end().to_string()
}

impl GenerateSql for SelectFromTable {
    type Output = SelectQuery;

    fn generate(&self, store: &SchemaStore) -> Generated<SelectQuery> {
        let mut errors = ThingErrors::new();

        let Some(thing) = errors.collect(store.get(&self.thing_name)) else {
            trace_outcome("select", &self.thing_name, &errors);
            return Generated::new(SelectQuery::default(), errors);
        };

        let mut where_values = Vec::new();
        let columns = self.columns_sql(thing, &mut errors);
        let filter = errors.collect(self.where_sql(thing, &mut where_values)).flatten();
        let pagination = errors.collect(self.pagination_sql()).flatten();

        let mut sql = format!(
            "SELECT {}\nFROM {} {}",
            columns,
            quote(&thing.table_name()),
            MAIN_TABLE_ALIAS
        );
        if let Some(filter) = filter {
            sql.push_str("\nWHERE ");
            sql.push_str(&filter);
        }
        if let Some(pagination) = pagination {
            sql.push('\n');
            sql.push_str(&pagination);
        }

        trace_outcome("select", &self.thing_name, &errors);
        Generated::new(SelectQuery { sql, where_values }, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use pretty_assertions::assert_eq;

    fn store() -> SchemaStore {
        let mut store = SchemaStore::new();
        store.register(
            Thing::new("person")
                .field(Field::primary_key("id"))
                .field(Field::string("fullName"))
                .field(Field::number("age"))
                .field(Field::thing_ref("employer", "company")),
        );
        store
    }

    #[test]
    fn test_columns_aliased_by_key() {
        let query = SelectFromTable::new("person")
            .field("fullName")
            .field("employer")
            .generate(&store())
            .into_result()
            .unwrap();

        assert_eq!(
            query.sql,
            "SELECT t.\"employer_id\" as \"employer\", t.\"full_name\" as \"fullName\"\nFROM \"person\" t"
        );
        assert!(query.where_values().is_empty());
    }

    #[test]
    fn test_number_fields_coalesced() {
        let query = SelectFromTable::new("person")
            .field("id")
            .filter("age >= 18 or fullName = 'Ada Lovelace'")
            .generate(&store())
            .into_result()
            .unwrap();

        assert_eq!(
            query.sql,
            "SELECT t.\"id\" as \"id\"\nFROM \"person\" t\nWHERE COALESCE(t.\"age\", 0) >= $1 or t.\"full_name\" = $2"
        );
        assert_eq!(query.where_values, vec!["18", "Ada Lovelace"]);
    }

    #[test]
    fn test_pagination_offset() {
        let query = SelectFromTable::new("person")
            .field("id")
            .paginate(3, 25)
            .generate(&store())
            .into_result()
            .unwrap();

        assert!(query.sql.ends_with("\nLIMIT 25\nOFFSET 50"));
    }

    #[test]
    fn test_page_zero_rejected() {
        let generated = SelectFromTable::new("person")
            .field("id")
            .paginate(0, 10)
            .generate(&store());

        assert!(matches!(
            generated.errors().iter().next(),
            Some(ThingError::InvalidPagination { page: 0, count: 10 })
        ));
        assert!(!generated.output().sql.contains("LIMIT"));
    }

    #[test]
    fn test_where_must_be_string() {
        let mut select = SelectFromTable::new("person").field("id");
        select.fields.insert(WHERE_KEY.to_string(), Value::Boolean(true));

        let generated = select.generate(&store());
        assert_eq!(generated.errors().to_string(), "_where must be string");
        assert_eq!(generated.output().sql, "SELECT t.\"id\" as \"id\"\nFROM \"person\" t");
    }

    #[test]
    fn test_empty_where() {
        let generated = SelectFromTable::new("person").field("id").filter("   ").generate(&store());
        assert_eq!(generated.errors().to_string(), "_where is empty");
    }

    #[test]
    fn test_underscore_keys_are_fields() {
        let generated = SelectFromTable::new("person")
            .field("id")
            .field("_hidden")
            .generate(&store());

        assert_eq!(generated.errors().to_string(), "field: _hidden not in thing: person");
        assert_eq!(generated.output().sql, "SELECT t.\"id\" as \"id\"\nFROM \"person\" t");
    }
}
