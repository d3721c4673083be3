//! INSERT generation.

use std::collections::BTreeMap;

use super::{quote, trace_outcome, GenerateSql, Generated};
use crate::error::{ThingError, ThingErrors};
use crate::registry::SchemaStore;
use crate::schema::FieldType;
use crate::value::Value;

/// Generates a single INSERT with named parameters for one thing.
///
/// Columns follow the value map's key order. Reference fields bind as
/// `:<field>Id` into their `<field>_id` column.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertIntoTable {
    pub thing_name: String,
    pub values: BTreeMap<String, Value>,
}

/// A generated INSERT and the parameters it expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertQuery {
    pub sql: String,
    /// `(parameter name, value)` in the order they appear in `sql`.
    pub params: Vec<(String, Value)>,
}

impl InsertIntoTable {
    pub fn new(thing_name: impl Into<String>) -> Self {
        Self {
            thing_name: thing_name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Set the value of one field.
    pub fn value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }
}

impl GenerateSql for InsertIntoTable {
    type Output = InsertQuery;

    fn generate(&self, store: &SchemaStore) -> Generated<InsertQuery> {
        let mut errors = ThingErrors::new();

        let Some(thing) = errors.collect(store.get(&self.thing_name)) else {
            trace_outcome("insert", &self.thing_name, &errors);
            return Generated::new(InsertQuery::default(), errors);
        };

        let mut columns: Vec<String> = Vec::new();
        let mut placeholders: Vec<String> = Vec::new();
        let mut params = Vec::new();

        for (key, value) in &self.values {
            let Some(field) = errors.collect(thing.get_field(key)) else {
                continue;
            };

            if field.field_type == FieldType::PrimaryKey {
                errors.push(ThingError::InvalidPrimaryKeyInsert {
                    thing: thing.name.clone(),
                    field: key.clone(),
                });
                continue;
            }

            let param = field.param_name();
            columns.push(quote(&field.column_name()));
            placeholders.push(format!(":{}", param));
            params.push((param, value.clone()));
        }

        let sql = format!(
            "INSERT INTO {} ({})\nVALUES ({})",
            quote(&thing.table_name()),
            columns.join(", "),
            placeholders.join(", ")
        );

        trace_outcome("insert", &self.thing_name, &errors);
        Generated::new(InsertQuery { sql, params }, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Thing};
    use pretty_assertions::assert_eq;

    fn store() -> SchemaStore {
        let mut store = SchemaStore::new();
        store.register(
            Thing::new("orderLine")
                .field(Field::primary_key("id"))
                .field(Field::number("quantity"))
                .field(Field::thing_ref("product", "product")),
        );
        store
    }

    #[test]
    fn test_reference_param_name() {
        let query = InsertIntoTable::new("orderLine")
            .value("quantity", 3)
            .value("product", 12)
            .generate(&store())
            .into_result()
            .unwrap();

        assert_eq!(
            query.sql,
            "INSERT INTO \"order_line\" (\"product_id\", \"quantity\")\nVALUES (:productId, :quantity)"
        );
        assert_eq!(
            query.params,
            vec![
                ("productId".to_string(), Value::Number(12.0)),
                ("quantity".to_string(), Value::Number(3.0)),
            ]
        );
    }

    #[test]
    fn test_primary_key_rejected() {
        let generated = InsertIntoTable::new("orderLine")
            .value("id", 1)
            .value("quantity", 3)
            .generate(&store());

        assert!(!generated.is_ok());
        assert!(matches!(
            generated.errors().iter().next(),
            Some(ThingError::InvalidPrimaryKeyInsert { .. })
        ));
        assert_eq!(
            generated.output().sql,
            "INSERT INTO \"order_line\" (\"quantity\")\nVALUES (:quantity)"
        );
    }

    #[test]
    fn test_unknown_field_collected() {
        let (query, errors) = InsertIntoTable::new("orderLine")
            .value("colour", "red")
            .value("quantity", 1)
            .generate(&store())
            .into_parts();

        assert_eq!(errors.to_string(), "field: colour not in thing: orderLine");
        assert_eq!(query.params.len(), 1);
    }

    #[test]
    fn test_unregistered_thing() {
        let generated = InsertIntoTable::new("ghost").value("a", 1).generate(&store());
        assert_eq!(generated.errors().to_string(), "thing: ghost doesn't exist");
        assert!(generated.output().sql.is_empty());
    }
}
