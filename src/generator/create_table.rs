//! CREATE TABLE generation.

use std::collections::VecDeque;

use super::{quote, trace_outcome, GenerateSql, Generated};
use crate::error::ThingErrors;
use crate::registry::SchemaStore;
use crate::schema::{Field, FieldType, RelationKind, Thing};

/// Generates `CREATE TABLE IF NOT EXISTS` statements for a thing and every
/// thing reachable from it through reference fields.
///
/// Things are visited breadth-first, root first. A thing reachable through
/// two reference paths gets a statement for each path; a reference back to a
/// thing already on the current path is not followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub thing_name: String,
}

struct Visit<'s> {
    thing: &'s Thing,
    /// Names from the root down to and including `thing`.
    path: Vec<&'s str>,
}

impl CreateTable {
    pub fn new(thing_name: impl Into<String>) -> Self {
        Self {
            thing_name: thing_name.into(),
        }
    }
}

impl GenerateSql for CreateTable {
    type Output = Vec<String>;

    fn generate(&self, store: &SchemaStore) -> Generated<Vec<String>> {
        let mut errors = ThingErrors::new();
        let mut statements = Vec::new();

        let Some(root) = errors.collect(store.get(&self.thing_name)) else {
            trace_outcome("create_table", &self.thing_name, &errors);
            return Generated::new(statements, errors);
        };

        let mut queue = VecDeque::from([Visit {
            thing: root,
            path: vec![root.name.as_str()],
        }]);

        while let Some(visit) = queue.pop_front() {
            statements.push(table_sql(visit.thing));

            for field in visit.thing.fields() {
                let Some(target) = field.field_type.referenced_thing() else {
                    continue;
                };
                if visit.path.contains(&target) {
                    tracing::trace!(thing = %visit.thing.name, field = %field.name, to = target, "cycle, not followed");
                    continue;
                }
                if let Some(other) = errors.collect(store.get(target)) {
                    let mut path = visit.path.clone();
                    path.push(other.name.as_str());
                    queue.push_back(Visit { thing: other, path });
                }
            }
        }

        trace_outcome("create_table", &self.thing_name, &errors);
        Generated::new(statements, errors)
    }
}

/// The CREATE TABLE statement for one thing, columns in field-name order.
pub fn table_sql(thing: &Thing) -> String {
    let columns: Vec<String> = thing
        .fields()
        .into_iter()
        .filter_map(column_definition)
        .map(|def| format!("  {}", def))
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        quote(&thing.table_name()),
        columns.join(",\n")
    )
}

/// Column DDL for a field; `None` for fields that own no column.
pub fn column_definition(field: &Field) -> Option<String> {
    let column = quote(&field.column_name());
    let sql_type = match &field.field_type {
        FieldType::PrimaryKey => "SERIAL PRIMARY KEY",
        FieldType::String => "TEXT",
        FieldType::Number => "NUMERIC(18, 4)",
        FieldType::Boolean => "BOOLEAN",
        FieldType::Date => "DATE",
        FieldType::ThingRef { .. } => "SERIAL",
        FieldType::Relation(relation) => match relation.kind {
            RelationKind::ManyToOne => "SERIAL",
            RelationKind::OneToMany => return None,
        },
    };
    Some(format!("{} {}", column, sql_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_definitions() {
        assert_eq!(
            column_definition(&Field::primary_key("primaryKey")).unwrap(),
            r#""primary_key" SERIAL PRIMARY KEY"#
        );
        assert_eq!(
            column_definition(&Field::number("unitPrice")).unwrap(),
            r#""unit_price" NUMERIC(18, 4)"#
        );
        assert_eq!(
            column_definition(&Field::thing_ref("owner", "user")).unwrap(),
            r#""owner_id" SERIAL"#
        );
        assert_eq!(
            column_definition(&Field::relation("parent", RelationKind::ManyToOne, "node", "children"))
                .unwrap(),
            r#""parent_id" SERIAL"#
        );
    }

    #[test]
    fn test_one_to_many_has_no_column() {
        let field = Field::relation("children", RelationKind::OneToMany, "node", "parent");
        assert_eq!(column_definition(&field), None);
    }

    #[test]
    fn test_table_sql_sorted_columns() {
        let thing = Thing::new("lineItem")
            .field(Field::string("sku"))
            .field(Field::boolean("active"))
            .field(Field::primary_key("id"))
            .field(Field::date("created"));

        assert_eq!(
            table_sql(&thing),
            r#"CREATE TABLE IF NOT EXISTS "line_item" (
  "active" BOOLEAN,
  "created" DATE,
  "id" SERIAL PRIMARY KEY,
  "sku" TEXT
)"#
        );
    }

    #[test]
    fn test_unregistered_root() {
        let store = SchemaStore::new();
        let (statements, errors) = CreateTable::new("ghost").generate(&store).into_parts();

        assert!(statements.is_empty());
        assert_eq!(errors.to_string(), "thing: ghost doesn't exist");
    }

    #[test]
    fn test_self_reference_is_not_followed() {
        let mut store = SchemaStore::new();
        store.register(
            Thing::new("node")
                .field(Field::primary_key("id"))
                .field(Field::thing_ref("next", "node")),
        );

        let statements = CreateTable::new("node").generate(&store).into_result().unwrap();
        assert_eq!(statements.len(), 1);
    }
}
