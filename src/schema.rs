//! Schema model: Things and their typed Fields.
//!
//! A [`Thing`] is a named entity that maps to one table. Each [`Field`]
//! carries a closed [`FieldType`]; reference fields (`ThingRef` and
//! `Relation`) point at other things by name and are resolved lazily
//! through the [`SchemaStore`](crate::registry::SchemaStore) at generation
//! time.
//!
//! Things round-trip through JSON using the authoring document keys:
//!
//! ```json
//! {
//!   "name": "childThing",
//!   "fields": {
//!     "string": { "name": "string", "type": "STRING" },
//!     "parent": {
//!       "name": "parent",
//!       "type": "RELATION",
//!       "relation": { "type": "MANY_TO_ONE", "otherThingName": "parentThing", "otherFieldName": "children" }
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};

use crate::error::{ThingError, ThingResult};

/// A named entity definition, analogous to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    pub name: String,
    #[serde(default)]
    pub constraints: ThingConstraints,
    /// Fields by key. Keys are usually the field name but need not be.
    #[serde(default)]
    pub fields: HashMap<String, Field>,
}

/// Ownership rules attached to a thing. Carried through, not enforced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingConstraints {
    #[serde(rename = "AssignedToUser", default)]
    pub assigned_to_user: bool,
}

impl Thing {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: ThingConstraints::default(),
            fields: HashMap::new(),
        }
    }

    /// Add a field keyed by its own name.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Add a field under an explicit key.
    pub fn field_with_key(mut self, key: impl Into<String>, field: Field) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    pub fn assigned_to_user(mut self, assigned: bool) -> Self {
        self.constraints.assigned_to_user = assigned;
        self
    }

    /// Look up a field by key.
    pub fn get_field(&self, key: &str) -> ThingResult<&Field> {
        self.fields
            .get(key)
            .ok_or_else(|| ThingError::field_not_found(&self.name, key))
    }

    /// All fields, sorted ascending by field name.
    ///
    /// Every generated column list follows this order.
    pub fn fields(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.values().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields().into_iter().map(|f| f.name.as_str()).collect()
    }

    pub fn table_name(&self) -> String {
        self.name.to_snake_case()
    }
}

/// A named, typed attribute of a thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldDocument", into = "FieldDocument")]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

/// The closed set of field types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    PrimaryKey,
    String,
    Number,
    Boolean,
    Date,
    /// Points at another thing without a declared counterpart.
    ThingRef { thing_name: String },
    /// One side of a bidirectional association.
    Relation(Relation),
}

/// A directional association between two things.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,
    pub other_thing_name: String,
    pub other_field_name: String,
}

/// Only the `ManyToOne` side owns a foreign-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    OneToMany,
    ManyToOne,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn primary_key(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::PrimaryKey)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn thing_ref(name: impl Into<String>, thing_name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::ThingRef {
                thing_name: thing_name.into(),
            },
        )
    }

    pub fn relation(
        name: impl Into<String>,
        kind: RelationKind,
        other_thing_name: impl Into<String>,
        other_field_name: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            FieldType::Relation(Relation {
                kind,
                other_thing_name: other_thing_name.into(),
                other_field_name: other_field_name.into(),
            }),
        )
    }

    /// Physical column name: snake case, `_id` suffixed for references.
    pub fn column_name(&self) -> String {
        let column = self.name.to_snake_case();
        if self.field_type.is_reference() {
            format!("{}_id", column)
        } else {
            column
        }
    }

    /// Named bind parameter used by INSERT: `name`, or `nameId` for references.
    pub fn param_name(&self) -> String {
        if self.field_type.is_reference() {
            format!("{}Id", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl FieldType {
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldType::ThingRef { .. } | FieldType::Relation(_))
    }

    /// Name of the thing this field points at, if it is a reference.
    pub fn referenced_thing(&self) -> Option<&str> {
        match self {
            FieldType::ThingRef { thing_name } => Some(thing_name),
            FieldType::Relation(relation) => Some(&relation.other_thing_name),
            FieldType::PrimaryKey
            | FieldType::String
            | FieldType::Number
            | FieldType::Boolean
            | FieldType::Date => None,
        }
    }

    /// Document spelling of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::PrimaryKey => "PRIMARY_KEY",
            FieldType::String => "STRING",
            FieldType::Number => "NUMBER",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Date => "DATE",
            FieldType::ThingRef { .. } => "THING",
            FieldType::Relation(_) => "RELATION",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::OneToMany => "ONE_TO_MANY",
            RelationKind::ManyToOne => "MANY_TO_ONE",
        }
    }

    fn parse(s: &str) -> ThingResult<Self> {
        match s {
            "ONE_TO_MANY" => Ok(RelationKind::OneToMany),
            "MANY_TO_ONE" => Ok(RelationKind::ManyToOne),
            other => Err(ThingError::UnsupportedFieldType(format!(
                "RELATION({})",
                other
            ))),
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Document form
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldDocument {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    type_thing_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation: Option<RelationDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationDocument {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    other_thing_name: String,
    #[serde(default)]
    other_field_name: String,
}

impl TryFrom<FieldDocument> for Field {
    type Error = ThingError;

    fn try_from(doc: FieldDocument) -> Result<Self, Self::Error> {
        let field_type = match doc.field_type.as_str() {
            "PRIMARY_KEY" => FieldType::PrimaryKey,
            "STRING" => FieldType::String,
            "NUMBER" => FieldType::Number,
            "BOOLEAN" => FieldType::Boolean,
            "DATE" => FieldType::Date,
            "THING" => {
                if doc.type_thing_name.is_empty() {
                    return Err(ThingError::UnsupportedFieldType(
                        "THING without typeThingName".to_string(),
                    ));
                }
                FieldType::ThingRef {
                    thing_name: doc.type_thing_name,
                }
            }
            "RELATION" => {
                let relation = doc.relation.ok_or_else(|| {
                    ThingError::UnsupportedFieldType("RELATION without relation".to_string())
                })?;
                FieldType::Relation(Relation {
                    kind: RelationKind::parse(&relation.kind)?,
                    other_thing_name: relation.other_thing_name,
                    other_field_name: relation.other_field_name,
                })
            }
            other => return Err(ThingError::UnsupportedFieldType(other.to_string())),
        };

        Ok(Field {
            name: doc.name,
            field_type,
        })
    }
}

impl From<Field> for FieldDocument {
    fn from(field: Field) -> Self {
        let field_type = field.field_type.as_str().to_string();
        let (type_thing_name, relation) = match field.field_type {
            FieldType::ThingRef { thing_name } => (thing_name, None),
            FieldType::Relation(relation) => (
                String::new(),
                Some(RelationDocument {
                    kind: relation.kind.as_str().to_string(),
                    other_thing_name: relation.other_thing_name,
                    other_field_name: relation.other_field_name,
                }),
            ),
            _ => (String::new(), None),
        };

        FieldDocument {
            name: field.name,
            field_type,
            type_thing_name,
            relation,
        }
    }
}
