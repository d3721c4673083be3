//! The schema store: every registered [`Thing`], by name.
//!
//! The store is a plain value owned by the caller and passed by reference to
//! the generators. It has no interior locking; share it behind an
//! `Arc<RwLock<_>>` or finish registering before handing out `&SchemaStore`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ThingError, ThingResult};
use crate::schema::Thing;

#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    things: HashMap<String, Thing>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a thing. References are not checked here.
    pub fn register(&mut self, thing: Thing) {
        tracing::trace!(thing = %thing.name, fields = thing.fields.len(), "register");
        if let Some(previous) = self.things.insert(thing.name.clone(), thing) {
            tracing::debug!(thing = %previous.name, "replaced existing thing");
        }
    }

    pub fn get(&self, name: &str) -> ThingResult<&Thing> {
        self.things
            .get(name)
            .ok_or_else(|| ThingError::SchemaNotFound(name.to_string()))
    }

    /// Remove every registered thing.
    pub fn clear(&mut self) {
        tracing::debug!(count = self.things.len(), "clearing schema store");
        self.things.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.things.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.things.len()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }

    /// Registered names in ascending order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.things.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register every thing in a JSON schema document, which holds either one
    /// thing object or an array of them.
    ///
    /// Returns how many things were registered. Nothing is registered if the
    /// document fails to parse.
    pub fn register_json(&mut self, json: &str) -> ThingResult<usize> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        let things: Vec<Thing> = if document.is_array() {
            serde_json::from_value(document)?
        } else {
            vec![serde_json::from_value(document)?]
        };

        let count = things.len();
        for thing in things {
            self.register(thing);
        }
        Ok(count)
    }

    /// Read a JSON schema document from disk and register its things.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ThingResult<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let count = self.register_json(&content)?;
        tracing::debug!(path = %path.display(), count, "loaded schema document");
        Ok(count)
    }
}

impl Extend<Thing> for SchemaStore {
    fn extend<I: IntoIterator<Item = Thing>>(&mut self, iter: I) {
        for thing in iter {
            self.register(thing);
        }
    }
}

impl FromIterator<Thing> for SchemaStore {
    fn from_iter<I: IntoIterator<Item = Thing>>(iter: I) -> Self {
        let mut store = SchemaStore::new();
        store.extend(iter);
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn test_register_and_get() {
        let mut store = SchemaStore::new();
        store.register(Thing::new("otherThing").field(Field::string("string")));

        let thing = store.get("otherThing").unwrap();
        assert_eq!(thing.table_name(), "other_thing");
        assert!(store.contains("otherThing"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unregistered() {
        let store = SchemaStore::new();
        let err = store.get("ghost").unwrap_err();
        assert!(matches!(err, ThingError::SchemaNotFound(ref name) if name == "ghost"));
    }

    #[test]
    fn test_register_overwrites() {
        let mut store = SchemaStore::new();
        store.register(Thing::new("a").field(Field::string("one")));
        store.register(Thing::new("a").field(Field::string("two")));

        assert_eq!(store.len(), 1);
        assert!(store.get("a").unwrap().get_field("two").is_ok());
    }

    #[test]
    fn test_clear() {
        let mut store: SchemaStore = vec![Thing::new("a"), Thing::new("b")].into_iter().collect();
        assert_eq!(store.names(), vec!["a", "b"]);

        store.clear();
        assert!(store.is_empty());
        assert!(matches!(store.get("a"), Err(ThingError::SchemaNotFound(_))));
    }

    #[test]
    fn test_register_json_array() {
        let mut store = SchemaStore::new();
        let count = store
            .register_json(
                r#"[
                    { "name": "a", "fields": { "x": { "name": "x", "type": "STRING" } } },
                    { "name": "b", "fields": {} }
                ]"#,
            )
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_register_json_single() {
        let mut store = SchemaStore::new();
        let count = store
            .register_json(r#"{ "name": "solo", "fields": {} }"#)
            .unwrap();
        assert_eq!(count, 1);
        assert!(store.contains("solo"));
    }

    #[test]
    fn test_register_json_reports_bad_type() {
        let mut store = SchemaStore::new();
        let err = store
            .register_json(r#"{ "name": "bad", "fields": { "x": { "name": "x", "type": "BLOB" } } }"#)
            .unwrap_err();

        assert!(matches!(err, ThingError::Json(_)));
        assert!(err.to_string().contains("BLOB"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_register_json_array_reports_bad_type() {
        let mut store = SchemaStore::new();
        let err = store
            .register_json(
                r#"[
                    { "name": "good", "fields": {} },
                    { "name": "bad", "fields": { "x": { "name": "x", "type": "BLOB" } } }
                ]"#,
            )
            .unwrap_err();

        assert!(matches!(err, ThingError::Json(_)));
        assert!(err.to_string().contains("BLOB"), "{}", err);
        assert!(store.is_empty());
    }
}
