//! Name-keyed schema cache shared by every document of a batch.
//!
//! The store keeps two parallel views of each schema: the typed [`Schema`] and
//! the raw JSON object it was decoded from. The raw view is what vendor
//! extension scans (`x-ves-*`) work on.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::openapi::{ref_name, Schema, Spec};

/// Explicit schema cache passed through the loader and resolver
#[derive(Debug, Default, Clone)]
pub struct SchemaStore {
    schemas: BTreeMap<String, Schema>,
    raw: BTreeMap<String, JsonValue>,
    collisions: usize,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge every schema of `spec` into the store.
    ///
    /// A name already present with different content is overwritten and counted
    /// as a collision. Returns the number of collisions caused by this document.
    pub fn merge(&mut self, spec: &Spec, raw: &JsonValue) -> usize {
        let raw_schemas = raw
            .pointer("/components/schemas")
            .and_then(JsonValue::as_object);
        let mut collisions = 0;

        for (name, schema) in &spec.components.schemas {
            if let Some(previous) = self.schemas.get(name) {
                if previous != schema {
                    log::warn!(
                        "Schema '{}' redefined by a later spec; keeping the later definition",
                        name
                    );
                    collisions += 1;
                }
            }
            self.schemas.insert(name.clone(), schema.clone());
            if let Some(raw_schema) = raw_schemas.and_then(|m| m.get(name)) {
                self.raw.insert(name.clone(), raw_schema.clone());
            }
        }

        self.collisions += collisions;
        collisions
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Total number of name collisions seen so far
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Look a reference up in `local` first, then in the store
    pub fn lookup<'a>(&'a self, reference: &str, local: Option<&'a Spec>) -> Option<&'a Schema> {
        let name = ref_name(reference);
        local
            .and_then(|spec| spec.schema(name))
            .or_else(|| self.schemas.get(name))
    }

    /// Raw JSON of schema `name`, taken from `local` when that document defines it.
    ///
    /// Mirrors [`SchemaStore::lookup`] so the raw view always comes from the same
    /// document as the typed one.
    pub fn raw_lookup<'a>(&'a self, name: &str, local: Option<&'a JsonValue>) -> Option<&'a JsonValue> {
        local
            .and_then(|doc| doc.get("components"))
            .and_then(|components| components.get("schemas"))
            .and_then(|schemas| schemas.get(name))
            .or_else(|| self.raw.get(name))
    }

    /// Resolve a reference, degrading to a `string` schema when it is unknown.
    ///
    /// Callers that need to know about the fallback use [`SchemaStore::lookup`].
    pub fn resolve<'a>(&'a self, reference: &str, local: Option<&'a Spec>) -> Cow<'a, Schema> {
        match self.lookup(reference, local) {
            Some(schema) => Cow::Borrowed(schema),
            None => {
                log::debug!("Unresolved reference '{}', falling back to string", reference);
                Cow::Owned(Schema::string())
            }
        }
    }
}
