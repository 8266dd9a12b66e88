//! Typed OpenAPI document model.
//!
//! Only the parts of an OpenAPI 3.x document the generator consumes are modeled:
//! `info`, `paths` and `components.schemas`. Vendor extensions are deliberately
//! absent from these structs; they are read from the raw JSON tree kept next to
//! every typed document (see [`crate::store::SchemaStore`]).
//!
//! # Examples
//!
//! ```
//! use f5xc_tfgen_core::openapi::Spec;
//!
//! let raw = serde_json::json!({
//!     "openapi": "3.0.3",
//!     "components": { "schemas": { "T": { "type": "string" } } }
//! });
//! let spec = Spec::from_value(&raw).unwrap();
//! assert_eq!(spec.schema("T").unwrap().kind.as_deref(), Some("string"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Prefix of every local schema reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// One parsed OpenAPI document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    /// OpenAPI version string
    #[serde(default)]
    pub openapi: String,

    /// Document metadata
    #[serde(default)]
    pub info: Info,

    /// Path templates and their operations
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,

    /// Reusable components
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
}

/// The operations defined on a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub post: Option<Operation>,
    pub put: Option<Operation>,
    pub delete: Option<Operation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

/// One named type definition.
///
/// When `reference` is set, every other field is ignored until the reference is resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Primitive kind, `object` or `array`
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub description: Option<String>,

    pub title: Option<String>,

    pub format: Option<String>,

    /// Ordered literal values
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<JsonValue>,

    pub default: Option<JsonValue>,

    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,

    pub items: Option<Box<Schema>>,

    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(rename = "$ref")]
    pub reference: Option<String>,

    #[serde(default)]
    pub required: Vec<String>,

    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
}

/// `additionalProperties` is either a flag or a value schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

impl Spec {
    /// Decode the typed view of an already parsed JSON document
    pub fn from_value(raw: &JsonValue) -> crate::Result<Self> {
        Ok(Spec::deserialize(raw)?)
    }

    /// Look up a schema defined by this document
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.schemas.get(name)
    }

    /// Name of the schema describing the creation payload of `resource`.
    ///
    /// F5XC names it `<package prefix><resource>CreateSpecType`; an exact suffix
    /// match wins over any other `*CreateSpecType` schema.
    pub fn create_spec_type_name(&self, resource: &str) -> Option<&str> {
        let exact = format!("{resource}CreateSpecType");
        let mut candidates = self
            .components
            .schemas
            .keys()
            .filter(|name| name.ends_with("CreateSpecType"));
        let first = candidates.clone().next();
        candidates
            .find(|name| name.ends_with(&exact))
            .or(first)
            .map(String::as_str)
    }

    /// Collection path used to create `plural` objects, normalized to a `{namespace}` placeholder
    pub fn collection_path(&self, plural: &str) -> Option<String> {
        let suffix = format!("/{plural}");
        self.paths
            .iter()
            .filter(|(path, item)| item.post.is_some() && path.ends_with(&suffix))
            .map(|(path, _)| path.replace("{metadata.namespace}", "{namespace}"))
            .find(|path| path.contains("/namespaces/{namespace}/"))
    }
}

impl Schema {
    /// Degraded placeholder used for unresolvable references
    pub fn string() -> Self {
        Self {
            kind: Some("string".to_string()),
            ..Default::default()
        }
    }

    /// Name targeted by a local `$ref`, if this schema is a reference
    pub fn ref_name(&self) -> Option<&str> {
        self.reference.as_deref().map(ref_name)
    }

    pub fn is_object(&self) -> bool {
        self.kind.as_deref() == Some("object") || !self.properties.is_empty()
    }

    /// True for a free-form map: `additionalProperties` without fixed properties
    pub fn is_free_form_map(&self) -> bool {
        self.properties.is_empty()
            && matches!(
                self.additional_properties,
                Some(AdditionalProperties::Allowed(true)) | Some(AdditionalProperties::Schema(_))
            )
    }
}

/// Extract `<Name>` from `#/components/schemas/<Name>`; other pointers keep their last segment
pub fn ref_name(reference: &str) -> &str {
    reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .unwrap_or_else(|| reference.rsplit('/').next().unwrap_or(reference))
}
