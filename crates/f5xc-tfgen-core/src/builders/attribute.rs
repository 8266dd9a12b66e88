//! Converts OpenAPI schemas into trees of [`TerraformAttribute`].

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use super::sort::sort_nested;
use crate::description;
use crate::error::{Error, Result};
use crate::oneof::OneOfIndex;
use crate::openapi::{AdditionalProperties, Schema, Spec};
use crate::store::SchemaStore;
use crate::templates::{AttributeKind, NestedBlockType, Requirement, TerraformAttribute};

/// Deepest level at which nested properties are still expanded
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Upper bound on `$ref` -> `$ref` alias chains
const MAX_ALIAS_HOPS: usize = 16;

/// Builds attribute trees for one resource.
///
/// Recursion is bounded by depth rather than by cycle detection: at `max_depth`
/// a block is emitted with no children, which terminates any self-referential schema.
#[derive(Debug)]
pub struct AttributeBuilder<'a> {
    store: &'a SchemaStore,
    local: Option<&'a Spec>,
    local_raw: Option<&'a JsonValue>,
    max_depth: usize,
    strict: bool,
    fallbacks: usize,
    unresolved: BTreeSet<String>,
}

impl<'a> AttributeBuilder<'a> {
    pub fn new(store: &'a SchemaStore) -> Self {
        Self {
            store,
            local: None,
            local_raw: None,
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
            fallbacks: 0,
            unresolved: BTreeSet::new(),
        }
    }

    /// Resolve references against this document before the shared store.
    ///
    /// `raw` is the JSON the typed `spec` was decoded from; vendor markers of
    /// locally defined schemas are read from it.
    pub fn with_local_document(mut self, spec: &'a Spec, raw: &'a JsonValue) -> Self {
        self.local = Some(spec);
        self.local_raw = Some(raw);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fail on unresolved references instead of degrading them to `string`
    pub fn with_strict_refs(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Number of references degraded to `string` so far
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }

    /// Distinct references that could not be resolved
    pub fn unresolved(&self) -> &BTreeSet<String> {
        &self.unresolved
    }

    /// Top-level attributes of a resource schema, unsorted.
    ///
    /// `origin` names the schema in the store so vendor `x-ves-required` markers
    /// can be read from its raw JSON. Members of a OneOf group get the group name,
    /// and the canonical member gets the `[OneOf: ...]` prefix.
    pub fn build_resource_attributes(
        &mut self,
        schema: &Schema,
        origin: Option<&str>,
        one_of: &OneOfIndex,
    ) -> Result<Vec<TerraformAttribute>> {
        let required = self.required_fields(schema, origin);
        let mut attributes = Vec::with_capacity(schema.properties.len());

        for (name, property) in &schema.properties {
            let group = one_of.group_of(name);
            let mut attr =
                self.build_attribute(name, property, required.contains(name), group, 0)?;
            if let Some(annotation) = one_of.annotation_for(name) {
                attr.description = format!("{annotation} {}", attr.description);
            }
            attributes.push(attr);
        }

        Ok(attributes)
    }

    /// Build one attribute, recursing into nested objects below `max_depth`
    pub fn build_attribute(
        &mut self,
        name: &str,
        schema: &Schema,
        required: bool,
        one_of_group: Option<&str>,
        depth: usize,
    ) -> Result<TerraformAttribute> {
        let origin = schema.ref_name();
        let resolved = self.resolve_schema(schema)?;

        let requirement = if resolved.read_only {
            Requirement::Computed
        } else if required {
            Requirement::Required
        } else {
            Requirement::Optional
        };
        let mut attr = TerraformAttribute::scalar(
            name,
            AttributeKind::String,
            requirement,
            description::describe(name, &resolved),
        );
        attr.depth = depth;
        attr.one_of_group = one_of_group.map(str::to_string);

        match resolved.kind.as_deref() {
            Some("array") => self.map_array(&mut attr, &resolved, depth)?,
            Some("object") | None if resolved.is_free_form_map() => {
                attr.kind = AttributeKind::Map;
                attr.element_type = Some(self.map_value_kind(&resolved)?);
            }
            Some("object") => {
                self.nest(&mut attr, &resolved, origin, NestedBlockType::Single, depth)?
            }
            None if !resolved.properties.is_empty() => {
                self.nest(&mut attr, &resolved, origin, NestedBlockType::Single, depth)?
            }
            other => {
                attr.kind = AttributeKind::from_primitive(other).unwrap_or_else(|| {
                    log::debug!("Property '{}' has type {:?}, using string", name, other);
                    AttributeKind::String
                });
            }
        }

        Ok(attr)
    }

    fn map_array(
        &mut self,
        attr: &mut TerraformAttribute,
        array: &Schema,
        depth: usize,
    ) -> Result<()> {
        attr.kind = AttributeKind::List;
        let Some(items) = array.items.as_deref() else {
            attr.element_type = Some(AttributeKind::String);
            return Ok(());
        };

        let origin = items.ref_name();
        let item = self.resolve_schema(items)?;
        if item.is_object() {
            return self.nest(attr, &item, origin, NestedBlockType::List, depth);
        }
        attr.element_type =
            Some(AttributeKind::from_primitive(item.kind.as_deref()).unwrap_or(AttributeKind::String));
        Ok(())
    }

    fn map_value_kind(&mut self, map: &Schema) -> Result<AttributeKind> {
        let kind = match &map.additional_properties {
            Some(AdditionalProperties::Schema(value)) => {
                let value = self.resolve_schema(value)?;
                AttributeKind::from_primitive(value.kind.as_deref())
            }
            _ => None,
        };
        Ok(kind.unwrap_or(AttributeKind::String))
    }

    fn nest(
        &mut self,
        attr: &mut TerraformAttribute,
        object: &Schema,
        origin: Option<&str>,
        block: NestedBlockType,
        depth: usize,
    ) -> Result<()> {
        attr.is_block = true;
        attr.nested_block_type = Some(block);
        match block {
            NestedBlockType::Single => attr.kind = AttributeKind::Object,
            NestedBlockType::List => {
                attr.kind = AttributeKind::List;
                attr.element_type = Some(AttributeKind::Object);
            }
        }

        if depth >= self.max_depth {
            log::debug!(
                "Depth limit {} reached at '{}', nested properties dropped",
                self.max_depth,
                attr.name
            );
            return Ok(());
        }

        let required = self.required_fields(object, origin);
        let mut children = Vec::with_capacity(object.properties.len());
        for (name, property) in &object.properties {
            children.push(self.build_attribute(
                name,
                property,
                required.contains(name),
                None,
                depth + 1,
            )?);
        }
        sort_nested(&mut children);
        attr.nested_attributes = children;
        Ok(())
    }

    /// Follow `$ref` chains; an unknown target becomes a `string` schema (or an error in strict mode)
    fn resolve_schema<'s>(&mut self, schema: &'s Schema) -> Result<Cow<'s, Schema>>
    where
        'a: 's,
    {
        let mut current = Cow::Borrowed(schema);
        for _ in 0..MAX_ALIAS_HOPS {
            let Some(reference) = current.reference.clone() else {
                return Ok(current);
            };
            let resolved = self.store.resolve(&reference, self.local);
            if let Cow::Owned(_) = resolved {
                self.record_unresolved(&reference)?;
            }
            current = resolved;
        }

        log::warn!(
            "Reference chain starting at {:?} exceeds {} hops, using string",
            schema.reference,
            MAX_ALIAS_HOPS
        );
        Ok(Cow::Owned(Schema::string()))
    }

    fn record_unresolved(&mut self, reference: &str) -> Result<()> {
        if self.strict {
            return Err(Error::UnresolvedReference(reference.to_string()));
        }
        self.fallbacks += 1;
        if self.unresolved.insert(reference.to_string()) {
            log::warn!("Unresolved reference '{}' rendered as string", reference);
        }
        Ok(())
    }

    /// Required property names: the schema's `required` list plus vendor `x-ves-required` markers
    fn required_fields(&self, schema: &Schema, origin: Option<&str>) -> BTreeSet<String> {
        let mut required: BTreeSet<String> = schema.required.iter().cloned().collect();
        let raw_properties = origin
            .and_then(|name| self.store.raw_lookup(name, self.local_raw))
            .and_then(|raw| raw.get("properties"))
            .and_then(JsonValue::as_object);

        if let Some(properties) = raw_properties {
            for (name, property) in properties {
                let marked = match property.get("x-ves-required") {
                    Some(JsonValue::Bool(flag)) => *flag,
                    Some(JsonValue::String(flag)) => flag.eq_ignore_ascii_case("true"),
                    _ => false,
                };
                if marked {
                    required.insert(name.clone());
                }
            }
        }
        required
    }
}
