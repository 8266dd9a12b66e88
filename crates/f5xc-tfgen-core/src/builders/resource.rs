//! Assembles the [`ResourceTemplate`] of one resource from its spec document.

use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use super::attribute::{AttributeBuilder, DEFAULT_MAX_DEPTH};
use super::sort::sort_attributes;
use crate::description;
use crate::error::{Error, Result};
use crate::oneof::OneOfIndex;
use crate::openapi::Spec;
use crate::store::SchemaStore;
use crate::templates::{AttributeKind, Requirement, ResourceTemplate, TerraformAttribute};
use crate::utils::{pluralize, to_title_case};

/// Object metadata attributes added to every resource; they map to the API object's `metadata`
pub const METADATA_ATTRIBUTES: [&str; 4] = ["annotations", "labels", "description", "disable"];

/// Options shared by every resource of a batch
#[derive(Debug, Clone)]
pub struct ResourceOptions {
    /// Prefix of Terraform type names (`f5xc` -> `f5xc_http_loadbalancer`)
    pub provider_name: String,
    pub max_depth: usize,
    pub strict_refs: bool,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            provider_name: "f5xc".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            strict_refs: false,
        }
    }
}

/// A built resource plus the reference diagnostics collected while building it
#[derive(Debug, Clone)]
pub struct ResourceBuild {
    pub template: ResourceTemplate,
    pub fallbacks: usize,
    pub unresolved: BTreeSet<String>,
}

/// Build the template of resource `name` described by `spec`, decoded from `raw`.
///
/// Fails with [`Error::MissingCreateSpec`] when the document has no CreateSpecType
/// schema, and with [`Error::UnresolvedReference`] in strict reference mode.
pub fn build_resource(
    name: &str,
    spec: &Spec,
    raw: &JsonValue,
    store: &SchemaStore,
    options: &ResourceOptions,
) -> Result<ResourceBuild> {
    let schema_name = spec
        .create_spec_type_name(name)
        .ok_or_else(|| Error::MissingCreateSpec(name.to_string()))?;
    let create = spec
        .schema(schema_name)
        .ok_or_else(|| Error::MissingCreateSpec(name.to_string()))?;

    let one_of = store
        .raw_lookup(schema_name, Some(raw))
        .map(OneOfIndex::from_raw)
        .unwrap_or_default();

    let mut builder = AttributeBuilder::new(store)
        .with_local_document(spec, raw)
        .with_max_depth(options.max_depth)
        .with_strict_refs(options.strict_refs);
    let mut attributes = builder.build_resource_attributes(create, Some(schema_name), &one_of)?;
    add_metadata_attributes(&mut attributes);
    let attributes = sort_attributes(attributes);

    let title_case = to_title_case(name);
    let type_name = format!("{}_{}", options.provider_name, name);
    let plural = pluralize(name);
    let api_path = spec
        .collection_path(&plural)
        .unwrap_or_else(|| format!("/api/config/namespaces/{{namespace}}/{plural}"));

    let description = [spec.info.description.as_deref(), create.description.as_deref()]
        .into_iter()
        .flatten()
        .map(description::normalize)
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| format!("Manages a {title_case} resource in F5 Distributed Cloud."));

    let example_usage = example_usage(&type_name, name, &attributes);

    log::debug!(
        "Built resource '{}' from '{}' with {} attributes",
        name,
        schema_name,
        attributes.len()
    );

    Ok(ResourceBuild {
        template: ResourceTemplate {
            name: name.to_string(),
            title_case,
            type_name,
            api_path,
            description,
            attributes,
            example_usage,
            schema_name: schema_name.to_string(),
            one_of_groups: one_of.groups().clone(),
        },
        fallbacks: builder.fallbacks(),
        unresolved: builder.unresolved().clone(),
    })
}

/// Object metadata every F5XC resource accepts besides its spec
fn add_metadata_attributes(attributes: &mut Vec<TerraformAttribute>) {
    let metadata = [
        TerraformAttribute::scalar(
            "annotations",
            AttributeKind::Map,
            Requirement::Optional,
            "Unstructured key-value map stored with the object.",
        )
        .with_element_type(AttributeKind::String),
        TerraformAttribute::scalar(
            "labels",
            AttributeKind::Map,
            Requirement::Optional,
            "Map of string keys and values used to organize and select objects.",
        )
        .with_element_type(AttributeKind::String),
        TerraformAttribute::scalar(
            "description",
            AttributeKind::String,
            Requirement::Optional,
            "Human readable description of the object.",
        ),
        TerraformAttribute::scalar(
            "disable",
            AttributeKind::Bool,
            Requirement::Optional,
            "Administratively disable the object.",
        ),
    ];

    for attr in metadata {
        if !attributes.iter().any(|existing| existing.name == attr.name) {
            attributes.push(attr);
        }
    }
}

/// Minimal HCL configuration: identity plus every required attribute
pub fn example_usage(type_name: &str, name: &str, attributes: &[TerraformAttribute]) -> String {
    let mut assignments = Vec::new();
    let mut blocks = Vec::new();

    for attr in attributes.iter().filter(|a| a.is_required()) {
        if attr.is_block {
            blocks.push(format!("  {} {{}}", attr.tfsdk_tag));
            continue;
        }
        let value = match attr.name.as_str() {
            "name" => format!("\"example-{}\"", name.replace('_', "-")),
            "namespace" => "\"default\"".to_string(),
            _ => placeholder(attr.kind, attr.element_type),
        };
        assignments.push((attr.tfsdk_tag.as_str(), value));
    }

    let width = assignments.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut lines = vec![format!("resource \"{type_name}\" \"example\" {{")];
    lines.extend(
        assignments
            .iter()
            .map(|(key, value)| format!("  {key:<width$} = {value}")),
    );
    if !blocks.is_empty() {
        lines.push(String::new());
        lines.extend(blocks);
    }
    lines.push("}".to_string());
    lines.join("\n")
}

fn placeholder(kind: AttributeKind, element: Option<AttributeKind>) -> String {
    match kind {
        AttributeKind::String => "\"example\"".to_string(),
        AttributeKind::Int64 => "1".to_string(),
        AttributeKind::Bool => "true".to_string(),
        AttributeKind::Map | AttributeKind::Object => "{}".to_string(),
        AttributeKind::List => format!(
            "[{}]",
            placeholder(element.unwrap_or(AttributeKind::String), None)
        ),
    }
}
