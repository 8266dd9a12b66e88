//! Template-specific types for code generation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::to_title_case;

/// Terraform value kind of an attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Int64,
    Bool,
    Map,
    List,
    Object,
}

impl AttributeKind {
    /// Map an OpenAPI primitive type name; `None` for anything unrecognized
    pub fn from_primitive(kind: Option<&str>) -> Option<Self> {
        match kind? {
            "string" => Some(Self::String),
            "integer" | "number" => Some(Self::Int64),
            "boolean" => Some(Self::Bool),
            _ => None,
        }
    }
}

/// Exactly one of required, optional or computed holds for every attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    Optional,
    Computed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedBlockType {
    Single,
    List,
}

/// Behavioral tag controlling how a planned value is computed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanModifier {
    /// Changing the value destroys and recreates the resource
    RequiresReplace,
    /// Once known, a refresh keeps the prior state value
    UseStateForUnknown,
}

/// One Terraform schema attribute or block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerraformAttribute {
    /// Property name as written in the spec
    pub name: String,
    /// snake_case name used in `tfsdk` and `json` tags
    pub tfsdk_tag: String,
    /// Go field name
    pub go_name: String,
    pub kind: AttributeKind,
    /// Element kind for lists and maps
    pub element_type: Option<AttributeKind>,
    pub description: String,
    pub requirement: Requirement,
    pub is_block: bool,
    pub nested_block_type: Option<NestedBlockType>,
    /// Children, only populated for blocks
    pub nested_attributes: Vec<TerraformAttribute>,
    pub one_of_group: Option<String>,
    pub plan_modifier: Option<PlanModifier>,
    /// Recursion depth at which the attribute was discovered
    pub depth: usize,
}

impl TerraformAttribute {
    /// Scalar (non-block) attribute
    pub fn scalar(
        name: &str,
        kind: AttributeKind,
        requirement: Requirement,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            tfsdk_tag: crate::utils::to_snake_case(name),
            go_name: to_title_case(name),
            kind,
            element_type: None,
            description: description.into(),
            requirement,
            is_block: false,
            nested_block_type: None,
            nested_attributes: Vec::new(),
            one_of_group: None,
            plan_modifier: None,
            depth: 0,
        }
    }

    /// Required identity attribute whose change forces replacement
    pub fn identity(name: &str, description: &str) -> Self {
        Self::scalar(name, AttributeKind::String, Requirement::Required, description)
            .with_plan_modifier(PlanModifier::RequiresReplace)
    }

    /// Synthetic computed `id`
    pub fn id() -> Self {
        Self::scalar(
            "id",
            AttributeKind::String,
            Requirement::Computed,
            "Unique identifier of the object, set by the API.",
        )
        .with_plan_modifier(PlanModifier::UseStateForUnknown)
    }

    pub fn with_plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifier = Some(modifier);
        self
    }

    pub fn with_element_type(mut self, element: AttributeKind) -> Self {
        self.element_type = Some(element);
        self
    }

    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }

    pub fn is_optional(&self) -> bool {
        self.requirement == Requirement::Optional
    }

    pub fn is_computed(&self) -> bool {
        self.requirement == Requirement::Computed
    }
}

/// Everything needed to render the artifacts of one resource
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceTemplate {
    /// snake_case resource name
    pub name: String,
    /// Go type name, e.g. `HTTPLoadBalancer`
    pub title_case: String,
    /// Terraform type name, e.g. `f5xc_http_loadbalancer`
    pub type_name: String,
    /// REST collection path with a `{namespace}` placeholder
    pub api_path: String,
    pub description: String,
    /// Sorted attributes, identity first
    pub attributes: Vec<TerraformAttribute>,
    pub example_usage: String,
    /// Schema the attributes were derived from
    pub schema_name: String,
    pub one_of_groups: BTreeMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_primitive() {
        assert_eq!(AttributeKind::from_primitive(Some("string")), Some(AttributeKind::String));
        assert_eq!(AttributeKind::from_primitive(Some("number")), Some(AttributeKind::Int64));
        assert_eq!(AttributeKind::from_primitive(Some("integer")), Some(AttributeKind::Int64));
        assert_eq!(AttributeKind::from_primitive(Some("boolean")), Some(AttributeKind::Bool));
        assert_eq!(AttributeKind::from_primitive(Some("object")), None);
        assert_eq!(AttributeKind::from_primitive(None), None);
    }

    #[test]
    fn test_identity_and_id() {
        let name = TerraformAttribute::identity("name", "Name of the object.");
        assert!(name.is_required());
        assert_eq!(name.plan_modifier, Some(PlanModifier::RequiresReplace));

        let id = TerraformAttribute::id();
        assert!(id.is_computed());
        assert!(!id.is_optional());
        assert_eq!(id.plan_modifier, Some(PlanModifier::UseStateForUnknown));
    }

    #[test]
    fn test_serialized_shape_for_templates() {
        let attr = TerraformAttribute::scalar(
            "http_port",
            AttributeKind::Int64,
            Requirement::Optional,
            "Port.",
        );
        let value = serde_json::to_value(&attr).unwrap();
        assert_eq!(value["kind"], json!("int64"));
        assert_eq!(value["requirement"], json!("optional"));
        assert_eq!(value["go_name"], json!("HTTPPort"));
        assert_eq!(value["plan_modifier"], json!(null));
    }
}
