//! Tera filters mapping attribute descriptors to Go types.

use std::collections::HashMap;

use tera::{Tera, Value};

use super::types::{AttributeKind, NestedBlockType, TerraformAttribute};

/// Register every filter used by the Go templates
pub fn register(tera: &mut Tera) {
    tera.register_filter("model_type", model_type);
    tera.register_filter("schema_attribute", schema_attribute);
    tera.register_filter("element_type", element_type);
    tera.register_filter("go_type", go_type);
    tera.register_filter("go_path_format", go_path_format);
}

fn attribute(value: &Value, filter: &str) -> tera::Result<TerraformAttribute> {
    serde_json::from_value(value.clone()).map_err(|e| {
        tera::Error::msg(format!("Filter `{filter}` expects an attribute: {e}"))
    })
}

fn kind(value: &Value, filter: &str) -> tera::Result<AttributeKind> {
    serde_json::from_value(value.clone())
        .map_err(|e| tera::Error::msg(format!("Filter `{filter}` expects a kind: {e}")))
}

/// `types.*` value type held by the Terraform model struct
fn model_type(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let go = match kind(value, "model_type")? {
        AttributeKind::String => "types.String",
        AttributeKind::Int64 => "types.Int64",
        AttributeKind::Bool => "types.Bool",
        AttributeKind::Map => "types.Map",
        AttributeKind::List => "types.List",
        AttributeKind::Object => "types.Object",
    };
    Ok(Value::from(go))
}

/// `schema.*Attribute` constructor of a non-block attribute
fn schema_attribute(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let go = match kind(value, "schema_attribute")? {
        AttributeKind::String => "StringAttribute",
        AttributeKind::Int64 => "Int64Attribute",
        AttributeKind::Bool => "BoolAttribute",
        AttributeKind::Map => "MapAttribute",
        AttributeKind::List => "ListAttribute",
        AttributeKind::Object => "ObjectAttribute",
    };
    Ok(Value::from(go))
}

/// `types.*Type` element type of a list or map
fn element_type(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let element = if value.is_null() {
        AttributeKind::String
    } else {
        kind(value, "element_type")?
    };
    let go = match element {
        AttributeKind::Int64 => "types.Int64Type",
        AttributeKind::Bool => "types.BoolType",
        _ => "types.StringType",
    };
    Ok(Value::from(go))
}

fn native(kind: AttributeKind) -> &'static str {
    match kind {
        AttributeKind::Int64 => "int64",
        AttributeKind::Bool => "bool",
        AttributeKind::Object | AttributeKind::Map => "map[string]interface{}",
        _ => "string",
    }
}

/// Go type of a client struct field whose children are not expanded.
///
/// Scalars that may be absent are pointers so an unset value stays distinct
/// from its zero value.
fn go_type(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let attr = attribute(value, "go_type")?;
    let element = attr.element_type.unwrap_or(AttributeKind::String);
    let go = match (attr.kind, attr.nested_block_type) {
        (_, Some(NestedBlockType::List)) => "[]map[string]interface{}".to_string(),
        (_, Some(NestedBlockType::Single)) => "map[string]interface{}".to_string(),
        (AttributeKind::List, None) => format!("[]{}", native(element)),
        (AttributeKind::Map, None) => format!("map[string]{}", native(element)),
        (AttributeKind::Object, None) => native(attr.kind).to_string(),
        (kind, None) if attr.is_required() => native(kind).to_string(),
        (kind, None) => format!("*{}", native(kind)),
    };
    Ok(Value::from(go))
}

/// `fmt.Sprintf` format of a collection path: `{namespace}` becomes `%s`
fn go_path_format(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let path = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("Filter `go_path_format` expects a string"))?;
    Ok(Value::from(
        path.replace('%', "%%").replace("{namespace}", "%s"),
    ))
}
