//! Deterministic attribute ordering.
//!
//! Top level: `name`, `namespace`, required, optional, `id`, computed. Names
//! are compared lexicographically inside each group.

use std::cmp::Ordering;

use crate::templates::TerraformAttribute;

/// Identity attributes prepended to every resource, in this order
pub const IDENTITY_ATTRIBUTES: [&str; 2] = ["name", "namespace"];

fn precedence(attr: &TerraformAttribute) -> u8 {
    if attr.is_computed() {
        2
    } else if attr.is_required() {
        0
    } else {
        1
    }
}

fn by_precedence(a: &TerraformAttribute, b: &TerraformAttribute) -> Ordering {
    precedence(a)
        .cmp(&precedence(b))
        .then_with(|| a.name.cmp(&b.name))
}

/// Order children of a block: required first, then by name
pub fn sort_nested(attributes: &mut [TerraformAttribute]) {
    attributes.sort_by(|a, b| {
        b.is_required()
            .cmp(&a.is_required())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Final top-level order of a resource.
///
/// Schema-derived `name`/`namespace` are replaced by the synthetic identity
/// attributes. `id` is placed after the optional attributes; a synthetic one is
/// added unless the schema already defines it. A schema `id` that is not
/// computed keeps its ordinary position.
pub fn sort_attributes(attributes: Vec<TerraformAttribute>) -> Vec<TerraformAttribute> {
    let mut rest: Vec<TerraformAttribute> = attributes
        .into_iter()
        .filter(|attr| {
            let identity = IDENTITY_ATTRIBUTES.contains(&attr.name.as_str());
            if identity {
                log::debug!("Replacing schema attribute '{}' with identity attribute", attr.name);
            }
            !identity
        })
        .collect();
    rest.sort_by(by_precedence);

    let id = match rest.iter().position(|attr| attr.name == "id") {
        Some(index) if rest[index].is_computed() => Some(rest.remove(index)),
        Some(_) => None,
        None => Some(TerraformAttribute::id()),
    };

    let mut sorted = Vec::with_capacity(rest.len() + 3);
    sorted.push(TerraformAttribute::identity(
        "name",
        "Name of the object. Changing this forces a new resource to be created.",
    ));
    sorted.push(TerraformAttribute::identity(
        "namespace",
        "Namespace of the object. Changing this forces a new resource to be created.",
    ));

    let first_computed = rest
        .iter()
        .position(TerraformAttribute::is_computed)
        .unwrap_or(rest.len());
    let computed = rest.split_off(first_computed);
    sorted.extend(rest);
    sorted.extend(id);
    sorted.extend(computed);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{AttributeKind, Requirement};

    fn attr(name: &str, requirement: Requirement) -> TerraformAttribute {
        TerraformAttribute::scalar(name, AttributeKind::String, requirement, "")
    }

    fn names(attrs: &[TerraformAttribute]) -> Vec<&str> {
        attrs.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_sort_precedence() {
        let sorted = sort_attributes(vec![
            attr("foo", Requirement::Required),
            attr("bar", Requirement::Required),
            attr("baz", Requirement::Optional),
        ]);
        assert_eq!(names(&sorted), vec!["name", "namespace", "bar", "foo", "baz", "id"]);
    }

    #[test]
    fn test_computed_after_id_and_metadata_among_optional() {
        let sorted = sort_attributes(vec![
            attr("state", Requirement::Computed),
            attr("labels", Requirement::Optional),
            attr("annotations", Requirement::Optional),
            attr("zone", Requirement::Required),
            attr("created_at", Requirement::Computed),
        ]);
        assert_eq!(
            names(&sorted),
            vec!["name", "namespace", "zone", "annotations", "labels", "id", "created_at", "state"]
        );
    }

    #[test]
    fn test_identity_attributes_replace_schema_ones() {
        let sorted = sort_attributes(vec![
            attr("namespace", Requirement::Optional),
            attr("name", Requirement::Optional),
            attr("port", Requirement::Optional),
        ]);
        assert_eq!(names(&sorted), vec!["name", "namespace", "port", "id"]);
        for identity in &sorted[..2] {
            assert!(identity.is_required());
            assert_eq!(
                identity.plan_modifier,
                Some(crate::templates::PlanModifier::RequiresReplace)
            );
        }
    }

    #[test]
    fn test_schema_id_is_kept_in_place() {
        let sorted = sort_attributes(vec![
            attr("id", Requirement::Optional),
            attr("port", Requirement::Optional),
            attr("uid", Requirement::Computed),
        ]);
        assert_eq!(names(&sorted), vec!["name", "namespace", "id", "port", "uid"]);
        assert_eq!(sorted.iter().filter(|a| a.name == "id").count(), 1);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let input = vec![
            attr("b", Requirement::Optional),
            attr("a", Requirement::Required),
            attr("c", Requirement::Computed),
        ];
        let once = sort_attributes(input);
        let twice = sort_attributes(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_nested_required_first() {
        let mut nested = vec![
            attr("b", Requirement::Optional),
            attr("z", Requirement::Required),
            attr("a", Requirement::Optional),
            attr("c", Requirement::Computed),
        ];
        sort_nested(&mut nested);
        assert_eq!(names(&nested), vec!["z", "a", "b", "c"]);
    }
}
