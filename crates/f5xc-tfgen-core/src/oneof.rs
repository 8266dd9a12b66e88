//! Mutually exclusive field groups declared through `x-ves-oneof-field-<group>`.
//!
//! The extension value is either a JSON array of field names or, for some
//! upstream specs, a string holding a bracketed comma separated list such as
//! `"[\"http\",\"https\"]"`. Both encodings produce the same group.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// Key prefix of the vendor extension
pub const ONEOF_PREFIX: &str = "x-ves-oneof-field-";

/// Scan the top-level keys of a raw schema object for OneOf groups.
///
/// Returns group name -> member fields in declared order. Non-object input yields no groups.
pub fn extract_one_of_groups(raw: &JsonValue) -> BTreeMap<String, Vec<String>> {
    let Some(object) = raw.as_object() else {
        return BTreeMap::new();
    };

    object
        .iter()
        .filter_map(|(key, value)| {
            let group = key.strip_prefix(ONEOF_PREFIX)?;
            let fields = parse_members(value);
            if fields.is_empty() {
                log::debug!("OneOf group '{}' has no members, ignoring", group);
                return None;
            }
            Some((group.to_string(), fields))
        })
        .collect()
}

fn parse_members(value: &JsonValue) -> Vec<String> {
    let members: Vec<String> = match value {
        JsonValue::Array(items) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(clean_member)
            .collect(),
        JsonValue::String(list) => list
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(clean_member)
            .collect(),
        _ => Vec::new(),
    };

    let mut unique = Vec::with_capacity(members.len());
    for member in members {
        if !member.is_empty() && !unique.contains(&member) {
            unique.push(member);
        }
    }
    unique
}

fn clean_member(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Field -> group lookup for one resource
#[derive(Debug, Clone, Default)]
pub struct OneOfIndex {
    groups: BTreeMap<String, Vec<String>>,
    by_field: BTreeMap<String, String>,
}

impl OneOfIndex {
    /// Build the index from the resource's raw CreateSpecType schema
    pub fn from_raw(raw: &JsonValue) -> Self {
        Self::from_groups(extract_one_of_groups(raw))
    }

    /// Build the index, keeping each field in the first group (by name) that claims it
    pub fn from_groups(groups: BTreeMap<String, Vec<String>>) -> Self {
        let mut by_field = BTreeMap::new();
        let mut kept = BTreeMap::new();

        for (group, fields) in groups {
            let mut members = Vec::with_capacity(fields.len());
            for field in fields {
                if let Some(owner) = by_field.get(&field) {
                    log::warn!(
                        "Field '{}' of OneOf group '{}' already belongs to group '{}'",
                        field,
                        group,
                        owner
                    );
                    continue;
                }
                by_field.insert(field.clone(), group.clone());
                members.push(field);
            }
            if !members.is_empty() {
                kept.insert(group, members);
            }
        }

        Self {
            groups: kept,
            by_field,
        }
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }

    /// Group owning `field`
    pub fn group_of(&self, field: &str) -> Option<&str> {
        self.by_field.get(field).map(String::as_str)
    }

    /// The `[OneOf: a, b]` prefix, returned only for the alphabetically first member of its group
    pub fn annotation_for(&self, field: &str) -> Option<String> {
        let members = self.groups.get(self.group_of(field)?)?;
        let mut sorted: Vec<&str> = members.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        if sorted.first() != Some(&field) {
            return None;
        }
        Some(format!("[OneOf: {}]", sorted.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_array_and_string_encodings_match() {
        let raw = json!({
            "type": "object",
            "x-ves-oneof-field-loadbalancer_type": ["http", "https", "https_auto_cert"],
            "x-ves-oneof-field-waf_choice": "[\"app_firewall\",\"disable_waf\"]",
            "x-ves-proto-message": "ignored"
        });
        let groups = extract_one_of_groups(&raw);

        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups["loadbalancer_type"],
            vec!["http", "https", "https_auto_cert"]
        );
        assert_eq!(groups["waf_choice"], vec!["app_firewall", "disable_waf"]);

        let as_string = json!({ "x-ves-oneof-field-g": "[ 'b' , a ,\"c\"]" });
        let as_array = json!({ "x-ves-oneof-field-g": ["b", "a", "c"] });
        assert_eq!(
            extract_one_of_groups(&as_string),
            extract_one_of_groups(&as_array)
        );
    }

    #[test]
    fn test_extract_ignores_empty_and_non_object() {
        assert!(extract_one_of_groups(&json!([1, 2])).is_empty());
        assert!(extract_one_of_groups(&json!({ "x-ves-oneof-field-empty": "[]" })).is_empty());
        assert!(extract_one_of_groups(&json!({ "x-ves-oneof-field-num": 4 })).is_empty());
    }

    #[test]
    fn test_annotation_only_on_alphabetically_first() {
        let index = OneOfIndex::from_raw(&json!({
            "x-ves-oneof-field-choice": ["zeta_field", "alpha_field", "mid_field"]
        }));

        assert_eq!(
            index.annotation_for("alpha_field").as_deref(),
            Some("[OneOf: alpha_field, mid_field, zeta_field]")
        );
        assert_eq!(index.annotation_for("zeta_field"), None);
        assert_eq!(index.annotation_for("mid_field"), None);
        assert_eq!(index.annotation_for("unrelated"), None);
        assert_eq!(index.group_of("zeta_field"), Some("choice"));
    }

    #[test]
    fn test_exactly_one_annotation_per_group() {
        let index = OneOfIndex::from_raw(&json!({
            "x-ves-oneof-field-a": ["one", "two"],
            "x-ves-oneof-field-b": "[three,four,five]"
        }));
        for members in index.groups().values() {
            let annotated = members
                .iter()
                .filter(|f| index.annotation_for(f).is_some())
                .count();
            assert_eq!(annotated, 1);
        }
    }

    #[test]
    fn test_field_claimed_by_two_groups_stays_in_first() {
        let index = OneOfIndex::from_raw(&json!({
            "x-ves-oneof-field-alpha": ["shared", "x"],
            "x-ves-oneof-field-beta": ["shared", "y"]
        }));
        assert_eq!(index.group_of("shared"), Some("alpha"));
        assert_eq!(index.groups()["beta"], vec!["y".to_string()]);
    }
}
