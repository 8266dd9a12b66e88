//! Turns free-text spec descriptions into single-line text safe to embed in a
//! generated Go string literal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::openapi::Schema;

/// Maximum length of a normalized description, ellipsis included
pub const MAX_DESCRIPTION_LEN: usize = 500;

const ELLIPSIS: &str = "...";

/// Defaults that mean "no real default" in F5XC specs
const PLACEHOLDER_DEFAULTS: &[&str] = &["INVALID", "UNKNOWN", "UNSPECIFIED", "0", "false"];

static TRAILING_CLAUSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\b(?:Example|Validation Rules):.*$").unwrap());
static VENDOR_RULE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ves\.io\.[\w.\-]*:\s*(?:\[[^\]]*\]|\S+)").unwrap());
static VENDOR_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bx-(?:displayName|ves-[\w\-]+):\s*(?:"[^"]*"|\S+)"#).unwrap());
static REQUIRED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bRequired:\s*(?:YES|NO)\b").unwrap());
static EXCLUSIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bExclusive with\s*\[[^\]]*\]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" ([.,;:])").unwrap());

/// Clean a raw description.
///
/// The passes run in a fixed order and truncation is always last, so a vendor
/// marker is either removed whole or kept whole.
pub fn normalize(raw: &str) -> String {
    let text = TRAILING_CLAUSE_RE.replace(raw, "");
    let text = VENDOR_RULE_RE.replace_all(&text, " ");
    let text = VENDOR_KEY_RE.replace_all(&text, " ");
    let text = REQUIRED_RE.replace_all(&text, " ");
    let text = EXCLUSIVE_RE.replace_all(&text, " ");
    let text = unescape(&text);
    let text = WHITESPACE_RE.replace_all(text.trim(), " ");
    let text = SPACE_BEFORE_PUNCT_RE.replace_all(&text, "$1");
    truncate(&escape(text.trim()), MAX_DESCRIPTION_LEN)
}

/// Undo escapes left over from JSON nested inside JSON strings
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(next @ ('\\' | '"')) => {
                out.push(next);
                chars.next();
            }
            Some('n' | 't' | 'r') => {
                out.push(' ');
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Escape for a double-quoted Go string literal
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max - ELLIPSIS.len()).collect();
    // An odd run of trailing backslashes would escape the closing quote
    let trailing = cut.chars().rev().take_while(|c| *c == '\\').count();
    if trailing % 2 == 1 {
        cut.pop();
    }
    cut.truncate(cut.trim_end().len());
    cut.push_str(ELLIPSIS);
    cut
}

/// Append a sentence, inserting the period the description may be missing
pub fn append_sentence(description: &str, sentence: &str) -> String {
    let description = description.trim_end();
    if description.is_empty() {
        sentence.to_string()
    } else if description.ends_with(['.', '!', '?']) {
        format!("{description} {sentence}")
    } else {
        format!("{description}. {sentence}")
    }
}

/// Add the "Possible values are ..." hint
pub fn with_enum_hint(description: &str, values: &[JsonValue]) -> String {
    if values.is_empty() {
        return description.to_string();
    }
    let listed = values
        .iter()
        .map(|v| format!("`{}`", escape(&literal(v))))
        .collect::<Vec<_>>()
        .join(", ");
    append_sentence(description, &format!("Possible values are {listed}."))
}

/// Add the "Defaults to ..." hint unless the default is a placeholder
pub fn with_default_hint(description: &str, default: Option<&JsonValue>) -> String {
    match default {
        Some(value) if !is_placeholder_default(value) => append_sentence(
            description,
            &format!("Defaults to `{}`.", escape(&literal(value))),
        ),
        _ => description.to_string(),
    }
}

/// Whether a spec default is one of the known "no real default" values
pub fn is_placeholder_default(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        other => PLACEHOLDER_DEFAULTS.contains(&literal(other).as_str()),
    }
}

/// Synthesized text for an attribute the spec leaves undocumented
pub fn fallback(name: &str) -> String {
    format!("Configuration for `{}`.", escape(name))
}

/// Full description of an attribute: normalized text plus enum and default hints
pub fn describe(name: &str, schema: &Schema) -> String {
    let raw = schema
        .description
        .as_deref()
        .or(schema.title.as_deref())
        .unwrap_or_default();
    let mut text = normalize(raw);
    if text.is_empty() {
        text = fallback(name);
    }
    let text = with_enum_hint(&text, &schema.enum_values);
    with_default_hint(&text, schema.default.as_ref())
}

fn literal(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
