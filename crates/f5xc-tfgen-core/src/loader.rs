//! Discovery and decoding of the vendor OpenAPI files.
//!
//! Files are read and decoded concurrently, then merged into the
//! [`SchemaStore`] one at a time in file-name order, so the store contents do
//! not depend on which read finished first.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use tokio::fs;

use crate::error::{Error, Result};
use crate::openapi::Spec;
use crate::store::SchemaStore;

/// Files decoded at the same time
pub const LOAD_CONCURRENCY: usize = 8;

const FILE_PREFIX: &str = r"^docs-cloud-f5-com\.[^.]+\.public\.ves\.io\.schema\.";
const FILE_SUFFIX: &str = r"\.ves-swagger\.json$";

static VIEWS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"{FILE_PREFIX}views\.([a-z0-9_]+){FILE_SUFFIX}")).unwrap());
static SUBTYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{FILE_PREFIX}([a-z0-9_]+)\.([a-z0-9_]+){FILE_SUFFIX}")).unwrap()
});
static DIRECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"{FILE_PREFIX}([a-z0-9_]+){FILE_SUFFIX}")).unwrap());

/// Resource name encoded in a vendor spec file name.
///
/// Patterns are tried in priority order: `views.<name>`, `<parent>.<child>`
/// (named `<parent>_<child>`), then `<name>`. `None` means the file does not
/// describe a supported resource.
pub fn resource_name_from_file(file_name: &str) -> Option<String> {
    if let Some(caps) = VIEWS_RE.captures(file_name) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = SUBTYPE_RE.captures(file_name) {
        return Some(format!("{}_{}", &caps[1], &caps[2]));
    }
    DIRECT_RE
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}

/// Compile a shell-style glob (`*`, `?`) into an anchored regex
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| Error::config(format!("Invalid spec pattern '{}': {}", pattern, e)))
}

/// A decoded spec file
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    pub path: PathBuf,
    pub file_name: String,
    /// Resource described by the file, `None` when the name is not recognized
    pub resource: Option<String>,
    pub spec: Spec,
    pub raw: JsonValue,
}

/// A file that matched the pattern but could not be decoded
#[derive(Debug)]
pub struct LoadFailure {
    pub file_name: String,
    pub error: Error,
}

/// Outcome of loading a spec directory, in file-name order
#[derive(Debug, Default)]
pub struct LoadReport {
    pub specs: Vec<LoadedSpec>,
    pub failures: Vec<LoadFailure>,
}

/// Sorted paths of the files in `dir` whose name matches `pattern`
pub async fn discover_spec_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = glob_to_regex(pattern)?;
    if !fs::try_exists(dir).await? {
        return Err(Error::config(format!(
            "Spec directory not found: {}",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| matcher.is_match(name));
        if matches && entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(Error::NoSpecFiles {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }
    log::info!("Found {} spec files in {}", paths.len(), dir.display());
    Ok(paths)
}

/// Decode one spec document from the bytes of its file
pub fn parse_spec(content: &[u8]) -> Result<(Spec, JsonValue)> {
    let raw: JsonValue = serde_json::from_slice(content)?;
    if raw.get("openapi").is_none() && raw.get("swagger").is_none() {
        return Err(Error::spec("document has no 'openapi' or 'swagger' version"));
    }
    let spec = Spec::from_value(&raw)?;
    Ok((spec, raw))
}

async fn read_spec(path: PathBuf) -> (PathBuf, Result<(Spec, JsonValue)>) {
    let result = match fs::read(&path).await {
        Ok(content) => parse_spec(&content),
        Err(e) => Err(Error::Io(e)),
    };
    (path, result)
}

/// Load every matching file of `dir` and merge its schemas into `store`.
///
/// A file that fails to decode is reported in [`LoadReport::failures`] and
/// skipped; I/O errors and an empty match set abort the load.
pub async fn load_specs(dir: &Path, pattern: &str, store: &mut SchemaStore) -> Result<LoadReport> {
    let paths = discover_spec_files(dir, pattern).await?;
    let decoded: Vec<_> = stream::iter(paths)
        .map(read_spec)
        .buffered(LOAD_CONCURRENCY)
        .collect()
        .await;

    let mut report = LoadReport::default();
    for (path, result) in decoded {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match result {
            Ok((spec, raw)) => {
                let collisions = store.merge(&spec, &raw);
                log::debug!(
                    "Loaded {} ({} schemas, {} collisions)",
                    file_name,
                    spec.components.schemas.len(),
                    collisions
                );
                report.specs.push(LoadedSpec {
                    resource: resource_name_from_file(&file_name),
                    path,
                    file_name,
                    spec,
                    raw,
                });
            }
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                log::warn!("Skipping {}: {}", file_name, error);
                report.failures.push(LoadFailure { file_name, error });
            }
        }
    }
    Ok(report)
}
