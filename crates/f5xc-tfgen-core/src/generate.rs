//! Batch generation: load every spec, build each resource, render and write its files

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{
    builders::{build_resource, ResourceOptions},
    config::GeneratorConfig,
    error::{Error, Result},
    loader::{self, LoadedSpec},
    store::SchemaStore,
    templates::{RenderedFile, TemplateManager},
};

/// Why a spec file produced no resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// File name or resource filtered out
    Unsupported,
    /// The document has no CreateSpecType schema
    NoCreateSchema,
    /// The file is not valid JSON/OpenAPI
    ParseError,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::NoCreateSchema => "no-create-schema",
            Self::ParseError => "parse-error",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Unsupported, Self::NoCreateSchema, Self::ParseError]
            .iter()
            .copied()
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: SkipReason,
    pub detail: String,
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {} [{}]: {}", self.file_name, self.reason, self.detail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedResource {
    pub resource: String,
    pub file_name: String,
    pub error: String,
}

impl fmt::Display for FailedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed {} ({}): {}", self.resource, self.file_name, self.error)
    }
}

/// Outcome of one batch
#[derive(Debug, Clone, Default)]
pub struct GenerationSummary {
    /// Generated resource names, in processing order
    pub generated: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<FailedResource>,
    /// Files written, or that would have been written in a dry run
    pub files: Vec<PathBuf>,
    /// References degraded to `string`
    pub fallback_refs: usize,
    pub unresolved_refs: BTreeSet<String>,
    /// Schema names redefined with different content across files
    pub collisions: usize,
    pub dry_run: bool,
}

impl GenerationSummary {
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    fn skip(&mut self, file_name: &str, reason: SkipReason, detail: impl Into<String>) {
        let skipped = SkippedFile {
            file_name: file_name.to_string(),
            reason,
            detail: detail.into(),
        };
        log::warn!("{}", skipped);
        self.skipped.push(skipped);
    }

    fn fail(&mut self, resource: &str, file_name: &str, error: &Error) {
        log::warn!("Failed to generate '{}' from {}: {}", resource, file_name, error);
        self.failed.push(FailedResource {
            resource: resource.to_string(),
            file_name: file_name.to_string(),
            error: error.to_string(),
        });
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} generated, {} skipped, {} failed",
            self.generated.len(),
            self.skipped.len(),
            self.failed.len()
        )?;
        if !self.skipped.is_empty() {
            let reasons: Vec<String> = SkipReason::all()
                .map(|reason| (reason, self.skipped_for(reason)))
                .filter(|(_, count)| *count > 0)
                .map(|(reason, count)| format!("{reason}: {count}"))
                .collect();
            write!(f, " ({})", reasons.join(", "))?;
        }
        if self.fallback_refs > 0 {
            write!(
                f,
                "; {} reference fallbacks to string ({} distinct)",
                self.fallback_refs,
                self.unresolved_refs.len()
            )?;
        }
        if self.collisions > 0 {
            write!(f, "; {} schema name collisions", self.collisions)?;
        }
        if self.dry_run {
            write!(f, "; dry run, nothing written")?;
        }
        Ok(())
    }
}

/// Run a full batch as described by `config`.
///
/// Per-file problems are recorded in the summary; only fatal errors (no spec
/// files, unreadable or broken templates, write failures, failing hooks) are
/// returned as `Err`.
pub async fn generate(config: &GeneratorConfig) -> Result<GenerationSummary> {
    config.validate()?;
    let templates = TemplateManager::new(config.template_dir.as_deref()).await?;

    let mut store = SchemaStore::new();
    let report = loader::load_specs(&config.spec_dir, &config.spec_pattern, &mut store).await?;

    let mut summary = GenerationSummary {
        dry_run: config.dry_run,
        ..Default::default()
    };
    for failure in &report.failures {
        summary.skip(&failure.file_name, SkipReason::ParseError, failure.error.to_string());
    }

    let options = ResourceOptions {
        provider_name: config.provider_name.clone(),
        max_depth: config.max_depth,
        strict_refs: config.strict_refs,
    };
    let mut seen = BTreeSet::new();

    for loaded in &report.specs {
        let Some(resource) = loaded.resource.as_deref() else {
            summary.skip(
                &loaded.file_name,
                SkipReason::Unsupported,
                "file name does not name a resource",
            );
            continue;
        };
        if !config.is_selected(resource) {
            summary.skip(
                &loaded.file_name,
                SkipReason::Unsupported,
                format!("resource '{resource}' is filtered out"),
            );
            continue;
        }
        if !seen.insert(resource.to_string()) {
            summary.skip(
                &loaded.file_name,
                SkipReason::Unsupported,
                format!("resource '{resource}' was already generated from another file"),
            );
            continue;
        }

        generate_resource(config, &templates, &store, &options, loaded, resource, &mut summary)
            .await?;
    }

    summary.collisions = store.collisions();

    if !config.dry_run && !summary.generated.is_empty() {
        templates
            .execute_post_generation_hooks(&config.output_dir)
            .await?;
    }

    log::info!("{}", summary);
    Ok(summary)
}

async fn generate_resource(
    config: &GeneratorConfig,
    templates: &TemplateManager,
    store: &SchemaStore,
    options: &ResourceOptions,
    loaded: &LoadedSpec,
    resource: &str,
    summary: &mut GenerationSummary,
) -> Result<()> {
    let build = match build_resource(resource, &loaded.spec, &loaded.raw, store, options) {
        Ok(build) => build,
        Err(Error::MissingCreateSpec(_)) => {
            summary.skip(
                &loaded.file_name,
                SkipReason::NoCreateSchema,
                format!("no CreateSpecType schema for '{resource}'"),
            );
            return Ok(());
        }
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            summary.fail(resource, &loaded.file_name, &e);
            return Ok(());
        }
    };
    summary.fallback_refs += build.fallbacks;
    summary.unresolved_refs.extend(build.unresolved);

    let files = match templates.render(&build.template) {
        Ok(files) => files,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            summary.fail(resource, &loaded.file_name, &e);
            return Ok(());
        }
    };

    for file in &files {
        let path = file.path(&config.output_dir, &config.client_dir);
        if config.dry_run {
            log::info!("Would write {}", path.display());
        } else {
            write_file(&path, file).await?;
        }
        summary.files.push(path);
    }

    log::info!("Generated {} from {}", build.template.type_name, loaded.file_name);
    summary.generated.push(resource.to_string());
    Ok(())
}

async fn write_file(path: &Path, file: &RenderedFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &file.content).await?;
    log::debug!(
        "Wrote {} {} ({} bytes) into the {} directory",
        file.artifact,
        path.display(),
        file.content.len(),
        file.target
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_names() {
        let names: Vec<_> = SkipReason::all().map(|r| r.to_string()).collect();
        assert_eq!(names, vec!["unsupported", "no-create-schema", "parse-error"]);
    }

    #[test]
    fn test_summary_line() {
        let mut summary = GenerationSummary::default();
        summary.generated = vec!["http_loadbalancer".into(), "origin_pool".into()];
        summary.skip("a.json", SkipReason::ParseError, "bad json");
        summary.skip("b.json", SkipReason::Unsupported, "unknown name");
        summary.skip("c.json", SkipReason::ParseError, "bad json");
        assert_eq!(
            summary.to_string(),
            "2 generated, 3 skipped, 0 failed (unsupported: 1, parse-error: 2)"
        );

        summary.fallback_refs = 4;
        summary.unresolved_refs.insert("#/components/schemas/Gone".into());
        summary.collisions = 1;
        summary.dry_run = true;
        assert_eq!(
            summary.to_string(),
            "2 generated, 3 skipped, 0 failed (unsupported: 1, parse-error: 2); \
             4 reference fallbacks to string (1 distinct); 1 schema name collisions; \
             dry run, nothing written"
        );
    }

    #[test]
    fn test_skipped_file_display() {
        let skipped = SkippedFile {
            file_name: "x.json".into(),
            reason: SkipReason::NoCreateSchema,
            detail: "no CreateSpecType schema for 'x'".into(),
        };
        assert_eq!(
            skipped.to_string(),
            "skipped x.json [no-create-schema]: no CreateSpecType schema for 'x'"
        );
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_loading() {
        let mut config = GeneratorConfig::new("/nonexistent");
        config.max_depth = 0;
        let err = generate(&config).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
