//! Loading and rendering of the Go source templates

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};

use super::filters;
use super::kind::{ArtifactKind, OutputTarget};
use super::manifest::{TemplateFile, TemplateManifest};
use super::types::{ResourceTemplate, TerraformAttribute};
use crate::builders::{sort::IDENTITY_ATTRIBUTES, METADATA_ATTRIBUTES};
use crate::error::{Error, Result};

/// Name written into the header of every generated file
pub const GENERATOR_NAME: &str = "f5xc-tfgen";

const BUILTIN_MANIFEST: &str = include_str!("builtin/manifest.yaml");
const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    ("macros.tera", include_str!("builtin/macros.tera")),
    ("resource.go.tera", include_str!("builtin/resource.go.tera")),
    ("types.go.tera", include_str!("builtin/types.go.tera")),
    ("data_source.go.tera", include_str!("builtin/data_source.go.tera")),
];

/// Prefix of the internal templates holding manifest destination patterns
const DESTINATION_PREFIX: &str = "__destination__/";

/// One generated file, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub artifact: ArtifactKind,
    pub target: OutputTarget,
    /// Path relative to the target directory
    pub file_name: String,
    pub content: String,
}

impl RenderedFile {
    /// Absolute location given the two base directories
    pub fn path(&self, output_dir: &Path, client_dir: &Path) -> PathBuf {
        match self.target {
            OutputTarget::Output => output_dir.join(&self.file_name),
            OutputTarget::Client => client_dir.join(&self.file_name),
        }
    }
}

/// Everything a template can reference
#[derive(Debug, Serialize)]
struct RenderContext<'a> {
    #[serde(flatten)]
    resource: &'a ResourceTemplate,
    generator: &'static str,
    /// Attributes sent in the API object's `spec`
    spec_attributes: Vec<&'a TerraformAttribute>,
    /// Spec attributes the user may set
    writable_attributes: Vec<&'a TerraformAttribute>,
    /// Non-block spec attributes, exposed by the data source
    readable_values: Vec<&'a TerraformAttribute>,
    /// Attributes mapped to the API object's `metadata`
    metadata_attributes: Vec<&'a TerraformAttribute>,
    example_lines: Vec<&'a str>,
}

impl<'a> RenderContext<'a> {
    fn new(resource: &'a ResourceTemplate) -> Self {
        let (metadata_attributes, spec_attributes): (Vec<_>, Vec<_>) = resource
            .attributes
            .iter()
            .filter(|attr| !IDENTITY_ATTRIBUTES.contains(&attr.name.as_str()) && attr.name != "id")
            .partition(|attr| METADATA_ATTRIBUTES.contains(&attr.name.as_str()));
        let writable_attributes = spec_attributes
            .iter()
            .copied()
            .filter(|attr| !attr.is_computed())
            .collect();
        let readable_values = spec_attributes
            .iter()
            .copied()
            .filter(|attr| !attr.is_block)
            .collect();

        Self {
            resource,
            generator: GENERATOR_NAME,
            spec_attributes,
            writable_attributes,
            readable_values,
            metadata_attributes,
            example_lines: resource.example_usage.lines().collect(),
        }
    }
}

/// Manages the template set and renders the artifacts of one resource at a time
#[derive(Debug, Clone)]
pub struct TemplateManager {
    tera: Arc<Tera>,
    manifest: TemplateManifest,
    /// `None` for the embedded template set
    template_dir: Option<PathBuf>,
}

impl TemplateManager {
    /// Use `template_dir` when given, the embedded templates otherwise
    pub async fn new(template_dir: Option<&Path>) -> Result<Self> {
        match template_dir {
            Some(dir) => Self::from_dir(dir).await,
            None => Self::builtin(),
        }
    }

    /// Template set compiled into the binary
    pub fn builtin() -> Result<Self> {
        let manifest = TemplateManifest::from_yaml(BUILTIN_MANIFEST)?;
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES.to_vec())?;
        Self::finish(tera, manifest, None)
    }

    /// Load a custom template set: `*.tera` files plus a manifest
    pub async fn from_dir(dir: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(dir).await? {
            return Err(Error::config(format!(
                "Template directory does not exist: {}",
                dir.display()
            )));
        }
        let manifest = TemplateManifest::load_from_dir(dir).await?;

        let dir_str = dir.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "Template path contains invalid UTF-8",
            )
        })?;
        log::info!("Loading templates from {}", dir.display());
        let tera = Tera::new(&format!("{}/**/*.tera", dir_str))?;
        Self::finish(tera, manifest, Some(dir.to_path_buf()))
    }

    fn finish(
        mut tera: Tera,
        manifest: TemplateManifest,
        template_dir: Option<PathBuf>,
    ) -> Result<Self> {
        manifest.validate()?;
        tera.autoescape_on(vec![]);
        filters::register(&mut tera);

        for file in &manifest.files {
            if !tera.get_template_names().any(|name| name == file.source) {
                return Err(Error::config(format!(
                    "Manifest '{}' references missing template '{}'",
                    manifest.name, file.source
                )));
            }
        }
        // Destination patterns are compiled up front so a bad pattern fails the load
        tera.add_raw_templates(
            manifest
                .files
                .iter()
                .map(|file| (destination_template(file), file.destination.clone()))
                .collect::<Vec<_>>(),
        )?;

        log::debug!(
            "Template set '{}' loaded with {} artifacts",
            manifest.name,
            manifest.files.len()
        );
        Ok(Self {
            tera: Arc::new(tera),
            manifest,
            template_dir,
        })
    }

    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    pub fn template_dir(&self) -> Option<&Path> {
        self.template_dir.as_deref()
    }

    /// Render every manifest artifact of `resource`.
    ///
    /// Output depends only on `resource`, so equal inputs give byte-identical files.
    pub fn render(&self, resource: &ResourceTemplate) -> Result<Vec<RenderedFile>> {
        let context = Context::from_serialize(RenderContext::new(resource))
            .map_err(|e| Error::template(format!("Failed to build context: {}", e)))?;

        let mut rendered = Vec::with_capacity(self.manifest.files.len());
        for file in &self.manifest.files {
            let file_name = self
                .render_one(&destination_template(file), &context)?
                .trim()
                .to_string();
            if file_name.is_empty() {
                return Err(Error::template(format!(
                    "Destination of '{}' rendered empty for resource '{}'",
                    file.source, resource.name
                )));
            }

            log::debug!("Rendering {} for '{}'", file.source, resource.name);
            let content = self.render_one(&file.source, &context)?;
            rendered.push(RenderedFile {
                artifact: file.artifact,
                target: file.target(),
                file_name,
                content,
            });
        }
        Ok(rendered)
    }

    fn render_one(&self, template: &str, context: &Context) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            // Tera keeps the useful part of the message in the source chain
            let mut message = e.to_string();
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = std::error::Error::source(cause);
            }
            Error::template(format!("Failed to render '{}': {}", template, message))
        })
    }

    /// Run the manifest's `post_generate` commands with `sh -c` inside `output_dir`
    pub async fn execute_post_generation_hooks(&self, output_dir: &Path) -> Result<()> {
        use tokio::process::Command as AsyncCommand;

        for command in &self.manifest.hooks.post_generate {
            log::info!("Running post-generation hook: {}", command);
            let output = AsyncCommand::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(output_dir)
                .output()
                .await
                .map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::Other,
                        format!("Failed to execute post-generation hook '{}': {}", command, e),
                    )
                })?;

            if !output.status.success() {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!(
                        "Post-generation hook '{}' failed with status {}\n{}{}",
                        command,
                        output.status,
                        String::from_utf8_lossy(&output.stderr),
                        String::from_utf8_lossy(&output.stdout)
                    ),
                )
                .into());
            }
        }
        Ok(())
    }
}

fn destination_template(file: &TemplateFile) -> String {
    format!("{}{}", DESTINATION_PREFIX, file.artifact)
}
