//! Manifest format of a template set.
//!
//! A template set is a directory holding `*.tera` files and a `manifest.yaml`
//! (or `manifest.toml`) describing which file renders which artifact, where the
//! result goes, and which commands run after a batch.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;
use tokio::fs;

use super::kind::{ArtifactKind, OutputTarget};
use crate::error::{Error, Result};

/// Root manifest of a template set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Files rendered for every resource
    pub files: Vec<TemplateFile>,

    #[serde(default)]
    pub hooks: TemplateHooks,
}

/// One artifact rendered per resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Template name, relative to the template set root
    pub source: String,

    /// File name pattern rendered with the resource context, e.g. `{{ name }}_resource.go`
    pub destination: String,

    pub artifact: ArtifactKind,

    /// Overrides the artifact's default directory
    #[serde(default)]
    pub target: Option<OutputTarget>,
}

impl TemplateFile {
    pub fn target(&self) -> OutputTarget {
        self.target.unwrap_or_else(|| self.artifact.default_target())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateHooks {
    /// Shell commands run in the output directory once all files are written
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub post_generate: Vec<String>,
}

fn default_version() -> String {
    String::from("0.1.0")
}

impl TemplateManifest {
    /// Parse a YAML manifest
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a TOML manifest
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `manifest.yaml`, falling back to `manifest.toml`, from a template directory
    pub async fn load_from_dir(template_dir: &Path) -> Result<Self> {
        let yaml_path = template_dir.join("manifest.yaml");
        let toml_path = template_dir.join("manifest.toml");

        let manifest = if fs::try_exists(&yaml_path).await? {
            log::debug!("Reading template manifest {}", yaml_path.display());
            Self::from_yaml(&fs::read_to_string(&yaml_path).await?)?
        } else if fs::try_exists(&toml_path).await? {
            log::debug!("Reading template manifest {}", toml_path.display());
            Self::from_toml(&fs::read_to_string(&toml_path).await?)?
        } else {
            return Err(Error::config(format!(
                "No manifest.yaml or manifest.toml in template directory {}",
                template_dir.display()
            )));
        };

        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject manifests that would render the same artifact twice or nothing at all
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(Error::config(format!(
                "Template manifest '{}' lists no files",
                self.name
            )));
        }
        for (i, file) in self.files.iter().enumerate() {
            if file.destination.trim().is_empty() {
                return Err(Error::config(format!(
                    "Template '{}' has an empty destination",
                    file.source
                )));
            }
            if self.files[..i].iter().any(|f| f.artifact == file.artifact) {
                return Err(Error::config(format!(
                    "Artifact '{}' is listed more than once in manifest '{}'",
                    file.artifact, self.name
                )));
            }
        }
        Ok(())
    }
}

/// Accept either a single command or a list of commands
fn deserialize_commands<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match SerdeValue::deserialize(deserializer)? {
        SerdeValue::String(command) => Ok(vec![command]),
        SerdeValue::Seq(items) => items
            .into_iter()
            .map(|item| match item {
                SerdeValue::String(command) => Ok(command),
                _ => Err(serde::de::Error::custom(
                    "Expected string or array of strings",
                )),
            })
            .collect(),
        SerdeValue::Unit | SerdeValue::Option(None) => Ok(Vec::new()),
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}
