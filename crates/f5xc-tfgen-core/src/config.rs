//! Generator configuration.
//!
//! A `GeneratorConfig` can be built programmatically, loaded from a YAML file,
//! or discovered from the usual locations. Command-line flags are applied on
//! top of whatever was loaded.
//!
//! # Examples
//!
//! ```
//! use f5xc_tfgen_core::config::GeneratorConfig;
//!
//! let mut config = GeneratorConfig::new("specs");
//! config.dry_run = true;
//! assert_eq!(config.output_dir.to_str(), Some("internal/provider"));
//! assert!(config.validate().is_ok());
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::builders::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "f5xc-tfgen.yaml";

/// Settings for one generation batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Directory holding the vendor OpenAPI JSON files
    pub spec_dir: PathBuf,

    /// Glob matched against file names in `spec_dir`
    #[serde(default = "default_spec_pattern")]
    pub spec_pattern: String,

    /// Provider package directory (resources and data sources)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Client package directory (request/response structs)
    #[serde(default = "default_client_dir")]
    pub client_dir: PathBuf,

    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Fail a resource on an unresolved `$ref` instead of degrading it to `string`
    #[serde(default)]
    pub strict_refs: bool,

    /// Render everything but write nothing
    #[serde(default)]
    pub dry_run: bool,

    /// Custom template set replacing the built-in one
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Only these resources, when non-empty
    #[serde(default)]
    pub include_resources: Vec<String>,

    #[serde(default)]
    pub exclude_resources: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl GeneratorConfig {
    pub fn new(spec_dir: impl Into<PathBuf>) -> Self {
        Self {
            spec_dir: spec_dir.into(),
            spec_pattern: default_spec_pattern(),
            output_dir: default_output_dir(),
            client_dir: default_client_dir(),
            provider_name: default_provider_name(),
            max_depth: default_max_depth(),
            strict_refs: false,
            dry_run: false,
            template_dir: None,
            include_resources: Vec::new(),
            exclude_resources: Vec::new(),
        }
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from the first config file found, or return the defaults.
    ///
    /// Lookup order: `explicit`, `./f5xc-tfgen.yaml`, then
    /// `<config dir>/f5xc-tfgen/config.yaml`. An explicit path that does not
    /// exist is an error; the implicit locations are simply skipped.
    pub async fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !fs::try_exists(path).await? {
                return Err(Error::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            log::debug!("Using config file {}", path.display());
            return Self::from_file(path).await;
        }

        for candidate in Self::candidate_paths() {
            if fs::try_exists(&candidate).await? {
                log::debug!("Using config file {}", candidate.display());
                return Self::from_file(&candidate).await;
            }
        }
        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("f5xc-tfgen").join("config.yaml"));
        }
        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::config("max_depth must be at least 1"));
        }
        if self.spec_pattern.trim().is_empty() {
            return Err(Error::config("spec_pattern must not be empty"));
        }
        if self.provider_name.trim().is_empty() {
            return Err(Error::config("provider_name must not be empty"));
        }
        if let Some(name) = self
            .include_resources
            .iter()
            .find(|name| self.exclude_resources.contains(name))
        {
            log::warn!("Resource '{}' is both included and excluded; excluding it", name);
        }
        Ok(())
    }

    /// Whether the include/exclude lists let `resource` through
    pub fn is_selected(&self, resource: &str) -> bool {
        let included = self.include_resources.is_empty()
            || self.include_resources.iter().any(|name| name == resource);
        included && !self.exclude_resources.iter().any(|name| name == resource)
    }
}

fn default_spec_pattern() -> String {
    "docs-cloud-f5-com.*.ves-swagger.json".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("internal/provider")
}

fn default_client_dir() -> PathBuf {
    PathBuf::from("internal/client")
}

fn default_provider_name() -> String {
    "f5xc".to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
