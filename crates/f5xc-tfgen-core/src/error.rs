//! Error handling for the F5XC Terraform schema generator.
//!
//! One `Error` enum for the whole pipeline plus a `Result` alias. Whether an
//! error ends the batch or only the current file is decided by
//! [`Error::is_fatal`].
//!
//! # Examples
//!
//! ```
//! use f5xc_tfgen_core::error::{Error, Result};
//!
//! fn might_fail(pattern: &str) -> Result<()> {
//!     if pattern.is_empty() {
//!         return Err(Error::config("spec pattern must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(might_fail("").is_err());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for generator operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A spec file could not be turned into a usable document
    #[error("Spec error: {0}")]
    Spec(String),

    /// No spec file matched the configured pattern
    #[error("No spec files matching '{pattern}' found in {}", dir.display())]
    NoSpecFiles { dir: PathBuf, pattern: String },

    /// The document has no `*CreateSpecType` schema to derive attributes from
    #[error("No CreateSpecType schema for resource '{0}'")]
    MissingCreateSpec(String),

    /// A `$ref` could not be resolved while strict reference mode is on
    #[error("Unresolved schema reference: {0}")]
    UnresolvedReference(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new spec error
    pub fn spec<S: Into<String>>(msg: S) -> Self {
        Self::Spec(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Whether the batch must stop when this error reaches the orchestration loop.
    ///
    /// Decode problems of a single file and per-resource rendering or strict
    /// reference failures are recovered locally; everything else aborts the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Json(_)
                | Self::Spec(_)
                | Self::MissingCreateSpec(_)
                | Self::UnresolvedReference(_)
                | Self::Template(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::NoSpecFiles {
            dir: PathBuf::from("specs"),
            pattern: "*.json".into()
        }
        .is_fatal());
        assert!(Error::config("bad").is_fatal());
        assert!(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).is_fatal());

        assert!(!Error::spec("broken file").is_fatal());
        assert!(!Error::MissingCreateSpec("dns_zone".into()).is_fatal());
        assert!(!Error::UnresolvedReference("#/components/schemas/X".into()).is_fatal());
        assert!(!Error::template("render failed").is_fatal());
    }

    #[test]
    fn test_no_spec_files_message() {
        let err = Error::NoSpecFiles {
            dir: PathBuf::from("/tmp/specs"),
            pattern: "*.ves-swagger.json".into(),
        };
        assert_eq!(
            err.to_string(),
            "No spec files matching '*.ves-swagger.json' found in /tmp/specs"
        );
    }
}
