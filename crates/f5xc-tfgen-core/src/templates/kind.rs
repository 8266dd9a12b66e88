//! Generated artifact kinds and the directories they are written to.
//!
//! Every resource produces one file per [`ArtifactKind`]. Provider-side
//! artifacts land in the output directory, client structs in the client
//! directory.
//!
//! # Examples
//!
//! ```
//! use f5xc_tfgen_core::templates::{ArtifactKind, OutputTarget};
//!
//! let kind = ArtifactKind::DataSource;
//! assert_eq!(kind.to_string(), "data_source");
//! assert_eq!(kind.default_target(), OutputTarget::Output);
//! assert_eq!(ArtifactKind::Types.default_target(), OutputTarget::Client);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// One rendered source file per resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Terraform schema and CRUD methods
    Resource,
    /// Client request/response structs
    Types,
    /// Read-only data source schema
    DataSource,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Types => "types",
            Self::DataSource => "data_source",
        }
    }

    /// Directory an artifact goes to when the manifest does not say otherwise
    pub fn default_target(&self) -> OutputTarget {
        match self {
            Self::Types => OutputTarget::Client,
            Self::Resource | Self::DataSource => OutputTarget::Output,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Base directory of a generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    /// Provider package (`--output-dir`)
    #[default]
    Output,
    /// Client package (`--client-dir`)
    Client,
}

impl OutputTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
