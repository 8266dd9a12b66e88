//! F5XC Terraform schema generator core library
//!
//! Turns the F5 Distributed Cloud OpenAPI exports into Terraform plugin
//! framework sources: a resource, a client struct file and a data source per
//! resource.

pub mod builders;
pub mod config;
pub mod description;
pub mod error;
pub mod generate;
pub mod loader;
pub mod oneof;
pub mod openapi;
pub mod store;
pub mod templates;
pub mod utils;

pub use crate::{
    builders::{build_resource, AttributeBuilder, ResourceOptions},
    config::GeneratorConfig,
    error::{Error, Result},
    generate::{generate, GenerationSummary, SkipReason},
    openapi::{Schema, Spec},
    store::SchemaStore,
    templates::{ResourceTemplate, TemplateManager, TerraformAttribute},
};
