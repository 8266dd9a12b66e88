//! Builders turning decoded OpenAPI documents into resource templates

pub mod attribute;
pub mod resource;
pub mod sort;

pub use attribute::{AttributeBuilder, DEFAULT_MAX_DEPTH};
pub use resource::{build_resource, ResourceBuild, ResourceOptions, METADATA_ATTRIBUTES};
pub use sort::{sort_attributes, sort_nested};
