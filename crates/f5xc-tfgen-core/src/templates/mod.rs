pub mod filters;
pub mod kind;
pub mod manager;
pub mod manifest;
pub mod types;

pub use kind::*;
pub use manager::*;
pub use manifest::*;
pub use types::*;
