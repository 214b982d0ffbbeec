//! Field tree compilation engine
//!
//! Compiles a metadata-annotated model instance into a renderer-agnostic
//! tree of typed, validated, ordered field definitions, and routes models
//! to pluggable rendering adapters.

pub mod builder;
pub mod error;
pub mod model;
pub mod registry;
pub mod store;
pub mod translator;

pub use builder::{ContextProps, FormBuilder};
pub use error::FormError;
pub use model::UiModel;
pub use registry::{JsonAdapter, RenderAdapter, RenderRegistry};
pub use store::{MetadataStore, ModelMetadata};

#[cfg(test)]
pub(crate) mod test_fixtures;
