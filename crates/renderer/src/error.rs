//! Build and registry errors

use thiserror::Error;

/// Errors raised while compiling a field tree or routing to an adapter.
///
/// All of these indicate metadata authoring defects, not transient
/// conditions: none are retried, and no partial tree is returned.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("no UI definition registered for model '{0}'")]
    MissingUiDefinition(String),

    #[error("property '{model}.{property}' carries conflicting placements: {kinds:?}")]
    ConflictingPlacement {
        model: String,
        property: String,
        kinds: Vec<&'static str>,
    },

    #[error("property '{model}.{property}' uses a child placement but is not model-typed")]
    ChildNotAModel { model: String, property: String },

    #[error("invalid validation attribute key '{key}'; allowed keys: {allowed}")]
    InvalidAttributeKey { key: String, allowed: String },

    #[error("invalid date format string '{0}'")]
    InvalidDateFormat(String),

    #[error("modifier on '{model}.{property}' has no element or child node to attach to")]
    OrphanModifier { model: String, property: String },

    #[error("cyclic model reference: {chain}")]
    CyclicModelReference { chain: String },

    #[error("unknown rendering flavour '{0}'")]
    UnknownFlavour(String),

    #[error("rendering flavour '{0}' is already registered")]
    DuplicateFlavour(String),
}
