pub mod field_definition;
pub mod metadata;
