//! Annotation metadata attached to model types
//!
//! Models are described once, at definition time, by class-level fragments
//! (tag, list-item template, handlers, layout, pages), property-level
//! placements and modifiers, and ordered validation descriptors. The field
//! tree builder consumes these fragments read-only.

mod field_type;
mod fragments;
mod validation;

pub use field_type::{BaseType, InputType};
pub use fragments::{
    ClassBundle, ClassFragment, ItemDefaults, LayoutSpec, Modifier, PageDescriptor, PagesSpec,
    Placement,
};
pub use validation::ValidationFragment;
