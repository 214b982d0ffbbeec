//! Model instance surface the builder walks

use contracts::shared::field_definition::PropValue;

/// A data model instance the field tree builder can traverse.
///
/// Replaces the runtime reflection of dynamic-language form systems: a model
/// exposes its type name (the metadata store key), per-property current
/// values, nested model instances and its primary key.
pub trait UiModel {
    /// Type name of the model; key into the metadata store.
    fn model_name(&self) -> &'static str;

    /// Current value of a property, `None` when unset.
    fn property_value(&self, property: &str) -> Option<PropValue>;

    /// Nested model instance for a `child`-placed property.
    ///
    /// Must return a placeholder (default-constructed) instance when the
    /// current value is unset, so the child's metadata can still be walked.
    /// `None` means the property is not model-typed at all.
    fn child_model(&self, property: &str) -> Option<Box<dyn UiModel>> {
        let _ = property;
        None
    }

    /// Primary-key value, used for the root node's renderer id.
    fn primary_key(&self) -> Option<String> {
        None
    }
}
