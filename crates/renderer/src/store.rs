//! Metadata store
//!
//! Typed registry of annotation fragments, keyed by model name and concern
//! (class vs. property). Populated once at start-up through the fluent
//! [`ModelMetadata`] builder; read-only from the builder's perspective.

use std::collections::HashMap;

use contracts::shared::field_definition::PropMap;
use contracts::shared::metadata::{
    BaseType, ClassBundle, ClassFragment, LayoutSpec, Modifier, PagesSpec, Placement,
    ValidationFragment,
};
use tracing::debug;

/// All fragments registered for one property, in attachment order.
///
/// Several placements may be stored for the same property; the conflict is a
/// model-shape defect and is reported by the builder at build time, not here.
#[derive(Debug, Default)]
struct PropertyRecord {
    name: String,
    placements: Vec<Placement>,
    modifiers: Vec<Modifier>,
    validations: Vec<ValidationFragment>,
}

/// Read-only (after start-up) store of model annotation metadata
#[derive(Debug, Default)]
pub struct MetadataStore {
    class: HashMap<String, Vec<ClassFragment>>,
    /// Property records per model, in declaration order
    properties: HashMap<String, Vec<PropertyRecord>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merged class-level bundle of a model, `None` when no class fragment
    /// was ever attached.
    pub fn class_bundle(&self, model: &str) -> Option<ClassBundle> {
        self.class
            .get(model)
            .map(|fragments| ClassBundle::from_fragments(fragments))
    }

    /// Annotated property names of a model, in declaration order.
    pub fn property_names(&self, model: &str) -> Vec<&str> {
        self.properties
            .get(model)
            .map(|records| records.iter().map(|r| r.name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn placements(&self, model: &str, property: &str) -> &[Placement] {
        self.record(model, property)
            .map(|r| r.placements.as_slice())
            .unwrap_or_default()
    }

    pub fn modifiers(&self, model: &str, property: &str) -> &[Modifier] {
        self.record(model, property)
            .map(|r| r.modifiers.as_slice())
            .unwrap_or_default()
    }

    pub fn validations(&self, model: &str, property: &str) -> &[ValidationFragment] {
        self.record(model, property)
            .map(|r| r.validations.as_slice())
            .unwrap_or_default()
    }

    fn record(&self, model: &str, property: &str) -> Option<&PropertyRecord> {
        self.properties
            .get(model)?
            .iter()
            .find(|r| r.name == property)
    }
}

/// Fluent registration builder for one model's metadata.
///
/// ```rust,ignore
/// ModelMetadata::new("User")
///     .tag("form-x", PropMap::new())
///     .element("name", "form-input", PropMap::new())
///     .validate("name", BaseType::String, vec![("minLength", 5.into())])
///     .hidden("name", ["update"])
///     .register(&mut store);
/// ```
#[derive(Debug)]
pub struct ModelMetadata {
    model: String,
    class: Vec<ClassFragment>,
    properties: Vec<PropertyRecord>,
}

impl ModelMetadata {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            class: Vec::new(),
            properties: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Class-level fragments
    // ------------------------------------------------------------------

    pub fn class_fragment(mut self, fragment: ClassFragment) -> Self {
        self.class.push(fragment);
        self
    }

    /// Root tag and static props of the model's form.
    pub fn tag(self, tag: impl Into<String>, props: PropMap) -> Self {
        self.class_fragment(ClassFragment::Model {
            tag: tag.into(),
            props,
            flavour: None,
        })
    }

    /// Root tag routed to a specific rendering flavour.
    pub fn tag_with_flavour(
        self,
        tag: impl Into<String>,
        props: PropMap,
        flavour: impl Into<String>,
    ) -> Self {
        self.class_fragment(ClassFragment::Model {
            tag: tag.into(),
            props,
            flavour: Some(flavour.into()),
        })
    }

    /// Default item template for list-placed collections.
    pub fn list_item(self, tag: impl Into<String>, props: PropMap) -> Self {
        self.class_fragment(ClassFragment::ListItem {
            tag: tag.into(),
            props,
        })
    }

    /// Event-handler map merged into the root node.
    pub fn handlers<K, V>(self, handlers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.class_fragment(ClassFragment::Handlers(
            handlers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn layout(self, spec: LayoutSpec) -> Self {
        self.class_fragment(ClassFragment::Layout(spec))
    }

    pub fn pages(self, spec: PagesSpec) -> Self {
        self.class_fragment(ClassFragment::Pages(spec))
    }

    // ------------------------------------------------------------------
    // Property-level fragments
    // ------------------------------------------------------------------

    pub fn placement(mut self, property: impl Into<String>, placement: Placement) -> Self {
        self.record_mut(property.into()).placements.push(placement);
        self
    }

    /// Leaf field with a concrete tag and static props.
    pub fn element(self, property: impl Into<String>, tag: impl Into<String>, props: PropMap) -> Self {
        let placement = Placement::Element {
            tag: tag.into(),
            props,
        };
        self.placement(property, placement)
    }

    /// Pass-through prop; `target` names the sibling element it attaches to.
    pub fn prop(self, property: impl Into<String>, target: Option<&str>, stringify: bool) -> Self {
        let placement = Placement::Prop {
            target: target.map(str::to_string),
            stringify,
        };
        self.placement(property, placement)
    }

    /// Nested sub-model with an optional tag/props override.
    pub fn child(self, property: impl Into<String>, tag: Option<&str>, props: PropMap) -> Self {
        let placement = Placement::Child {
            tag: tag.map(str::to_string),
            props,
        };
        self.placement(property, placement)
    }

    /// Collection rendered through an item template.
    pub fn list_prop(
        self,
        property: impl Into<String>,
        tag: Option<&str>,
        props: PropMap,
        mapped_name: Option<&str>,
    ) -> Self {
        let placement = Placement::ListProp {
            tag: tag.map(str::to_string),
            props,
            mapped_name: mapped_name.map(str::to_string),
        };
        self.placement(property, placement)
    }

    pub fn modifier(mut self, property: impl Into<String>, modifier: Modifier) -> Self {
        self.record_mut(property.into()).modifiers.push(modifier);
        self
    }

    /// Hide the property's node on the given operations.
    pub fn hidden<S: Into<String>>(
        self,
        property: impl Into<String>,
        operations: impl IntoIterator<Item = S>,
    ) -> Self {
        let modifier = Modifier::Hidden(operations.into_iter().map(Into::into).collect());
        self.modifier(property, modifier)
    }

    pub fn order(self, property: impl Into<String>, order: i32) -> Self {
        self.modifier(property, Modifier::Order(order))
    }

    pub fn layout_pos(self, property: impl Into<String>, col: u32, row: u32) -> Self {
        self.modifier(property, Modifier::LayoutPos { col, row })
    }

    pub fn page(self, property: impl Into<String>, page: u32) -> Self {
        self.modifier(property, Modifier::Page(page))
    }

    /// Ordered validation metadata: implicit base type first, then constraints.
    pub fn validate(
        mut self,
        property: impl Into<String>,
        base: BaseType,
        constraints: Vec<ValidationFragment>,
    ) -> Self {
        let record = self.record_mut(property.into());
        record.validations.push(ValidationFragment::Base(base));
        record.validations.extend(constraints);
        self
    }

    /// Attach everything to the store.
    pub fn register(self, store: &mut MetadataStore) {
        debug!(
            model = %self.model,
            class_fragments = self.class.len(),
            properties = self.properties.len(),
            "registering model metadata"
        );
        store
            .class
            .entry(self.model.clone())
            .or_default()
            .extend(self.class);
        store
            .properties
            .entry(self.model)
            .or_default()
            .extend(self.properties);
    }

    /// Record for a property, created on first touch so declaration order
    /// follows the registration call order.
    fn record_mut(&mut self, property: String) -> &mut PropertyRecord {
        if let Some(index) = self.properties.iter().position(|r| r.name == property) {
            return &mut self.properties[index];
        }
        self.properties.push(PropertyRecord {
            name: property,
            ..Default::default()
        });
        self.properties.last_mut().expect("record just pushed")
    }
}
