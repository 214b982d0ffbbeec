//! Field tree builder
//!
//! The core compilation pass: merges a model's class metadata, resolves each
//! annotated property's placement, recurses into nested models, applies
//! modifiers, and emits an ordered, visibility-filtered [`FieldDefinition`]
//! tree. One invocation builds one tree; nothing is cached.

use std::collections::BTreeSet;

use chrono::Utc;
use contracts::shared::field_definition::{
    prop_keys, FieldDefinition, ItemDescriptor, PropMap, PropValue,
};
use contracts::shared::metadata::{BaseType, InputType, Modifier, Placement, ValidationFragment};
use tracing::{debug, trace};

use crate::error::FormError;
use crate::model::UiModel;
use crate::store::MetadataStore;
use crate::translator;

/// Order assigned to children without an explicit order modifier.
const DEFAULT_ORDER: i32 = 0;

/// Caller-supplied context merged into every node of one build.
#[derive(Debug, Clone, Default)]
pub struct ContextProps {
    /// Active operation (e.g. "create", "update"); drives visibility.
    pub operation: Option<String>,
    /// Custom props merged into every emitted node, winning last.
    pub props: PropMap,
    // Recursion state, populated internally for child builds.
    child_of: Option<String>,
    inherit: Option<Inherited>,
    ancestors: Vec<&'static str>,
}

impl ContextProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// Tag/props override a `child` placement declares for its sub-model.
#[derive(Debug, Clone, Default)]
struct Inherited {
    tag: Option<String>,
    props: PropMap,
}

/// Accumulating child before ordering and visibility post-processing.
struct PendingField {
    name: String,
    def: FieldDefinition,
    order: Option<i32>,
    hidden_on: BTreeSet<String>,
}

/// A `prop`-placed value staged for a sibling element or the parent node.
struct StagedProp {
    key: String,
    target: Option<String>,
    value: PropValue,
}

/// Compiles field trees against one metadata store.
pub struct FormBuilder<'a> {
    store: &'a MetadataStore,
}

impl<'a> FormBuilder<'a> {
    pub fn new(store: &'a MetadataStore) -> Self {
        Self { store }
    }

    /// Build the field tree of one model instance.
    ///
    /// `generate_id` controls whether the root node receives a renderer id;
    /// recursive child builds always pass `false`.
    pub fn build(
        &self,
        model: &dyn UiModel,
        ctx: ContextProps,
        generate_id: bool,
    ) -> Result<FieldDefinition, FormError> {
        let model_name = model.model_name();
        debug!(model = model_name, operation = ?ctx.operation, "building field tree");

        if ctx.ancestors.contains(&model_name) {
            let mut chain: Vec<&str> = ctx.ancestors.clone();
            chain.push(model_name);
            return Err(FormError::CyclicModelReference {
                chain: chain.join(" -> "),
            });
        }

        // 1. Class metadata merge; inherited overrides win over the model's own.
        let mut bundle = self
            .store
            .class_bundle(model_name)
            .ok_or_else(|| FormError::MissingUiDefinition(model_name.to_string()))?;
        if let Some(inherited) = &ctx.inherit {
            if inherited.tag.is_some() {
                bundle.tag = inherited.tag.clone();
            }
            bundle.props.extend(inherited.props.clone());
        }
        let tag = bundle
            .tag
            .clone()
            .ok_or_else(|| FormError::MissingUiDefinition(model_name.to_string()))?;

        let mut children: Vec<PendingField> = Vec::new();
        let mut item: Option<ItemDescriptor> = None;
        let mut staged: Vec<StagedProp> = Vec::new();

        // 2. Property enumeration in declaration order.
        for property in self.store.property_names(model_name) {
            let placements = self.store.placements(model_name, property);
            if placements.len() > 1 {
                return Err(FormError::ConflictingPlacement {
                    model: model_name.to_string(),
                    property: property.to_string(),
                    kinds: placements.iter().map(Placement::kind).collect(),
                });
            }
            let modifiers = self.store.modifiers(model_name, property);

            match placements.first() {
                None => {
                    // Modifier-only property: attach to an already-emitted node.
                    let existing = children.iter_mut().find(|c| c.name == property);
                    match existing {
                        Some(child) => apply_modifiers(child, modifiers),
                        None => {
                            return Err(FormError::OrphanModifier {
                                model: model_name.to_string(),
                                property: property.to_string(),
                            })
                        }
                    }
                }
                Some(Placement::Prop { target, stringify }) => {
                    trace!(property, "prop placement");
                    if !modifiers.is_empty() {
                        return Err(FormError::OrphanModifier {
                            model: model_name.to_string(),
                            property: property.to_string(),
                        });
                    }
                    let raw = model.property_value(property).unwrap_or(PropValue::Null);
                    let value = if *stringify {
                        PropValue::Text(raw.stringify())
                    } else {
                        raw
                    };
                    staged.push(StagedProp {
                        key: property.to_string(),
                        target: target.clone(),
                        value,
                    });
                }
                Some(Placement::Child {
                    tag: child_tag,
                    props: child_props,
                }) => {
                    trace!(property, "child placement");
                    let child_model = model.child_model(property).ok_or_else(|| {
                        FormError::ChildNotAModel {
                            model: model_name.to_string(),
                            property: property.to_string(),
                        }
                    })?;

                    let child_path = join_path(ctx.child_of.as_deref(), property);
                    let mut ancestors = ctx.ancestors.clone();
                    ancestors.push(model_name);
                    let child_ctx = ContextProps {
                        operation: ctx.operation.clone(),
                        props: ctx.props.clone(),
                        child_of: Some(child_path),
                        inherit: Some(Inherited {
                            tag: child_tag.clone(),
                            props: child_props.clone(),
                        }),
                        ancestors,
                    };

                    // Only the root of the whole build carries a renderer id.
                    let def = self.build(child_model.as_ref(), child_ctx, false)?;
                    children.push(PendingField {
                        name: property.to_string(),
                        def,
                        order: None,
                        hidden_on: BTreeSet::new(),
                    });
                    apply_modifiers(children.last_mut().expect("just pushed"), modifiers);
                }
                Some(Placement::ListProp {
                    tag: list_tag,
                    props: list_props,
                    mapped_name,
                }) => {
                    trace!(property, "list-prop placement");
                    if !modifiers.is_empty() {
                        return Err(FormError::OrphanModifier {
                            model: model_name.to_string(),
                            property: property.to_string(),
                        });
                    }
                    // Increasing priority: class list-item defaults, the
                    // placement's own props, the active context props.
                    let defaults = bundle.list_item.clone();
                    let item_tag = list_tag
                        .clone()
                        .or_else(|| defaults.as_ref().map(|d| d.tag.clone()))
                        .unwrap_or_else(|| property.to_string());
                    let mut item_props = defaults.map(|d| d.props).unwrap_or_default();
                    item_props.extend(list_props.clone());
                    item_props.extend(ctx.props.clone());
                    item = Some(ItemDescriptor {
                        tag: item_tag,
                        props: item_props,
                        mapped_name: mapped_name.clone(),
                    });
                }
                Some(Placement::Element {
                    tag: element_tag,
                    props: element_props,
                }) => {
                    trace!(property, "element placement");
                    let def = self.build_element(
                        model,
                        model_name,
                        property,
                        element_tag,
                        element_props,
                        &ctx,
                        &mut staged,
                    )?;
                    children.push(PendingField {
                        name: property.to_string(),
                        def,
                        order: None,
                        hidden_on: BTreeSet::new(),
                    });
                    apply_modifiers(children.last_mut().expect("just pushed"), modifiers);
                }
            }
        }

        // 4. Ordering, then operation-scoped visibility.
        children.sort_by_key(|c| c.order.unwrap_or(DEFAULT_ORDER));
        let before = children.len();
        let visible: Vec<FieldDefinition> = children
            .into_iter()
            .filter(|child| match &ctx.operation {
                Some(operation) => !child.hidden_on.contains(operation),
                None => true,
            })
            .map(|child| child.def)
            .collect();
        if visible.len() != before {
            debug!(
                model = model_name,
                dropped = before - visible.len(),
                "dropped hidden children"
            );
        }

        // 5. Assembly.
        let mut props = bundle.props.clone();
        for entry in staged {
            props.insert(entry.key, entry.value);
        }
        if let Some(layout) = &bundle.layout {
            props.insert(prop_keys::LAYOUT.into(), layout.into());
        }
        if let Some(pages) = &bundle.pages {
            props.insert(prop_keys::PAGES.into(), pages.into());
        }
        if !bundle.handlers.is_empty() {
            let handlers = bundle
                .handlers
                .iter()
                .map(|(event, handler)| (event.clone(), PropValue::Text(handler.clone())))
                .collect();
            props.insert(prop_keys::HANDLERS.into(), PropValue::Map(handlers));
        }
        props.extend(ctx.props.clone());
        if let Some(operation) = &ctx.operation {
            props.insert(prop_keys::OPERATION.into(), PropValue::Text(operation.clone()));
        }
        if let Some(parent) = &ctx.child_of {
            props.insert(prop_keys::CHILD_OF.into(), PropValue::Text(parent.clone()));
        }
        if generate_id {
            props.insert(
                prop_keys::RENDERER_ID.into(),
                PropValue::Text(renderer_id(model)),
            );
        }

        Ok(FieldDefinition {
            tag,
            props,
            children: visible,
            item,
        })
    }

    /// Build one leaf field node: merge props, translate validation
    /// fragments, resolve the input type and attach the formatted value.
    #[allow(clippy::too_many_arguments)]
    fn build_element(
        &self,
        model: &dyn UiModel,
        model_name: &str,
        property: &str,
        tag: &str,
        element_props: &PropMap,
        ctx: &ContextProps,
        staged: &mut Vec<StagedProp>,
    ) -> Result<FieldDefinition, FormError> {
        let mut props = PropMap::new();

        // Prop-placement values staged for this element.
        let mut rest = Vec::new();
        for entry in std::mem::take(staged) {
            if entry.target.as_deref() == Some(property) {
                props.insert(entry.key, entry.value);
            } else {
                rest.push(entry);
            }
        }
        *staged = rest;

        props.extend(element_props.clone());

        let path = join_path(ctx.child_of.as_deref(), property);
        props.insert(prop_keys::PATH.into(), PropValue::Text(path));
        if let Some(parent) = &ctx.child_of {
            props.insert(prop_keys::CHILD_OF.into(), PropValue::Text(parent.clone()));
        }

        // Context props win last.
        props.extend(ctx.props.clone());
        if let Some(operation) = &ctx.operation {
            props.insert(prop_keys::OPERATION.into(), PropValue::Text(operation.clone()));
        }

        // Validation fragments: implicit base type first, then constraints.
        let mut fragments = self.store.validations(model_name, property).iter();
        let base = match fragments.next() {
            Some(ValidationFragment::Base(base)) => *base,
            _ => BaseType::default(),
        };
        let mut marker: Option<(InputType, Option<String>)> = None;
        for fragment in fragments {
            if let ValidationFragment::Constraint { key, value } = fragment {
                match translator::translate_constraint(key, value)? {
                    translator::TranslatedConstraint::Attribute { name, value } => {
                        props.insert(name, value);
                    }
                    translator::TranslatedConstraint::TypeMarker { input, format } => {
                        marker = Some((input, format));
                    }
                }
            }
        }

        // No marker set: derive the type from the base descriptor.
        let (input, format) = marker.unwrap_or_else(|| {
            let input = translator::input_type_for(base);
            let format = (input == InputType::Date)
                .then(|| translator::DEFAULT_DATE_FORMAT.to_string());
            (input, format)
        });
        props.insert(prop_keys::TYPE.into(), PropValue::Text(input.as_str().into()));
        if let Some(format) = &format {
            props.insert(prop_keys::FORMAT.into(), PropValue::Text(format.clone()));
        }

        // The current value is always present on element nodes.
        let raw = model.property_value(property).unwrap_or(PropValue::Null);
        props.insert(
            prop_keys::VALUE.into(),
            translator::format_value(&raw, input, format.as_deref())?,
        );

        Ok(FieldDefinition {
            tag: tag.to_string(),
            props,
            children: vec![],
            item: None,
        })
    }
}

fn apply_modifiers(child: &mut PendingField, modifiers: &[Modifier]) {
    for modifier in modifiers {
        match modifier {
            Modifier::Hidden(operations) => {
                child.hidden_on.extend(operations.iter().cloned());
            }
            Modifier::Order(order) => {
                child.order = Some(*order);
            }
            Modifier::LayoutPos { col, row } => {
                child
                    .def
                    .props
                    .insert(prop_keys::COL.into(), PropValue::Integer(*col as i64));
                child
                    .def
                    .props
                    .insert(prop_keys::ROW.into(), PropValue::Integer(*row as i64));
            }
            Modifier::Page(page) => {
                child
                    .def
                    .props
                    .insert(prop_keys::PAGE.into(), PropValue::Integer(*page as i64));
            }
        }
    }
}

/// Dot-joined chain of ancestor property names.
fn join_path(parent: Option<&str>, property: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}.{property}"),
        None => property.to_string(),
    }
}

/// Renderer id of the root node: primary key (fallback: timestamp) plus the
/// model's type name.
fn renderer_id(model: &dyn UiModel) -> String {
    let key = model
        .primary_key()
        .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());
    format!("{key}{}", model.model_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        address_metadata, sample_event, sample_user, user_metadata, user_store, Address, Looper,
        User,
    };
    use crate::store::ModelMetadata;
    use contracts::shared::metadata::LayoutSpec;

    fn ctx_create() -> ContextProps {
        ContextProps::new().operation("create")
    }

    fn names(tree: &FieldDefinition) -> Vec<&str> {
        tree.children
            .iter()
            .map(|child| match child.props.get(prop_keys::PATH) {
                Some(PropValue::Text(path)) => path.rsplit('.').next().unwrap_or(path.as_str()),
                _ => child.tag.as_str(),
            })
            .collect()
    }

    #[test]
    fn test_basic_tree_in_declaration_order() {
        let store = user_store();
        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap();

        assert_eq!(tree.tag, "form-x");
        assert_eq!(tree.children.len(), 3);
        assert_eq!(names(&tree), vec!["id", "name", "email"]);

        let id = &tree.children[0];
        assert_eq!(id.props.get("required"), Some(&PropValue::Bool(true)));
        assert_eq!(
            id.props.get(prop_keys::TYPE),
            Some(&PropValue::Text("number".into()))
        );
        assert_eq!(id.props.get(prop_keys::VALUE), Some(&PropValue::Integer(7)));

        let name = &tree.children[1];
        assert_eq!(name.props.get("minlength"), Some(&PropValue::Integer(5)));
        assert_eq!(
            name.props.get("different"),
            Some(&PropValue::Text("email".into()))
        );

        let email = &tree.children[2];
        assert_eq!(
            email.props.get(prop_keys::TYPE),
            Some(&PropValue::Text("email".into()))
        );
        assert!(email.props.get(prop_keys::FORMAT).is_none());
    }

    #[test]
    fn test_builds_are_deterministic() {
        let store = user_store();
        let builder = FormBuilder::new(&store);

        let first = builder.build(&sample_user(), ctx_create(), true).unwrap();
        let second = builder.build(&sample_user(), ctx_create(), true).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_hidden_is_operation_scoped() {
        let mut store = MetadataStore::new();
        user_metadata().hidden("name", ["update"]).register(&mut store);
        let builder = FormBuilder::new(&store);

        let update = builder
            .build(
                &sample_user(),
                ContextProps::new().operation("update"),
                true,
            )
            .unwrap();
        assert_eq!(names(&update), vec!["id", "email"]);

        let create = builder.build(&sample_user(), ctx_create(), true).unwrap();
        assert_eq!(create.children.len(), 3);
    }

    #[test]
    fn test_child_placeholder_matches_real_instance_shape() {
        let mut store = MetadataStore::new();
        user_metadata()
            .child("address", None, PropMap::new())
            .register(&mut store);
        address_metadata().register(&mut store);
        let builder = FormBuilder::new(&store);

        let without = builder.build(&sample_user(), ctx_create(), true).unwrap();
        let with = builder
            .build(
                &User {
                    address: Some(Address {
                        street: "Main St".into(),
                        city: "Oslo".into(),
                    }),
                    ..sample_user()
                },
                ctx_create(),
                true,
            )
            .unwrap();

        let subtree = &without.children[3];
        assert_eq!(subtree.tag, "address-group");
        assert_eq!(
            subtree.props.get(prop_keys::CHILD_OF),
            Some(&PropValue::Text("address".into()))
        );
        // Placeholder subtree has the same shape as a populated one.
        assert_eq!(subtree.children.len(), 2);
        assert_eq!(with.children[3].children.len(), 2);
        assert_eq!(
            subtree.children[0].props.get(prop_keys::PATH),
            Some(&PropValue::Text("address.street".into()))
        );
    }

    #[test]
    fn test_child_tag_override_wins() {
        let mut store = MetadataStore::new();
        user_metadata()
            .child("address", Some("address-card"), PropMap::new())
            .register(&mut store);
        address_metadata().register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap();
        assert_eq!(tree.children[3].tag, "address-card");
    }

    #[test]
    fn test_conflicting_placements_fail() {
        let mut store = MetadataStore::new();
        user_metadata().prop("name", None, false).register(&mut store);

        let err = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap_err();
        match err {
            FormError::ConflictingPlacement { property, kinds, .. } => {
                assert_eq!(property, "name");
                assert_eq!(kinds, vec!["element", "prop"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_attribute_key_aborts_build() {
        let mut store = MetadataStore::new();
        ModelMetadata::new("User")
            .tag("form-x", PropMap::new())
            .element("name", "form-input", PropMap::new())
            .validate(
                "name",
                BaseType::String,
                vec![ValidationFragment::constraint("bogusKey", PropValue::Null)],
            )
            .register(&mut store);

        let err = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bogusKey"));
        assert!(message.contains("required"));
    }

    #[test]
    fn test_orphan_modifier_fails() {
        let mut store = MetadataStore::new();
        ModelMetadata::new("User")
            .tag("form-x", PropMap::new())
            .hidden("ghost", ["create"])
            .register(&mut store);

        let err = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap_err();
        assert!(matches!(err, FormError::OrphanModifier { property, .. } if property == "ghost"));
    }

    #[test]
    fn test_cyclic_model_reference_fails_fast() {
        let mut store = MetadataStore::new();
        ModelMetadata::new("Looper")
            .tag("loop-form", PropMap::new())
            .child("next", None, PropMap::new())
            .register(&mut store);

        let err = FormBuilder::new(&store)
            .build(&Looper, ctx_create(), true)
            .unwrap_err();
        assert!(
            matches!(err, FormError::CyclicModelReference { chain } if chain == "Looper -> Looper")
        );
    }

    #[test]
    fn test_child_placement_on_non_model_property() {
        let mut store = MetadataStore::new();
        user_metadata()
            .child("nickname", None, PropMap::new())
            .register(&mut store);

        let err = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap_err();
        assert!(
            matches!(err, FormError::ChildNotAModel { property, .. } if property == "nickname")
        );
    }

    #[test]
    fn test_missing_ui_definition() {
        let store = MetadataStore::new();
        let err = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap_err();
        assert!(matches!(err, FormError::MissingUiDefinition(model) if model == "User"));
    }

    #[test]
    fn test_order_modifier_overrides_declaration_order() {
        let mut store = MetadataStore::new();
        user_metadata().order("email", -1).register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap();
        assert_eq!(names(&tree), vec!["email", "id", "name"]);
    }

    #[test]
    fn test_targeted_prop_lands_on_element() {
        let mut store = MetadataStore::new();
        ModelMetadata::new("User")
            .tag("form-x", PropMap::new())
            .prop("nickname", Some("name"), false)
            .element("name", "form-input", PropMap::new())
            .validate("name", BaseType::String, vec![])
            .register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap();
        assert_eq!(
            tree.children[0].props.get("nickname"),
            Some(&PropValue::Text("jono".into()))
        );
        assert!(tree.props.get("nickname").is_none());
    }

    #[test]
    fn test_untargeted_prop_lands_on_parent() {
        let mut store = MetadataStore::new();
        user_metadata().prop("nickname", None, false).register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap();
        assert_eq!(
            tree.props.get("nickname"),
            Some(&PropValue::Text("jono".into()))
        );
    }

    #[test]
    fn test_list_prop_configures_item_descriptor() {
        let mut store = MetadataStore::new();
        user_metadata()
            .list_item("item-row", PropMap::from([("dense".to_string(), PropValue::Bool(true))]))
            .list_prop("emails", None, PropMap::new(), Some("items"))
            .register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap();
        let item = tree.item.expect("item descriptor configured");
        assert_eq!(item.tag, "item-row");
        assert_eq!(item.props.get("dense"), Some(&PropValue::Bool(true)));
        assert_eq!(item.mapped_name.as_deref(), Some("items"));
    }

    #[test]
    fn test_date_type_inferred_from_base_descriptor() {
        let mut store = MetadataStore::new();
        ModelMetadata::new("Event")
            .tag("event-form", PropMap::new())
            .element("when", "form-input", PropMap::new())
            .validate("when", BaseType::Date, vec![])
            .register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_event(), ctx_create(), true)
            .unwrap();
        let when = &tree.children[0];
        assert_eq!(
            when.props.get(prop_keys::TYPE),
            Some(&PropValue::Text("date".into()))
        );
        assert_eq!(
            when.props.get(prop_keys::FORMAT),
            Some(&PropValue::Text(translator::DEFAULT_DATE_FORMAT.into()))
        );
        assert_eq!(
            when.props.get(prop_keys::VALUE),
            Some(&PropValue::Text("2024-03-09".into()))
        );
    }

    #[test]
    fn test_explicit_date_format_wins() {
        let mut store = MetadataStore::new();
        ModelMetadata::new("Event")
            .tag("event-form", PropMap::new())
            .element("when", "form-input", PropMap::new())
            .validate(
                "when",
                BaseType::Date,
                vec![ValidationFragment::constraint("date", "%d.%m.%Y")],
            )
            .register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_event(), ctx_create(), true)
            .unwrap();
        let when = &tree.children[0];
        assert_eq!(
            when.props.get(prop_keys::FORMAT),
            Some(&PropValue::Text("%d.%m.%Y".into()))
        );
        assert_eq!(
            when.props.get(prop_keys::VALUE),
            Some(&PropValue::Text("09.03.2024".into()))
        );
    }

    #[test]
    fn test_invalid_date_format_aborts_build() {
        let mut store = MetadataStore::new();
        ModelMetadata::new("Event")
            .tag("event-form", PropMap::new())
            .element("when", "form-input", PropMap::new())
            .validate(
                "when",
                BaseType::Date,
                vec![ValidationFragment::constraint("date", "%Q")],
            )
            .register(&mut store);

        let err = FormBuilder::new(&store)
            .build(&sample_event(), ctx_create(), true)
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidDateFormat(f) if f == "%Q"));
    }

    #[test]
    fn test_renderer_id_only_on_root() {
        let mut store = MetadataStore::new();
        user_metadata()
            .child("address", None, PropMap::new())
            .register(&mut store);
        address_metadata().register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap();
        assert_eq!(
            tree.props.get(prop_keys::RENDERER_ID),
            Some(&PropValue::Text("7User".into()))
        );
        assert!(tree.children[3].props.get(prop_keys::RENDERER_ID).is_none());
    }

    #[test]
    fn test_string_values_are_escaped() {
        let store = user_store();
        let tree = FormBuilder::new(&store)
            .build(
                &User {
                    name: "a<b&c".into(),
                    ..sample_user()
                },
                ctx_create(),
                true,
            )
            .unwrap();
        assert_eq!(
            tree.children[1].props.get(prop_keys::VALUE),
            Some(&PropValue::Text("a&lt;b&amp;c".into()))
        );
    }

    #[test]
    fn test_context_props_merge_into_every_node() {
        let store = user_store();
        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create().prop("theme", "dark"), true)
            .unwrap();
        assert_eq!(tree.props.get("theme"), Some(&PropValue::Text("dark".into())));
        for child in &tree.children {
            assert_eq!(
                child.props.get("theme"),
                Some(&PropValue::Text("dark".into()))
            );
            assert_eq!(
                child.props.get(prop_keys::OPERATION),
                Some(&PropValue::Text("create".into()))
            );
        }
    }

    #[test]
    fn test_handlers_and_layout_on_root() {
        let mut store = MetadataStore::new();
        user_metadata()
            .handlers([("submit", "onSubmit")])
            .layout(LayoutSpec {
                columns: 2,
                rows: 3,
                breakpoint: Some("md".into()),
            })
            .layout_pos("name", 2, 1)
            .page("email", 2)
            .register(&mut store);

        let tree = FormBuilder::new(&store)
            .build(&sample_user(), ctx_create(), true)
            .unwrap();

        match tree.props.get(prop_keys::HANDLERS) {
            Some(PropValue::Map(handlers)) => {
                assert_eq!(handlers.get("submit"), Some(&PropValue::Text("onSubmit".into())));
            }
            other => panic!("expected handlers map, got {other:?}"),
        }
        assert!(tree.props.contains_key(prop_keys::LAYOUT));
        assert_eq!(
            tree.children[1].props.get(prop_keys::COL),
            Some(&PropValue::Integer(2))
        );
        assert_eq!(
            tree.children[2].props.get(prop_keys::PAGE),
            Some(&PropValue::Integer(2))
        );
    }
}
