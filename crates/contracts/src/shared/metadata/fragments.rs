//! Class-level and property-level annotation fragments

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::shared::field_definition::{PropMap, PropValue};

// ============================================================================
// Class-level fragments
// ============================================================================

/// One class-level fragment attached to a model type.
///
/// A model may carry several fragments; they merge positionally into a
/// [`ClassBundle`], later fragments overriding earlier ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassFragment {
    /// Root tag and static props of the model's form
    Model {
        tag: String,
        props: PropMap,
        /// Rendering adapter flavour this model is routed to
        flavour: Option<String>,
    },
    /// Default tag/props for items of list-placed collections
    ListItem { tag: String, props: PropMap },
    /// Event-handler map (event name → handler identifier)
    Handlers(BTreeMap<String, String>),
    /// Layout grid spec
    Layout(LayoutSpec),
    /// Stepped/paged form spec
    Pages(PagesSpec),
}

/// Layout grid declared at class level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub columns: u32,
    pub rows: u32,
    pub breakpoint: Option<String>,
}

/// Paged form spec: a bare page count or explicit page descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PagesSpec {
    Count(u32),
    Descriptors(Vec<PageDescriptor>),
}

/// One page of a stepped form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub title: String,
    pub props: PropMap,
}

/// Default item template taken from a `ListItem` class fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefaults {
    pub tag: String,
    pub props: PropMap,
}

/// Merged class-level bundle of a model type.
///
/// Produced by folding the model's class fragments in registration order;
/// later fragments override earlier ones field by field.
#[derive(Debug, Clone, Default)]
pub struct ClassBundle {
    pub tag: Option<String>,
    pub props: PropMap,
    pub flavour: Option<String>,
    pub list_item: Option<ItemDefaults>,
    pub handlers: BTreeMap<String, String>,
    pub layout: Option<LayoutSpec>,
    pub pages: Option<PagesSpec>,
}

impl ClassBundle {
    /// Fold fragments into a bundle, later fragments winning.
    pub fn from_fragments(fragments: &[ClassFragment]) -> Self {
        let mut bundle = Self::default();
        for fragment in fragments {
            match fragment {
                ClassFragment::Model { tag, props, flavour } => {
                    bundle.tag = Some(tag.clone());
                    bundle.props.extend(props.clone());
                    if flavour.is_some() {
                        bundle.flavour = flavour.clone();
                    }
                }
                ClassFragment::ListItem { tag, props } => {
                    bundle.list_item = Some(ItemDefaults {
                        tag: tag.clone(),
                        props: props.clone(),
                    });
                }
                ClassFragment::Handlers(map) => {
                    bundle.handlers.extend(map.clone());
                }
                ClassFragment::Layout(spec) => {
                    bundle.layout = Some(spec.clone());
                }
                ClassFragment::Pages(spec) => {
                    bundle.pages = Some(spec.clone());
                }
            }
        }
        bundle
    }
}

impl From<&LayoutSpec> for PropValue {
    fn from(spec: &LayoutSpec) -> Self {
        let mut map = PropMap::new();
        map.insert("columns".into(), PropValue::Integer(spec.columns as i64));
        map.insert("rows".into(), PropValue::Integer(spec.rows as i64));
        if let Some(breakpoint) = &spec.breakpoint {
            map.insert("breakpoint".into(), PropValue::Text(breakpoint.clone()));
        }
        PropValue::Map(map)
    }
}

impl From<&PagesSpec> for PropValue {
    fn from(spec: &PagesSpec) -> Self {
        match spec {
            PagesSpec::Count(count) => PropValue::Integer(*count as i64),
            PagesSpec::Descriptors(pages) => PropValue::List(
                pages
                    .iter()
                    .map(|page| {
                        let mut map = page.props.clone();
                        map.insert("title".into(), PropValue::Text(page.title.clone()));
                        PropValue::Map(map)
                    })
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// Property-level fragments
// ============================================================================

/// Placement of a property in the built tree.
///
/// Exactly one placement per property is legal; the builder rejects
/// properties carrying more than one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Placement {
    /// Pass the raw property value as a named component prop; no node is
    /// created. `target` names the sibling element the value attaches to;
    /// untargeted values land on the parent node.
    Prop {
        target: Option<String>,
        stringify: bool,
    },
    /// Render as a concrete leaf field with validation
    Element { tag: String, props: PropMap },
    /// Recurse into a nested sub-model; tag/props override the child's own
    /// class fragment
    Child {
        tag: Option<String>,
        props: PropMap,
    },
    /// The property is a collection rendered through an item template
    ListProp {
        tag: Option<String>,
        props: PropMap,
        mapped_name: Option<String>,
    },
}

impl Placement {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Prop { .. } => "prop",
            Self::Element { .. } => "element",
            Self::Child { .. } => "child",
            Self::ListProp { .. } => "list-prop",
        }
    }
}

/// Modifier composing with a property's placement without replacing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Modifier {
    /// Operations on which the node is dropped from the final tree
    Hidden(BTreeSet<String>),
    /// Explicit render order relative to siblings
    Order(i32),
    /// Layout grid position
    LayoutPos { col: u32, row: u32 },
    /// Page index of a stepped form
    Page(u32),
}
