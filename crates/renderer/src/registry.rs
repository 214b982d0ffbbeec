//! Rendering engine registry
//!
//! Process-scoped, explicitly constructed registry mapping a flavour name to
//! a rendering adapter. Adapters register at start-up (append-only); lookup
//! boots not-yet-instantiated adapters on first access and caches them.

use std::collections::HashMap;

use contracts::shared::field_definition::FieldDefinition;
use serde_json::Value;
use tracing::debug;

use crate::builder::{ContextProps, FormBuilder};
use crate::error::FormError;
use crate::model::UiModel;
use crate::store::MetadataStore;

/// Output adapter for one rendering flavour.
///
/// `render` is expected to invoke the [`FormBuilder`] and convert the
/// resulting field tree into the adapter's native representation.
pub trait RenderAdapter {
    /// Flavour name this adapter registers under.
    fn flavour(&self) -> &'static str;

    /// One-time boot hook, run when the registry first resolves the adapter.
    fn init(&mut self) {}

    /// Convert a model into the adapter's native output.
    fn render(
        &self,
        store: &MetadataStore,
        model: &dyn UiModel,
        ctx: ContextProps,
    ) -> Result<Value, FormError>;
}

/// Constructor of a lazily-booted adapter.
pub type AdapterCtor = fn() -> Box<dyn RenderAdapter>;

struct Booted {
    adapter: Box<dyn RenderAdapter>,
    initialized: bool,
}

enum Slot {
    Ready(Booted),
    Pending(AdapterCtor),
}

/// Flavour → adapter registry.
///
/// The first registered flavour becomes the process default.
#[derive(Default)]
pub struct RenderRegistry {
    adapters: HashMap<String, Slot>,
    default: Option<String>,
}

impl RenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready adapter instance.
    pub fn register(&mut self, adapter: Box<dyn RenderAdapter>) -> Result<(), FormError> {
        let flavour = adapter.flavour();
        self.insert(
            flavour,
            Slot::Ready(Booted {
                adapter,
                initialized: false,
            }),
        )
    }

    /// Register a constructor; the adapter is instantiated on first lookup.
    pub fn register_lazy(
        &mut self,
        flavour: &'static str,
        ctor: AdapterCtor,
    ) -> Result<(), FormError> {
        self.insert(flavour, Slot::Pending(ctor))
    }

    fn insert(&mut self, flavour: &str, slot: Slot) -> Result<(), FormError> {
        if self.adapters.contains_key(flavour) {
            return Err(FormError::DuplicateFlavour(flavour.to_string()));
        }
        debug!(flavour, "registering rendering flavour");
        self.adapters.insert(flavour.to_string(), slot);
        if self.default.is_none() {
            self.default = Some(flavour.to_string());
        }
        Ok(())
    }

    /// Resolve an adapter; no flavour means the process default.
    pub fn get(&mut self, flavour: Option<&str>) -> Result<&dyn RenderAdapter, FormError> {
        let flavour = match flavour {
            Some(flavour) => flavour.to_string(),
            None => self
                .default
                .clone()
                .ok_or_else(|| FormError::UnknownFlavour("(default)".to_string()))?,
        };
        Ok(self.boot(&flavour)?.adapter.as_ref())
    }

    /// Whether a flavour's adapter has completed its boot hook.
    pub fn is_initialized(&self, flavour: &str) -> bool {
        matches!(
            self.adapters.get(flavour),
            Some(Slot::Ready(booted)) if booted.initialized
        )
    }

    /// Render a model through the flavour declared on its class metadata,
    /// falling back to the process default.
    pub fn render_model(
        &mut self,
        store: &MetadataStore,
        model: &dyn UiModel,
        ctx: ContextProps,
    ) -> Result<Value, FormError> {
        let flavour = store
            .class_bundle(model.model_name())
            .and_then(|bundle| bundle.flavour)
            .or_else(|| self.default.clone())
            .ok_or_else(|| FormError::UnknownFlavour("(default)".to_string()))?;
        debug!(model = model.model_name(), flavour = %flavour, "routing model to adapter");
        let booted = self.boot(&flavour)?;
        booted.adapter.render(store, model, ctx)
    }

    fn boot(&mut self, flavour: &str) -> Result<&mut Booted, FormError> {
        let slot = self
            .adapters
            .get_mut(flavour)
            .ok_or_else(|| FormError::UnknownFlavour(flavour.to_string()))?;
        if let Slot::Pending(ctor) = slot {
            let ctor = *ctor;
            debug!(flavour, "booting rendering adapter");
            *slot = Slot::Ready(Booted {
                adapter: ctor(),
                initialized: false,
            });
        }
        let Slot::Ready(booted) = slot else {
            // Pending slots were replaced just above.
            return Err(FormError::UnknownFlavour(flavour.to_string()));
        };
        if !booted.initialized {
            booted.adapter.init();
            booted.initialized = true;
        }
        Ok(booted)
    }
}

/// Headless reference adapter: emits the compiled field tree as plain JSON.
#[derive(Debug, Default)]
pub struct JsonAdapter;

impl RenderAdapter for JsonAdapter {
    fn flavour(&self) -> &'static str {
        "json"
    }

    fn render(
        &self,
        store: &MetadataStore,
        model: &dyn UiModel,
        ctx: ContextProps,
    ) -> Result<Value, FormError> {
        let tree = FormBuilder::new(store).build(model, ctx, true)?;
        Ok(field_to_json(&tree))
    }
}

/// Convert one field definition node (and its subtree) to plain JSON.
pub fn field_to_json(node: &FieldDefinition) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("tag".to_string(), Value::String(node.tag.clone()));
    object.insert(
        "props".to_string(),
        Value::Object(
            node.props
                .iter()
                .map(|(key, value)| (key.clone(), value.into()))
                .collect(),
        ),
    );
    if !node.children.is_empty() {
        object.insert(
            "children".to_string(),
            Value::Array(node.children.iter().map(field_to_json).collect()),
        );
    }
    if let Some(item) = &node.item {
        let mut item_object = serde_json::Map::new();
        item_object.insert("tag".to_string(), Value::String(item.tag.clone()));
        item_object.insert(
            "props".to_string(),
            Value::Object(
                item.props
                    .iter()
                    .map(|(key, value)| (key.clone(), value.into()))
                    .collect(),
            ),
        );
        if let Some(mapped) = &item.mapped_name {
            item_object.insert("mappedName".to_string(), Value::String(mapped.clone()));
        }
        object.insert("item".to_string(), Value::Object(item_object));
    }
    Value::Object(object)
}
