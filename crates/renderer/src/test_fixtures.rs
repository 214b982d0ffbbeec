//! Shared model and metadata fixtures for builder and registry tests

use chrono::NaiveDateTime;
use contracts::shared::field_definition::{PropMap, PropValue};
use contracts::shared::metadata::{BaseType, ValidationFragment};
use uuid::Uuid;

use crate::model::UiModel;
use crate::store::{MetadataStore, ModelMetadata};

#[derive(Debug, Clone, Default)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub nickname: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl UiModel for User {
    fn model_name(&self) -> &'static str {
        "User"
    }

    fn property_value(&self, property: &str) -> Option<PropValue> {
        match property {
            "id" => Some(PropValue::Integer(self.id)),
            "name" => Some(PropValue::Text(self.name.clone())),
            "email" => Some(PropValue::Text(self.email.clone())),
            "nickname" => Some(PropValue::Text(self.nickname.clone())),
            _ => None,
        }
    }

    fn child_model(&self, property: &str) -> Option<Box<dyn UiModel>> {
        match property {
            "address" => Some(Box::new(self.address.clone().unwrap_or_default())),
            _ => None,
        }
    }

    fn primary_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

impl UiModel for Address {
    fn model_name(&self) -> &'static str {
        "Address"
    }

    fn property_value(&self, property: &str) -> Option<PropValue> {
        match property {
            "street" => Some(PropValue::Text(self.street.clone())),
            "city" => Some(PropValue::Text(self.city.clone())),
            _ => None,
        }
    }
}

/// Model with a Uuid primary key, routed to the "json" flavour.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub login: String,
}

impl UiModel for Account {
    fn model_name(&self) -> &'static str {
        "Account"
    }

    fn property_value(&self, property: &str) -> Option<PropValue> {
        match property {
            "login" => Some(PropValue::Text(self.login.clone())),
            _ => None,
        }
    }

    fn primary_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

/// Model whose only child is itself; exercises the cycle guard.
#[derive(Debug, Clone, Default)]
pub struct Looper;

impl UiModel for Looper {
    fn model_name(&self) -> &'static str {
        "Looper"
    }

    fn property_value(&self, _property: &str) -> Option<PropValue> {
        None
    }

    fn child_model(&self, property: &str) -> Option<Box<dyn UiModel>> {
        match property {
            "next" => Some(Box::new(Looper)),
            _ => None,
        }
    }
}

/// Model with a date-typed property.
#[derive(Debug, Clone)]
pub struct Event {
    pub when: NaiveDateTime,
}

impl UiModel for Event {
    fn model_name(&self) -> &'static str {
        "Event"
    }

    fn property_value(&self, property: &str) -> Option<PropValue> {
        match property {
            "when" => Some(PropValue::Date(self.when)),
            _ => None,
        }
    }
}

pub fn sample_event() -> Event {
    let when = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    Event { when }
}

pub fn sample_user() -> User {
    User {
        id: 7,
        name: "Jonathan".into(),
        email: "jon@example.com".into(),
        nickname: "jono".into(),
        address: None,
    }
}

pub fn sample_account() -> Account {
    Account {
        id: Uuid::new_v4(),
        login: "jdoe".into(),
    }
}

/// The §-scenario model: `id:number`, `name:string(minLength 5, different
/// email)`, `email:string(email)` under a `form-x` root.
pub fn user_metadata() -> ModelMetadata {
    ModelMetadata::new("User")
        .tag("form-x", PropMap::new())
        .element("id", "form-input", PropMap::new())
        .validate(
            "id",
            BaseType::Number,
            vec![ValidationFragment::constraint("required", PropValue::Null)],
        )
        .element("name", "form-input", PropMap::new())
        .validate(
            "name",
            BaseType::String,
            vec![
                ValidationFragment::constraint("minLength", PropValue::Integer(5)),
                ValidationFragment::constraint("different", "email"),
            ],
        )
        .element("email", "form-input", PropMap::new())
        .validate(
            "email",
            BaseType::String,
            vec![ValidationFragment::constraint("email", PropValue::Null)],
        )
}

pub fn address_metadata() -> ModelMetadata {
    ModelMetadata::new("Address")
        .tag("address-group", PropMap::new())
        .element("street", "form-input", PropMap::new())
        .validate("street", BaseType::String, vec![])
        .element("city", "form-input", PropMap::new())
        .validate("city", BaseType::String, vec![])
}

pub fn user_store() -> MetadataStore {
    let mut store = MetadataStore::new();
    user_metadata().register(&mut store);
    address_metadata().register(&mut store);
    store
}

pub fn account_store() -> MetadataStore {
    let mut store = MetadataStore::new();
    ModelMetadata::new("Account")
        .tag_with_flavour("account-form", PropMap::new(), "json")
        .element("login", "form-input", PropMap::new())
        .validate("login", BaseType::String, vec![])
        .register(&mut store);
    store
}
