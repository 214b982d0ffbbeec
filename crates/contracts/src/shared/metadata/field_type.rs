//! Type enumerations for the metadata system

use serde::{Deserialize, Serialize};

/// Semantic base type of a model property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    #[default]
    String,
    Number,
    BigInt,
    Boolean,
    Date,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::BigInt => "bigint",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

/// UI input category of an emitted field node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Number,
    Checkbox,
    Radio,
    Range,
    Date,
    #[serde(rename = "datetime-local")]
    DatetimeLocal,
    Time,
    Email,
    Url,
    Password,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Range => "range",
            Self::Date => "date",
            Self::DatetimeLocal => "datetime-local",
            Self::Time => "time",
            Self::Email => "email",
            Self::Url => "url",
            Self::Password => "password",
        }
    }
}
