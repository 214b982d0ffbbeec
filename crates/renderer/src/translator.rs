//! Type & validation translator
//!
//! Maps semantic base types to UI input categories and back, converts
//! validation constraint descriptors into node attributes or type markers,
//! and formats current values for display.

use std::collections::HashMap;

use chrono::format::{Item, StrftimeItems};
use contracts::shared::field_definition::PropValue;
use contracts::shared::metadata::{BaseType, InputType};
use once_cell::sync::Lazy;

use crate::error::FormError;

/// Format applied to date fields that declare no explicit format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Constraint keys translated into node attributes.
const ATTRIBUTE_KEYS: &[&str] = &[
    "required",
    "min",
    "max",
    "minLength",
    "maxLength",
    "pattern",
    "step",
    "same",
    "different",
];

/// Constraint keys that imply the input type instead of an attribute.
const TYPE_KEYS: &[&str] = &["email", "url", "date", "password"];

/// Constraint keys whose attribute name differs from the metadata key.
static ATTRIBUTE_NAME_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([("minLength", "minlength"), ("maxLength", "maxlength")])
});

/// Forward mapping: semantic base type → UI input category.
pub fn input_type_for(base: BaseType) -> InputType {
    match base {
        BaseType::String => InputType::Text,
        BaseType::Number | BaseType::BigInt => InputType::Number,
        BaseType::Boolean => InputType::Checkbox,
        BaseType::Date => InputType::Date,
    }
}

/// Backward mapping: UI input category → semantic base type.
pub fn base_type_for(input: InputType) -> BaseType {
    match input {
        InputType::Checkbox | InputType::Radio => BaseType::Boolean,
        InputType::Number | InputType::Range => BaseType::Number,
        InputType::Date | InputType::DatetimeLocal | InputType::Time => BaseType::Date,
        _ => BaseType::String,
    }
}

/// Result of translating one constraint descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatedConstraint {
    /// Attribute to merge into the node's props
    Attribute { name: String, value: PropValue },
    /// The constraint key implies the input type itself
    TypeMarker {
        input: InputType,
        format: Option<String>,
    },
}

/// Translate a constraint key plus its configured value.
///
/// `required` always yields boolean `true`; the remaining attribute keys pass
/// their literal value through (under the translated attribute name where it
/// differs). Type-implying keys resolve the input category, with `date` also
/// resolving a format string.
pub fn translate_constraint(key: &str, value: &PropValue) -> Result<TranslatedConstraint, FormError> {
    if TYPE_KEYS.contains(&key) {
        let input = match key {
            "email" => InputType::Email,
            "url" => InputType::Url,
            "password" => InputType::Password,
            _ => InputType::Date,
        };
        let format = if input == InputType::Date {
            let format = match value {
                PropValue::Text(explicit) => explicit.clone(),
                _ => DEFAULT_DATE_FORMAT.to_string(),
            };
            validate_date_format(&format)?;
            Some(format)
        } else {
            None
        };
        return Ok(TranslatedConstraint::TypeMarker { input, format });
    }

    if ATTRIBUTE_KEYS.contains(&key) {
        let name = ATTRIBUTE_NAME_MAP.get(key).copied().unwrap_or(key);
        let value = if key == "required" {
            PropValue::Bool(true)
        } else {
            value.clone()
        };
        return Ok(TranslatedConstraint::Attribute {
            name: name.to_string(),
            value,
        });
    }

    Err(FormError::InvalidAttributeKey {
        key: key.to_string(),
        allowed: allowed_keys(),
    })
}

fn allowed_keys() -> String {
    ATTRIBUTE_KEYS
        .iter()
        .chain(TYPE_KEYS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reject strftime strings chrono cannot format with.
///
/// Chrono's `DelayedFormat` only reports a bad specifier when the value is
/// displayed, as a panic in `to_string`; parsing the items up front turns
/// the authoring defect into a typed error instead.
fn validate_date_format(format: &str) -> Result<(), FormError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(FormError::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}

/// Produce the display value of a field from its raw value and resolved type.
///
/// Date-category values render through the resolved format string; string
/// values are HTML-escaped; everything else passes through unchanged.
pub fn format_value(
    value: &PropValue,
    input: InputType,
    format: Option<&str>,
) -> Result<PropValue, FormError> {
    Ok(match base_type_for(input) {
        BaseType::Date => match value {
            PropValue::Date(date) => {
                let format = format.unwrap_or(DEFAULT_DATE_FORMAT);
                validate_date_format(format)?;
                PropValue::Text(date.format(format).to_string())
            }
            other => other.clone(),
        },
        BaseType::String => match value {
            PropValue::Text(text) => PropValue::Text(escape_html(text)),
            other => other.clone(),
        },
        _ => value.clone(),
    })
}

/// Neutralize markup-significant characters in a text value.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
