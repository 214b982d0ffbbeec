//! Validation descriptors attached to model properties
//!
//! Each property carries an ordered list of descriptors. The first entry is
//! always the implicit base-type descriptor; the rest are constraint tuples
//! translated by the renderer into node attributes or type markers.

use serde::{Deserialize, Serialize};

use super::field_type::BaseType;
use crate::shared::field_definition::PropValue;

/// One entry of a property's validation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValidationFragment {
    /// Implicit base-type descriptor, always first
    Base(BaseType),
    /// Constraint descriptor: recognized key plus its configured value
    Constraint { key: String, value: PropValue },
}

impl ValidationFragment {
    pub fn constraint(key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Self::Constraint {
            key: key.into(),
            value: value.into(),
        }
    }
}
