//! Type and field keys that rules are stored and looked up by.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Short name of `T` as used for the `type` column of stored rules.
///
/// Module path and generic arguments are dropped, so `shop::Order` and
/// `shop::Page<shop::Order>` resolve to `"Order"` and `"Page"`.
pub fn type_key<T: ?Sized>() -> &'static str {
    short_type_name(std::any::type_name::<T>())
}

fn short_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

/// Identifies the scope of a rule set: a whole type, or one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub field: Option<String>,
}

impl RuleKey {
    pub fn for_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field: None,
        }
    }

    pub fn for_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field: Some(field.into()),
        }
    }

    pub fn is_type_level(&self) -> bool {
        self.field.is_none()
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}.{}", self.type_name, field),
            None => f.write_str(&self.type_name),
        }
    }
}
