//! Read and write contracts between rule storage and the validation pipeline.

use std::sync::Arc;

use async_trait::async_trait;

use super::key::type_key;
use super::rules::{ValidateRule, ValidationRule};
use crate::error::CoreError;
use crate::types::DbId;

/// One rule returned by a [`ValidationSource`], with the field it applies to.
#[derive(Debug, Clone)]
pub struct ResolvedRule {
    /// `None` for type-level rules.
    pub field: Option<String>,
    pub rule: Arc<dyn ValidateRule>,
}

impl ResolvedRule {
    pub fn new(field: Option<String>, rule: Arc<dyn ValidateRule>) -> Self {
        Self { field, rule }
    }

    pub fn is_type_level(&self) -> bool {
        self.field.is_none()
    }
}

impl From<Arc<ValidationRule>> for ResolvedRule {
    fn from(rule: Arc<ValidationRule>) -> Self {
        Self {
            field: rule.scope_field().map(str::to_string),
            rule,
        }
    }
}

/// Supplies the rules for a type at validation time.
///
/// Implementations return every type-level and field-level rule for
/// `type_name` in resolution order, and an empty vector for unknown types.
/// The returned rules are a snapshot; callers never mutate them.
#[async_trait]
pub trait ValidationSource: Send + Sync {
    async fn get_validation_rules(&self, type_name: &str)
        -> Result<Vec<ResolvedRule>, CoreError>;
}

/// Rules for the Rust type `T`, looked up by its [`type_key`].
pub async fn get_rules_for<T, S>(source: &S) -> Result<Vec<ResolvedRule>, CoreError>
where
    T: ?Sized,
    S: ValidationSource + ?Sized,
{
    source.get_validation_rules(type_key::<T>()).await
}

/// Persists batches of rules.
///
/// A batch is all-or-nothing. Rules with an unassigned id are inserted and
/// given a fresh one; rules with an existing id replace the stored rule.
#[async_trait]
pub trait ValidationSourceWriter: Send + Sync {
    async fn save_validation_rules(&self, rules: Vec<ValidationRule>) -> Result<(), CoreError>;

    /// Remove rules by id. Returns how many were removed.
    async fn delete_validation_rules(&self, ids: &[DbId]) -> Result<u64, CoreError>;
}
