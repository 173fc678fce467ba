//! Compile-time rule declarations registered explicitly per type.
//!
//! Declarations are attached with a builder at startup:
//!
//! ```
//! use rulebook_core::validation::registry::RuleRegistry;
//! use rulebook_core::validation::rules::{ValidateField, ValidateRequest};
//!
//! let mut registry = RuleRegistry::new();
//! registry
//!     .register_type("Order")?
//!     .validate(ValidateRequest::new("IsAuthenticated").with_status_code(401))
//!     .field("Total", ValidateField::new("GreaterThan(0)"));
//! assert_eq!(registry.len(), 1);
//! # Ok::<(), rulebook_core::error::CoreError>(())
//! ```
//!
//! Type-level declarations resolve before field declarations; within each
//! group, declaration order is kept. A blank field name declares a
//! type-level rule.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::key::type_key;
use super::rules::{ValidateField, ValidateRequest, ValidationRule};
use super::source::{ResolvedRule, ValidationSource};
use crate::error::CoreError;

#[derive(Debug, Default)]
struct TypeDeclarations {
    type_rules: Vec<Arc<ValidateRequest>>,
    field_rules: Vec<(String, Arc<ValidateField>)>,
}

/// Declared rules keyed by type name.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    types: HashMap<String, TypeDeclarations>,
}

/// Builder returned by [`RuleRegistry::register_type`].
#[derive(Debug)]
pub struct TypeRulesBuilder<'a> {
    decls: &'a mut TypeDeclarations,
}

impl TypeRulesBuilder<'_> {
    /// Attach a type-level rule.
    pub fn validate(self, rule: ValidateRequest) -> Self {
        self.decls.type_rules.push(Arc::new(rule));
        self
    }

    /// Attach a rule to `field`. A blank `field` attaches it to the type.
    pub fn field(self, field: impl Into<String>, rule: ValidateField) -> Self {
        let field = field.into();
        if field.trim().is_empty() {
            return self.validate(ValidateRequest {
                base: rule.base,
                status_code: None,
            });
        }
        self.decls.field_rules.push((field, Arc::new(rule)));
        self
    }
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or continue) declaring rules for `type_name`.
    ///
    /// Fails on a blank type name, which could never be stored or looked up.
    pub fn register_type(
        &mut self,
        type_name: impl Into<String>,
    ) -> Result<TypeRulesBuilder<'_>, CoreError> {
        let type_name = type_name.into();
        if type_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "cannot register rules for an empty type name".into(),
            ));
        }
        Ok(self.declarations(type_name))
    }

    /// Start declaring rules for the Rust type `T`, keyed by [`type_key`].
    pub fn register<T: ?Sized>(&mut self) -> TypeRulesBuilder<'_> {
        self.declarations(type_key::<T>().to_string())
    }

    fn declarations(&mut self, type_name: String) -> TypeRulesBuilder<'_> {
        TypeRulesBuilder {
            decls: self.types.entry(type_name).or_default(),
        }
    }

    /// Number of types with at least one registration call.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Rules for `type_name` in resolution order.
    pub fn rules_for(&self, type_name: &str) -> Vec<ResolvedRule> {
        let Some(decls) = self.types.get(type_name) else {
            return Vec::new();
        };
        let type_level = decls
            .type_rules
            .iter()
            .map(|rule| ResolvedRule::new(None, rule.clone()));
        let field_level = decls
            .field_rules
            .iter()
            .map(|(field, rule)| ResolvedRule::new(Some(field.clone()), rule.clone()));
        type_level.chain(field_level).collect()
    }

    /// Convert every declaration into an unsaved storage row, numbering
    /// `sort_order` in resolution order.
    ///
    /// Status codes have no storage column and are dropped.
    pub fn export(&self) -> Vec<ValidationRule> {
        let mut type_names: Vec<&String> = self.types.keys().collect();
        type_names.sort();

        let mut rows = Vec::new();
        for type_name in type_names {
            let decls = &self.types[type_name];
            let type_level = decls
                .type_rules
                .iter()
                .map(|rule| (None, rule.base.clone()));
            let field_level = decls
                .field_rules
                .iter()
                .map(|(field, rule)| (Some(field.clone()), rule.base.clone()));

            for (sort_order, (field, base)) in type_level.chain(field_level).enumerate() {
                rows.push(ValidationRule {
                    type_name: type_name.clone(),
                    field,
                    sort_order: i32::try_from(sort_order).unwrap_or(i32::MAX),
                    base,
                    ..ValidationRule::default()
                });
            }
        }
        rows
    }
}

#[async_trait]
impl ValidationSource for RuleRegistry {
    async fn get_validation_rules(
        &self,
        type_name: &str,
    ) -> Result<Vec<ResolvedRule>, CoreError> {
        Ok(self.rules_for(type_name))
    }
}
