//! Validation rule types.
//!
//! Three shapes share the same core of validator / condition / error metadata:
//!
//! - [`ValidateRequest`] — a type-level declaration (whole object).
//! - [`ValidateField`] — a field-level declaration.
//! - [`ValidationRule`] — a persisted rule with storage identity and ordering.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::combinator::{all_of, any_of};
use crate::error::CoreError;
use crate::types::{DbId, UNASSIGNED_ID};

/// Read-only view shared by every rule shape.
///
/// Rules handed out by a [`ValidationSource`](super::source::ValidationSource)
/// are published behind `Arc<dyn ValidateRule>` and never mutated afterwards.
pub trait ValidateRule: fmt::Debug + Send + Sync {
    /// Expression naming a registered validator. Empty when the rule is a
    /// bare condition.
    fn validator(&self) -> &str;

    /// Boolean expression evaluated against `Request`, `dto`, `field` and `it`.
    /// Empty means "always applies".
    fn condition(&self) -> &str;

    /// Error code to report. Empty defers to the validator's own code.
    fn error_code(&self) -> &str;

    /// Message template; may contain `{PropertyName}` and `{PropertyValue}`.
    fn message(&self) -> &str;

    /// HTTP-style status override. Only type-level declarations carry one.
    fn status_code(&self) -> Option<u16> {
        None
    }
}

// ── Rule core ────────────────────────────────────────────────────────

/// Validator, condition and error metadata common to all rule shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleBase {
    pub validator: String,
    pub condition: String,
    pub error_code: String,
    pub message: String,
}

impl RuleBase {
    pub fn new(validator: impl Into<String>) -> Self {
        Self {
            validator: validator.into(),
            ..Self::default()
        }
    }
}

impl ValidateRule for RuleBase {
    fn validator(&self) -> &str {
        &self.validator
    }

    fn condition(&self) -> &str {
        &self.condition
    }

    fn error_code(&self) -> &str {
        &self.error_code
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Builder-style setters and write-only condition projections, shared by
/// the declaration types through their embedded [`RuleBase`].
macro_rules! rule_authoring {
    ($ty:ident) => {
        impl $ty {
            pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
                self.base.condition = condition.into();
                self
            }

            pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
                self.base.error_code = error_code.into();
                self
            }

            pub fn with_message(mut self, message: impl Into<String>) -> Self {
                self.base.message = message.into();
                self
            }

            /// Overwrite `condition` with the AND-combination of `conditions`.
            pub fn set_all_conditions(&mut self, conditions: &[String]) {
                self.base.condition = all_of(conditions);
            }

            /// Overwrite `condition` with the OR-combination of `conditions`.
            pub fn set_any_conditions(&mut self, conditions: &[String]) {
                self.base.condition = any_of(conditions);
            }

            /// Always fails: `all_conditions` is write-only.
            pub fn all_conditions(&self) -> Result<Vec<String>, CoreError> {
                Err(CoreError::UnsupportedRead("all_conditions"))
            }

            /// Always fails: `any_conditions` is write-only.
            pub fn any_conditions(&self) -> Result<Vec<String>, CoreError> {
                Err(CoreError::UnsupportedRead("any_conditions"))
            }
        }
    };
}

// ── Type-level declaration ───────────────────────────────────────────

/// A rule attached to a whole type, checked before its field rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateRequest {
    #[serde(flatten)]
    pub base: RuleBase,
    /// Status to return when the rule fails. `None` keeps the pipeline default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ValidateRequest {
    pub fn new(validator: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(validator),
            status_code: None,
        }
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Independent checks that must all hold; collapsed into `condition`.
    pub fn set_conditions(&mut self, conditions: &[String]) {
        self.set_all_conditions(conditions);
    }

    /// The collapsed `condition` as a one-element list.
    pub fn conditions(&self) -> Vec<String> {
        vec![self.base.condition.clone()]
    }

    /// Builder form of [`set_conditions`](Self::set_conditions).
    pub fn with_conditions<S: AsRef<str>>(mut self, conditions: &[S]) -> Self {
        let owned: Vec<String> = conditions.iter().map(|c| c.as_ref().to_string()).collect();
        self.set_conditions(&owned);
        self
    }
}

rule_authoring!(ValidateRequest);

impl ValidateRule for ValidateRequest {
    fn validator(&self) -> &str {
        &self.base.validator
    }

    fn condition(&self) -> &str {
        &self.base.condition
    }

    fn error_code(&self) -> &str {
        &self.base.error_code
    }

    fn message(&self) -> &str {
        &self.base.message
    }

    fn status_code(&self) -> Option<u16> {
        self.status_code
    }
}

// ── Field-level declaration ──────────────────────────────────────────

/// A rule attached to a single field of a type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateField {
    #[serde(flatten)]
    pub base: RuleBase,
}

impl ValidateField {
    pub fn new(validator: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(validator),
        }
    }
}

rule_authoring!(ValidateField);

impl ValidateRule for ValidateField {
    fn validator(&self) -> &str {
        &self.base.validator
    }

    fn condition(&self) -> &str {
        &self.base.condition
    }

    fn error_code(&self) -> &str {
        &self.base.error_code
    }

    fn message(&self) -> &str {
        &self.base.message
    }
}

// ── Persisted rule ───────────────────────────────────────────────────

/// A rule stored outside the binary, keyed by type name and optional field.
///
/// Rules for the same type resolve in ascending `sort_order`, then `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Assigned by the store on insert. [`UNASSIGNED_ID`] until then.
    #[serde(default)]
    pub id: DbId,
    /// Name of the validated type. Never empty once persisted.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Property name for field rules; `None` for type-level rules. A blank
    /// field in a rules file or row reads as `None`.
    #[serde(default, deserialize_with = "blank_field_as_none")]
    pub field: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(flatten)]
    pub base: RuleBase,
}

impl ValidationRule {
    /// A type-level rule for `type_name` running `validator`.
    pub fn for_type(type_name: impl Into<String>, validator: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            base: RuleBase::new(validator),
            ..Self::default()
        }
    }

    /// A field-level rule for `type_name.field` running `validator`.
    pub fn for_field(
        type_name: impl Into<String>,
        field: impl Into<String>,
        validator: impl Into<String>,
    ) -> Self {
        Self {
            field: normalize_field(Some(field.into())),
            ..Self::for_type(type_name, validator)
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.base.condition = condition.into();
        self
    }

    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.base.error_code = error_code.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.base.message = message.into();
        self
    }

    pub fn is_type_level(&self) -> bool {
        self.scope_field().is_none()
    }

    /// The field this rule is scoped to, treating a blank field as type-level.
    pub fn scope_field(&self) -> Option<&str> {
        self.field.as_deref().filter(|f| !f.trim().is_empty())
    }

    /// Rewrite a blank `field` to `None`.
    pub fn normalize_scope(mut self) -> Self {
        self.field = normalize_field(self.field.take());
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    /// Check the storage invariants: non-empty type and a non-negative id.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.type_name.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "rule #{} has an empty type",
                self.id
            )));
        }
        if self.id < UNASSIGNED_ID {
            return Err(CoreError::Validation(format!(
                "rule on {} has a negative id {}",
                self.type_name, self.id
            )));
        }
        Ok(())
    }

    /// Compare by resolution order: `sort_order`, then `id`.
    pub fn cmp_resolution(&self, other: &Self) -> Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then(self.id.cmp(&other.id))
    }
}

impl ValidateRule for ValidationRule {
    fn validator(&self) -> &str {
        &self.base.validator
    }

    fn condition(&self) -> &str {
        &self.base.condition
    }

    fn error_code(&self) -> &str {
        &self.base.error_code
    }

    fn message(&self) -> &str {
        &self.base.message
    }
}

fn normalize_field(field: Option<String>) -> Option<String> {
    field.filter(|f| !f.trim().is_empty())
}

fn blank_field_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(normalize_field)
}

/// Normalize scopes and validate a batch before it is written.
///
/// Blank fields become type-level; see [`validate_batch`] for the checks.
pub fn prepare_batch(rules: Vec<ValidationRule>) -> Result<Vec<ValidationRule>, CoreError> {
    let rules: Vec<ValidationRule> = rules
        .into_iter()
        .map(ValidationRule::normalize_scope)
        .collect();
    validate_batch(&rules)?;
    Ok(rules)
}

/// Validate every rule in a batch, stopping at the first violation.
///
/// Besides the per-rule checks, a persisted id may appear only once.
pub fn validate_batch(rules: &[ValidationRule]) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for rule in rules {
        rule.validate()?;
        if rule.is_persisted() && !seen.insert(rule.id) {
            return Err(CoreError::Validation(format!(
                "rule #{} appears more than once in the batch",
                rule.id
            )));
        }
    }
    Ok(())
}
