//! Condition gating — pure logic, no expression engine.
//!
//! Condition strings are evaluated by an external engine plugged in through
//! [`ConditionEvaluator`]. This module only decides which rules reach that
//! engine and keeps the survivors in resolution order.

use serde_json::Value;

use super::rules::ValidateRule;
use super::source::ResolvedRule;
use crate::error::CoreError;

/// Variables visible to a condition expression.
///
/// `dto` is the object being validated. `field` and `it` (the property name
/// and value) are only set for field-level rules.
#[derive(Debug, Clone, Copy)]
pub struct ConditionScope<'a> {
    pub dto: &'a Value,
    pub field: Option<&'a str>,
    pub it: Option<&'a Value>,
}

impl<'a> ConditionScope<'a> {
    pub fn for_rule(dto: &'a Value, field: Option<&'a str>) -> Self {
        let it = field.and_then(|f| dto.get(f));
        Self { dto, field, it }
    }
}

/// External boolean expression engine.
pub trait ConditionEvaluator {
    fn evaluate(&self, condition: &str, scope: &ConditionScope<'_>) -> Result<bool, CoreError>;
}

/// Whether `rule` applies in `scope`. An empty condition always applies.
pub fn rule_applies<E>(
    rule: &dyn ValidateRule,
    scope: &ConditionScope<'_>,
    evaluator: &E,
) -> Result<bool, CoreError>
where
    E: ConditionEvaluator + ?Sized,
{
    let condition = rule.condition().trim();
    if condition.is_empty() {
        return Ok(true);
    }
    evaluator.evaluate(condition, scope)
}

/// Keep the rules whose condition holds for `dto`, in their original order.
pub fn applicable_rules<E>(
    rules: &[ResolvedRule],
    dto: &Value,
    evaluator: &E,
) -> Result<Vec<ResolvedRule>, CoreError>
where
    E: ConditionEvaluator + ?Sized,
{
    let mut applicable = Vec::with_capacity(rules.len());
    for resolved in rules {
        let scope = ConditionScope::for_rule(dto, resolved.field.as_deref());
        if rule_applies(resolved.rule.as_ref(), &scope, evaluator)? {
            applicable.push(resolved.clone());
        }
    }
    Ok(applicable)
}
