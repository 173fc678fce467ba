//! Ordered rule collections scoped to one `(type, field)` pair.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::key::RuleKey;
use super::rules::ValidationRule;
use crate::error::CoreError;

/// Rules sharing a [`RuleKey`], kept in resolution order (`sort_order`, `id`).
#[derive(Debug, Clone)]
pub struct RuleSet {
    key: RuleKey,
    rules: Vec<Arc<ValidationRule>>,
}

impl RuleSet {
    pub fn new(key: RuleKey) -> Self {
        Self {
            key,
            rules: Vec::new(),
        }
    }

    pub fn key(&self) -> &RuleKey {
        &self.key
    }

    /// Add a rule at its resolution position.
    ///
    /// Fails if the rule belongs to a different type or field.
    pub fn insert(&mut self, rule: Arc<ValidationRule>) -> Result<(), CoreError> {
        if rule.type_name != self.key.type_name
            || rule.scope_field() != self.key.field.as_deref()
        {
            return Err(CoreError::Validation(format!(
                "rule #{} does not belong to rule set {}",
                rule.id, self.key
            )));
        }
        self.place(rule);
        Ok(())
    }

    fn place(&mut self, rule: Arc<ValidationRule>) {
        let pos = self
            .rules
            .partition_point(|existing| existing.cmp_resolution(&rule).is_lt());
        self.rules.insert(pos, rule);
    }

    /// The rule that fires first.
    pub fn first(&self) -> Option<&Arc<ValidationRule>> {
        self.rules.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ValidationRule>> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Group rules into per-key rule sets. Type-level sets sort ahead of the
/// field sets of the same type.
pub fn group_by_key<I>(rules: I) -> BTreeMap<RuleKey, RuleSet>
where
    I: IntoIterator<Item = Arc<ValidationRule>>,
{
    let mut sets: BTreeMap<RuleKey, RuleSet> = BTreeMap::new();
    for rule in rules {
        let key = RuleKey {
            type_name: rule.type_name.clone(),
            field: rule.scope_field().map(str::to_string),
        };
        sets.entry(key.clone())
            .or_insert_with(|| RuleSet::new(key))
            .place(rule);
    }
    sets
}

/// Sort rules of one type into resolution order across all of its fields.
pub fn sort_for_resolution(rules: &mut [Arc<ValidationRule>]) {
    rules.sort_by(|a, b| a.cmp_resolution(b));
}
