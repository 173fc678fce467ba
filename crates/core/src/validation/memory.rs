//! In-process rule store.
//!
//! Backs both contracts with a map guarded by a single async `RwLock`.
//! Reads share the lock; each saved batch holds the write lock for its whole
//! duration, which also serializes id allocation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::rule_set::sort_for_resolution;
use super::rules::{prepare_batch, ValidationRule};
use super::source::{ResolvedRule, ValidationSource, ValidationSourceWriter};
use crate::error::CoreError;
use crate::types::{DbId, UNASSIGNED_ID};

#[derive(Debug)]
struct Store {
    rules: BTreeMap<DbId, Arc<ValidationRule>>,
    /// Highest id ever handed out. Deleted ids are not reused.
    last_id: DbId,
}

/// A [`ValidationSource`] and [`ValidationSourceWriter`] held in memory.
#[derive(Debug)]
pub struct InMemoryValidationSource {
    store: RwLock<Store>,
}

impl Default for InMemoryValidationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryValidationSource {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                rules: BTreeMap::new(),
                last_id: UNASSIGNED_ID,
            }),
        }
    }

    /// Number of stored rules across all types.
    pub async fn len(&self) -> usize {
        self.store.read().await.rules.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.rules.is_empty()
    }

    /// Look up a single stored rule.
    pub async fn get(&self, id: DbId) -> Option<Arc<ValidationRule>> {
        self.store.read().await.rules.get(&id).cloned()
    }
}

#[async_trait]
impl ValidationSource for InMemoryValidationSource {
    async fn get_validation_rules(
        &self,
        type_name: &str,
    ) -> Result<Vec<ResolvedRule>, CoreError> {
        let mut matching: Vec<Arc<ValidationRule>> = {
            let store = self.store.read().await;
            store
                .rules
                .values()
                .filter(|rule| rule.type_name == type_name)
                .cloned()
                .collect()
        };
        sort_for_resolution(&mut matching);
        tracing::debug!(type_name, count = matching.len(), "Loaded validation rules");
        Ok(matching.into_iter().map(ResolvedRule::from).collect())
    }
}

#[async_trait]
impl ValidationSourceWriter for InMemoryValidationSource {
    async fn save_validation_rules(&self, rules: Vec<ValidationRule>) -> Result<(), CoreError> {
        let rules = prepare_batch(rules)?;

        let mut store = self.store.write().await;

        // Check every identity before touching the map so a bad batch leaves
        // the store untouched.
        if let Some(missing) = rules
            .iter()
            .find(|r| r.is_persisted() && !store.rules.contains_key(&r.id))
        {
            return Err(CoreError::NotFound {
                entity: "validation_rule",
                id: missing.id,
            });
        }

        let mut inserted = 0usize;
        let mut replaced = 0usize;
        for mut rule in rules {
            if rule.is_persisted() {
                replaced += 1;
            } else {
                store.last_id += 1;
                rule.id = store.last_id;
                inserted += 1;
            }
            store.rules.insert(rule.id, Arc::new(rule));
        }

        tracing::info!(inserted, replaced, "Saved validation rules");
        Ok(())
    }

    async fn delete_validation_rules(&self, ids: &[DbId]) -> Result<u64, CoreError> {
        let mut store = self.store.write().await;
        let removed = ids
            .iter()
            .filter(|id| store.rules.remove(*id).is_some())
            .count() as u64;
        tracing::info!(removed, "Deleted validation rules");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::validation::rules::ValidateRule;
    use crate::validation::source::get_rules_for;

    /// Tests name validators `#<n>` after the id they expect the rule to get.
    async fn tagged_ids(source: &InMemoryValidationSource, type_name: &str) -> Vec<DbId> {
        source
            .get_validation_rules(type_name)
            .await
            .unwrap()
            .iter()
            .map(|r| r.rule.validator().trim_start_matches('#').parse().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn unknown_type_yields_no_rules() {
        let source = InMemoryValidationSource::new();
        let rules = source.get_validation_rules("Missing").await.unwrap();
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn rules_resolve_by_sort_order_across_fields() {
        let source = InMemoryValidationSource::new();
        source
            .save_validation_rules(vec![
                ValidationRule::for_field("Order", "A", "FieldA").with_sort_order(10),
                ValidationRule::for_field("Order", "B", "FieldB").with_sort_order(5),
                ValidationRule::for_type("Order", "Whole").with_sort_order(0),
                ValidationRule::for_type("Customer", "Other"),
            ])
            .await
            .unwrap();

        let rules = source.get_validation_rules("Order").await.unwrap();
        let validators: Vec<&str> = rules.iter().map(|r| r.rule.validator()).collect();
        assert_eq!(validators, vec!["Whole", "FieldB", "FieldA"]);

        assert!(rules[0].is_type_level());
        assert_eq!(rules[1].field.as_deref(), Some("B"));
        assert_eq!(rules[2].field.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn ties_on_sort_order_resolve_by_id() {
        let source = InMemoryValidationSource::new();
        source
            .save_validation_rules(vec![
                ValidationRule::for_field("Order", "Total", "#1"),
                ValidationRule::for_field("Order", "Total", "#2"),
                ValidationRule::for_type("Order", "#3"),
            ])
            .await
            .unwrap();
        assert_eq!(tagged_ids(&source, "Order").await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn batch_with_empty_type_persists_nothing() {
        let source = InMemoryValidationSource::new();
        let result = source
            .save_validation_rules(vec![
                ValidationRule::for_type("Order", "NotNull"),
                ValidationRule::for_type("", "NotNull"),
                ValidationRule::for_field("Order", "Total", "NotNull"),
            ])
            .await;
        assert_matches!(result, Err(CoreError::Validation(_)));
        assert!(source.is_empty().await);
    }

    #[tokio::test]
    async fn blank_field_is_saved_as_type_level() {
        let source = InMemoryValidationSource::new();
        let from_file: ValidationRule = serde_json::from_str(
            r#"{"type": "Order", "field": "", "validator": "NotNull"}"#,
        )
        .unwrap();
        let mut programmatic = ValidationRule::for_type("Order", "Other");
        programmatic.field = Some(String::new());
        source
            .save_validation_rules(vec![from_file, programmatic])
            .await
            .unwrap();

        assert_eq!(source.len().await, 2);
        assert_eq!(source.get(2).await.unwrap().field, None);
        let rules = source.get_validation_rules("Order").await.unwrap();
        assert!(rules.iter().all(|r| r.is_type_level()));
    }

    #[tokio::test]
    async fn saving_existing_id_replaces_rule() {
        let source = InMemoryValidationSource::new();
        source
            .save_validation_rules(vec![ValidationRule::for_field("Order", "Total", "NotNull")])
            .await
            .unwrap();

        let before = source.get(1).await.unwrap();
        let mut updated = (*before).clone();
        updated.base.validator = "GreaterThan(0)".into();
        updated.sort_order = 3;
        source.save_validation_rules(vec![updated]).await.unwrap();

        assert_eq!(source.len().await, 1);
        let after = source.get(1).await.unwrap();
        assert_eq!(after.validator(), "GreaterThan(0)");
        assert_eq!(after.sort_order, 3);
        // The earlier snapshot is untouched.
        assert_eq!(before.validator(), "NotNull");
    }

    #[tokio::test]
    async fn saving_unknown_id_rejects_batch() {
        let source = InMemoryValidationSource::new();
        let mut stray = ValidationRule::for_type("Order", "NotNull");
        stray.id = 42;
        let result = source
            .save_validation_rules(vec![ValidationRule::for_type("Order", "x"), stray])
            .await;
        assert_matches!(result, Err(CoreError::NotFound { id: 42, .. }));
        assert!(source.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_id_in_batch_is_rejected() {
        let source = InMemoryValidationSource::new();
        source
            .save_validation_rules(vec![ValidationRule::for_type("Order", "x")])
            .await
            .unwrap();
        let existing = (*source.get(1).await.unwrap()).clone();
        let result = source
            .save_validation_rules(vec![existing.clone(), existing])
            .await;
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let source = InMemoryValidationSource::new();
        source
            .save_validation_rules(vec![
                ValidationRule::for_type("Order", "#1"),
                ValidationRule::for_type("Order", "#2"),
            ])
            .await
            .unwrap();
        assert_eq!(source.delete_validation_rules(&[2, 99]).await.unwrap(), 1);

        source
            .save_validation_rules(vec![ValidationRule::for_type("Order", "#3")])
            .await
            .unwrap();
        assert_eq!(tagged_ids(&source, "Order").await, vec![1, 3]);
    }

    #[tokio::test]
    async fn concurrent_saves_allocate_unique_ids() {
        let source = Arc::new(InMemoryValidationSource::new());
        let mut handles = Vec::new();
        for task in 0..8 {
            let source = Arc::clone(&source);
            handles.push(tokio::spawn(async move {
                let batch = (0..5)
                    .map(|i| ValidationRule::for_type("Order", format!("t{task}-{i}")))
                    .collect();
                source.save_validation_rules(batch).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let store = source.store.read().await;
        assert_eq!(store.rules.len(), 40);
        assert_eq!(store.last_id, 40);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn reads_interleave_with_saves() {
        let source = Arc::new(InMemoryValidationSource::new());
        source
            .save_validation_rules(vec![
                ValidationRule::for_type("Customer", "#1"),
                ValidationRule::for_field("Customer", "Email", "#2"),
            ])
            .await
            .unwrap();

        let mut writers = Vec::new();
        for task in 0..4 {
            let source = Arc::clone(&source);
            writers.push(tokio::spawn(async move {
                for i in 0..10 {
                    let batch = vec![ValidationRule::for_field(
                        "Order",
                        "Total",
                        format!("w{task}-{i}"),
                    )];
                    source.save_validation_rules(batch).await?;
                    tokio::task::yield_now().await;
                }
                Ok::<(), CoreError>(())
            }));
        }

        let mut readers = Vec::new();
        for _ in 0..4 {
            let source = Arc::clone(&source);
            readers.push(tokio::spawn(async move {
                let mut last_order_count = 0;
                for _ in 0..20 {
                    let customer = tagged_ids(&source, "Customer").await;
                    assert_eq!(customer, vec![1, 2]);

                    let order = source.get_validation_rules("Order").await.unwrap();
                    assert!(order.len() >= last_order_count);
                    assert!(order.iter().all(|r| r.field.as_deref() == Some("Total")));
                    last_order_count = order.len();
                    tokio::task::yield_now().await;
                }
            }));
        }

        for writer in writers {
            writer.await.unwrap().unwrap();
        }
        for reader in readers {
            reader.await.unwrap();
        }

        assert_eq!(source.get_validation_rules("Order").await.unwrap().len(), 40);
        assert_eq!(tagged_ids(&source, "Customer").await, vec![1, 2]);
    }

    #[tokio::test]
    async fn lookup_by_rust_type() {
        #[allow(dead_code)]
        struct Invoice;

        let source = InMemoryValidationSource::new();
        source
            .save_validation_rules(vec![ValidationRule::for_type("Invoice", "NotNull")])
            .await
            .unwrap();
        let rules = get_rules_for::<Invoice, _>(&source).await.unwrap();
        assert_eq!(rules.len(), 1);
    }
}
