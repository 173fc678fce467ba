//! PostgreSQL-backed rule source and writer.

use std::sync::Arc;

use async_trait::async_trait;
use rulebook_core::error::CoreError;
use rulebook_core::types::DbId;
use rulebook_core::validation::rules::{prepare_batch, ValidationRule};
use rulebook_core::validation::source::{ResolvedRule, ValidationSource, ValidationSourceWriter};

use crate::repositories::ValidationRuleRepo;
use crate::DbPool;

/// Serves rules from the `validate_rules` table.
///
/// Reads are plain `SELECT`s. Each saved batch runs in one transaction, so
/// a failure anywhere in the batch rolls back every row; ids come from the
/// table's `BIGSERIAL` sequence and are never reused.
#[derive(Debug, Clone)]
pub struct PgValidationSource {
    pool: DbPool,
}

impl PgValidationSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Validation rule store failed");
    CoreError::Storage(err.to_string())
}

#[async_trait]
impl ValidationSource for PgValidationSource {
    async fn get_validation_rules(
        &self,
        type_name: &str,
    ) -> Result<Vec<ResolvedRule>, CoreError> {
        let rows = ValidationRuleRepo::list_by_type(&self.pool, type_name)
            .await
            .map_err(storage_error)?;
        tracing::debug!(type_name, count = rows.len(), "Loaded validation rules");
        Ok(rows
            .into_iter()
            .map(|row| ResolvedRule::from(Arc::new(ValidationRule::from(row))))
            .collect())
    }
}

#[async_trait]
impl ValidationSourceWriter for PgValidationSource {
    async fn save_validation_rules(&self, rules: Vec<ValidationRule>) -> Result<(), CoreError> {
        let rules = prepare_batch(rules)?;

        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        let mut inserted = 0usize;
        let mut replaced = 0usize;

        for rule in &rules {
            if rule.is_persisted() {
                let row = ValidationRuleRepo::replace(&mut *tx, rule)
                    .await
                    .map_err(storage_error)?;
                if row.is_none() {
                    // Dropping `tx` rolls back the rows written so far.
                    return Err(CoreError::NotFound {
                        entity: "validation_rule",
                        id: rule.id,
                    });
                }
                replaced += 1;
            } else {
                ValidationRuleRepo::insert(&mut *tx, rule)
                    .await
                    .map_err(storage_error)?;
                inserted += 1;
            }
        }

        tx.commit().await.map_err(storage_error)?;
        tracing::info!(inserted, replaced, "Saved validation rules");
        Ok(())
    }

    async fn delete_validation_rules(&self, ids: &[DbId]) -> Result<u64, CoreError> {
        let removed = ValidationRuleRepo::delete_many(&self.pool, ids)
            .await
            .map_err(storage_error)?;
        tracing::info!(removed, "Deleted validation rules");
        Ok(removed)
    }
}
