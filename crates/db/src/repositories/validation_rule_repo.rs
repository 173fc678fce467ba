//! Repository for stored validation rules.

use rulebook_core::types::DbId;
use rulebook_core::validation::rules::ValidationRule;
use sqlx::{PgConnection, PgPool};

use crate::models::validation::ValidationRuleRow;

/// Column list for `validate_rules` queries.
const COLUMNS: &str = "id, \"type\", field, sort_order, validator, condition, error_code, message";

/// Provides CRUD operations for validation rules.
pub struct ValidationRuleRepo;

impl ValidationRuleRepo {
    /// All rules for a type, type-level and field-level, ordered by
    /// `sort_order` then `id`.
    pub async fn list_by_type(
        pool: &PgPool,
        type_name: &str,
    ) -> Result<Vec<ValidationRuleRow>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM validate_rules \
             WHERE \"type\" = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, ValidationRuleRow>(&sql)
            .bind(type_name)
            .fetch_all(pool)
            .await
    }

    /// Find a rule by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ValidationRuleRow>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM validate_rules WHERE id = $1");
        sqlx::query_as::<_, ValidationRuleRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a rule, letting the database assign its ID. Any ID already on
    /// `rule` is ignored.
    pub async fn insert(
        conn: &mut PgConnection,
        rule: &ValidationRule,
    ) -> Result<ValidationRuleRow, sqlx::Error> {
        let sql = format!(
            "INSERT INTO validate_rules \
                (\"type\", field, sort_order, validator, condition, error_code, message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ValidationRuleRow>(&sql)
            .bind(&rule.type_name)
            .bind(rule.scope_field())
            .bind(rule.sort_order)
            .bind(&rule.base.validator)
            .bind(&rule.base.condition)
            .bind(&rule.base.error_code)
            .bind(&rule.base.message)
            .fetch_one(conn)
            .await
    }

    /// Replace every column of the rule with `rule.id`.
    ///
    /// Returns `None` if no row with that ID exists.
    pub async fn replace(
        conn: &mut PgConnection,
        rule: &ValidationRule,
    ) -> Result<Option<ValidationRuleRow>, sqlx::Error> {
        let sql = format!(
            "UPDATE validate_rules SET \
                \"type\" = $2, \
                field = $3, \
                sort_order = $4, \
                validator = $5, \
                condition = $6, \
                error_code = $7, \
                message = $8 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ValidationRuleRow>(&sql)
            .bind(rule.id)
            .bind(&rule.type_name)
            .bind(rule.scope_field())
            .bind(rule.sort_order)
            .bind(&rule.base.validator)
            .bind(&rule.base.condition)
            .bind(&rule.base.error_code)
            .bind(&rule.base.message)
            .fetch_optional(conn)
            .await
    }

    /// Delete rules by ID. Returns the number of rows removed.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM validate_rules WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
