//! Models for stored validation rules.

use rulebook_core::types::DbId;
use rulebook_core::validation::rules::{RuleBase, ValidationRule};
use sqlx::FromRow;

/// A row from the `validate_rules` table.
#[derive(Debug, Clone, FromRow)]
pub struct ValidationRuleRow {
    pub id: DbId,
    #[sqlx(rename = "type")]
    pub type_name: String,
    /// `NULL` or blank for type-level rules.
    pub field: Option<String>,
    pub sort_order: i32,
    pub validator: String,
    pub condition: String,
    pub error_code: String,
    pub message: String,
}

impl From<ValidationRuleRow> for ValidationRule {
    fn from(row: ValidationRuleRow) -> Self {
        ValidationRule {
            id: row.id,
            type_name: row.type_name,
            field: row.field,
            sort_order: row.sort_order,
            base: RuleBase {
                validator: row.validator,
                condition: row.condition,
                error_code: row.error_code,
                message: row.message,
            },
        }
        .normalize_scope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_converts_to_core_rule() {
        let row = ValidationRuleRow {
            id: 3,
            type_name: "Order".into(),
            field: Some("Total".into()),
            sort_order: 5,
            validator: "GreaterThan(0)".into(),
            condition: "dto.IsPaid".into(),
            error_code: "TotalRequired".into(),
            message: "{PropertyName} must be positive".into(),
        };
        let rule = ValidationRule::from(row);
        assert_eq!(rule.id, 3);
        assert_eq!(rule.field.as_deref(), Some("Total"));
        assert_eq!(rule.base.condition, "dto.IsPaid");
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn blank_row_field_converts_to_type_level() {
        let row = ValidationRuleRow {
            id: 4,
            type_name: "Order".into(),
            field: Some(String::new()),
            sort_order: 0,
            validator: "NotNull".into(),
            condition: String::new(),
            error_code: String::new(),
            message: String::new(),
        };
        let rule = ValidationRule::from(row);
        assert_eq!(rule.field, None);
        assert!(rule.is_type_level());
    }
}
