//! Boolean condition combination.
//!
//! Conditions are opaque expression strings. Combining never parses them; it
//! only wraps each one in parentheses so the result can be nested inside a
//! further combination without operator-precedence surprises.

use serde::{Deserialize, Serialize};

/// Logical operator used to join conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    /// The operator token as written in condition expressions.
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "&&",
            Combinator::Or => "||",
        }
    }
}

/// Combine `conditions` into a single parenthesized expression.
///
/// Empty and absent entries are skipped. With nothing left the result is
/// `"()"`; one entry yields `"(c)"`; more entries yield
/// `"(c1) && (c2) && (c3)"` (or `||`).
pub fn combine<'a, I>(op: Combinator, conditions: I) -> String
where
    I: IntoIterator,
    I::Item: Into<Option<&'a str>>,
{
    let joiner = format!(") {} (", op.as_str());
    let mut out = String::from("(");
    let mut first = true;

    for condition in conditions {
        let condition: Option<&str> = condition.into();
        let Some(condition) = condition.filter(|c| !c.is_empty()) else {
            continue;
        };
        if !first {
            out.push_str(&joiner);
        }
        out.push_str(condition);
        first = false;
    }

    out.push(')');
    out
}

/// Shorthand for [`combine`] with [`Combinator::And`] over owned strings.
pub fn all_of(conditions: &[String]) -> String {
    combine(Combinator::And, conditions.iter().map(String::as_str))
}

/// Shorthand for [`combine`] with [`Combinator::Or`] over owned strings.
pub fn any_of(conditions: &[String]) -> String {
    combine(Combinator::Or, conditions.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_condition_is_wrapped_once() {
        assert_eq!(combine(Combinator::And, ["x > 1"]), "(x > 1)");
        assert_eq!(combine(Combinator::Or, ["x > 1"]), "(x > 1)");
    }

    #[test]
    fn and_joins_with_double_ampersand() {
        assert_eq!(
            combine(Combinator::And, ["x > 1", "x < 10"]),
            "(x > 1) && (x < 10)"
        );
    }

    #[test]
    fn or_joins_with_double_pipe() {
        assert_eq!(combine(Combinator::Or, ["a", "b", "c"]), "(a) || (b) || (c)");
    }

    #[test]
    fn nothing_to_combine_yields_empty_parens() {
        let none: [&str; 0] = [];
        assert_eq!(combine(Combinator::And, none), "()");
        assert_eq!(combine(Combinator::Or, [Some(""), None]), "()");
    }

    #[test]
    fn empty_and_absent_entries_are_skipped() {
        assert_eq!(
            combine(Combinator::And, [None, Some("a"), Some(""), Some("b")]),
            "(a) && (b)"
        );
    }

    #[test]
    fn order_is_preserved() {
        let ab = combine(Combinator::And, ["a", "b"]);
        let ba = combine(Combinator::And, ["b", "a"]);
        assert_eq!(ab, "(a) && (b)");
        assert_ne!(ab, ba);
    }

    #[test]
    fn combined_output_nests_cleanly() {
        let left = combine(Combinator::Or, ["a", "b"]);
        let nested = combine(Combinator::And, [left.as_str(), "c"]);
        assert_eq!(nested, "((a) || (b)) && (c)");
    }

    #[test]
    fn owned_string_helpers() {
        let conds = vec!["x".to_string(), String::new(), "y".to_string()];
        assert_eq!(all_of(&conds), "(x) && (y)");
        assert_eq!(any_of(&conds), "(x) || (y)");
    }
}
