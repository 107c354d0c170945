use super::ast::{Condition, Connective, Expression};
use super::compare::{CompareError, compare};
use super::error::{QueryError, QueryResult};
use crate::parser::{AccessRecord, FieldValue};

/// Evaluate an expression tree against one record.
///
/// `and` stops at the first false operand and `or` at the first true one,
/// so errors on the skipped side are never raised.
pub fn evaluate(expr: &Expression, record: &AccessRecord) -> QueryResult<bool> {
    evaluate_with(expr, record, &mut |cond: &Condition, value: FieldValue<'_>| {
        compare(&cond.literal, cond.operator, value)
    })
}

/// Evaluate with a custom leaf comparison, called once per reached condition
pub fn evaluate_with<F>(
    expr: &Expression,
    record: &AccessRecord,
    leaf: &mut F,
) -> QueryResult<bool>
where
    F: FnMut(&Condition, FieldValue<'_>) -> Result<bool, CompareError>,
{
    match expr {
        Expression::Boolean {
            connective,
            left,
            right,
        } => {
            let left = evaluate_with(left, record, leaf)?;
            match (connective, left) {
                (Connective::And, false) => Ok(false),
                (Connective::Or, true) => Ok(true),
                _ => evaluate_with(right, record, leaf),
            }
        }
        Expression::Condition(cond) => {
            let value = record
                .lookup(&cond.field)
                .ok_or_else(|| QueryError::UnknownField(cond.field.to_lowercase()))?;
            leaf(cond, value).map_err(|e| condition_error(cond, e))
        }
    }
}

fn condition_error(cond: &Condition, error: CompareError) -> QueryError {
    match error {
        CompareError::Coercion(e) => QueryError::Coercion {
            field: cond.field.to_lowercase(),
            literal: e.literal,
            expected: e.expected,
        },
        CompareError::Pattern { pattern, source } => QueryError::InvalidPattern {
            pattern,
            reason: source.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::Operator;
    use crate::query::parse_query;
    use chrono::DateTime;

    fn record() -> AccessRecord {
        AccessRecord {
            ip: "66.249.73.135".parse().unwrap(),
            datetime: DateTime::parse_from_rfc3339("2015-05-17T10:05:03+00:00").unwrap(),
            method: "GET".to_string(),
            url: "/admin/index.php".to_string(),
            version: 1.1,
            status: 403,
            size: 512,
            referrer: "-".to_string(),
            user_agent: "Mozilla/5.0 (iPhone) Version/6.0 Mobile Safari".to_string(),
        }
    }

    fn eval(query: &str) -> QueryResult<bool> {
        evaluate(&parse_query(query).unwrap(), &record())
    }

    #[test]
    fn test_grouped_scenario() {
        assert_eq!(
            eval("(method = post or url ~ *admin*) and status >= 400"),
            Ok(true)
        );
    }

    #[test]
    fn test_grouping_changes_result() {
        // (false and true) or true
        assert_eq!(eval("method = post and status = 403 or size = 512"), Ok(true));
        // false and (true or true)
        assert_eq!(eval("method = post and (status = 403 or size = 512)"), Ok(false));
    }

    #[test]
    fn test_field_names_are_case_insensitive() {
        assert_eq!(eval("METHOD = get"), Ok(true));
        assert_eq!(eval("User_Agent ~ *Mobile*"), Ok(true));
    }

    #[test]
    fn test_escaped_space_in_glob() {
        assert_eq!(eval(r"user_agent ~ *Version/6.0\ Mobile*"), Ok(true));
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            eval("host = example.com"),
            Err(QueryError::UnknownField("host".to_string()))
        );
    }

    #[test]
    fn test_and_short_circuit_suppresses_errors() {
        assert_eq!(eval("method = post and bogus = 1"), Ok(false));
        assert_eq!(eval("method = post and status = abc"), Ok(false));
    }

    #[test]
    fn test_or_short_circuit_suppresses_errors() {
        assert_eq!(eval("method = get or bogus = 1"), Ok(true));
        assert_eq!(eval("method = get | size > lots"), Ok(true));
    }

    #[test]
    fn test_error_when_right_side_is_reached() {
        assert!(eval("method = get and bogus = 1").is_err());
    }

    #[test]
    fn test_coercion_error_names_field() {
        assert_eq!(
            eval("Status > abc"),
            Err(QueryError::Coercion {
                field: "status".to_string(),
                literal: "abc".to_string(),
                expected: crate::parser::FieldKind::Integer,
            })
        );
    }

    #[test]
    fn test_less_or_equal_node() {
        let expr = Expression::condition("status", Operator::Le, "403");
        assert_eq!(evaluate(&expr, &record()), Ok(true));
    }

    #[test]
    fn test_leaf_called_only_for_reached_conditions() {
        let expr = parse_query("method = post and status = 403 and size = 1").unwrap();
        let mut calls = 0;
        let result = evaluate_with(&expr, &record(), &mut |cond: &Condition, value: FieldValue<'_>| {
            calls += 1;
            compare(&cond.literal, cond.operator, value)
        });
        assert_eq!(result, Ok(false));
        assert_eq!(calls, 1);
    }
}
