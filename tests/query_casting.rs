//! Query Casting Tests
//!
//! Tests for query operand casting on date fields:
//! - Ordering operators cast like plain values
//! - Membership operators cast element-wise
//! - Existence checks bypass date casting
//! - Unsupported operators are usage errors naming the operator

use aerodate::schema::{
    cast_date, Candidate, DateField, FieldError, FieldErrorCode, QueryOperand, SchemaField,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn field() -> DateField {
    DateField::new("starts_at")
}

fn plain(value: &str) -> QueryOperand<chrono::DateTime<chrono::Utc>> {
    QueryOperand::Value(cast_date("starts_at", &Candidate::from(value)).unwrap())
}

// =============================================================================
// Operator Tests
// =============================================================================

/// Ordering operators and their aliases cast like a plain value.
#[test]
fn test_ordering_operators_cast_value() {
    let field = field();
    for op in ["$gt", "$gte", "$lt", "$lte", "greater-than", "less-or-equal"] {
        let operand = field
            .cast_for_query(Some(op), &Candidate::from("2020-01-01"))
            .unwrap();
        assert_eq!(operand, plain("2020-01-01"), "operator {}", op);
    }
}

/// No operator means plain equality casting.
#[test]
fn test_single_argument_form() {
    let field = field();
    assert_eq!(
        field.cast_for_query(None, &Candidate::from("2020-01-01")).unwrap(),
        plain("2020-01-01")
    );
    assert_eq!(
        field.cast_for_query(None, &Candidate::Null).unwrap(),
        QueryOperand::Value(None)
    );
}

/// $in casts each element; a lone value is wrapped.
#[test]
fn test_membership_operators() {
    let field = field();
    let operand = field
        .cast_for_query(Some("$in"), &Candidate::from(json!(["2020-01-01", 0, null])))
        .unwrap();
    match operand {
        QueryOperand::List(items) => {
            assert_eq!(items.len(), 3);
            assert!(items[0].is_some());
            assert!(items[1].is_some());
            assert!(items[2].is_none());
        }
        other => panic!("expected list operand, got {:?}", other),
    }

    let wrapped = field
        .cast_for_query(Some("$nin"), &Candidate::from(0))
        .unwrap();
    assert!(matches!(wrapped, QueryOperand::List(ref items) if items.len() == 1));
}

/// $exists bypasses date casting.
#[test]
fn test_exists_bypasses_cast() {
    let field = field();
    assert_eq!(
        field.cast_for_query(Some("$exists"), &Candidate::from(true)).unwrap(),
        QueryOperand::Flag(true)
    );
    assert_eq!(
        field.cast_for_query(Some("$exists"), &Candidate::from("false")).unwrap(),
        QueryOperand::Flag(false)
    );
}

/// Ordering operands still reject what a value cast rejects.
#[test]
fn test_ordering_operand_cast_failure() {
    let err = field()
        .cast_for_query(Some("$gt"), &Candidate::from(true))
        .unwrap_err();
    assert!(err.is_cast());
}

/// Unsupported operators fail with a usage error naming the operator.
#[test]
fn test_unsupported_operator() {
    let field = field();
    for op in ["$regex", "unsupported-operator", "gt"] {
        let err = field
            .cast_for_query(Some(op), &Candidate::from("2020-01-01"))
            .unwrap_err();
        assert_eq!(err, FieldError::usage(op, "date"));
        assert_eq!(err.code(), FieldErrorCode::AeroFieldUnsupportedOperator);
        assert_eq!(err.to_string(), format!("Can't use {} with date.", op));
        assert!(err.is_fatal());
    }
}

/// Generic dispatch renders operands as JSON.
#[test]
fn test_schema_field_query_json() {
    let field = SchemaField::from_options("date", "starts_at", &json!({})).unwrap();
    let operand = field
        .cast_for_query_to_json(Some("$in"), &Candidate::from(json!([0])))
        .unwrap();
    assert_eq!(operand, json!({"shape": "list", "operand": ["1970-01-01T00:00:00.000Z"]}));
}
