//! Query operand casting.
//!
//! When a field appears on the right-hand side of a query operator, the
//! operand is cast through a conditional handler looked up by operator.
//! Every field kind starts from `base_handlers` (equality, membership,
//! existence, type) and layers its own handlers on top.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::candidate::Candidate;
use super::errors::{FieldError, FieldResult};
use super::field_type::SchemaType;

/// Query operators a conditional handler can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    All,
    Exists,
    Type,
}

impl QueryOperator {
    /// Resolves an operator token. Accepts `$`-prefixed tokens and
    /// spelled-out names.
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "$eq" | "equal" => QueryOperator::Eq,
            "$ne" | "not-equal" => QueryOperator::Ne,
            "$gt" | "greater-than" => QueryOperator::Gt,
            "$gte" | "greater-or-equal" => QueryOperator::Gte,
            "$lt" | "less-than" => QueryOperator::Lt,
            "$lte" | "less-or-equal" => QueryOperator::Lte,
            "$in" | "in" => QueryOperator::In,
            "$nin" | "not-in" => QueryOperator::Nin,
            "$all" | "all" => QueryOperator::All,
            "$exists" | "exists" => QueryOperator::Exists,
            "$type" | "type" => QueryOperator::Type,
            _ => return None,
        };
        Some(op)
    }

    /// Canonical token
    pub fn token(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "$eq",
            QueryOperator::Ne => "$ne",
            QueryOperator::Gt => "$gt",
            QueryOperator::Gte => "$gte",
            QueryOperator::Lt => "$lt",
            QueryOperator::Lte => "$lte",
            QueryOperator::In => "$in",
            QueryOperator::Nin => "$nin",
            QueryOperator::All => "$all",
            QueryOperator::Exists => "$exists",
            QueryOperator::Type => "$type",
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Cast query operand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "operand", rename_all = "lowercase")]
pub enum QueryOperand<T> {
    /// Single cast value (`None` for an explicit null)
    Value(Option<T>),
    /// Element-wise cast list for membership operators
    List(Vec<Option<T>>),
    /// Boolean flag for existence checks
    Flag(bool),
    /// Passed through uncast
    Raw(Value),
}

impl<T> QueryOperand<T> {
    /// Converts every cast value, keeping the operand's shape.
    pub fn map<U>(self, f: impl Fn(T) -> U) -> QueryOperand<U> {
        match self {
            QueryOperand::Value(value) => QueryOperand::Value(value.map(&f)),
            QueryOperand::List(items) => QueryOperand::List(items.into_iter().map(|item| item.map(&f)).collect()),
            QueryOperand::Flag(flag) => QueryOperand::Flag(flag),
            QueryOperand::Raw(raw) => QueryOperand::Raw(raw),
        }
    }
}

/// Casts an operand for one operator.
pub type ConditionalHandler<F> = fn(&F, &Candidate) -> FieldResult<QueryOperand<<F as SchemaType>::Value>>;

/// Handler table shared by every field kind.
pub fn base_handlers<F: SchemaType>() -> BTreeMap<QueryOperator, ConditionalHandler<F>> {
    let mut handlers: BTreeMap<QueryOperator, ConditionalHandler<F>> = BTreeMap::new();
    handlers.insert(QueryOperator::Eq, cast_single::<F>);
    handlers.insert(QueryOperator::Ne, cast_single::<F>);
    handlers.insert(QueryOperator::In, cast_list::<F>);
    handlers.insert(QueryOperator::Nin, cast_list::<F>);
    handlers.insert(QueryOperator::All, cast_list::<F>);
    handlers.insert(QueryOperator::Exists, cast_exists::<F>);
    handlers.insert(QueryOperator::Type, cast_type::<F>);
    handlers
}

/// Casts the operand through the field's own `cast`.
pub fn cast_single<F: SchemaType>(field: &F, value: &Candidate) -> FieldResult<QueryOperand<F::Value>> {
    Ok(QueryOperand::Value(field.cast(value)?))
}

/// Casts every element; a non-list operand is treated as a one-element list.
pub fn cast_list<F: SchemaType>(field: &F, value: &Candidate) -> FieldResult<QueryOperand<F::Value>> {
    let cast = match value {
        Candidate::List(items) => items
            .iter()
            .map(|item| field.cast(item))
            .collect::<FieldResult<Vec<_>>>()?,
        single => vec![field.cast(single)?],
    };
    Ok(QueryOperand::List(cast))
}

/// Existence checks take a boolean and never touch the field's own cast.
pub fn cast_exists<F: SchemaType>(field: &F, value: &Candidate) -> FieldResult<QueryOperand<F::Value>> {
    cast_boolean(value)
        .map(QueryOperand::Flag)
        .ok_or_else(|| FieldError::cast("boolean", value, field.path()))
}

/// Type checks take a type number or alias and pass it through.
pub fn cast_type<F: SchemaType>(field: &F, value: &Candidate) -> FieldResult<QueryOperand<F::Value>> {
    match value {
        Candidate::Number(n) => serde_json::Number::from_f64(*n)
            .map(|n| QueryOperand::Raw(Value::Number(n)))
            .ok_or_else(|| FieldError::usage(format!("$type {}", value), field.kind())),
        Candidate::Text(s) => Ok(QueryOperand::Raw(Value::String(s.clone()))),
        other => Err(FieldError::usage(
            format!("$type with {} operand", other.type_name()),
            field.kind(),
        )),
    }
}

/// Boolean coercion used by `$exists`.
pub fn cast_boolean(value: &Candidate) -> Option<bool> {
    match value {
        Candidate::Bool(b) => Some(*b),
        Candidate::Number(n) if *n == 1.0 => Some(true),
        Candidate::Number(n) if *n == 0.0 => Some(false),
        Candidate::Text(s) => match s.as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_and_aliases_resolve() {
        assert_eq!(QueryOperator::from_token("$gt"), Some(QueryOperator::Gt));
        assert_eq!(QueryOperator::from_token("greater-than"), Some(QueryOperator::Gt));
        assert_eq!(QueryOperator::from_token("less-or-equal"), Some(QueryOperator::Lte));
        assert_eq!(QueryOperator::from_token("$near"), None);
        assert_eq!(QueryOperator::from_token("gt"), None);
    }

    #[test]
    fn test_token_round_trip() {
        for op in [
            QueryOperator::Eq,
            QueryOperator::Gte,
            QueryOperator::Nin,
            QueryOperator::Exists,
        ] {
            assert_eq!(QueryOperator::from_token(op.token()), Some(op));
        }
    }

    #[test]
    fn test_cast_boolean() {
        assert_eq!(cast_boolean(&Candidate::from("yes")), Some(true));
        assert_eq!(cast_boolean(&Candidate::from(0)), Some(false));
        assert_eq!(cast_boolean(&Candidate::from(false)), Some(false));
        assert_eq!(cast_boolean(&Candidate::from("maybe")), None);
        assert_eq!(cast_boolean(&Candidate::from(2)), None);
    }

    #[test]
    fn test_map_keeps_shape() {
        let list: QueryOperand<i32> = QueryOperand::List(vec![Some(1), None]);
        assert_eq!(list.map(|n| n * 10), QueryOperand::List(vec![Some(10), None]));

        let flag: QueryOperand<i32> = QueryOperand::Flag(true);
        assert_eq!(flag.map(|n| n.to_string()), QueryOperand::Flag(true));
    }
}
