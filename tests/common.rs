//! Test helper utilities for vector-filter integration tests
//!
//! Random filter trees, a reference evaluator over integer metadata, and
//! converter construction for every backend.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use std::collections::HashMap;
use vector_filter::{
    ComparisonOperator, Expression, ExpressionType, FilterConfig, FilterExpressionConverter,
    UnifiedFilterConverter, Value,
};

/// Every backend name the crate converts for.
pub const ALL_BACKENDS: [&str; 4] = ["mongodb", "elasticsearch", "sql", "weaviate"];

/// Metadata keys used by generated trees.
pub const KEYS: [&str; 4] = ["genre", "year", "rating", "country"];

const TEXT_VALUES: [&str; 4] = ["drama", "comedy", "news", "BG"];

const COMPARISONS: [ComparisonOperator; 8] = [
    ComparisonOperator::Eq,
    ComparisonOperator::Ne,
    ComparisonOperator::Gt,
    ComparisonOperator::Gte,
    ComparisonOperator::Lt,
    ComparisonOperator::Lte,
    ComparisonOperator::In,
    ComparisonOperator::Nin,
];

/// Create a converter with default configuration for a backend
///
/// # Panics
///
/// Panics if the backend name is not recognized (test failure is appropriate).
pub fn create_converter(backend: &str) -> UnifiedFilterConverter {
    let config = FilterConfig::create_backend(backend, None)
        .unwrap_or_else(|e| panic!("Unsupported test backend '{backend}': {e}"));
    UnifiedFilterConverter::from_config(&config)
        .unwrap_or_else(|e| panic!("Converter for '{backend}' failed to build: {e}"))
}

/// Which literals a generated tree may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literals {
    /// Integers only, so the reference evaluator can judge the tree
    Integers,
    /// Integers and text, list elements of one kind
    Mixed,
}

/// Random well-formed tree of at most `depth` levels, restricted to the
/// operators `supports` accepts.
pub fn random_tree(
    rng: &mut fastrand::Rng,
    depth: usize,
    literals: Literals,
    supports: &dyn Fn(ExpressionType) -> bool,
) -> Expression {
    if depth <= 1 || rng.u8(0..3) == 0 {
        return random_comparison(rng, literals, supports);
    }

    match rng.u8(0..4) {
        0 if supports(ExpressionType::Not) => {
            Expression::not(random_tree(rng, depth - 1, literals, supports))
        }
        1 => Expression::group(random_tree(rng, depth - 1, literals, supports)),
        2 => Expression::or(
            random_tree(rng, depth - 1, literals, supports),
            random_tree(rng, depth - 1, literals, supports),
        ),
        _ => Expression::and(
            random_tree(rng, depth - 1, literals, supports),
            random_tree(rng, depth - 1, literals, supports),
        ),
    }
}

fn random_comparison(
    rng: &mut fastrand::Rng,
    literals: Literals,
    supports: &dyn Fn(ExpressionType) -> bool,
) -> Expression {
    let allowed: Vec<ComparisonOperator> = COMPARISONS
        .into_iter()
        .filter(|operator| supports((*operator).into()))
        .collect();
    let operator = allowed[rng.usize(0..allowed.len())];
    let key = KEYS[rng.usize(0..KEYS.len())];
    let text = literals == Literals::Mixed && rng.bool();

    let value = if operator.is_membership() {
        let len = rng.usize(1..4);
        Value::List((0..len).map(|_| random_scalar(rng, text)).collect())
    } else {
        random_scalar(rng, text)
    };

    Expression::comparison(operator, key, value)
}

fn random_scalar(rng: &mut fastrand::Rng, text: bool) -> Value {
    if text {
        Value::from(TEXT_VALUES[rng.usize(0..TEXT_VALUES.len())])
    } else {
        Value::Int(rng.i64(-2..6))
    }
}

/// Random document assigning an integer to every key in [`KEYS`].
pub fn random_document(rng: &mut fastrand::Rng) -> HashMap<&'static str, i64> {
    KEYS.iter().map(|key| (*key, rng.i64(-2..6))).collect()
}

/// Reference semantics of an integer-only tree against a document.
///
/// # Panics
///
/// Panics on non-integer literals or unknown keys (test failure is appropriate).
pub fn evaluate(expression: &Expression, document: &HashMap<&str, i64>) -> bool {
    match expression {
        Expression::Comparison {
            operator,
            key,
            value,
        } => {
            let actual = document[key.identifier()];
            let int = |value: &Value| match value {
                Value::Int(number) => *number,
                other => panic!("evaluator only handles integers, got {other:?}"),
            };
            let in_list = || {
                value
                    .as_list()
                    .expect("membership needs a list")
                    .iter()
                    .any(|item| int(item) == actual)
            };
            match operator {
                ComparisonOperator::Eq => actual == int(value),
                ComparisonOperator::Ne => actual != int(value),
                ComparisonOperator::Gt => actual > int(value),
                ComparisonOperator::Gte => actual >= int(value),
                ComparisonOperator::Lt => actual < int(value),
                ComparisonOperator::Lte => actual <= int(value),
                ComparisonOperator::In => in_list(),
                ComparisonOperator::Nin => !in_list(),
            }
        }
        Expression::Compound {
            operator,
            left,
            right,
        } => match operator {
            vector_filter::LogicalOperator::And => {
                evaluate(left, document) && evaluate(right, document)
            }
            vector_filter::LogicalOperator::Or => {
                evaluate(left, document) || evaluate(right, document)
            }
        },
        Expression::Not { operand } => !evaluate(operand, document),
        Expression::Group { content } => evaluate(content, document),
    }
}

/// Whether every opening bracket in `text` is closed in order.
///
/// Characters inside double-quoted strings and backslash escapes are skipped.
pub fn brackets_balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' => in_string = !in_string,
            _ if in_string => {}
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }

    stack.is_empty() && !in_string
}

/// Convert with `converter`, panicking with the tree on failure.
pub fn convert_ok(converter: &dyn FilterExpressionConverter, expression: &Expression) -> String {
    converter
        .convert_expression(Some(expression))
        .unwrap_or_else(|e| panic!("{} failed on {expression:?}: {e}", converter.backend_name()))
}
