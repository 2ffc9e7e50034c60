//! Tree rewrites that let one filter target backends with smaller operator
//! tables.
//!
//! - [`negate`] builds the logical complement of a tree.
//! - [`rewrite_negations`] removes every `NOT` node by pushing it down to the
//!   comparisons.
//! - [`expand_membership`] replaces `IN`/`NIN` with chains of `EQ`/`NE`.
//!
//! All three return new trees; the input is left untouched.

use crate::core_types::expression::{ComparisonOperator, Expression, Key, LogicalOperator, Value};
use crate::error::{FilterError, FilterResult};

/// Logical complement of `expression`.
///
/// `AND`/`OR` flip by De Morgan, comparisons flip to their complement
/// (`EQ`/`NE`, `GT`/`LTE`, `GTE`/`LT`, `IN`/`NIN`), a `NOT` node drops its
/// negation and groups are kept.
///
/// ```rust
/// use vector_filter::Expression;
/// use vector_filter::core_types::rewrite::negate;
///
/// let filter = Expression::and(Expression::eq("a", 1), Expression::gt("b", 2));
/// assert_eq!(
///     negate(&filter),
///     Expression::or(Expression::ne("a", 1), Expression::lte("b", 2))
/// );
/// ```
pub fn negate(expression: &Expression) -> Expression {
    match expression {
        Expression::Comparison {
            operator,
            key,
            value,
        } => Expression::Comparison {
            operator: operator.negated(),
            key: key.clone(),
            value: value.clone(),
        },
        Expression::Compound {
            operator,
            left,
            right,
        } => Expression::Compound {
            operator: operator.dual(),
            left: Box::new(negate(left)),
            right: Box::new(negate(right)),
        },
        Expression::Not { operand } => (**operand).clone(),
        Expression::Group { content } => Expression::group(negate(content)),
    }
}

/// Equivalent tree without any `NOT` node.
pub fn rewrite_negations(expression: &Expression) -> Expression {
    match expression {
        Expression::Comparison { .. } => expression.clone(),
        Expression::Compound {
            operator,
            left,
            right,
        } => Expression::Compound {
            operator: *operator,
            left: Box::new(rewrite_negations(left)),
            right: Box::new(rewrite_negations(right)),
        },
        // The rewritten operand is NOT-free, so negating it stays NOT-free
        Expression::Not { operand } => negate(&rewrite_negations(operand)),
        Expression::Group { content } => Expression::group(rewrite_negations(content)),
    }
}

/// Equivalent tree without `IN`/`NIN`.
///
/// `k IN [a, b]` becomes `(k == a OR k == b)` and `k NIN [a, b]` becomes
/// `(k != a AND k != b)`, each wrapped in a group. Longer lists become a
/// balanced chain, so an `n`-element list adds about `log2(n)` levels.
/// Fails on a membership comparison whose value is not a non-empty list.
pub fn expand_membership(expression: &Expression) -> FilterResult<Expression> {
    match expression {
        Expression::Comparison {
            operator,
            key,
            value,
        } if operator.is_membership() => {
            let (item_operator, joiner) = match operator {
                ComparisonOperator::In => (ComparisonOperator::Eq, LogicalOperator::Or),
                _ => (ComparisonOperator::Ne, LogicalOperator::And),
            };

            let items = value.as_list().ok_or_else(|| {
                FilterError::malformed_expression(format!(
                    "cannot expand membership test on '{key}': value is a {}",
                    value.type_name()
                ))
            })?;
            if items.is_empty() {
                return Err(FilterError::malformed_expression(format!(
                    "cannot expand membership test on '{key}': empty list"
                )));
            }

            let chain = balanced_chain(item_operator, joiner, key, items);
            Ok(Expression::group(chain))
        }
        Expression::Comparison { .. } => Ok(expression.clone()),
        Expression::Compound {
            operator,
            left,
            right,
        } => Ok(Expression::Compound {
            operator: *operator,
            left: Box::new(expand_membership(left)?),
            right: Box::new(expand_membership(right)?),
        }),
        Expression::Not { operand } => Ok(Expression::not(expand_membership(operand)?)),
        Expression::Group { content } => Ok(Expression::group(expand_membership(content)?)),
    }
}

/// `items` joined by `joiner` as a balanced tree of `item_operator`
/// comparisons, in list order. `items` must be non-empty.
fn balanced_chain(
    item_operator: ComparisonOperator,
    joiner: LogicalOperator,
    key: &Key,
    items: &[Value],
) -> Expression {
    if let [item] = items {
        return Expression::comparison(item_operator, key.clone(), item.clone());
    }
    let (left, right) = items.split_at(items.len() / 2);
    Expression::Compound {
        operator: joiner,
        left: Box::new(balanced_chain(item_operator, joiner, key, left)),
        right: Box::new(balanced_chain(item_operator, joiner, key, right)),
    }
}
