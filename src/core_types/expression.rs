//! Backend-neutral filter expression tree
//!
//! A filter is a small boolean query over document metadata: comparisons of
//! a metadata [`Key`] against a literal [`Value`], combined with `AND`/`OR`,
//! negated with `NOT`, and optionally parenthesised with a group.
//!
//! Trees are immutable once built. Converters read them, they never change
//! them; rewrites (see [`crate::core_types::rewrite`]) return new trees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every operator a filter tree can contain.
///
/// This is the key of each backend's operator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpressionType {
    And,
    Or,
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Not,
}

impl ExpressionType {
    /// All operators, in declaration order.
    pub const ALL: [ExpressionType; 11] = [
        ExpressionType::And,
        ExpressionType::Or,
        ExpressionType::Eq,
        ExpressionType::Ne,
        ExpressionType::Gt,
        ExpressionType::Gte,
        ExpressionType::Lt,
        ExpressionType::Lte,
        ExpressionType::In,
        ExpressionType::Nin,
        ExpressionType::Not,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionType::And => "AND",
            ExpressionType::Or => "OR",
            ExpressionType::Eq => "EQ",
            ExpressionType::Ne => "NE",
            ExpressionType::Gt => "GT",
            ExpressionType::Gte => "GTE",
            ExpressionType::Lt => "LT",
            ExpressionType::Lte => "LTE",
            ExpressionType::In => "IN",
            ExpressionType::Nin => "NIN",
            ExpressionType::Not => "NOT",
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators comparing a key against a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
}

impl ComparisonOperator {
    /// `IN` and `NIN` take a list value; everything else takes a scalar.
    pub fn is_membership(&self) -> bool {
        matches!(self, ComparisonOperator::In | ComparisonOperator::Nin)
    }

    /// The operator selecting exactly the documents this one rejects.
    pub fn negated(&self) -> ComparisonOperator {
        match self {
            ComparisonOperator::Eq => ComparisonOperator::Ne,
            ComparisonOperator::Ne => ComparisonOperator::Eq,
            ComparisonOperator::Gt => ComparisonOperator::Lte,
            ComparisonOperator::Gte => ComparisonOperator::Lt,
            ComparisonOperator::Lt => ComparisonOperator::Gte,
            ComparisonOperator::Lte => ComparisonOperator::Gt,
            ComparisonOperator::In => ComparisonOperator::Nin,
            ComparisonOperator::Nin => ComparisonOperator::In,
        }
    }
}

impl From<ComparisonOperator> for ExpressionType {
    fn from(operator: ComparisonOperator) -> Self {
        match operator {
            ComparisonOperator::Eq => ExpressionType::Eq,
            ComparisonOperator::Ne => ExpressionType::Ne,
            ComparisonOperator::Gt => ExpressionType::Gt,
            ComparisonOperator::Gte => ExpressionType::Gte,
            ComparisonOperator::Lt => ExpressionType::Lt,
            ComparisonOperator::Lte => ExpressionType::Lte,
            ComparisonOperator::In => ExpressionType::In,
            ComparisonOperator::Nin => ExpressionType::Nin,
        }
    }
}

/// Operators combining two sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// De Morgan dual: `AND` <-> `OR`.
    pub fn dual(&self) -> LogicalOperator {
        match self {
            LogicalOperator::And => LogicalOperator::Or,
            LogicalOperator::Or => LogicalOperator::And,
        }
    }
}

impl From<LogicalOperator> for ExpressionType {
    fn from(operator: LogicalOperator) -> Self {
        match operator {
            LogicalOperator::And => ExpressionType::And,
            LogicalOperator::Or => ExpressionType::Or,
        }
    }
}

/// A metadata field name.
///
/// Callers may hand in keys wrapped in single or double quotes (the way a
/// textual filter quotes identifiers containing dots or spaces). The quotes
/// are not part of the field name; [`Key::identifier`] strips them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key exactly as supplied.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Whether the trimmed key starts and ends with the same quote character.
    pub fn has_outer_quotes(&self) -> bool {
        let trimmed = self.0.trim();
        trimmed.len() >= 2
            && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
                || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    }

    /// The field name with surrounding whitespace and outer quotes removed.
    ///
    /// ```rust
    /// use vector_filter::Key;
    ///
    /// assert_eq!(Key::new("\"a.b\"").identifier(), "a.b");
    /// assert_eq!(Key::new("'country'").identifier(), "country");
    /// assert_eq!(Key::new("year").identifier(), "year");
    /// ```
    pub fn identifier(&self) -> &str {
        let trimmed = self.0.trim();
        if self.has_outer_quotes() {
            // Both quote characters are single-byte, so slicing stays on char boundaries
            &trimmed[1..trimmed.len() - 1]
        } else {
            trimmed
        }
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A literal on the right-hand side of a comparison.
///
/// Lists only appear as the value of `IN`/`NIN` and hold scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Rendered as ISO-8601 `yyyy-MM-ddTHH:mm:ssZ` in UTC.
    Date(DateTime<Utc>),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the literal's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Date(_) => "date",
            Value::Text(_) => "string",
            Value::List(_) => "list",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// A node of the filter tree.
///
/// The shape guarantees the structural invariants: a comparison always has
/// a key on the left, compound and negation nodes always hold expressions.
/// Value-shape rules (lists only for `IN`/`NIN`, finite floats, non-empty
/// keys) are checked by the converters before anything is emitted.
///
/// ```rust
/// use vector_filter::Expression;
///
/// // genre == "drama" AND year >= 2020
/// let filter = Expression::and(
///     Expression::eq("genre", "drama"),
///     Expression::gte("year", 2020),
/// );
/// assert_eq!(filter.depth(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    Comparison {
        operator: ComparisonOperator,
        key: Key,
        value: Value,
    },
    Compound {
        operator: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not {
        operand: Box<Expression>,
    },
    Group {
        content: Box<Expression>,
    },
}

impl Expression {
    pub fn comparison(
        operator: ComparisonOperator,
        key: impl Into<Key>,
        value: impl Into<Value>,
    ) -> Self {
        Expression::Comparison {
            operator,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn eq(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Eq, key, value)
    }

    pub fn ne(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Ne, key, value)
    }

    pub fn gt(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Gt, key, value)
    }

    pub fn gte(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Gte, key, value)
    }

    pub fn lt(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Lt, key, value)
    }

    pub fn lte(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Lte, key, value)
    }

    /// Membership in a list of values; element order is preserved.
    pub fn is_in<V: Into<Value>>(key: impl Into<Key>, values: impl IntoIterator<Item = V>) -> Self {
        Self::comparison(
            ComparisonOperator::In,
            key,
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Non-membership in a list of values; element order is preserved.
    pub fn not_in<V: Into<Value>>(key: impl Into<Key>, values: impl IntoIterator<Item = V>) -> Self {
        Self::comparison(
            ComparisonOperator::Nin,
            key,
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::Compound {
            operator: LogicalOperator::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Compound {
            operator: LogicalOperator::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Not {
            operand: Box::new(operand),
        }
    }

    pub fn group(content: Expression) -> Self {
        Expression::Group {
            content: Box::new(content),
        }
    }

    /// The operator at this node; `None` for a group, which has none.
    pub fn expression_type(&self) -> Option<ExpressionType> {
        match self {
            Expression::Comparison { operator, .. } => Some((*operator).into()),
            Expression::Compound { operator, .. } => Some((*operator).into()),
            Expression::Not { .. } => Some(ExpressionType::Not),
            Expression::Group { .. } => None,
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Expression::Comparison { .. } => 1,
            Expression::Compound { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expression::Not { operand } => 1 + operand.depth(),
            Expression::Group { content } => 1 + content.depth(),
        }
    }

    /// Whether any node in the tree uses `operator`.
    pub fn contains(&self, operator: ExpressionType) -> bool {
        if self.expression_type() == Some(operator) {
            return true;
        }
        match self {
            Expression::Comparison { .. } => false,
            Expression::Compound { left, right, .. } => {
                left.contains(operator) || right.contains(operator)
            }
            Expression::Not { operand } => operand.contains(operator),
            Expression::Group { content } => content.contains(operator),
        }
    }
}
