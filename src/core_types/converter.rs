//! Converter trait and the shared tree walk
//!
//! Every backend implements [`FilterExpressionConverter`] by supplying four
//! policies (compound syntax, operator tokens via an [`OperatorTable`], key
//! namespacing, literal rendering) plus optional group/`NOT` rendering. The
//! walk, validation and the match-all shortcut live here, once.

use crate::core_types::expression::{
    ComparisonOperator, Expression, ExpressionType, Key, LogicalOperator, Value,
};
use crate::error::{FilterError, FilterResult};
use crate::logging::{log_debug, log_trace};
use std::borrow::Cow;

/// Deepest tree a converter accepts.
pub const MAX_EXPRESSION_DEPTH: usize = 128;

/// Operators every backend must be able to express.
const REQUIRED_OPERATORS: [ExpressionType; 3] =
    [ExpressionType::And, ExpressionType::Or, ExpressionType::Eq];

/// Fixed mapping from operator to a backend's token.
///
/// Built once per converter. Construction rejects duplicate entries and
/// tables missing `AND`, `OR` or `EQ`, so a broken table surfaces when the
/// converter is created rather than on the first filter that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    backend: &'static str,
    entries: Vec<(ExpressionType, &'static str)>,
}

impl OperatorTable {
    pub fn new(
        backend: &'static str,
        entries: &[(ExpressionType, &'static str)],
    ) -> FilterResult<Self> {
        for (index, (operator, _)) in entries.iter().enumerate() {
            if entries[..index].iter().any(|(seen, _)| seen == operator) {
                return Err(FilterError::invalid_operator_table(
                    backend,
                    format!("duplicate entry for {operator}"),
                ));
            }
        }

        for required in REQUIRED_OPERATORS {
            if !entries.iter().any(|(operator, _)| *operator == required) {
                return Err(FilterError::invalid_operator_table(
                    backend,
                    format!("missing required operator {required}"),
                ));
            }
        }

        Ok(Self {
            backend,
            entries: entries.to_vec(),
        })
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn supports(&self, operator: ExpressionType) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == operator)
    }

    /// Token for `operator`, or [`FilterError::UnsupportedOperator`].
    pub fn symbol(&self, operator: ExpressionType) -> FilterResult<&'static str> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == operator)
            .map(|(_, symbol)| *symbol)
            .ok_or_else(|| FilterError::unsupported_operator(operator, self.backend))
    }

    pub fn supported_operators(&self) -> impl Iterator<Item = ExpressionType> + '_ {
        self.entries.iter().map(|(operator, _)| *operator)
    }
}

/// Translates a filter tree into one backend's native filter syntax.
///
/// Implementations are immutable after construction and conversion is a
/// pure function of the tree, so a converter can be shared freely across
/// threads.
///
/// # Example
///
/// ```rust
/// use vector_filter::{Expression, FilterExpressionConverter, MongoDbAtlasFilterConverter};
/// use vector_filter::config::MongoDbConfig;
///
/// let converter = MongoDbAtlasFilterConverter::new(MongoDbConfig::default()).unwrap();
///
/// let filter = Expression::eq("country", "BG");
/// assert_eq!(
///     converter.convert_expression(Some(&filter)).unwrap(),
///     r#"{"metadata.country":{"$eq":"BG"}}"#
/// );
/// assert_eq!(converter.convert_expression(None).unwrap(), "{}");
/// ```
pub trait FilterExpressionConverter: Send + Sync {
    /// Backend identifier used in logs and errors.
    fn backend_name(&self) -> &'static str;

    fn operator_table(&self) -> &OperatorTable;

    /// Fragment meaning "no filtering applied".
    fn match_all(&self) -> &'static str;

    /// Rewrite applied before validation. The default leaves the tree as is.
    fn prepare<'a>(&self, expression: &'a Expression) -> FilterResult<Cow<'a, Expression>> {
        Ok(Cow::Borrowed(expression))
    }

    /// Backend grammar checks on a comparison, beyond the shared rules.
    fn validate_comparison(
        &self,
        _operator: ComparisonOperator,
        _key: &Key,
        _value: &Value,
    ) -> FilterResult<()> {
        Ok(())
    }

    fn write_compound(
        &self,
        operator: LogicalOperator,
        left: &Expression,
        right: &Expression,
        out: &mut String,
    ) -> FilterResult<()>;

    fn write_comparison(
        &self,
        operator: ComparisonOperator,
        key: &Key,
        value: &Value,
        out: &mut String,
    ) -> FilterResult<()>;

    fn write_key(&self, key: &Key, out: &mut String) -> FilterResult<()>;

    fn write_value(&self, value: &Value, out: &mut String) -> FilterResult<()>;

    /// Groups are transparent unless the grammar needs explicit grouping.
    fn write_group(&self, content: &Expression, out: &mut String) -> FilterResult<()> {
        self.write_expression(content, out)
    }

    fn write_not(&self, _operand: &Expression, _out: &mut String) -> FilterResult<()> {
        Err(FilterError::unsupported_operator(
            ExpressionType::Not,
            self.backend_name(),
        ))
    }

    fn write_expression(&self, expression: &Expression, out: &mut String) -> FilterResult<()> {
        match expression {
            Expression::Comparison {
                operator,
                key,
                value,
            } => self.write_comparison(*operator, key, value, out),
            Expression::Compound {
                operator,
                left,
                right,
            } => self.write_compound(*operator, left, right, out),
            Expression::Not { operand } => self.write_not(operand, out),
            Expression::Group { content } => self.write_group(content, out),
        }
    }

    /// Check the whole tree against the shared rules and this backend's
    /// operator table and grammar.
    fn validate(&self, expression: &Expression) -> FilterResult<()> {
        validate_tree(self, expression, 1)
    }

    /// Convert `expression` into this backend's filter fragment.
    ///
    /// `None` yields [`match_all`](Self::match_all). The tree is validated in
    /// full before anything is emitted.
    fn convert_expression(&self, expression: Option<&Expression>) -> FilterResult<String> {
        let Some(expression) = expression else {
            log_debug!(
                backend = self.backend_name(),
                "No filter expression, using match-all token"
            );
            return Ok(self.match_all().to_string());
        };

        let prepared = self.prepare(expression)?;
        self.validate(&prepared)?;

        let mut out = String::new();
        self.write_expression(&prepared, &mut out)?;

        log_debug!(
            backend = self.backend_name(),
            depth = prepared.depth(),
            rewritten = matches!(prepared, Cow::Owned(_)),
            fragment_len = out.len(),
            "Filter expression converted"
        );
        log_trace!(backend = self.backend_name(), fragment = %out, "Converted filter fragment");

        Ok(out)
    }
}

fn validate_tree<C>(converter: &C, expression: &Expression, depth: usize) -> FilterResult<()>
where
    C: FilterExpressionConverter + ?Sized,
{
    if depth > MAX_EXPRESSION_DEPTH {
        return Err(FilterError::malformed_expression(format!(
            "expression nesting exceeds {MAX_EXPRESSION_DEPTH} levels"
        )));
    }

    match expression {
        Expression::Comparison {
            operator,
            key,
            value,
        } => {
            converter.operator_table().symbol((*operator).into())?;
            validate_key_shape(key)?;
            validate_value_shape(*operator, key, value)?;
            converter.validate_comparison(*operator, key, value)
        }
        Expression::Compound {
            operator,
            left,
            right,
        } => {
            converter.operator_table().symbol((*operator).into())?;
            validate_tree(converter, left, depth + 1)?;
            validate_tree(converter, right, depth + 1)
        }
        Expression::Not { operand } => {
            converter.operator_table().symbol(ExpressionType::Not)?;
            validate_tree(converter, operand, depth + 1)
        }
        Expression::Group { content } => validate_tree(converter, content, depth + 1),
    }
}

fn validate_key_shape(key: &Key) -> FilterResult<()> {
    if key.identifier().is_empty() {
        return Err(FilterError::malformed_expression(format!(
            "empty metadata key '{}'",
            key.raw()
        )));
    }
    Ok(())
}

fn validate_value_shape(operator: ComparisonOperator, key: &Key, value: &Value) -> FilterResult<()> {
    let operator_type = ExpressionType::from(operator);

    if operator.is_membership() {
        let items = value.as_list().ok_or_else(|| {
            FilterError::malformed_expression(format!(
                "{operator_type} on '{key}' needs a list value, got {}",
                value.type_name()
            ))
        })?;
        if items.is_empty() {
            return Err(FilterError::malformed_expression(format!(
                "{operator_type} on '{key}' needs at least one value"
            )));
        }
        return items
            .iter()
            .try_for_each(|item| validate_scalar(operator_type, key, item));
    }

    validate_scalar(operator_type, key, value)
}

fn validate_scalar(operator: ExpressionType, key: &Key, value: &Value) -> FilterResult<()> {
    if value.is_list() {
        return Err(FilterError::malformed_expression(format!(
            "{operator} on '{key}' needs a scalar value, got a list"
        )));
    }
    match value {
        Value::Float(number) if !number.is_finite() => Err(FilterError::malformed_expression(
            format!("{operator} on '{key}' has non-finite number {number}"),
        )),
        _ => Ok(()),
    }
}
