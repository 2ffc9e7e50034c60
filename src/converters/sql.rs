//! SQL converter for stores keeping metadata as a JSON column
//!
//! Produces a `WHERE` predicate in the style HANA Cloud accepts:
//!
//! ```text
//! JSON_VALUE(metadata, '$.genre') = 'drama' AND JSON_VALUE(metadata, '$.year') >= 2020
//! JSON_VALUE(metadata, '$.genre') NOT IN ('drama', 'comedy')
//! ```
//!
//! `1 = 1` matches every row. `JSON_VALUE` yields text, so booleans compare
//! against `'true'`/`'false'`. Keys are spliced into the JSON path literal
//! and must be dotted identifiers.

use super::shared::{format_timestamp, needs_parentheses, render_number};
use crate::config::{BackendConfig, SqlConfig};
use crate::core_types::converter::{FilterExpressionConverter, OperatorTable};
use crate::core_types::expression::{
    ComparisonOperator, Expression, ExpressionType, Key, LogicalOperator, Value,
};
use crate::error::{FilterError, FilterResult};
use crate::logging::log_debug;
use once_cell::sync::Lazy;
use regex::Regex;

const BACKEND: &str = "sql";

const OPERATORS: &[(ExpressionType, &str)] = &[
    (ExpressionType::And, " AND "),
    (ExpressionType::Or, " OR "),
    (ExpressionType::Eq, "="),
    (ExpressionType::Ne, "<>"),
    (ExpressionType::Lt, "<"),
    (ExpressionType::Lte, "<="),
    (ExpressionType::Gt, ">"),
    (ExpressionType::Gte, ">="),
    (ExpressionType::In, "IN"),
    (ExpressionType::Nin, "NOT IN"),
    (ExpressionType::Not, "NOT"),
];

static JSON_PATH_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("static JSON path key pattern")
});

/// Converts filter trees into SQL predicates over a JSON metadata column.
#[derive(Debug, Clone)]
pub struct SqlFilterConverter {
    config: SqlConfig,
    operators: OperatorTable,
}

impl SqlFilterConverter {
    pub fn new(config: SqlConfig) -> FilterResult<Self> {
        config.validate()?;
        let operators = OperatorTable::new(BACKEND, OPERATORS)?;

        log_debug!(
            backend = BACKEND,
            metadata_column = %config.metadata_column,
            "SQL filter converter created"
        );

        Ok(Self { config, operators })
    }

    pub fn config(&self) -> &SqlConfig {
        &self.config
    }

    fn write_scalar(&self, value: &Value, out: &mut String) {
        match value {
            Value::Bool(flag) => out.push_str(if *flag { "'true'" } else { "'false'" }),
            Value::Int(_) | Value::Float(_) => {
                out.push_str(&render_number(value).unwrap_or_default());
            }
            Value::Date(timestamp) => {
                out.push('\'');
                out.push_str(&format_timestamp(timestamp));
                out.push('\'');
            }
            Value::Text(text) => {
                out.push('\'');
                out.push_str(&text.replace('\'', "''"));
                out.push('\'');
            }
            // Lists are rendered by write_value; nested lists fail validation
            Value::List(_) => {}
        }
    }

    fn write_operand(
        &self,
        parent: LogicalOperator,
        child: &Expression,
        out: &mut String,
    ) -> FilterResult<()> {
        if needs_parentheses(parent, child) {
            out.push('(');
            self.write_expression(child, out)?;
            out.push(')');
            Ok(())
        } else {
            self.write_expression(child, out)
        }
    }
}

impl FilterExpressionConverter for SqlFilterConverter {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn operator_table(&self) -> &OperatorTable {
        &self.operators
    }

    fn match_all(&self) -> &'static str {
        "1 = 1"
    }

    fn validate_comparison(
        &self,
        _operator: ComparisonOperator,
        key: &Key,
        _value: &Value,
    ) -> FilterResult<()> {
        if !JSON_PATH_KEY.is_match(key.identifier()) {
            return Err(FilterError::malformed_expression(format!(
                "metadata key '{key}' is not a dotted identifier usable in a JSON path"
            )));
        }
        Ok(())
    }

    fn write_compound(
        &self,
        operator: LogicalOperator,
        left: &Expression,
        right: &Expression,
        out: &mut String,
    ) -> FilterResult<()> {
        self.write_operand(operator, left, out)?;
        out.push_str(self.operators.symbol(operator.into())?);
        self.write_operand(operator, right, out)
    }

    fn write_comparison(
        &self,
        operator: ComparisonOperator,
        key: &Key,
        value: &Value,
        out: &mut String,
    ) -> FilterResult<()> {
        self.write_key(key, out)?;
        out.push(' ');
        out.push_str(self.operators.symbol(operator.into())?);
        out.push(' ');
        self.write_value(value, out)
    }

    fn write_key(&self, key: &Key, out: &mut String) -> FilterResult<()> {
        out.push_str("JSON_VALUE(");
        out.push_str(&self.config.metadata_column);
        out.push_str(", '$.");
        out.push_str(key.identifier());
        out.push_str("')");
        Ok(())
    }

    fn write_value(&self, value: &Value, out: &mut String) -> FilterResult<()> {
        match value {
            Value::List(items) => {
                out.push('(');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_scalar(item, out);
                }
                out.push(')');
            }
            scalar => self.write_scalar(scalar, out),
        }
        Ok(())
    }

    fn write_group(&self, content: &Expression, out: &mut String) -> FilterResult<()> {
        out.push('(');
        self.write_expression(content, out)?;
        out.push(')');
        Ok(())
    }

    fn write_not(&self, operand: &Expression, out: &mut String) -> FilterResult<()> {
        out.push_str(self.operators.symbol(ExpressionType::Not)?);
        out.push_str(" (");
        self.write_expression(operand, out)?;
        out.push(')');
        Ok(())
    }
}
