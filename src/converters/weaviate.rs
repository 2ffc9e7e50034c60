//! Weaviate converter
//!
//! Produces the argument of a GraphQL `where` filter:
//!
//! ```text
//! {operator:And operands:[{path:["meta_genre"] operator:Equal valueText:"drama"},{path:["meta_year"] operator:GreaterThanEqual valueInt:2020}]}
//! ```
//!
//! The literal's type picks the value field (`valueText`, `valueInt`,
//! `valueNumber`, `valueBoolean`, `valueDate`). Without a filter the `where`
//! argument is left out entirely, so the match-all fragment is empty.
//!
//! There is no `NotIn` and no negation operator. `NIN` and `NOT` are
//! rejected unless `expand_membership`/`rewrite_negation` rewrite them away.

use super::shared::{format_timestamp, json_string, render_number};
use crate::config::{BackendConfig, WeaviateConfig};
use crate::core_types::converter::{FilterExpressionConverter, OperatorTable};
use crate::core_types::expression::{
    ComparisonOperator, Expression, ExpressionType, Key, LogicalOperator, Value,
};
use crate::core_types::rewrite::{expand_membership, rewrite_negations};
use crate::error::{FilterError, FilterResult};
use crate::logging::log_debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

const BACKEND: &str = "weaviate";

const OPERATORS: &[(ExpressionType, &str)] = &[
    (ExpressionType::And, "And"),
    (ExpressionType::Or, "Or"),
    (ExpressionType::Eq, "Equal"),
    (ExpressionType::Ne, "NotEqual"),
    (ExpressionType::Lt, "LessThan"),
    (ExpressionType::Lte, "LessThanEqual"),
    (ExpressionType::Gt, "GreaterThan"),
    (ExpressionType::Gte, "GreaterThanEqual"),
    (ExpressionType::In, "ContainsAny"),
];

static PROPERTY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("static property name pattern"));

/// Value field of a Weaviate filter operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueField {
    Text,
    Int,
    Number,
    Boolean,
    Date,
}

impl ValueField {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(_) => Some(ValueField::Boolean),
            Value::Int(_) => Some(ValueField::Int),
            Value::Float(_) => Some(ValueField::Number),
            Value::Date(_) => Some(ValueField::Date),
            Value::Text(_) => Some(ValueField::Text),
            Value::List(_) => None,
        }
    }

    /// Common field for a list; integers mixed with floats widen to a number.
    fn of_list(items: &[Value]) -> Option<Self> {
        let mut fields = items.iter().map(Self::of);
        let first = fields.next()??;
        fields.try_fold(first, |acc, field| match (acc, field?) {
            (a, b) if a == b => Some(a),
            (ValueField::Int, ValueField::Number) | (ValueField::Number, ValueField::Int) => {
                Some(ValueField::Number)
            }
            _ => None,
        })
    }

    fn name(&self) -> &'static str {
        match self {
            ValueField::Text => "valueText",
            ValueField::Int => "valueInt",
            ValueField::Number => "valueNumber",
            ValueField::Boolean => "valueBoolean",
            ValueField::Date => "valueDate",
        }
    }
}

/// Converts filter trees into Weaviate GraphQL `where` filters.
#[derive(Debug, Clone)]
pub struct WeaviateFilterConverter {
    config: WeaviateConfig,
    operators: OperatorTable,
}

impl WeaviateFilterConverter {
    pub fn new(config: WeaviateConfig) -> FilterResult<Self> {
        config.validate()?;
        let operators = OperatorTable::new(BACKEND, OPERATORS)?;

        log_debug!(
            backend = BACKEND,
            property_prefix = %config.property_prefix,
            rewrite_negation = config.rewrite_negation,
            expand_membership = config.expand_membership,
            "Weaviate filter converter created"
        );

        Ok(Self { config, operators })
    }

    pub fn config(&self) -> &WeaviateConfig {
        &self.config
    }

    fn property_name(&self, key: &Key) -> String {
        format!("{}{}", self.config.property_prefix, key.identifier())
    }

    fn write_scalar(&self, value: &Value, out: &mut String) {
        match value {
            Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
            Value::Int(_) | Value::Float(_) => {
                out.push_str(&render_number(value).unwrap_or_default());
            }
            Value::Date(timestamp) => out.push_str(&json_string(&format_timestamp(timestamp))),
            Value::Text(text) => out.push_str(&json_string(text)),
            // Lists are rendered by write_value; nested lists fail validation
            Value::List(_) => {}
        }
    }
}

impl FilterExpressionConverter for WeaviateFilterConverter {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn operator_table(&self) -> &OperatorTable {
        &self.operators
    }

    fn match_all(&self) -> &'static str {
        ""
    }

    fn prepare<'a>(&self, expression: &'a Expression) -> FilterResult<Cow<'a, Expression>> {
        let mut prepared = Cow::Borrowed(expression);

        // Negations first: NOT (k IN [..]) turns into NIN, which expansion then removes
        if self.config.rewrite_negation && prepared.contains(ExpressionType::Not) {
            prepared = Cow::Owned(rewrite_negations(&prepared));
        }
        if self.config.expand_membership
            && (prepared.contains(ExpressionType::In) || prepared.contains(ExpressionType::Nin))
        {
            prepared = Cow::Owned(expand_membership(&prepared)?);
        }

        Ok(prepared)
    }

    fn validate_comparison(
        &self,
        operator: ComparisonOperator,
        key: &Key,
        value: &Value,
    ) -> FilterResult<()> {
        let property = self.property_name(key);
        if !PROPERTY_NAME.is_match(&property) {
            return Err(FilterError::malformed_expression(format!(
                "metadata key '{key}' maps to '{property}', which is not a valid Weaviate property name"
            )));
        }

        if let Some(items) = value.as_list() {
            if ValueField::of_list(items).is_none() {
                return Err(FilterError::malformed_expression(format!(
                    "{} on '{key}' mixes value types that Weaviate cannot compare together",
                    ExpressionType::from(operator)
                )));
            }
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
        out.push_str("{operator:");
        out.push_str(self.operators.symbol(operator.into())?);
        out.push_str(" operands:[");
        self.write_expression(left, out)?;
        out.push(',');
        self.write_expression(right, out)?;
        out.push_str("]}");
        Ok(())
    }

    fn write_comparison(
        &self,
        operator: ComparisonOperator,
        key: &Key,
        value: &Value,
        out: &mut String,
    ) -> FilterResult<()> {
        out.push_str("{path:[");
        self.write_key(key, out)?;
        out.push_str("] operator:");
        out.push_str(self.operators.symbol(operator.into())?);
        out.push(' ');
        self.write_value(value, out)?;
        out.push('}');
        Ok(())
    }

    fn write_key(&self, key: &Key, out: &mut String) -> FilterResult<()> {
        out.push_str(&json_string(&self.property_name(key)));
        Ok(())
    }

    fn write_value(&self, value: &Value, out: &mut String) -> FilterResult<()> {
        match value {
            Value::List(items) => {
                let field = ValueField::of_list(items).ok_or_else(|| {
                    FilterError::malformed_expression("list mixes incompatible value types")
                })?;
                out.push_str(field.name());
                out.push_str(":[");
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    self.write_scalar(item, out);
                }
                out.push(']');
            }
            scalar => {
                let field = ValueField::of(scalar).ok_or_else(|| {
                    FilterError::malformed_expression("expected a scalar value")
                })?;
                out.push_str(field.name());
                out.push(':');
                self.write_scalar(scalar, out);
            }
        }
        Ok(())
    }
}
