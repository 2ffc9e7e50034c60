//! Elasticsearch converter
//!
//! Produces a Lucene `query_string` query used as the filter of a knn search:
//!
//! ```text
//! metadata.genre:drama AND metadata.year:>=2020
//! (metadata.genre:drama OR comedy)
//! (*:* NOT metadata.country:BG)
//! ```
//!
//! `*` matches every document. Negations are written against `*:*` inside
//! their own parentheses; a bare `NOT` clause under `OR` would exclude
//! documents from the whole disjunction. Reserved characters and
//! whitespace in keys and values are backslash-escaped; `<` and `>` cannot
//! be escaped in a query string, so text values containing them are
//! rejected. Empty text is written as `""`.

use super::shared::{format_timestamp, namespaced, needs_parentheses, render_number};
use crate::config::{BackendConfig, ElasticsearchConfig};
use crate::core_types::converter::{FilterExpressionConverter, OperatorTable};
use crate::core_types::expression::{
    ComparisonOperator, Expression, ExpressionType, Key, LogicalOperator, Value,
};
use crate::core_types::search::SearchRequest;
use crate::error::{FilterError, FilterResult};
use crate::logging::log_debug;
use serde_json::json;

const BACKEND: &str = "elasticsearch";

const OPERATORS: &[(ExpressionType, &str)] = &[
    (ExpressionType::And, " AND "),
    (ExpressionType::Or, " OR "),
    (ExpressionType::Eq, ""),
    (ExpressionType::Ne, "NOT "),
    (ExpressionType::Lt, "<"),
    (ExpressionType::Lte, "<="),
    (ExpressionType::Gt, ">"),
    (ExpressionType::Gte, ">="),
    (ExpressionType::In, ""),
    (ExpressionType::Nin, "NOT "),
    (ExpressionType::Not, "NOT "),
];

/// Separator between the alternatives of an `IN`/`NIN` list.
const VALUE_RANGE_SEPARATOR: &str = " OR ";

/// Clause matching every document, the base a negation subtracts from.
const ALL_DOCUMENTS: &str = "*:*";

const RESERVED_CHARACTERS: &[char] = &[
    '+', '-', '=', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':',
    '\\', '/',
];

/// Converts filter trees into Elasticsearch query string syntax.
#[derive(Debug, Clone)]
pub struct ElasticsearchFilterConverter {
    config: ElasticsearchConfig,
    operators: OperatorTable,
}

impl ElasticsearchFilterConverter {
    pub fn new(config: ElasticsearchConfig) -> FilterResult<Self> {
        config.validate()?;
        let operators = OperatorTable::new(BACKEND, OPERATORS)?;

        log_debug!(
            backend = BACKEND,
            metadata_field = %config.metadata_field,
            escape_reserved_characters = config.escape_reserved_characters,
            "Elasticsearch filter converter created"
        );

        Ok(Self { config, operators })
    }

    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Search body for a filtered knn query.
    ///
    /// The converted filter (or `*`) becomes the knn `query_string` filter;
    /// `num_candidates` is one and a half times `k`, rounded down.
    pub fn knn_search_body(
        &self,
        request: &SearchRequest,
        query_vector: &[f32],
    ) -> FilterResult<serde_json::Value> {
        request.validate()?;

        let query = self.convert_expression(request.filter_expression.as_ref())?;
        let num_candidates = request.top_k * 3 / 2;

        Ok(json!({
            "min_score": request.similarity_threshold,
            "knn": {
                "field": self.config.embedding_field,
                "query_vector": query_vector,
                "k": request.top_k,
                "num_candidates": num_candidates,
                "filter": {
                    "query_string": { "query": query }
                }
            }
        }))
    }

    fn escape(&self, text: &str) -> String {
        if !self.config.escape_reserved_characters {
            return text.to_string();
        }
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            if RESERVED_CHARACTERS.contains(&c) || c.is_whitespace() {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    fn write_scalar(&self, value: &Value, out: &mut String) {
        match value {
            Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
            Value::Int(_) | Value::Float(_) => {
                let number = render_number(value).unwrap_or_default();
                out.push_str(&self.escape(&number));
            }
            Value::Date(timestamp) => out.push_str(&self.escape(&format_timestamp(timestamp))),
            Value::Text(text) if text.is_empty() => out.push_str("\"\""),
            Value::Text(text) => out.push_str(&self.escape(text)),
            // Lists are flattened by write_value; nested lists fail validation
            Value::List(_) => {}
        }
    }

    /// `(*:* NOT <clause>)`, where `write_clause` writes `<clause>`.
    fn write_negation(
        &self,
        out: &mut String,
        write_clause: impl FnOnce(&mut String) -> FilterResult<()>,
    ) -> FilterResult<()> {
        out.push('(');
        out.push_str(ALL_DOCUMENTS);
        out.push(' ');
        out.push_str(self.operators.symbol(ExpressionType::Not)?);
        write_clause(out)?;
        out.push(')');
        Ok(())
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

impl FilterExpressionConverter for ElasticsearchFilterConverter {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn operator_table(&self) -> &OperatorTable {
        &self.operators
    }

    fn match_all(&self) -> &'static str {
        "*"
    }

    fn validate_comparison(
        &self,
        operator: ComparisonOperator,
        key: &Key,
        value: &Value,
    ) -> FilterResult<()> {
        if !self.config.escape_reserved_characters {
            return Ok(());
        }

        let unescapable = |text: &str| text.contains(['<', '>']);
        if unescapable(key.identifier()) {
            return Err(FilterError::malformed_expression(format!(
                "metadata key '{key}' contains '<' or '>', which a query string cannot escape"
            )));
        }

        let items = value.as_list().unwrap_or(std::slice::from_ref(value));
        for item in items {
            if let Value::Text(text) = item {
                if unescapable(text) {
                    return Err(FilterError::malformed_expression(format!(
                        "{} value '{text}' on '{key}' contains '<' or '>', which a query string cannot escape",
                        ExpressionType::from(operator)
                    )));
                }
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
        let symbol = self.operators.symbol(operator.into())?;
        match operator {
            ComparisonOperator::In => {
                out.push('(');
                self.write_key(key, out)?;
                self.write_value(value, out)?;
                out.push(')');
                Ok(())
            }
            ComparisonOperator::Nin => self.write_negation(out, |out| {
                out.push('(');
                self.write_key(key, out)?;
                self.write_value(value, out)?;
                out.push(')');
                Ok(())
            }),
            ComparisonOperator::Ne => self.write_negation(out, |out| {
                self.write_key(key, out)?;
                self.write_value(value, out)
            }),
            _ => {
                self.write_key(key, out)?;
                out.push_str(symbol);
                self.write_value(value, out)
            }
        }
    }

    fn write_key(&self, key: &Key, out: &mut String) -> FilterResult<()> {
        let field = namespaced(&self.config.metadata_field, key.identifier());
        out.push_str(&self.escape(&field));
        out.push(':');
        Ok(())
    }

    fn write_value(&self, value: &Value, out: &mut String) -> FilterResult<()> {
        match value {
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push_str(VALUE_RANGE_SEPARATOR);
                    }
                    self.write_scalar(item, out);
                }
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
        self.write_negation(out, |out| {
            out.push('(');
            self.write_expression(operand, out)?;
            out.push(')');
            Ok(())
        })
    }
}
