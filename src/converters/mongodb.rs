//! MongoDB Atlas converter
//!
//! Produces the `filter` document of an Atlas `$vectorSearch` stage:
//!
//! ```text
//! {"$and":[{"metadata.genre":{"$eq":"drama"}},{"metadata.year":{"$gte":2020}}]}
//! ```
//!
//! The JSON nesting mirrors the tree, so groups need no syntax of their own.
//! Atlas pre-filters have no `$not` at this level; `NOT` is rejected unless
//! `rewrite_negation` pushes it down to the comparisons.

use super::shared::{json_string, namespaced, to_json};
use crate::config::{BackendConfig, MongoDbConfig};
use crate::core_types::converter::{FilterExpressionConverter, OperatorTable};
use crate::core_types::expression::{
    ComparisonOperator, Expression, ExpressionType, Key, LogicalOperator, Value,
};
use crate::core_types::rewrite::rewrite_negations;
use crate::core_types::search::SearchRequest;
use crate::error::{FilterError, FilterResult};
use crate::logging::log_debug;
use serde_json::json;
use std::borrow::Cow;

const BACKEND: &str = "mongodb";

const OPERATORS: &[(ExpressionType, &str)] = &[
    (ExpressionType::And, "$and"),
    (ExpressionType::Or, "$or"),
    (ExpressionType::Eq, "$eq"),
    (ExpressionType::Ne, "$ne"),
    (ExpressionType::Lt, "$lt"),
    (ExpressionType::Lte, "$lte"),
    (ExpressionType::Gt, "$gt"),
    (ExpressionType::Gte, "$gte"),
    (ExpressionType::In, "$in"),
    (ExpressionType::Nin, "$nin"),
];

/// Converts filter trees into MongoDB Atlas metadata filter documents.
#[derive(Debug, Clone)]
pub struct MongoDbAtlasFilterConverter {
    config: MongoDbConfig,
    operators: OperatorTable,
}

impl MongoDbAtlasFilterConverter {
    pub fn new(config: MongoDbConfig) -> FilterResult<Self> {
        config.validate()?;
        let operators = OperatorTable::new(BACKEND, OPERATORS)?;

        log_debug!(
            backend = BACKEND,
            metadata_field = %config.metadata_field,
            rewrite_negation = config.rewrite_negation,
            "MongoDB Atlas filter converter created"
        );

        Ok(Self { config, operators })
    }

    pub fn config(&self) -> &MongoDbConfig {
        &self.config
    }

    /// Aggregation pipeline running a filtered vector search.
    ///
    /// `$vectorSearch` (with the converted filter when the request has one),
    /// then the search score projected into `score` and matched against the
    /// request's similarity threshold.
    pub fn vector_search_pipeline(
        &self,
        request: &SearchRequest,
        query_vector: &[f32],
    ) -> FilterResult<Vec<serde_json::Value>> {
        request.validate()?;

        let mut stage = json!({
            "index": self.config.index_name,
            "path": self.config.embedding_path,
            "queryVector": query_vector,
            "numCandidates": self.config.num_candidates.max(request.top_k),
            "limit": request.top_k,
        });

        if let Some(expression) = &request.filter_expression {
            let fragment = self.convert_expression(Some(expression))?;
            let filter: serde_json::Value = serde_json::from_str(&fragment).map_err(|e| {
                FilterError::malformed_expression(format!(
                    "converted MongoDB filter is not valid JSON: {e}"
                ))
            })?;
            stage["filter"] = filter;
        }

        Ok(vec![
            json!({ "$vectorSearch": stage }),
            json!({ "$addFields": { "score": { "$meta": "vectorSearchScore" } } }),
            json!({ "$match": { "score": { "$gte": request.similarity_threshold } } }),
        ])
    }
}

impl FilterExpressionConverter for MongoDbAtlasFilterConverter {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn operator_table(&self) -> &OperatorTable {
        &self.operators
    }

    fn match_all(&self) -> &'static str {
        "{}"
    }

    fn prepare<'a>(&self, expression: &'a Expression) -> FilterResult<Cow<'a, Expression>> {
        if self.config.rewrite_negation && expression.contains(ExpressionType::Not) {
            return Ok(Cow::Owned(rewrite_negations(expression)));
        }
        Ok(Cow::Borrowed(expression))
    }

    fn write_compound(
        &self,
        operator: LogicalOperator,
        left: &Expression,
        right: &Expression,
        out: &mut String,
    ) -> FilterResult<()> {
        out.push('{');
        out.push_str(&json_string(self.operators.symbol(operator.into())?));
        out.push_str(":[");
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
        out.push('{');
        self.write_key(key, out)?;
        out.push_str(":{");
        out.push_str(&json_string(self.operators.symbol(operator.into())?));
        out.push(':');
        self.write_value(value, out)?;
        out.push_str("}}");
        Ok(())
    }

    fn write_key(&self, key: &Key, out: &mut String) -> FilterResult<()> {
        out.push_str(&json_string(&namespaced(
            &self.config.metadata_field,
            key.identifier(),
        )));
        Ok(())
    }

    fn write_value(&self, value: &Value, out: &mut String) -> FilterResult<()> {
        out.push_str(&to_json(value).to_string());
        Ok(())
    }
}
