//! Similarity search request carried to the store-specific query builders
//!
//! The converted filter fragment is embedded into a backend search request
//! here. Scoring, distance normalisation and the HTTP calls themselves stay
//! with the store adapters.

use crate::core_types::expression::Expression;
use crate::error::{FilterError, FilterResult};
use serde::{Deserialize, Serialize};

/// Number of results returned when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 4;

/// Threshold that accepts every result regardless of similarity.
pub const SIMILARITY_THRESHOLD_ACCEPT_ALL: f64 = 0.0;

/// A similarity search: query text, result count, similarity cut-off and an
/// optional metadata filter.
///
/// ```rust
/// use vector_filter::{Expression, SearchRequest};
///
/// let request = SearchRequest::query("space opera")
///     .with_top_k(10)?
///     .with_similarity_threshold(0.75)?
///     .with_filter_expression(Expression::gte("year", 2020));
///
/// assert_eq!(request.top_k, 10);
/// # Ok::<(), vector_filter::FilterError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    /// Lower bound on similarity in `[0.0, 1.0]`.
    pub similarity_threshold: f64,
    pub filter_expression: Option<Expression>,
}

impl SearchRequest {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            similarity_threshold: SIMILARITY_THRESHOLD_ACCEPT_ALL,
            filter_expression: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> FilterResult<Self> {
        self.top_k = top_k;
        self.validate_top_k()?;
        Ok(self)
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> FilterResult<Self> {
        self.similarity_threshold = threshold;
        self.validate_threshold()?;
        Ok(self)
    }

    pub fn with_similarity_threshold_all(mut self) -> Self {
        self.similarity_threshold = SIMILARITY_THRESHOLD_ACCEPT_ALL;
        self
    }

    pub fn with_filter_expression(mut self, expression: Expression) -> Self {
        self.filter_expression = Some(expression);
        self
    }

    /// Re-check the numeric parameters, e.g. after deserializing a request.
    pub fn validate(&self) -> FilterResult<()> {
        self.validate_top_k()?;
        self.validate_threshold()
    }

    fn validate_top_k(&self) -> FilterResult<()> {
        if self.top_k == 0 {
            return Err(FilterError::invalid_search_request(
                "top_k must be at least 1",
            ));
        }
        Ok(())
    }

    fn validate_threshold(&self) -> FilterResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(FilterError::invalid_search_request(format!(
                "similarity threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::query("")
    }
}
