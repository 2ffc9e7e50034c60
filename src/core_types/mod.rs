//! Core types for backend-neutral metadata filtering
//!
//! ## Organization
//! - `expression` - The filter tree: operators, keys, values
//! - `converter` - The converter trait, operator tables and the shared walk
//! - `rewrite` - Negation push-down and membership expansion
//! - `search` - Search requests that carry a filter to a backend

pub mod converter;
pub mod expression;
pub mod rewrite;
pub mod search;

// Re-export commonly used types
pub use converter::{FilterExpressionConverter, OperatorTable, MAX_EXPRESSION_DEPTH};
pub use expression::{ComparisonOperator, Expression, ExpressionType, Key, LogicalOperator, Value};
pub use search::{SearchRequest, DEFAULT_TOP_K, SIMILARITY_THRESHOLD_ACCEPT_ALL};
