//! # vector-filter
//!
//! Backend-neutral metadata filter expressions, compiled into the native
//! filter syntax of MongoDB Atlas, Elasticsearch, SQL (JSON metadata column)
//! and Weaviate vector stores.
//!
//! ## Key Features
//!
//! - **One filter, many stores**: build an [`Expression`] once, convert it for any backend
//! - **Explicit operator tables**: operators a backend cannot express fail fast
//! - **Validation before emission**: malformed trees never produce partial query text
//! - **Opt-in rewrites**: negation push-down and membership expansion for smaller dialects
//! - **Search boundary**: knn bodies and `$vectorSearch` pipelines carrying the filter
//!
//! ## Example
//!
//! ```rust
//! use vector_filter::{Expression, FilterConfig, FilterExpressionConverter, UnifiedFilterConverter};
//!
//! # fn example() -> vector_filter::FilterResult<()> {
//! let config = FilterConfig::create_backend("elasticsearch", None)?;
//! let converter = UnifiedFilterConverter::from_config(&config)?;
//!
//! let filter = Expression::and(
//!     Expression::eq("genre", "drama"),
//!     Expression::gte("year", 2020),
//! );
//! assert_eq!(
//!     converter.convert_expression(Some(&filter))?,
//!     "metadata.genre:drama AND metadata.year:>=2020"
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]
// Allow unreachable in config clone - all types are covered but compiler can't verify
#![allow(clippy::unreachable)]

// Core types for backend-neutral filtering
pub mod core_types;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod client;
pub mod config;
pub mod converters;
pub mod error;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use client::UnifiedFilterConverter;
pub use config::{
    BackendConfig, ElasticsearchConfig, FilterConfig, MongoDbConfig, SqlConfig, WeaviateConfig,
};
pub use converters::{
    ElasticsearchFilterConverter, MongoDbAtlasFilterConverter, SqlFilterConverter,
    WeaviateFilterConverter,
};
pub use error::{FilterError, FilterResult};

// Re-export core types (expression tree, converter trait, search request)
pub use core_types::{
    ComparisonOperator, Expression, ExpressionType, FilterExpressionConverter, Key,
    LogicalOperator, OperatorTable, SearchRequest, Value,
};
