//! Backend converter implementations
//!
//! This module contains one converter per vector-store filter dialect:
//!
//! - **mongodb**: MongoDB Atlas `$vectorSearch` filter documents
//! - **elasticsearch**: Lucene query strings for knn filters
//! - **sql**: SQL predicates over a JSON metadata column
//! - **weaviate**: GraphQL `where` filters
//! - **shared**: Literal and key helpers used by all of them
//!
//! ## Architecture
//!
//! ```text
//! core_types::converter   <- FilterExpressionConverter trait, OperatorTable, shared walk
//!      |        |        |        |
//! mongodb.rs  elasticsearch.rs  sql.rs  weaviate.rs   <- four policies each
//!      |        |        |        |
//!              shared.rs          <- JSON literals, timestamps, namespacing
//! ```

pub mod elasticsearch;
pub mod mongodb;
pub(crate) mod shared;
pub mod sql;
pub mod weaviate;

#[cfg(test)]
mod tests;

// Re-export the converter structs
pub use elasticsearch::ElasticsearchFilterConverter;
pub use mongodb::MongoDbAtlasFilterConverter;
pub use sql::SqlFilterConverter;
pub use weaviate::WeaviateFilterConverter;
