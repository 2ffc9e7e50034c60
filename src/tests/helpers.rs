//! Test helper utilities for vector-filter unit tests
//!
//! Shared fixtures: configurations for each backend and a representative
//! filter tree.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

use crate::config::FilterConfig;
use crate::core_types::expression::Expression;

/// Every backend name the crate converts for.
pub const ALL_BACKENDS: [&str; 4] = ["mongodb", "elasticsearch", "sql", "weaviate"];

/// Environment variables read by `FilterConfig::from_env`.
pub const FILTER_ENV_VARS: [&str; 3] = [
    "VECTOR_STORE_BACKEND",
    "FILTER_METADATA_FIELD",
    "FILTER_REWRITE_NEGATION",
];

/// Create default configuration for a backend
///
/// # Panics
///
/// Panics if the backend name is not recognized (test failure is appropriate).
pub fn create_test_config(backend_name: &str) -> FilterConfig {
    FilterConfig::create_backend(backend_name, None)
        .unwrap_or_else(|e| panic!("Unsupported test backend '{backend_name}': {e}"))
}

/// `country == "BG" AND year >= 2020`
pub fn sample_filter() -> Expression {
    Expression::and(
        Expression::eq("country", "BG"),
        Expression::gte("year", 2020),
    )
}

/// Remove every filter variable so a test starts from a clean environment.
pub fn clear_filter_env() {
    for name in FILTER_ENV_VARS {
        std::env::remove_var(name);
    }
}
