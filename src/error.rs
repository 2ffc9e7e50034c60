//! Error types for filter conversion.
//!
//! This module provides structured error handling for vector-filter,
//! including categorization and severity levels.
//!
//! # Error Types
//!
//! The main error type is [`FilterError`], which covers all failure modes:
//! - Operators a backend cannot express
//! - Expression trees that break the well-typedness rules
//! - Unknown backends and invalid configuration
//! - Invalid search request parameters
//!
//! None of these are transient. They indicate a caller or configuration
//! bug and are never retried.
//!
//! # Error Handling Example
//!
//! ```rust
//! use vector_filter::{Expression, FilterError, FilterExpressionConverter, WeaviateFilterConverter};
//! use vector_filter::config::WeaviateConfig;
//!
//! let converter = WeaviateFilterConverter::new(WeaviateConfig::default()).unwrap();
//! let filter = Expression::not_in("genre", ["drama", "comedy"]);
//!
//! match converter.convert_expression(Some(&filter)) {
//!     Err(FilterError::UnsupportedOperator { operator, backend }) => {
//!         println!("{backend} cannot express {operator}");
//!     }
//!     Err(other) => println!("{}", other.user_message()),
//!     Ok(fragment) => println!("{fragment}"),
//! }
//! ```

use crate::core_types::ExpressionType;
use crate::logging::{log_error, log_warn};
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
///
/// Use [`FilterError::category()`] to get the category for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Internal system errors (bugs, invariant violations).
    ///
    /// A backend operator table failed its own consistency checks.
    Internal,

    /// Client errors (invalid filter, unknown backend, configuration).
    ///
    /// The caller built something the target backend cannot accept and
    /// can fix it.
    Client,
}

/// Severity level for logging and alerting decisions.
///
/// Use [`FilterError::severity()`] to get the severity for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The library itself is inconsistent.
    Critical,

    /// Action failed but system is stable.
    Error,

    /// Unexpected but recoverable situation.
    Warning,
}

// ============================================================================
// Filter Error types
// ============================================================================

/// Convenient result type for filter operations.
///
/// Alias for `Result<T, FilterError>`.
///
/// ```rust
/// use vector_filter::FilterResult;
///
/// fn normalise(field: &str) -> FilterResult<String> {
///     if field.is_empty() {
///         return Err(vector_filter::FilterError::malformed_expression("Empty key"));
///     }
///     Ok(field.trim().to_string())
/// }
/// ```
pub type FilterResult<T> = std::result::Result<T, FilterError>;

/// Errors that can occur while converting filter expressions.
///
/// | Variant | Category | Severity |
/// |---------|----------|----------|
/// | `UnsupportedOperator` | Client | Error |
/// | `MalformedExpression` | Client | Warning |
/// | `UnsupportedBackend` | Client | Error |
/// | `ConfigurationError` | Client | Error |
/// | `InvalidOperatorTable` | Internal | Critical |
/// | `InvalidSearchRequest` | Client | Warning |
///
/// Use the constructor methods, which log the error on creation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The expression uses an operator the target backend has no token for.
    ///
    /// Usually a filter written for one backend used against another.
    #[error("Not supported expression type: {operator} for backend {backend}")]
    UnsupportedOperator {
        /// The operator that could not be mapped.
        operator: ExpressionType,
        /// The backend whose operator table lacks it.
        backend: String,
    },

    /// The expression tree breaks a well-typedness rule.
    ///
    /// Examples: `IN` with a scalar value, an empty key, a non-finite
    /// float, or a key the backend grammar cannot carry.
    #[error("Malformed filter expression: {message}")]
    MalformedExpression {
        /// Description of the violated rule.
        message: String,
    },

    /// The requested backend is not one this crate converts for.
    ///
    /// Supported backends: "mongodb", "elasticsearch", "sql", "weaviate"
    #[error("Backend not supported: {backend}")]
    UnsupportedBackend {
        /// The backend name that was requested.
        backend: String,
    },

    /// Backend configuration is invalid or incomplete.
    #[error("Backend configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// A backend operator table failed its construction checks.
    #[error("Invalid operator table for {backend}: {message}")]
    InvalidOperatorTable {
        /// The backend owning the table.
        backend: String,
        /// What is wrong with it.
        message: String,
    },

    /// Search request parameters are out of range.
    #[error("Invalid search request: {message}")]
    InvalidSearchRequest {
        /// Description of the invalid parameter.
        message: String,
    },
}

impl FilterError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedOperator { .. } => ErrorCategory::Client,
            Self::MalformedExpression { .. } => ErrorCategory::Client,
            Self::UnsupportedBackend { .. } => ErrorCategory::Client,
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::InvalidOperatorTable { .. } => ErrorCategory::Internal,
            Self::InvalidSearchRequest { .. } => ErrorCategory::Client,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedOperator { .. } => ErrorSeverity::Error,
            Self::MalformedExpression { .. } => ErrorSeverity::Warning,
            Self::UnsupportedBackend { .. } => ErrorSeverity::Error,
            Self::ConfigurationError { .. } => ErrorSeverity::Error,
            Self::InvalidOperatorTable { .. } => ErrorSeverity::Critical,
            Self::InvalidSearchRequest { .. } => ErrorSeverity::Warning,
        }
    }

    /// Always `false`: conversion failures are deterministic.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Convert to a user-friendly message suitable for display.
    ///
    /// ```rust
    /// use vector_filter::{ExpressionType, FilterError};
    ///
    /// let err = FilterError::unsupported_operator(ExpressionType::Nin, "weaviate");
    /// assert_eq!(
    ///     err.user_message(),
    ///     "The weaviate vector store does not support the NIN filter operator"
    /// );
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedOperator { operator, backend } => {
                format!("The {backend} vector store does not support the {operator} filter operator")
            }
            Self::MalformedExpression { .. } => {
                "The metadata filter is not valid. Please check its syntax".to_string()
            }
            Self::UnsupportedBackend { .. } => {
                "The requested vector store is not supported".to_string()
            }
            Self::ConfigurationError { .. } => {
                "Vector store configuration issue. Please check your settings".to_string()
            }
            Self::InvalidOperatorTable { .. } => {
                "Internal filter conversion error".to_string()
            }
            Self::InvalidSearchRequest { .. } => {
                "The search request parameters are not valid".to_string()
            }
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    /// Create an unsupported operator error (logs at ERROR level).
    pub fn unsupported_operator(operator: ExpressionType, backend: impl Into<String>) -> Self {
        let backend = backend.into();
        log_error!(
            operator = %operator,
            backend = %backend,
            error_type = "unsupported_operator",
            "Filter operator not supported by backend"
        );
        Self::UnsupportedOperator { operator, backend }
    }

    pub fn malformed_expression(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "malformed_expression",
            message = %message,
            "Filter expression failed validation"
        );
        Self::MalformedExpression { message }
    }

    pub fn unsupported_backend(backend: impl Into<String>) -> Self {
        let backend = backend.into();
        log_error!(
            backend = %backend,
            error_type = "unsupported_backend",
            "Unsupported vector store backend requested"
        );
        Self::UnsupportedBackend { backend }
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Backend configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn invalid_operator_table(backend: impl Into<String>, message: impl Into<String>) -> Self {
        let backend = backend.into();
        let message = message.into();
        log_error!(
            backend = %backend,
            error_type = "invalid_operator_table",
            message = %message,
            "Operator table rejected at construction"
        );
        Self::InvalidOperatorTable { backend, message }
    }

    pub fn invalid_search_request(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "invalid_search_request",
            message = %message,
            "Search request validation failed"
        );
        Self::InvalidSearchRequest { message }
    }
}
