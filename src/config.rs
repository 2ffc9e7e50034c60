use crate::error::{FilterError, FilterResult};
use crate::logging::log_debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Debug;

static SQL_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("static SQL identifier pattern")
});

static GRAPHQL_NAME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([_A-Za-z][_0-9A-Za-z]*)?$").expect("static GraphQL name pattern"));

/// Trait for backend-specific converter configuration
pub trait BackendConfig: Send + Sync + Debug + Any {
    /// Get the backend name
    fn backend_name(&self) -> &'static str;

    /// Field, column or prefix metadata keys are namespaced under
    fn metadata_namespace(&self) -> &str;

    /// Validate backend configuration
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ConfigurationError`] if a value cannot be
    /// embedded safely in the backend's query syntax.
    fn validate(&self) -> FilterResult<()>;

    /// Helper for downcasting to concrete config types
    fn as_any(&self) -> &dyn Any;
}

/// Converter configuration for the selected backend
#[derive(Debug)]
pub struct FilterConfig {
    pub backend: Box<dyn BackendConfig>,
}

impl FilterConfig {
    /// Clone backend config by downcasting to concrete type
    fn clone_backend(&self) -> Box<dyn BackendConfig> {
        let any_ref = self.backend.as_any();

        if let Some(config) = any_ref.downcast_ref::<MongoDbConfig>() {
            return Box::new(config.clone());
        }
        if let Some(config) = any_ref.downcast_ref::<ElasticsearchConfig>() {
            return Box::new(config.clone());
        }
        if let Some(config) = any_ref.downcast_ref::<SqlConfig>() {
            return Box::new(config.clone());
        }
        if let Some(config) = any_ref.downcast_ref::<WeaviateConfig>() {
            return Box::new(config.clone());
        }

        unreachable!("Unknown backend config type - all backend types should be handled")
    }
}

impl Clone for FilterConfig {
    fn clone(&self) -> Self {
        Self {
            backend: self.clone_backend(),
        }
    }
}

/// MongoDB Atlas configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoDbConfig {
    /// Document field holding the metadata sub-document
    pub metadata_field: String,
    /// Push `NOT` down to the comparisons instead of rejecting it
    pub rewrite_negation: bool,
    /// Atlas vector search index name
    pub index_name: String,
    /// Document field holding the embedding
    pub embedding_path: String,
    /// Candidates considered by `$vectorSearch` before the limit applies
    pub num_candidates: usize,
}

impl Default for MongoDbConfig {
    fn default() -> Self {
        Self {
            metadata_field: "metadata".to_string(),
            rewrite_negation: false,
            index_name: "vector_index".to_string(),
            embedding_path: "embedding".to_string(),
            num_candidates: 200,
        }
    }
}

impl BackendConfig for MongoDbConfig {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn metadata_namespace(&self) -> &str {
        &self.metadata_field
    }

    fn validate(&self) -> FilterResult<()> {
        if self.index_name.is_empty() {
            return Err(FilterError::configuration_error(
                "MongoDB vector index name is required",
            ));
        }
        if self.embedding_path.is_empty() {
            return Err(FilterError::configuration_error(
                "MongoDB embedding path is required",
            ));
        }
        if self.num_candidates == 0 {
            return Err(FilterError::configuration_error(
                "MongoDB num_candidates must be at least 1",
            ));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Elasticsearch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Object field holding document metadata
    pub metadata_field: String,
    /// Backslash-escape Lucene reserved characters and whitespace in values
    pub escape_reserved_characters: bool,
    /// Dense vector field used by knn search
    pub embedding_field: String,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            metadata_field: "metadata".to_string(),
            escape_reserved_characters: true,
            embedding_field: "embedding".to_string(),
        }
    }
}

impl BackendConfig for ElasticsearchConfig {
    fn backend_name(&self) -> &'static str {
        "elasticsearch"
    }

    fn metadata_namespace(&self) -> &str {
        &self.metadata_field
    }

    fn validate(&self) -> FilterResult<()> {
        if self.embedding_field.is_empty() {
            return Err(FilterError::configuration_error(
                "Elasticsearch embedding field is required",
            ));
        }
        if self.metadata_field.chars().any(char::is_whitespace) {
            return Err(FilterError::configuration_error(format!(
                "Elasticsearch metadata field '{}' must not contain whitespace",
                self.metadata_field
            )));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// SQL (JSON metadata column) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlConfig {
    /// Column holding the metadata JSON document
    pub metadata_column: String,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            metadata_column: "metadata".to_string(),
        }
    }
}

impl BackendConfig for SqlConfig {
    fn backend_name(&self) -> &'static str {
        "sql"
    }

    fn metadata_namespace(&self) -> &str {
        &self.metadata_column
    }

    fn validate(&self) -> FilterResult<()> {
        if !SQL_IDENTIFIER.is_match(&self.metadata_column) {
            return Err(FilterError::configuration_error(format!(
                "SQL metadata column '{}' is not a plain identifier",
                self.metadata_column
            )));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Weaviate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaviateConfig {
    /// Prefix of the class properties that carry metadata
    pub property_prefix: String,
    /// Push `NOT` down to the comparisons instead of rejecting it
    pub rewrite_negation: bool,
    /// Expand `IN`/`NIN` into `Equal`/`NotEqual` chains instead of rejecting `NIN`
    pub expand_membership: bool,
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            property_prefix: "meta_".to_string(),
            rewrite_negation: false,
            expand_membership: false,
        }
    }
}

impl BackendConfig for WeaviateConfig {
    fn backend_name(&self) -> &'static str {
        "weaviate"
    }

    fn metadata_namespace(&self) -> &str {
        &self.property_prefix
    }

    fn validate(&self) -> FilterResult<()> {
        if !GRAPHQL_NAME_PREFIX.is_match(&self.property_prefix) {
            return Err(FilterError::configuration_error(format!(
                "Weaviate property prefix '{}' is not a valid GraphQL name",
                self.property_prefix
            )));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl FilterConfig {
    /// Create configuration for a specific backend
    /// This is the main factory method for creating backend configurations
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedBackend`] if the backend name is not recognized.
    /// Supported backends are: "mongodb", "elasticsearch", "sql", "weaviate".
    ///
    /// Returns [`FilterError::ConfigurationError`] if the resulting
    /// configuration fails validation.
    pub fn create_backend(
        backend_name: &str,
        metadata_namespace: Option<String>,
    ) -> FilterResult<Self> {
        log_debug!(
            backend = %backend_name,
            has_metadata_namespace = metadata_namespace.is_some(),
            "Creating backend configuration"
        );

        let backend: Box<dyn BackendConfig> = match backend_name.to_lowercase().as_str() {
            "mongodb" | "mongodb-atlas" => {
                let mut config = MongoDbConfig::default();
                if let Some(field) = metadata_namespace {
                    config.metadata_field = field;
                }
                Box::new(config)
            }
            "elasticsearch" => {
                let mut config = ElasticsearchConfig::default();
                if let Some(field) = metadata_namespace {
                    config.metadata_field = field;
                }
                Box::new(config)
            }
            "sql" | "hana" => {
                let mut config = SqlConfig::default();
                if let Some(column) = metadata_namespace {
                    config.metadata_column = column;
                }
                Box::new(config)
            }
            "weaviate" => {
                let mut config = WeaviateConfig::default();
                if let Some(prefix) = metadata_namespace {
                    config.property_prefix = prefix;
                }
                Box::new(config)
            }
            _ => return Err(FilterError::unsupported_backend(backend_name)),
        };

        backend.validate()?;

        Ok(Self { backend })
    }

    /// Load configuration from environment variables
    /// This is the ONLY method that should access environment variables
    ///
    /// - `VECTOR_STORE_BACKEND`: backend name, defaults to "mongodb"
    /// - `FILTER_METADATA_FIELD`: metadata field, column or prefix override
    /// - `FILTER_REWRITE_NEGATION`: "true"/"false", for backends without `NOT`
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedBackend`] if `VECTOR_STORE_BACKEND`
    /// names an unknown backend.
    ///
    /// Returns [`FilterError::ConfigurationError`] if a variable holds an
    /// invalid value or validation fails.
    pub fn from_env() -> FilterResult<Self> {
        let backend_name =
            std::env::var("VECTOR_STORE_BACKEND").unwrap_or_else(|_| "mongodb".to_string());
        let metadata_namespace = std::env::var("FILTER_METADATA_FIELD").ok();
        let rewrite_negation = Self::bool_from_env("FILTER_REWRITE_NEGATION")?;

        log_debug!(
            target_backend = %backend_name,
            "Loading filter configuration from environment"
        );

        let mut config = Self::create_backend(&backend_name, metadata_namespace)?;
        if let Some(rewrite) = rewrite_negation {
            config = config.with_rewrite_negation(rewrite);
        }

        log_debug!(
            backend = config.backend.backend_name(),
            metadata_namespace = config.backend.metadata_namespace(),
            "Filter configuration loaded and validated"
        );

        Ok(config)
    }

    /// Set negation push-down on backends whose operator table lacks `NOT`
    fn with_rewrite_negation(mut self, rewrite: bool) -> Self {
        let any_ref = self.backend.as_any();

        let replacement: Option<Box<dyn BackendConfig>> =
            if let Some(config) = any_ref.downcast_ref::<MongoDbConfig>() {
                Some(Box::new(MongoDbConfig {
                    rewrite_negation: rewrite,
                    ..config.clone()
                }))
            } else if let Some(config) = any_ref.downcast_ref::<WeaviateConfig>() {
                Some(Box::new(WeaviateConfig {
                    rewrite_negation: rewrite,
                    ..config.clone()
                }))
            } else {
                None
            };

        match replacement {
            Some(backend) => self.backend = backend,
            None => log_debug!(
                backend = self.backend.backend_name(),
                "Backend expresses NOT natively, ignoring FILTER_REWRITE_NEGATION"
            ),
        }

        self
    }

    fn bool_from_env(name: &str) -> FilterResult<Option<bool>> {
        match std::env::var(name) {
            Ok(raw) => raw.trim().to_lowercase().parse::<bool>().map(Some).map_err(|_| {
                FilterError::configuration_error(format!(
                    "{name} must be 'true' or 'false', got '{raw}'"
                ))
            }),
            Err(_) => Ok(None),
        }
    }
}
