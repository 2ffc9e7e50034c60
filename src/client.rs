use crate::config::{
    ElasticsearchConfig, FilterConfig, MongoDbConfig, SqlConfig, WeaviateConfig,
};
use crate::converters::{
    ElasticsearchFilterConverter, MongoDbAtlasFilterConverter, SqlFilterConverter,
    WeaviateFilterConverter,
};
use crate::core_types::converter::{FilterExpressionConverter, OperatorTable};
use crate::core_types::expression::{ComparisonOperator, Expression, Key, LogicalOperator, Value};
use crate::error::{FilterError, FilterResult};
use crate::logging::log_debug;
use std::borrow::Cow;

/// Internal backend enum for UnifiedFilterConverter
#[derive(Debug, Clone)]
enum Backend {
    MongoDb(MongoDbAtlasFilterConverter),
    Elasticsearch(ElasticsearchFilterConverter),
    Sql(SqlFilterConverter),
    Weaviate(WeaviateFilterConverter),
}

/// Unified converter that implements FilterExpressionConverter
/// This is the primary interface when the backend is chosen by configuration
#[derive(Debug, Clone)]
pub struct UnifiedFilterConverter {
    backend: Backend,
}

impl UnifiedFilterConverter {
    /// Factory method to create UnifiedFilterConverter for a named backend
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedBackend`] if the backend name is not recognized.
    /// Supported backends are: "mongodb", "elasticsearch", "sql", "weaviate".
    ///
    /// Returns [`FilterError::ConfigurationError`] if:
    /// - The backend configuration type doesn't match the backend name
    /// - Configuration validation fails
    pub fn create(backend_name: &str, config: &FilterConfig) -> FilterResult<Self> {
        let any_ref = config.backend.as_any();
        let mismatch = || {
            FilterError::configuration_error(format!(
                "Configuration for '{}' cannot build a '{}' converter",
                config.backend.backend_name(),
                backend_name
            ))
        };

        let backend = match backend_name {
            "mongodb" => Backend::MongoDb(MongoDbAtlasFilterConverter::new(
                any_ref
                    .downcast_ref::<MongoDbConfig>()
                    .ok_or_else(mismatch)?
                    .clone(),
            )?),
            "elasticsearch" => Backend::Elasticsearch(ElasticsearchFilterConverter::new(
                any_ref
                    .downcast_ref::<ElasticsearchConfig>()
                    .ok_or_else(mismatch)?
                    .clone(),
            )?),
            "sql" => Backend::Sql(SqlFilterConverter::new(
                any_ref
                    .downcast_ref::<SqlConfig>()
                    .ok_or_else(mismatch)?
                    .clone(),
            )?),
            "weaviate" => Backend::Weaviate(WeaviateFilterConverter::new(
                any_ref
                    .downcast_ref::<WeaviateConfig>()
                    .ok_or_else(mismatch)?
                    .clone(),
            )?),
            _ => return Err(FilterError::unsupported_backend(backend_name)),
        };

        log_debug!(backend = backend_name, "UnifiedFilterConverter created");

        Ok(Self { backend })
    }

    /// Create a converter using environment variables for configuration
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ConfigurationError`] or
    /// [`FilterError::UnsupportedBackend`] as [`FilterConfig::from_env`] does.
    pub fn from_env() -> FilterResult<Self> {
        let config = FilterConfig::from_env()?;
        Self::from_config(&config)
    }

    /// Create a converter for the backend a FilterConfig describes
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ConfigurationError`] if the configuration fails validation.
    pub fn from_config(config: &FilterConfig) -> FilterResult<Self> {
        let backend_name = config.backend.backend_name();

        log_debug!(
            target_backend = backend_name,
            "Creating UnifiedFilterConverter from config"
        );

        Self::create(backend_name, config)
    }

    /// The MongoDB converter, when that is the configured backend
    pub fn as_mongodb(&self) -> Option<&MongoDbAtlasFilterConverter> {
        match &self.backend {
            Backend::MongoDb(converter) => Some(converter),
            _ => None,
        }
    }

    /// The Elasticsearch converter, when that is the configured backend
    pub fn as_elasticsearch(&self) -> Option<&ElasticsearchFilterConverter> {
        match &self.backend {
            Backend::Elasticsearch(converter) => Some(converter),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn FilterExpressionConverter {
        match &self.backend {
            Backend::MongoDb(converter) => converter,
            Backend::Elasticsearch(converter) => converter,
            Backend::Sql(converter) => converter,
            Backend::Weaviate(converter) => converter,
        }
    }
}

/// Implement FilterExpressionConverter for UnifiedFilterConverter
/// Just delegates to the underlying backend, rewrites and grammar checks included
impl FilterExpressionConverter for UnifiedFilterConverter {
    fn backend_name(&self) -> &'static str {
        self.inner().backend_name()
    }

    fn operator_table(&self) -> &OperatorTable {
        self.inner().operator_table()
    }

    fn match_all(&self) -> &'static str {
        self.inner().match_all()
    }

    fn prepare<'a>(&self, expression: &'a Expression) -> FilterResult<Cow<'a, Expression>> {
        self.inner().prepare(expression)
    }

    fn validate_comparison(
        &self,
        operator: ComparisonOperator,
        key: &Key,
        value: &Value,
    ) -> FilterResult<()> {
        self.inner().validate_comparison(operator, key, value)
    }

    fn write_compound(
        &self,
        operator: LogicalOperator,
        left: &Expression,
        right: &Expression,
        out: &mut String,
    ) -> FilterResult<()> {
        self.inner().write_compound(operator, left, right, out)
    }

    fn write_comparison(
        &self,
        operator: ComparisonOperator,
        key: &Key,
        value: &Value,
        out: &mut String,
    ) -> FilterResult<()> {
        self.inner().write_comparison(operator, key, value, out)
    }

    fn write_key(&self, key: &Key, out: &mut String) -> FilterResult<()> {
        self.inner().write_key(key, out)
    }

    fn write_value(&self, value: &Value, out: &mut String) -> FilterResult<()> {
        self.inner().write_value(value, out)
    }

    fn write_group(&self, content: &Expression, out: &mut String) -> FilterResult<()> {
        self.inner().write_group(content, out)
    }

    fn write_not(&self, operand: &Expression, out: &mut String) -> FilterResult<()> {
        self.inner().write_not(operand, out)
    }

    fn convert_expression(&self, expression: Option<&Expression>) -> FilterResult<String> {
        self.inner().convert_expression(expression)
    }
}
