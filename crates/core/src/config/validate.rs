use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog base URL is an http(s) URL
/// - Batch size and cache capacity are non-zero
/// - Server port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.catalog.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.base_url cannot be empty".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "catalog.base_url must start with http:// or https:// (got '{}')",
            base_url
        )));
    }

    if config.catalog.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.batch_size cannot be 0".to_string(),
        ));
    }

    if config.search.cache_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "search.cache_capacity cannot be 0".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}
