//! Configuration management
//!
//! Loads and validates the node configuration

use crate::error::{Result, ServiceError};
use crate::types::ServiceConfig;
use config::{Config, File};
use std::path::Path;

/// Load the node configuration from a file
///
/// # Parameters
/// - `config_path`: configuration file path (TOML, JSON or YAML)
///
/// Fields missing from the file fall back to [`ServiceConfig::default`].
///
/// # Example
/// ```no_run
/// use signer_node::config::load_config;
///
/// let config = load_config("config.toml").expect("Failed to load config");
/// println!("Listening on port {}", config.port);
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<ServiceConfig> {
    let config = Config::builder()
        .add_source(File::from(config_path.as_ref()))
        .build()
        .map_err(|e| ServiceError::Config(format!("Failed to load config file: {}", e)))?;

    let service_config: ServiceConfig = config
        .try_deserialize()
        .map_err(|e| ServiceError::Config(format!("Failed to parse config: {}", e)))?;

    validate_config(&service_config)?;

    Ok(service_config)
}

/// Load configuration from environment variables (container deployments)
///
/// Variable prefix: `SIGNER_`
/// Example: `SIGNER_PORT`, `SIGNER_MAX_UPLOAD_BYTES`
pub fn load_config_from_env() -> Result<ServiceConfig> {
    let config = Config::builder()
        .add_source(config::Environment::with_prefix("SIGNER").try_parsing(true))
        .build()
        .map_err(|e| ServiceError::Config(format!("Failed to load env vars: {}", e)))?;

    let service_config: ServiceConfig = config
        .try_deserialize()
        .map_err(|e| ServiceError::Config(format!("Failed to parse env config: {}", e)))?;

    validate_config(&service_config)?;

    Ok(service_config)
}

/// Validate configuration
///
/// Checks:
/// - port is non-zero
/// - timeouts and size limits are non-zero
/// - storage paths are set
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    if config.port == 0 {
        return Err(ServiceError::Config(
            "port must be greater than 0".to_string(),
        ));
    }

    if config.fetch_timeout_secs == 0 {
        return Err(ServiceError::Config(
            "fetch_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.max_fetch_bytes == 0 || config.max_upload_bytes == 0 {
        return Err(ServiceError::Config(
            "max_fetch_bytes and max_upload_bytes must be greater than 0".to_string(),
        ));
    }

    if config.storage_dir.trim().is_empty() {
        return Err(ServiceError::Config(
            "storage_dir must not be empty".to_string(),
        ));
    }

    if config.document_index_path.trim().is_empty() {
        return Err(ServiceError::Config(
            "document_index_path must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = ServiceConfig::default();
        config.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_limits() {
        let mut config = ServiceConfig::default();
        config.max_upload_bytes = 0;
        assert!(validate_config(&config).is_err());

        let mut config = ServiceConfig::default();
        config.fetch_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_storage_dir() {
        let mut config = ServiceConfig::default();
        config.storage_dir = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 9090").unwrap();
        writeln!(file, "fetch_timeout_secs = 5").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.fetch_timeout_secs, 5);
        assert!(config.max_upload_bytes > 0);
    }

    #[test]
    fn test_load_from_env() {
        // Only this test touches SIGNER_* variables
        std::env::set_var("SIGNER_PORT", "9191");
        std::env::set_var("SIGNER_FETCH_TIMEOUT_SECS", "7");
        std::env::set_var("SIGNER_STORAGE_DIR", "/srv/signer/storage");

        let config = load_config_from_env();

        std::env::set_var("SIGNER_PORT", "0");
        let rejected = load_config_from_env();

        for key in ["SIGNER_PORT", "SIGNER_FETCH_TIMEOUT_SECS", "SIGNER_STORAGE_DIR"] {
            std::env::remove_var(key);
        }

        let config = config.unwrap();
        assert_eq!(config.port, 9191);
        assert_eq!(config.fetch_timeout_secs, 7);
        assert_eq!(config.storage_dir, "/srv/signer/storage");
        assert!(config.max_upload_bytes > 0);

        assert!(matches!(rejected, Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 0").unwrap();

        assert!(load_config(file.path()).is_err());
    }
}
