use crate::config::types::{BackendKind, Config, EngineConfig, ProberConfig, StorageConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_prober_config(&config.prober)?;
    validate_engine_config(&config.engine)?;
    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.backend != BackendKind::Memory && config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "storage path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates prober configuration
fn validate_prober_config(config: &ProberConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 60 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 60, got {}",
            config.timeout_secs
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.recovery_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "recovery-timeout-secs must be >= 1, got {}",
            config.recovery_timeout_secs
        )));
    }

    Ok(())
}
