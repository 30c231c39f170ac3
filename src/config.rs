//! Configuration management for mxtally.
//!
//! Defaults, then environment variables, then command-line flags, in
//! increasing precedence, with a validation pass before the pipeline runs.

#![allow(dead_code)]

use std::time::Duration;

use crate::app::PipelineOptions;
use crate::cli::Cli;
use crate::resolver::ResolveOptions;

/// Main configuration structure.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Network operation settings
    pub network: NetworkConfig,

    /// Pipeline policy settings
    pub pipeline: PipelineConfig,
}

/// Network-related configuration options.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Timeout for a single MX lookup
    pub lookup_timeout: Duration,

    /// Maximum concurrent MX lookups
    pub max_concurrent_lookups: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(5),
            max_concurrent_lookups: 16,
        }
    }
}

/// Pipeline policy configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Abort on a malformed address reaching domain extraction.
    pub strict: bool,
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("MXTALLY_LOOKUP_TIMEOUT_SECS")
            && let Ok(secs) = timeout.parse::<u64>()
        {
            config.network.lookup_timeout = Duration::from_secs(secs);
        }

        if let Ok(concurrent) = std::env::var("MXTALLY_MAX_CONCURRENT")
            && let Ok(n) = concurrent.parse::<usize>()
        {
            config.network.max_concurrent_lookups = n;
        }

        if let Ok(strict) = std::env::var("MXTALLY_STRICT") {
            config.pipeline.strict = strict.eq_ignore_ascii_case("true")
                || strict.eq_ignore_ascii_case("1")
                || strict.eq_ignore_ascii_case("yes");
        }

        config
    }

    /// Merge with CLI arguments, giving CLI precedence.
    pub fn merge_with_cli(&mut self, cli: &Cli) {
        if let Some(secs) = cli.lookup_timeout {
            self.network.lookup_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = cli.max_concurrent {
            self.network.max_concurrent_lookups = n;
        }
        if cli.strict {
            self.pipeline.strict = true;
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.lookup_timeout.as_secs() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.lookup_timeout".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.network.max_concurrent_lookups == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.max_concurrent_lookups".to_string(),
                value: "0".to_string(),
                reason: "At least one concurrent lookup is required".to_string(),
            });
        }

        Ok(())
    }

    /// Resolver tunables derived from this configuration.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            lookup_timeout: self.network.lookup_timeout,
            max_concurrent: self.network.max_concurrent_lookups,
        }
    }

    /// Pipeline tunables derived from this configuration.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            strict: self.pipeline.strict,
            resolve: self.resolve_options(),
        }
    }
}

/// Configuration-related errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value '{}' for '{}': {}", value, field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.network.max_concurrent_lookups, 16);
        assert!(!config.pipeline.strict);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.network.lookup_timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());

        config.network.lookup_timeout = Duration::from_secs(5);
        config.network.max_concurrent_lookups = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_loading() {
        unsafe {
            env::set_var("MXTALLY_LOOKUP_TIMEOUT_SECS", "15");
            env::set_var("MXTALLY_MAX_CONCURRENT", "4");
            env::set_var("MXTALLY_STRICT", "true");
        }

        let config = Config::from_env();
        assert_eq!(config.network.lookup_timeout, Duration::from_secs(15));
        assert_eq!(config.network.max_concurrent_lookups, 4);
        assert!(config.pipeline.strict);

        // Clean up
        unsafe {
            env::remove_var("MXTALLY_LOOKUP_TIMEOUT_SECS");
            env::remove_var("MXTALLY_MAX_CONCURRENT");
            env::remove_var("MXTALLY_STRICT");
        }
    }

    #[test]
    fn test_cli_precedence() {
        let cli = Cli::parse_from([
            "mxtally",
            "--lookup-timeout",
            "2",
            "--max-concurrent",
            "8",
            "--strict",
        ]);
        let mut config = Config::default();
        config.merge_with_cli(&cli);
        assert_eq!(config.network.lookup_timeout, Duration::from_secs(2));
        assert_eq!(config.network.max_concurrent_lookups, 8);
        assert!(config.pipeline.strict);

        let opts = config.pipeline_options();
        assert!(opts.strict);
        assert_eq!(opts.resolve.max_concurrent, 8);
    }
}
