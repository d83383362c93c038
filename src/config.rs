//! Planner configuration using Figment
//!
//! Configuration is layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. `step_planner.toml` (or a path given explicitly)
//! 3. Environment variables prefixed with `STEP_PLANNER_`, `__` separating
//!    nested keys
//!
//! ```text
//! STEP_PLANNER_APPLICATION__LOG_LEVEL=debug
//! STEP_PLANNER_KEYS__STRATEGY=sequential
//! STEP_PLANNER_OUTPUT__PRETTY=false
//! ```
//!
//! # Example
//!
//! ```no_run
//! use step_planner::config::PlannerConfig;
//!
//! let config = PlannerConfig::load()?;
//! println!("Log level: {}", config.application.log_level);
//! # Ok::<(), step_planner::error::PlannerError>(())
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PlannerError, PlannerResult};
use crate::keys::{KeyGenerator, SequentialKeyGenerator, UuidKeyGenerator};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "step_planner.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "STEP_PLANNER_";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Command key generation
    #[serde(default)]
    pub keys: KeyConfig,
    /// JSON output formatting
    #[serde(default)]
    pub output: OutputConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "step_planner".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// How command keys are generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// Random v4 UUIDs
    #[default]
    Uuid,
    /// `<prefix><n>` counting from zero
    Sequential,
}

/// Command key configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Generation strategy
    pub strategy: KeyStrategy,
    /// Prefix for sequential keys
    pub prefix: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            strategy: KeyStrategy::Uuid,
            prefix: "cmd-".to_string(),
        }
    }
}

impl KeyConfig {
    /// Build the configured generator.
    pub fn generator(&self) -> Box<dyn KeyGenerator> {
        match self.strategy {
            KeyStrategy::Uuid => Box::new(UuidKeyGenerator),
            KeyStrategy::Sequential => Box::new(SequentialKeyGenerator::new(self.prefix.clone())),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl PlannerConfig {
    /// Load from `step_planner.toml` (if present) and the environment.
    pub fn load() -> PlannerResult<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from a specific file path and the environment, then validate.
    ///
    /// A missing file contributes nothing; defaults and environment
    /// variables still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered provider stack.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    ///
    /// Checks:
    /// - Log level is valid (trace, debug, info, warn, error)
    /// - Sequential keys have a non-empty prefix
    pub fn validate(&self) -> PlannerResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(PlannerError::Validation(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.keys.strategy == KeyStrategy::Sequential && self.keys.prefix.is_empty() {
            return Err(PlannerError::Validation(
                "Sequential keys require a non-empty 'prefix'".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PlannerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = PlannerConfig::default();
        config.application.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid log_level 'verbose'"));
    }

    #[test]
    fn test_empty_sequential_prefix() {
        let mut config = PlannerConfig::default();
        config.keys.strategy = KeyStrategy::Sequential;
        config.keys.prefix.clear();
        assert!(matches!(
            config.validate(),
            Err(PlannerError::Validation(_))
        ));
    }

    #[test]
    fn test_sequential_generator_uses_prefix() {
        let keys = KeyConfig {
            strategy: KeyStrategy::Sequential,
            prefix: "step-".to_string(),
        };
        let mut generator = keys.generator();
        assert_eq!(generator.next_key(), "step-0");
        assert_eq!(generator.next_key(), "step-1");
    }
}
