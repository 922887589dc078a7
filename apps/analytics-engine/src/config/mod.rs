//! Configuration module for the analytics engine.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the engine components.
//!
//! # Usage
//!
//! ```rust,ignore
//! use analytics_engine::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Access configuration values
//! println!("horizon: {}", config.projection.horizon_days);
//! ```

mod observability;
mod pricing;
mod projection;
mod roll;
mod scheduler;
mod strategies;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::analytics::{Target, default_targets};

pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};
pub use pricing::PricingConfig;
pub use projection::ProjectionConfig;
pub use roll::RollConfig;
pub use scheduler::SchedulerConfig;
pub use strategies::StrategiesConfig;

/// Default configuration path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pricing model configuration.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Theta projection and stress test configuration.
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Roll analysis thresholds.
    #[serde(default)]
    pub roll: RollConfig,
    /// Strategy rule table override.
    #[serde(default)]
    pub strategies: StrategiesConfig,
    /// Profit and loss targets per strategy.
    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,
    /// Recompute scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            projection: ProjectionConfig::default(),
            roll: RollConfig::default(),
            strategies: StrategiesConfig::default(),
            targets: default_targets(),
            scheduler: SchedulerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration, falling back to defaults when the file does not exist.
///
/// # Errors
///
/// Returns a `ConfigError` if an existing file cannot be read, parsed, or validated.
pub fn load_config_or_default(path: Option<&str>) -> Result<Config, ConfigError> {
    match load_config(path) {
        Err(ConfigError::ReadError { path, source })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::info!(path = %path, "Config file not found, using defaults");
            Ok(Config::default())
        }
        other => other,
    }
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` naming the first invalid value.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid = |message: &str| Err(ConfigError::ValidationError(message.to_string()));

    // Pricing
    let pricing = &config.pricing;
    if !(0.0..=1.0).contains(&pricing.risk_free_rate) {
        return invalid("pricing.risk_free_rate must be between 0.0 and 1.0");
    }
    if !pricing.default_iv.is_finite() || pricing.default_iv <= 0.0 {
        return invalid("pricing.default_iv must be positive");
    }
    if !pricing.min_dte_floor.is_finite() || pricing.min_dte_floor <= 0.0 {
        return invalid("pricing.min_dte_floor must be positive");
    }

    // Projection
    if config.projection.horizon_days == 0 {
        return invalid("projection.horizon_days must be at least 1");
    }
    if config.projection.scenario_moves_pct.iter().any(|m| !m.is_finite() || *m <= -100.0) {
        return invalid("projection.scenario_moves_pct must be finite and greater than -100");
    }

    // Roll
    let roll = &config.roll;
    if roll.late_stage_dte < 0 {
        return invalid("roll.late_stage_dte must not be negative");
    }
    if roll.credit_min_reward_to_risk < 0.0 || roll.debit_min_reward_to_risk < 0.0 {
        return invalid("roll reward:risk thresholds must not be negative");
    }
    if roll.reward_to_risk_cap <= 0.0 {
        return invalid("roll.reward_to_risk_cap must be positive");
    }

    // Targets
    let mut names = HashSet::new();
    for target in &config.targets {
        if !names.insert(target.strategy_name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate target for strategy '{}'",
                target.strategy_name
            )));
        }
        if target.profit_target_pct <= 0.0 || target.loss_target_pct <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "targets for '{}' must be positive",
                target.strategy_name
            )));
        }
    }

    // Strategy table
    config
        .strategies
        .table()
        .map_err(|e| ConfigError::ValidationError(format!("strategies: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::StrategyTable;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!((config.pricing.risk_free_rate - 0.045).abs() < f64::EPSILON);
        assert!((config.pricing.default_iv - 0.30).abs() < f64::EPSILON);
        assert_eq!(config.projection.horizon_days, 45);
        assert_eq!(config.projection.scenario_moves_pct.len(), 13);
        assert!(config.roll.enabled);
        assert_eq!(config.roll.late_stage_dte, 21);
        assert_eq!(config.targets.len(), 4);
        assert_eq!(config.scheduler.debounce_ms, 2000);
        assert_eq!(config.observability.logging.format, LogFormat::Json);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_empty_config() {
        let config = match load_config_from_string("{}") {
            Ok(c) => c,
            Err(e) => panic!("should load empty config: {e}"),
        };
        assert_eq!(config.projection.horizon_days, 45);
        assert_eq!(config.strategies.table().unwrap(), StrategyTable::standard());
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "level: ${ANALYTICS_CONFIG_TEST_NONEXISTENT_VAR:-debug}";
        assert_eq!(interpolate_env_vars(input), "level: debug");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);
        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "level: ${ANALYTICS_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "level: ");
    }

    #[test]
    fn test_validation_invalid_risk_free_rate() {
        let yaml = "pricing:\n  risk_free_rate: 1.5\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for invalid risk_free_rate");
        };
        assert!(err.to_string().contains("risk_free_rate"));
    }

    #[test]
    fn test_validation_non_positive_iv() {
        let yaml = "pricing:\n  default_iv: 0\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero default_iv");
        };
        assert!(err.to_string().contains("default_iv"));
    }

    #[test]
    fn test_validation_zero_horizon() {
        let yaml = "projection:\n  horizon_days: 0\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero horizon");
        };
        assert!(err.to_string().contains("horizon_days"));
    }

    #[test]
    fn test_validation_duplicate_targets() {
        let yaml = r#"
targets:
  - strategy_name: "Bull Put Spread"
    profit_target_pct: 50
    loss_target_pct: 200
  - strategy_name: "Bull Put Spread"
    profit_target_pct: 60
    loss_target_pct: 150
"#;
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for duplicate targets");
        };
        assert!(err.to_string().contains("duplicate target"));
    }

    #[test]
    fn test_validation_unknown_priority() {
        let yaml = "strategies:\n  priority: [\"Iron Condor\", \"Widow Maker\"]\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for unknown priority entry");
        };
        assert!(err.to_string().contains("Widow Maker"));
    }

    #[test]
    fn test_priority_reorders_builtin_rules() {
        let yaml = "strategies:\n  priority: [\"Cash Secured Put\"]\n";
        let config = load_config_from_string(yaml).unwrap();
        let table = config.strategies.table().unwrap();
        assert_eq!(table.position("Cash Secured Put"), Some(0));
        assert!(table.position("Short Put").is_some());
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
pricing:
  risk_free_rate: 0.04
  default_iv: 0.25
  min_dte_floor: 1.0

projection:
  horizon_days: 30
  scenario_moves_pct: [-5, 0, 5]

roll:
  enabled: false
  late_stage_dte: 14

strategies:
  definitions:
    - name: "Long Call"
      leg_count: 1
      calls: 1
      option_side: long
    - name: "Short Call"
      leg_count: 1
      calls: 1
      option_side: short
  priority: ["Short Call"]

targets:
  - strategy_name: "Bull Put Spread"
    profit_target_pct: 60
    loss_target_pct: 150

scheduler:
  debounce_ms: 500

observability:
  logging:
    level: "${ANALYTICS_CONFIG_TEST_LEVEL:-debug}"
    format: "pretty"
  metrics:
    enabled: true
    listen_addr: "127.0.0.1:9464"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert!((config.pricing.risk_free_rate - 0.04).abs() < f64::EPSILON);
        assert!((config.pricing.min_dte_floor - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.projection.params().scenario_moves_pct, vec![-5.0, 0.0, 5.0]);
        assert!(!config.roll.params().enabled);
        assert_eq!(config.roll.late_stage_dte, 14);
        assert!((config.roll.credit_min_reward_to_risk - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.scheduler.debounce().as_millis(), 500);
        assert_eq!(config.observability.logging.level, "debug");
        assert_eq!(config.observability.logging.format, LogFormat::Pretty);
        assert!(config.observability.metrics.enabled);
        assert_eq!(config.observability.metrics.listen_addr.port(), 9464);

        let table = config.strategies.table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rules()[0].name, "Short Call");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "projection:\n  horizon_days: 10").unwrap();
        let path = file.path().to_str().unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.projection.horizon_days, 10);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let path = path.to_str().unwrap();

        assert!(matches!(
            load_config(Some(path)),
            Err(ConfigError::ReadError { .. })
        ));
        let config = load_config_or_default(Some(path)).unwrap();
        assert_eq!(config.projection.horizon_days, 45);
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.yaml");
        let config = load_config(Some(path)).unwrap();
        let defaults = Config::default();

        assert_eq!(config.projection.scenario_moves_pct, defaults.projection.scenario_moves_pct);
        assert_eq!(config.targets, defaults.targets);
        assert_eq!(config.roll.late_stage_dte, defaults.roll.late_stage_dte);
        assert_eq!(config.scheduler.debounce(), defaults.scheduler.debounce());
        assert_eq!(config.observability.metrics, defaults.observability.metrics);
        assert_eq!(config.strategies.table().unwrap().len(), StrategyTable::standard().len());
    }
}
