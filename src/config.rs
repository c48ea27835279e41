use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_TIME_ZONE: &str = "Asia/Bangkok";
const DEFAULT_TREND_LOOKBACK_DAYS: u32 = 7;
const DEFAULT_TOP_PRODUCTS_LIMIT: usize = 5;
const DEFAULT_SALES_DROP_ALERT_PERCENT: f64 = -20.0;
const DEFAULT_ATTENDANCE_DROP_ALERT_PERCENT: f64 = -20.0;
const DEFAULT_TICKET_SPIKE_ALERT_PERCENT: f64 = 50.0;

/// Dashboard engine tuning
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// IANA timezone used when a request carries none
    #[serde(default = "default_time_zone")]
    #[validate(custom = "validate_time_zone")]
    pub time_zone: String,

    /// Days of sales history in the snapshot trend (1-90)
    #[serde(default = "default_trend_lookback_days")]
    #[validate(range(min = 1, max = 90))]
    pub trend_lookback_days: u32,

    /// Entries kept in the snapshot top-product list
    #[serde(default = "default_top_products_limit")]
    pub top_products_limit: usize,

    /// Sales delta (percent) at or below which the sales alert fires
    #[serde(default = "default_sales_drop_alert_percent")]
    pub sales_drop_alert_percent: f64,

    /// Attendance delta (percent) at or below which the attendance alert fires
    #[serde(default = "default_attendance_drop_alert_percent")]
    pub attendance_drop_alert_percent: f64,

    /// Average-ticket delta (percent) at or above which the anomaly alert fires
    #[serde(default = "default_ticket_spike_alert_percent")]
    pub ticket_spike_alert_percent: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            trend_lookback_days: default_trend_lookback_days(),
            top_products_limit: default_top_products_limit(),
            sales_drop_alert_percent: default_sales_drop_alert_percent(),
            attendance_drop_alert_percent: default_attendance_drop_alert_percent(),
            ticket_spike_alert_percent: default_ticket_spike_alert_percent(),
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Dashboard engine configuration
    #[serde(default)]
    #[validate]
    pub dashboard: DashboardConfig,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            dashboard: DashboardConfig::default(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Parsed default timezone; configuration validation guarantees the name
    /// resolves, so the UTC fallback is unreachable in a validated config.
    pub fn dashboard_time_zone(&self) -> chrono_tz::Tz {
        self.dashboard.time_zone.parse().unwrap_or_else(|_| {
            error!(
                time_zone = %self.dashboard.time_zone,
                "configured timezone failed to parse, using UTC"
            );
            chrono_tz::Tz::UTC
        })
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_trend_lookback_days() -> u32 {
    DEFAULT_TREND_LOOKBACK_DAYS
}

fn default_top_products_limit() -> usize {
    DEFAULT_TOP_PRODUCTS_LIMIT
}

fn default_sales_drop_alert_percent() -> f64 {
    DEFAULT_SALES_DROP_ALERT_PERCENT
}

fn default_attendance_drop_alert_percent() -> f64 {
    DEFAULT_ATTENDANCE_DROP_ALERT_PERCENT
}

fn default_ticket_spike_alert_percent() -> f64 {
    DEFAULT_TICKET_SPIKE_ALERT_PERCENT
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Validates IANA timezone names
fn validate_time_zone(name: &str) -> Result<(), ValidationError> {
    if name.parse::<chrono_tz::Tz>().is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_zone");
        err.message = Some("Must be a valid IANA timezone name, e.g. Asia/Bangkok".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("retailops_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 8080);
        assert_eq!(config.dashboard.trend_lookback_days, 7);
    }

    #[test]
    fn default_time_zone_parses() {
        let config = AppConfig::default();
        assert_eq!(config.dashboard_time_zone(), chrono_tz::Asia::Bangkok);
    }

    #[test]
    fn bad_time_zone_fails_validation() {
        let config = AppConfig {
            dashboard: DashboardConfig {
                time_zone: "Mars/Olympus_Mons".to_string(),
                ..DashboardConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let config = AppConfig {
            log_level: "verbose".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn permissive_cors_only_in_development_or_by_override() {
        let dev = AppConfig::default();
        assert!(dev.should_allow_permissive_cors());

        let prod = AppConfig {
            environment: "production".to_string(),
            ..AppConfig::default()
        };
        assert!(!prod.should_allow_permissive_cors());

        let prod_override = AppConfig {
            environment: "production".to_string(),
            cors_allow_any_origin: true,
            ..AppConfig::default()
        };
        assert!(prod_override.should_allow_permissive_cors());
    }
}
