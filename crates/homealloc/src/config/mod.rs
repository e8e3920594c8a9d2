use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::workflows::allocation::{AllocationConfig, SizeAdequacyConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub allocation: AllocationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidValue {
                var: "APP_LOG_FORMAT",
                value: raw,
            })?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            allocation: load_allocation_config()?,
        })
    }
}

fn load_allocation_config() -> Result<AllocationConfig, ConfigError> {
    let defaults = AllocationConfig::default();

    let reference_income = parse_var("APP_REFERENCE_INCOME", defaults.reference_income)?;
    if !reference_income.is_finite() || reference_income <= 0.0 {
        return Err(ConfigError::InvalidValue {
            var: "APP_REFERENCE_INCOME",
            value: reference_income.to_string(),
        });
    }

    let match_threshold = parse_var("APP_MATCH_THRESHOLD", defaults.batch.match_threshold)?;

    let mut batch = defaults.batch;
    batch.match_threshold = match_threshold;
    batch.max_applicants = parse_optional_limit("APP_BATCH_MAX_APPLICANTS")?;
    batch.max_houses_per_applicant = parse_optional_limit("APP_BATCH_MAX_HOUSES")?;

    let mut suggestions = defaults.suggestions;
    suggestions.match_threshold = match_threshold;
    if let Some(limit) = parse_optional_limit("APP_SUGGESTION_MAX_APPLICANTS")? {
        suggestions.max_applicants = Some(limit);
    }
    if let Some(limit) = parse_optional_limit("APP_SUGGESTION_MAX_HOUSES")? {
        suggestions.max_houses_per_applicant = Some(limit);
    }

    let size_adequacy = match env::var("APP_MATCH_SIZE_FACTOR") {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(SizeAdequacyConfig::default()),
            "0" | "false" | "no" | "off" | "" => None,
            _ => {
                return Err(ConfigError::InvalidValue {
                    var: "APP_MATCH_SIZE_FACTOR",
                    value: raw,
                })
            }
        },
        Err(_) => defaults.size_adequacy,
    };

    Ok(AllocationConfig {
        reference_income,
        batch,
        suggestions,
        size_adequacy,
    })
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_optional_var<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Selection caps must admit at least one applicant or house.
fn parse_optional_limit(var: &'static str) -> Result<Option<usize>, ConfigError> {
    match parse_optional_var::<usize>(var)? {
        Some(0) => Err(ConfigError::InvalidValue {
            var,
            value: "0".to_string(),
        }),
        limit => Ok(limit),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { var, value } => {
                write!(f, "{var} has an unusable value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort | ConfigError::InvalidValue { .. } => None,
        }
    }
}
