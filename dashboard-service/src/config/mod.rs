use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    /// Empty string disables OTLP export.
    pub otlp_endpoint: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(format!("Unknown environment '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub signup_attempts: u32,
    pub signup_window_seconds: u64,
    pub global_ip_limit: u32,
    pub global_ip_window_seconds: u64,
}

/// Billing policy knobs. The tax rate deliberately lives here rather than
/// in code: the business has run with both 10% and 18% over time.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub tax_rate: Decimal,
    pub invoice_number_prefix: String,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let config = DashboardConfig {
            common,
            environment,
            service_name: get_env("SERVICE_NAME", Some("dashboard-service"))?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")))?,
            log_level: get_env("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: get_env("OTLP_ENDPOINT", Some(""))?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "10")?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", "1")?,
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET", None)?,
                access_token_expiry_minutes: parse_env("JWT_ACCESS_TOKEN_EXPIRY_MINUTES", "60")?,
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("http://localhost:3000"))?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            rate_limit: RateLimitConfig {
                login_attempts: parse_env("RATE_LIMIT_LOGIN_ATTEMPTS", "10")?,
                login_window_seconds: parse_env("RATE_LIMIT_LOGIN_WINDOW_SECONDS", "60")?,
                signup_attempts: parse_env("RATE_LIMIT_SIGNUP_ATTEMPTS", "5")?,
                signup_window_seconds: parse_env("RATE_LIMIT_SIGNUP_WINDOW_SECONDS", "60")?,
                global_ip_limit: parse_env("RATE_LIMIT_GLOBAL_IP_LIMIT", "300")?,
                global_ip_window_seconds: parse_env("RATE_LIMIT_GLOBAL_IP_WINDOW_SECONDS", "60")?,
            },
            billing: BillingConfig {
                tax_rate: parse_env("BILLING_TAX_RATE", "0.18")?,
                invoice_number_prefix: get_env("BILLING_INVOICE_NUMBER_PREFIX", Some("INV"))?,
            },
        };

        Ok(config)
    }
}

fn get_env(name: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => default.map(String::from).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "Missing required environment variable {}",
                name
            ))
        }),
    }
}

fn parse_env<T>(name: &str, default: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env(name, Some(default))?.parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Invalid value for {}: {}", name, e))
    })
}
