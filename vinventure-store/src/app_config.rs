use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,
    #[serde(default = "default_admission_timeout")]
    pub admission_timeout_ms: u64,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: i64,
}

fn default_page_limit() -> u32 {
    20
}
fn default_max_page_limit() -> u32 {
    100
}
fn default_admission_timeout() -> u64 {
    5_000
}
fn default_rate_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Which identity backend verifies bearer tokens: "federated" or "directory".
    /// Picked once at bootstrap.
    pub provider: String,
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    /// Issuer pinned by the managed-directory resolver.
    #[serde(default = "default_directory_issuer")]
    pub directory_issuer: String,
}

fn default_directory_issuer() -> String {
    "https://directory.vinventure.local".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file; optional, defaults to 'development'
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file; this file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of VINVENTURE)
            // Eg. `VINVENTURE__SERVER__PORT=8080` would set the server port
            .add_source(config::Environment::with_prefix("VINVENTURE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
