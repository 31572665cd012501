use std::env;
use std::time::Duration as StdDuration;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password_reset: PasswordResetConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub grpc_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
}

impl JwtConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_ttl_minutes)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_ttl_days)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordResetConfig {
    #[serde(default = "default_reset_ttl_minutes")]
    pub ttl_minutes: i64,
    #[serde(default = "default_link_base_url")]
    pub link_base_url: String,
}

impl PasswordResetConfig {
    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.ttl_minutes)
    }
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_reset_ttl_minutes(),
            link_base_url: default_link_base_url(),
        }
    }
}

/// Email outbox settings. Emails are published to `topic` and delivered by
/// an external mailer.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub brokers: String,
    pub topic: String,
    pub sender: String,
    #[serde(default = "default_dispatch_timeout_ms")]
    pub dispatch_timeout_ms: u64,
}

impl EmailConfig {
    pub fn dispatch_timeout(&self) -> StdDuration {
        StdDuration::from_millis(self.dispatch_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MaintenanceConfig {
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
    #[serde(default = "default_prune_grace_hours")]
    pub prune_grace_hours: i64,
}

impl MaintenanceConfig {
    pub fn prune_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.prune_interval_secs)
    }

    pub fn prune_grace(&self) -> Duration {
        Duration::hours(self.prune_grace_hours)
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            prune_interval_secs: default_prune_interval_secs(),
            prune_grace_hours: default_prune_grace_hours(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_access_ttl_minutes() -> i64 {
    15
}

fn default_refresh_ttl_days() -> i64 {
    30
}

fn default_reset_ttl_minutes() -> i64 {
    60
}

fn default_link_base_url() -> String {
    String::from("http://localhost:3000/reset-password")
}

fn default_dispatch_timeout_ms() -> u64 {
    2_000
}

fn default_prune_interval_secs() -> u64 {
    3_600
}

fn default_prune_grace_hours() -> i64 {
    24
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}
