//! Configuration loaded from the environment (and `.env` via dotenvy)

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::pricing::PricingPolicy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    /// Multiply daily/weekly rates by duration
    #[serde(rename = "pricing_scale_long_stays")]
    pub scale_long_stays_by_duration: bool,
    /// Fixed seed for the availability calendar; random when unset
    #[serde(default)]
    pub availability_seed: Option<u64>,
    pub session_ttl_minutes: u64,
}

impl AppConfig {
    /// Read configuration from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default().try_parsing(true))
    }

    /// Build configuration from defaults overlaid with an environment source
    fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("database_max_connections", 5)?
            .set_default("pricing_scale_long_stays", false)?
            .set_default("session_ttl_minutes", 30)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            scale_long_stays_by_duration: self.scale_long_stays_by_duration,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
