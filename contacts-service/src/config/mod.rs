use serde::Deserialize;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ContactsConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub datastore: DatastoreBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub server_selection_timeout_ms: u64,
}

impl MongoConfig {
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_millis(self.server_selection_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreBackend {
    Mongodb,
    Memory,
}

impl ContactsConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        let config = ContactsConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("test"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("contacts"), is_prod)?,
                server_selection_timeout_ms: get_env(
                    "MONGODB_SERVER_SELECTION_TIMEOUT_MS",
                    Some("29000"),
                    is_prod,
                )?
                .parse::<u64>()
                .map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "MONGODB_SERVER_SELECTION_TIMEOUT_MS is not a number: {}",
                        e
                    ))
                })?,
            },
            datastore: get_env("DATASTORE_BACKEND", Some("mongodb"), is_prod)?
                .parse::<DatastoreBackend>()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// The datastore must give up before the host does, so an outage surfaces
    /// as a 503 with a retry hint instead of a generic request timeout.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.mongodb.server_selection_timeout() >= self.common.request_timeout() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "MONGODB_SERVER_SELECTION_TIMEOUT_MS ({}ms) must be less than the request timeout ({}s)",
                self.mongodb.server_selection_timeout_ms,
                self.common.request_timeout_secs
            )));
        }
        Ok(())
    }
}

impl std::str::FromStr for DatastoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(DatastoreBackend::Mongodb),
            "memory" => Ok(DatastoreBackend::Memory),
            _ => Err(format!("Invalid datastore backend: {}", s)),
        }
    }
}
