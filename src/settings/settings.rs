use anyhow::{Result, anyhow, bail};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub database: Database,
    pub queries: Queries,
    pub auth_code: AuthCode,
    pub suite: Suite,
    pub log: Log,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: String, // e.g. "http://localhost:9999/api"
    pub timeout_secs: u64,
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Deserialize)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

// The url carries the password.
impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Queries {
    pub path: String,
}

/// Polling schedule used while waiting for the service to persist a fresh code.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthCode {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub deadline_ms: u64,
}

impl AuthCode {
    /// A zero initial delay would never grow and poll the database in a tight loop.
    fn validate(&self) -> Result<()> {
        if self.initial_delay_ms == 0 {
            bail!("auth_code.initial_delay_ms must be at least 1");
        }
        if self.max_delay_ms < self.initial_delay_ms {
            bail!("auth_code.max_delay_ms must not be below auth_code.initial_delay_ms");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Suite {
    pub login: String,
    pub password: String,
    pub transfer_amount: i64, // minor units
    pub clear_after_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "BANK_SUITE";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;
    settings.auth_code.validate()?;

    Ok(settings)
}
