use serde::Deserialize;
use std::env;
use std::time::Duration;
use tripverse_shared::Masked;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub redis: RedisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub anon_key: Option<Masked<String>>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 { 10 }

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    "tripverse_user".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    /// Session slots live in process memory when unset.
    pub url: Option<String>,
}

/// Which collaborators the application is wired with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataMode {
    Mock,
    Remote { url: String, anon_key: Masked<String> },
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Remote { .. } => "remote",
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `TRIPVERSE__BACKEND__URL=https://...`
            .add_source(config::Environment::with_prefix("TRIPVERSE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Remote only when both the backend url and the anon key are present.
    pub fn data_mode(&self) -> DataMode {
        let present = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let url = present(self.backend.url.as_deref());
        let anon_key = present(self.backend.anon_key.as_ref().map(|key| key.expose().as_str()));

        match (url, anon_key) {
            (Some(url), Some(anon_key)) => DataMode::Remote {
                url,
                anon_key: Masked(anon_key),
            },
            _ => DataMode::Mock,
        }
    }
}
