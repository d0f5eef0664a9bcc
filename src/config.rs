use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the shoe catalogue JSON file
    #[serde(default = "default_catalogue_path")]
    pub catalogue_path: String,

    /// Prose generation endpoint; template prose is used when unset
    #[serde(default)]
    pub prose_api_url: Option<String>,

    /// Bearer token for the prose generation endpoint
    #[serde(default)]
    pub prose_api_key: Option<String>,

    /// Upper bound on a single prose generation call
    #[serde(default = "default_prose_timeout_ms")]
    pub prose_timeout_ms: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalogue_path() -> String {
    "data/catalogue.json".to_string()
}

fn default_prose_timeout_ms() -> u64 {
    4000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn prose_timeout(&self) -> Duration {
        Duration::from_millis(self.prose_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
