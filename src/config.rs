use std::{fs, path::Path};

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// backend HTTP API config
    pub api: ApiConfig,
    /// event stream config
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// backend base url
    pub base_url: String,
    /// request timeout in milliseconds
    pub timeout_ms: u64,
    /// authorization scheme sent with every request
    pub auth: ApiAuth,
}

/// Authorization scheme for backend requests.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "scheme")]
pub enum ApiAuth {
    #[default]
    None,
    Bearer {
        token: String,
    },
    /// `user:pass` credentials, base64-encoded on send. A value without
    /// a colon is assumed pre-encoded and passed through.
    Basic {
        credentials: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// websocket base url
    pub url: String,
    /// bound on consecutive reconnect attempts
    pub max_reconnect_attempts: u32,
    /// base reconnect delay in milliseconds; attempt n waits n times this
    pub reconnect_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_ms: 30_000,
            auth: ApiAuth::None,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8001".to_string(),
            max_reconnect_attempts: 5,
            reconnect_backoff_ms: 2000,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Self {
        let data = fs::read_to_string(path.as_ref()).expect(&format!("failed to load config file {:?}", path.as_ref()));

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Self {
        let config = toml::from_str::<Config>(toml_str).expect("failed to parse the toml str");
        config
    }
}
